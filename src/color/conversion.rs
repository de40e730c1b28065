//! Color space conversion utilities
//!
//! Provides the sRGB → CIE XYZ → CIE L*a*b* chain used for every detected
//! shade and catalog entry:
//! - sRGB (0-255) to XYZ with inverse companding and the sRGB/D65 matrix
//! - XYZ to Lab relative to the D65 reference white
//! - Hex color representation
//!
//! All conversions are pure and deterministic: equal inputs give
//! bit-identical outputs.

use palette::{white_point::D65, FromColor, Lab, Lch, Srgb};
use serde::{Deserialize, Serialize};

use crate::constants::{lab, srgb, D65_WHITE_POINT_XYZ};
use crate::{AnalysisError, Result};

/// CIE XYZ tristimulus values (Y of reference white = 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XyzColor {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// CIE L*a*b* coordinates under D65
///
/// Serialized as a `[L, a, b]` array, the layout used by catalog records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct LabColor {
    /// Lightness, nominally 0-100
    pub l: f64,
    /// Green-red axis
    pub a: f64,
    /// Blue-yellow axis
    pub b: f64,
}

impl LabColor {
    pub const fn new(l: f64, a: f64, b: f64) -> Self {
        Self { l, a, b }
    }

    /// Chroma, the distance from the neutral axis
    pub fn chroma(&self) -> f64 {
        self.a.hypot(self.b)
    }

    /// Convert to the cylindrical LCh representation
    pub fn to_lch(&self) -> Lch<D65, f64> {
        Lch::from_color(Lab::<D65, f64>::from(*self))
    }
}

impl From<[f64; 3]> for LabColor {
    fn from([l, a, b]: [f64; 3]) -> Self {
        Self { l, a, b }
    }
}

impl From<LabColor> for [f64; 3] {
    fn from(color: LabColor) -> Self {
        [color.l, color.a, color.b]
    }
}

impl From<LabColor> for Lab<D65, f64> {
    fn from(color: LabColor) -> Self {
        Lab::new(color.l, color.a, color.b)
    }
}

/// Undo sRGB companding for one channel in [0, 1]
fn srgb_to_linear(c: f64) -> f64 {
    if c <= srgb::LINEAR_THRESHOLD {
        c / srgb::LINEAR_SLOPE
    } else {
        ((c + srgb::GAMMA_OFFSET) / (1.0 + srgb::GAMMA_OFFSET)).powf(srgb::GAMMA_EXPONENT)
    }
}

/// CIE Lab nonlinear response
fn lab_f(t: f64) -> f64 {
    if t > lab::EPSILON {
        t.cbrt()
    } else {
        lab::KAPPA_SLOPE * t + lab::LINEAR_OFFSET
    }
}

/// Convert sRGB channels in [0, 255] to CIE XYZ
///
/// Channels may be fractional (cluster centroids are means of byte values).
pub fn rgb_to_xyz(r: f64, g: f64, b: f64) -> XyzColor {
    let linear = [
        srgb_to_linear(r / 255.0),
        srgb_to_linear(g / 255.0),
        srgb_to_linear(b / 255.0),
    ];
    let m = &srgb::TO_XYZ;
    let row = |i: usize| m[i][0] * linear[0] + m[i][1] * linear[1] + m[i][2] * linear[2];

    XyzColor {
        x: row(0),
        y: row(1),
        z: row(2),
    }
}

/// Convert CIE XYZ to L*a*b* relative to the D65 white point
pub fn xyz_to_lab(xyz: XyzColor) -> LabColor {
    let [xn, yn, zn] = D65_WHITE_POINT_XYZ;
    let fx = lab_f(xyz.x / xn);
    let fy = lab_f(xyz.y / yn);
    let fz = lab_f(xyz.z / zn);

    LabColor {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Convert sRGB channels in [0, 255] to L*a*b*
pub fn rgb_to_lab(r: f64, g: f64, b: f64) -> LabColor {
    xyz_to_lab(rgb_to_xyz(r, g, b))
}

/// Format RGB channels as `#rrggbb`
///
/// Channels are rounded and clamped to the byte range first.
pub fn to_hex(r: f64, g: f64, b: f64) -> String {
    let byte = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))
}

/// Parse `#rrggbb` (or `rrggbb`, `#rgb`) into byte channels
///
/// # Errors
///
/// Returns `ColorConversionError` if the string is not a valid hex color
pub fn parse_hex(hex: &str) -> Result<[u8; 3]> {
    let srgb: Srgb<u8> = hex.trim().parse().map_err(|e| AnalysisError::ColorConversionError {
        message: format!("Invalid hex color '{}': {}", hex, e),
    })?;
    Ok([srgb.red, srgb.green, srgb.blue])
}

/// Parse a hex color and convert it straight to L*a*b*
pub fn hex_to_lab(hex: &str) -> Result<LabColor> {
    let [r, g, b] = parse_hex(hex)?;
    Ok(rgb_to_lab(r as f64, g as f64, b as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;

    #[test]
    fn test_rgb_to_lab_white() {
        let lab = rgb_to_lab(255.0, 255.0, 255.0);
        assert!((lab.l - 100.0).abs() < 0.5);
        assert!(lab.a.abs() < 0.5);
        assert!(lab.b.abs() < 0.5);
    }

    #[test]
    fn test_rgb_to_lab_black() {
        let lab = rgb_to_lab(0.0, 0.0, 0.0);
        assert!(lab.l.abs() < 0.5);
        assert!(lab.a.abs() < 0.5);
        assert!(lab.b.abs() < 0.5);
    }

    #[test]
    fn test_rgb_to_lab_is_bit_identical() {
        let first = rgb_to_lab(139.0, 69.0, 19.0);
        let second = rgb_to_lab(139.0, 69.0, 19.0);
        assert_eq!(first.l.to_bits(), second.l.to_bits());
        assert_eq!(first.a.to_bits(), second.a.to_bits());
        assert_eq!(first.b.to_bits(), second.b.to_bits());
    }

    #[test]
    fn test_rgb_to_xyz_white_is_reference_white() {
        let xyz = rgb_to_xyz(255.0, 255.0, 255.0);
        assert!((xyz.x - 0.95047).abs() < 1e-4);
        assert!((xyz.y - 1.0).abs() < 1e-4);
        assert!((xyz.z - 1.08883).abs() < 1e-4);
    }

    #[test]
    fn test_linear_segment_below_threshold() {
        // 10/255 is below 0.04045 so only the linear segment applies
        let xyz = rgb_to_xyz(10.0, 10.0, 10.0);
        let linear = (10.0 / 255.0) / 12.92;
        assert!((xyz.y - linear).abs() < 1e-7);
    }

    #[test]
    fn test_primaries_match_known_lab() {
        let red = rgb_to_lab(255.0, 0.0, 0.0);
        assert!((red.l - 53.24).abs() < 0.1);
        assert!((red.a - 80.09).abs() < 0.1);
        assert!((red.b - 67.20).abs() < 0.1);

        let blue = rgb_to_lab(0.0, 0.0, 255.0);
        assert!((blue.l - 32.30).abs() < 0.1);
        assert!(blue.b < -100.0);
    }

    #[test]
    fn test_agrees_with_palette() {
        for &(r, g, b) in &[(139u8, 69u8, 19u8), (200, 180, 150), (40, 30, 25), (128, 128, 128)] {
            let ours = rgb_to_lab(r as f64, g as f64, b as f64);
            let theirs: Lab<D65, f64> = Lab::from_color(Srgb::new(r, g, b).into_format::<f64>());
            assert!((ours.l - theirs.l).abs() < 0.05, "L for ({r},{g},{b})");
            assert!((ours.a - theirs.a).abs() < 0.05, "a for ({r},{g},{b})");
            assert!((ours.b - theirs.b).abs() < 0.05, "b for ({r},{g},{b})");
        }
    }

    #[test]
    fn test_to_hex_rounds_and_clamps() {
        assert_eq!(to_hex(139.0, 69.0, 19.0), "#8b4513");
        assert_eq!(to_hex(0.4, 254.6, 15.5), "#00ff10");
        assert_eq!(to_hex(-3.0, 300.0, 0.0), "#00ff00");
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#8b4513").unwrap(), [139, 69, 19]);
        assert_eq!(parse_hex("8B4513").unwrap(), [139, 69, 19]);
        assert!(parse_hex("#GGGGGG").is_err());
        assert!(parse_hex("#12345").is_err());
    }

    #[test]
    fn test_hex_to_lab_matches_rgb_to_lab() {
        let from_hex = hex_to_lab("#8b4513").unwrap();
        assert_eq!(from_hex, rgb_to_lab(139.0, 69.0, 19.0));
    }

    #[test]
    fn test_lab_serializes_as_array() {
        let lab = LabColor::new(37.5, 23.25, 46.0);
        let json = serde_json::to_string(&lab).unwrap();
        assert_eq!(json, "[37.5,23.25,46.0]");
        let back: LabColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lab);
    }

    #[test]
    fn test_lab_to_lch() {
        let lab = LabColor::new(50.0, 25.0, 25.0);
        let lch = lab.to_lch();
        assert!((lch.l - 50.0).abs() < 1e-9);
        assert!((lch.chroma - lab.chroma()).abs() < 1e-9);
        assert!((lch.hue.into_positive_degrees() - 45.0).abs() < 1e-9);
    }
}
