//! Perceptual color difference
//!
//! CIEDE2000 (CIE 142-2001) is the ranking metric for catalog matching.
//! The hue terms follow Sharma, Wu & Dalal (2005), including the achromatic
//! branches where hue is undefined.

use std::f64::consts::PI;

use super::conversion::LabColor;
use crate::constants::ciede2000::TWENTY_FIVE_POW_7;

/// Hue angle in degrees, normalized to [0, 360)
fn hue_angle(a: f64, b: f64) -> f64 {
    if a == 0.0 && b == 0.0 {
        return 0.0;
    }
    let h = b.atan2(a).to_degrees();
    if h < 0.0 {
        h + 360.0
    } else {
        h
    }
}

/// sqrt(C^7 / (C^7 + 25^7)), shared by the G and R_C terms
fn chroma_weight(c: f64) -> f64 {
    let c7 = c.powi(7);
    (c7 / (c7 + TWENTY_FIVE_POW_7)).sqrt()
}

/// CIEDE2000 color difference (ΔE00) with k_L = k_C = k_H = 1
///
/// Returns 0 for identical inputs and is never negative.
pub fn delta_e_2000(lab1: LabColor, lab2: LabColor) -> f64 {
    let (l1, a1, b1) = (lab1.l, lab1.a, lab1.b);
    let (l2, a2, b2) = (lab2.l, lab2.a, lab2.b);

    let c_mean = (a1.hypot(b1) + a2.hypot(b2)) / 2.0;
    let g = 0.5 * (1.0 - chroma_weight(c_mean));

    let a1p = (1.0 + g) * a1;
    let a2p = (1.0 + g) * a2;
    let c1p = a1p.hypot(b1);
    let c2p = a2p.hypot(b2);
    let h1p = hue_angle(a1p, b1);
    let h2p = hue_angle(a2p, b2);
    let achromatic = c1p * c2p == 0.0;

    let delta_lp = l2 - l1;
    let delta_cp = c2p - c1p;

    // shortest way round the hue circle
    let delta_hp = if achromatic {
        0.0
    } else {
        let dh = h2p - h1p;
        if dh > 180.0 {
            dh - 360.0
        } else if dh < -180.0 {
            dh + 360.0
        } else {
            dh
        }
    };
    let delta_big_hp = 2.0 * (c1p * c2p).sqrt() * (delta_hp.to_radians() / 2.0).sin();

    let lp_mean = (l1 + l2) / 2.0;
    let cp_mean = (c1p + c2p) / 2.0;
    let hp_mean = if achromatic {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        (h1p + h2p) / 2.0
    } else if h1p + h2p < 360.0 {
        (h1p + h2p + 360.0) / 2.0
    } else {
        (h1p + h2p - 360.0) / 2.0
    };

    let t = 1.0 - 0.17 * (hp_mean - 30.0).to_radians().cos()
        + 0.24 * (2.0 * hp_mean).to_radians().cos()
        + 0.32 * (3.0 * hp_mean + 6.0).to_radians().cos()
        - 0.20 * (4.0 * hp_mean - 63.0).to_radians().cos();

    let lp_offset_sq = (lp_mean - 50.0).powi(2);
    let sl = 1.0 + 0.015 * lp_offset_sq / (20.0 + lp_offset_sq).sqrt();
    let sc = 1.0 + 0.045 * cp_mean;
    let sh = 1.0 + 0.015 * cp_mean * t;

    // blue region rotation
    let delta_theta = 30.0 * (-((hp_mean - 275.0) / 25.0).powi(2)).exp();
    let rt = -2.0 * chroma_weight(cp_mean) * (2.0 * delta_theta * PI / 180.0).sin();

    let term_l = delta_lp / sl;
    let term_c = delta_cp / sc;
    let term_h = delta_big_hp / sh;

    (term_l * term_l + term_c * term_c + term_h * term_h + rt * term_c * term_h)
        .max(0.0)
        .sqrt()
}

/// CIE76 color difference (Euclidean distance in Lab)
pub fn delta_e_76(lab1: LabColor, lab2: LabColor) -> f64 {
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Perceptual bucket for a ΔE00 value
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    /// ΔE00 < 1.0, not perceptible
    Exact,
    /// ΔE00 1.0-2.0, perceptible on close inspection
    Close,
    /// ΔE00 2.0-10.0, perceptible at a glance
    Similar,
    /// ΔE00 10.0-50.0
    Distinct,
    /// ΔE00 >= 50.0
    Opposite,
}

impl MatchQuality {
    pub fn from_delta_e(delta_e: f64) -> Self {
        if delta_e < 1.0 {
            Self::Exact
        } else if delta_e < 2.0 {
            Self::Close
        } else if delta_e < 10.0 {
            Self::Similar
        } else if delta_e < 50.0 {
            Self::Distinct
        } else {
            Self::Opposite
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lab(l: f64, a: f64, b: f64) -> LabColor {
        LabColor::new(l, a, b)
    }

    /// Sharma, Wu & Dalal (2005) test data, Table 1
    #[test]
    fn test_reference_pairs() {
        let pairs = [
            (50.0, 2.6772, -79.7751, 50.0, 0.0, -82.7485, 2.0425),
            (50.0, 3.1571, -77.2803, 50.0, 0.0, -82.7485, 2.8615),
            (50.0, 2.8361, -74.0200, 50.0, 0.0, -82.7485, 3.4412),
            (50.0, -1.3802, -84.2814, 50.0, 0.0, -82.7485, 1.0000),
            (50.0, -1.1848, -84.8006, 50.0, 0.0, -82.7485, 1.0000),
            (50.0, -0.9009, -85.5211, 50.0, 0.0, -82.7485, 1.0000),
            (50.0, 0.0, 0.0, 50.0, -1.0, 2.0, 2.3669),
            (50.0, -1.0, 2.0, 50.0, 0.0, 0.0, 2.3669),
            (50.0, 2.4900, -0.0010, 50.0, -2.4900, 0.0009, 7.1792),
            (50.0, 2.4900, -0.0010, 50.0, -2.4900, 0.0010, 7.1792),
            (50.0, 2.4900, -0.0010, 50.0, -2.4900, 0.0011, 7.2195),
            (50.0, 2.4900, -0.0010, 50.0, -2.4900, 0.0012, 7.2195),
            (50.0, -0.0010, 2.4900, 50.0, 0.0009, -2.4900, 4.8045),
            (50.0, -0.0010, 2.4900, 50.0, 0.0010, -2.4900, 4.8045),
            (50.0, -0.0010, 2.4900, 50.0, 0.0011, -2.4900, 4.7461),
            (50.0, 2.5, 0.0, 50.0, 0.0, -2.5, 4.3065),
            (50.0, 2.5, 0.0, 73.0, 25.0, -18.0, 27.1492),
            (50.0, 2.5, 0.0, 61.0, -5.0, 29.0, 22.8977),
            (50.0, 2.5, 0.0, 56.0, -27.0, -3.0, 31.9030),
            (50.0, 2.5, 0.0, 58.0, 24.0, 15.0, 19.4535),
            (50.0, 2.5, 0.0, 50.0, 3.1736, 0.5854, 1.0000),
            (50.0, 2.5, 0.0, 50.0, 3.2972, 0.0, 1.0000),
            (50.0, 2.5, 0.0, 50.0, 1.8634, 0.5757, 1.0000),
            (50.0, 2.5, 0.0, 50.0, 3.2592, 0.3350, 1.0000),
            (60.2574, -34.0099, 36.2677, 60.4626, -34.1751, 39.4387, 1.2644),
            (63.0109, -31.0961, -5.8663, 62.8187, -29.7946, -4.0864, 1.2630),
            (61.2901, 3.7196, -5.3901, 61.4292, 2.2480, -4.9620, 1.8731),
            (35.0831, -44.1164, 3.7933, 35.0232, -40.0716, 1.5901, 1.8645),
            (22.7233, 20.0904, -46.6940, 23.0331, 14.9730, -42.5619, 2.0373),
            (36.4612, 47.8580, 18.3852, 36.2715, 50.5065, 21.2231, 1.4146),
            (90.8027, -2.0831, 1.4410, 91.1528, -1.6435, 0.0447, 1.4441),
            (90.9257, -0.5406, -0.9208, 88.6381, -0.8985, -0.7239, 1.5381),
            (6.7747, -0.2908, -2.4247, 5.8714, -0.0985, -2.2286, 0.6377),
            (2.0776, 0.0795, -1.1350, 0.9033, -0.0636, -0.5514, 0.9082),
        ];

        for (i, &(l1, a1, b1, l2, a2, b2, expected)) in pairs.iter().enumerate() {
            let result = delta_e_2000(lab(l1, a1, b1), lab(l2, a2, b2));
            assert!(
                (result - expected).abs() < 2e-4,
                "pair {}: expected {:.4}, got {:.4}",
                i + 1,
                expected,
                result
            );
        }
    }

    #[test]
    fn test_identity_is_zero() {
        for color in [lab(0.0, 0.0, 0.0), lab(50.0, 25.0, -30.0), lab(37.5, 23.4, 46.4), lab(100.0, 0.0, 0.0)] {
            assert_eq!(delta_e_2000(color, color), 0.0);
        }
    }

    #[test]
    fn test_non_negative_and_swap_stable() {
        let samples = [
            lab(50.0, 25.0, -30.0),
            lab(60.0, -10.0, 15.0),
            lab(20.0, 0.0, 0.0),
            lab(75.0, 2.0, -60.0),
            lab(37.5, 23.4, 46.4),
        ];
        for &x in &samples {
            for &y in &samples {
                let forward = delta_e_2000(x, y);
                let backward = delta_e_2000(y, x);
                assert!(forward >= 0.0);
                assert!((forward - backward).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_achromatic_pair_ignores_hue() {
        // Two grays: only the lightness term contributes
        let de = delta_e_2000(lab(50.0, 0.0, 0.0), lab(60.0, 0.0, 0.0));
        let lp_offset_sq: f64 = 25.0;
        let sl = 1.0 + 0.015 * lp_offset_sq / (20.0 + lp_offset_sq).sqrt();
        assert!((de - 10.0 / sl).abs() < 1e-9);
    }

    #[test]
    fn test_hue_angle_quadrants() {
        assert!(hue_angle(1.0, 0.0).abs() < 1e-12);
        assert!((hue_angle(0.0, 1.0) - 90.0).abs() < 1e-12);
        assert!((hue_angle(-1.0, 0.0) - 180.0).abs() < 1e-12);
        assert!((hue_angle(0.0, -1.0) - 270.0).abs() < 1e-12);
        assert_eq!(hue_angle(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_delta_e_76() {
        assert_eq!(delta_e_76(lab(50.0, 0.0, 0.0), lab(50.0, 3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_match_quality_boundaries() {
        assert_eq!(MatchQuality::from_delta_e(0.0), MatchQuality::Exact);
        assert_eq!(MatchQuality::from_delta_e(1.0), MatchQuality::Close);
        assert_eq!(MatchQuality::from_delta_e(2.0), MatchQuality::Similar);
        assert_eq!(MatchQuality::from_delta_e(10.0), MatchQuality::Distinct);
        assert_eq!(MatchQuality::from_delta_e(50.0), MatchQuality::Opposite);
    }
}
