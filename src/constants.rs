//! Reference constants for color conversion, segmentation and matching
//!
//! Colorimetric values follow the sRGB (IEC 61966-2-1) and CIE 1976 L*a*b*
//! definitions. Pipeline defaults match the deployed U^2-Net hair model.

/// D65 Standard Illuminant Reference
///
/// CIE Standard Illuminant D65 represents average daylight with a correlated
/// color temperature of 6504K. This is the reference white for sRGB.
pub mod d65 {
    /// D65 white point in CIE XYZ color space (Y normalized to 1.0)
    /// Source: CIE 15:2004 Colorimetry, 3rd edition
    pub const WHITE_POINT_XYZ: [f64; 3] = [0.95047, 1.00000, 1.08883];
}

/// Re-export D65 white point at top level for convenience
pub const D65_WHITE_POINT_XYZ: [f64; 3] = d65::WHITE_POINT_XYZ;

/// sRGB transfer function and primaries
pub mod srgb {
    /// Encoded values at or below this use the linear segment
    pub const LINEAR_THRESHOLD: f64 = 0.04045;

    /// Slope divisor of the linear segment
    pub const LINEAR_SLOPE: f64 = 12.92;

    /// Offset of the power-law segment
    pub const GAMMA_OFFSET: f64 = 0.055;

    /// Exponent of the power-law segment
    pub const GAMMA_EXPONENT: f64 = 2.4;

    /// Linear sRGB to CIE XYZ (D65), row-major
    pub const TO_XYZ: [[f64; 3]; 3] = [
        [0.4124564, 0.3575761, 0.1804375],
        [0.2126729, 0.7151522, 0.0721750],
        [0.0193339, 0.1191920, 0.9503041],
    ];
}

/// CIE L*a*b* nonlinear response parameters
pub mod lab {
    /// Values above this take the cube root
    pub const EPSILON: f64 = 0.008856;

    /// Slope of the linear segment below EPSILON
    pub const KAPPA_SLOPE: f64 = 7.787;

    /// Offset of the linear segment below EPSILON
    pub const LINEAR_OFFSET: f64 = 16.0 / 116.0;
}

/// CIEDE2000 empirical coefficients
pub mod ciede2000 {
    /// 25^7, the chroma normalization used by G and R_C
    pub const TWENTY_FIVE_POW_7: f64 = 6_103_515_625.0;
}

/// Segmentation model grid and mask thresholds
pub mod segmentation {
    /// Fixed model input/output width in pixels
    pub const MODEL_INPUT_WIDTH: usize = 320;

    /// Fixed model input/output height in pixels
    pub const MODEL_INPUT_HEIGHT: usize = 320;

    /// Activation above which a pixel counts as foreground (strict)
    pub const MASK_THRESHOLD: f32 = 0.3;

    /// Hair class index for multi-class human parsing models
    pub const HAIR_CLASS_INDEX: usize = 17;
}

/// Shade clustering parameters
pub mod clustering {
    /// Default number of hair shades extracted per photo
    pub const DEFAULT_SHADE_COUNT: usize = 3;

    /// Maximum k-means assignment/update rounds
    pub const MAX_ITERATIONS: usize = 30;
}

/// Catalog matching parameters
pub mod matching {
    /// Default number of catalog entries returned per detected shade
    pub const DEFAULT_TOP_K: usize = 3;
}

/// Catalog storage defaults
pub mod catalog {
    /// Side length used when sampling an extension image for its mean color
    pub const SAMPLE_SIZE: u32 = 256;

    /// Default catalog database file
    pub const DATABASE_FILE: &str = "data/extensions.json";

    /// Default directory holding extension images
    pub const DATA_DIR: &str = "data";
}
