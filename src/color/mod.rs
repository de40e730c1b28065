//! Color conversion and perceptual difference
//!
//! This module handles the sRGB → XYZ → L*a*b* chain and the CIEDE2000
//! metric used to rank catalog entries against detected shades.

pub mod conversion;
pub mod difference;

pub use conversion::{hex_to_lab, parse_hex, rgb_to_lab, rgb_to_xyz, to_hex, xyz_to_lab, LabColor, XyzColor};
pub use difference::{delta_e_2000, delta_e_76, MatchQuality};
