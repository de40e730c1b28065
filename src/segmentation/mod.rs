//! Segmentation output handling
//!
//! This module defines the seam to the external segmentation model and turns
//! its raw activation tensor into a binary hair mask.

pub mod mask;
pub mod model;

pub use mask::{extract_mask, HairMask, MaskExtractor, MaskPolicy};
pub use model::{InputTensor, SegmentationModel, SegmentationOutput};
