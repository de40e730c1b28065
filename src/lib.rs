//! # Hair Shade Match
//!
//! A Rust crate for extracting hair shades from portrait photographs and
//! matching them against a catalog of hair extension colors.
//!
//! This library provides perceptual shade matching by:
//! - Converting sRGB to CIE L*a*b* under D65
//! - Turning segmentation model output into a binary hair mask
//! - Clustering hair pixels into representative shades with k-means
//! - Ranking catalog entries by CIEDE2000 distance to each shade
//!
//! The segmentation network is supplied by the caller through the
//! [`SegmentationModel`] trait.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hair_shade_match::{match_photo, PipelineConfig, Result};
//! use hair_shade_match::segmentation::{InputTensor, SegmentationModel, SegmentationOutput};
//! use std::path::Path;
//!
//! struct MyModel;
//!
//! impl SegmentationModel for MyModel {
//!     fn input_size(&self) -> (usize, usize) {
//!         (320, 320)
//!     }
//!
//!     fn segment(&self, input: &InputTensor) -> Result<SegmentationOutput> {
//!         // run the network here
//!         # unimplemented!()
//!     }
//! }
//!
//! let report = match_photo(&MyModel, Path::new("photo.jpg"), &PipelineConfig::default())?;
//! for (shade, matches) in report.user_hair.iter().zip(&report.top_matches) {
//!     println!("{} -> {:?}", shade.hex, matches.first().map(|m| &m.entry.name));
//! }
//! # Ok::<(), hair_shade_match::AnalysisError>(())
//! ```

use std::path::Path;

pub mod catalog;
pub mod clustering;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod image_loader;
pub mod logger;
pub mod pipeline;
pub mod segmentation;

pub use catalog::{Catalog, CatalogEntry, CatalogMatcher, CatalogStore, JsonCatalogStore, RankedEntry, Upsert};
pub use clustering::{Shade, ShadeClusterer};
pub use color::{delta_e_2000, rgb_to_lab, rgb_to_xyz, xyz_to_lab, LabColor, MatchQuality, XyzColor};
pub use config::PipelineConfig;
pub use error::{AnalysisError, Result};
pub use image_loader::RgbFrame;
pub use pipeline::{HairPipeline, MatchReport};
pub use segmentation::{extract_mask, HairMask, MaskPolicy, SegmentationModel};

/// Match the hair in a photo against the catalog named by `config`
///
/// This is the main entry point. It loads the photo at the model grid,
/// detects hair shades and ranks the stored catalog against each one.
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - The configuration is invalid
/// - The photo cannot be loaded
/// - The model fails or returns a tensor on the wrong grid
/// - The catalog cannot be read
pub fn match_photo<M>(model: &M, photo: &Path, config: &PipelineConfig) -> Result<MatchReport>
where
    M: SegmentationModel + ?Sized,
{
    let pipeline = HairPipeline::new(config.clone())?;
    let store = JsonCatalogStore::new(&config.catalog.database_path);
    pipeline.match_file(model, photo, &store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shade_serialization() {
        let shade = Shade {
            hex: "#8b4513".to_string(),
            lab: LabColor::new(37.5, 23.25, 41.75),
            pixels: 120,
        };

        let json = serde_json::to_string(&shade).unwrap();
        let deserialized: Shade = serde_json::from_str(&json).unwrap();

        assert_eq!(shade, deserialized);
    }
}
