//! End-to-end orchestration
//!
//! ```text
//! photo -> RgbFrame (model grid) -> InputTensor -> model -> HairMask
//!       -> k-means shades -> CIEDE2000 ranking against the catalog
//! ```
//!
//! The pipeline owns configuration only. The segmentation model, catalog
//! store and random source are passed into each call.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogEntry, CatalogMatcher, CatalogStore, RankedEntry, Upsert};
use crate::clustering::{Shade, ShadeClusterer};
use crate::config::PipelineConfig;
use crate::image_loader::{self, RgbFrame};
use crate::segmentation::{InputTensor, MaskExtractor, SegmentationModel};
use crate::{AnalysisError, Result};

/// Detected shades with their closest catalog entries
///
/// `top_matches[i]` ranks the catalog against `user_hair[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    pub user_hair: Vec<Shade>,
    pub top_matches: Vec<Vec<RankedEntry>>,
}

/// Configured hair shade pipeline
#[derive(Debug, Clone)]
pub struct HairPipeline {
    config: PipelineConfig,
    extractor: MaskExtractor,
    clusterer: ShadeClusterer,
    matcher: CatalogMatcher,
}

impl HairPipeline {
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the configuration fails validation
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let seg = &config.segmentation;
        Ok(Self {
            extractor: MaskExtractor::new(seg.mask, seg.input_width, seg.input_height),
            clusterer: ShadeClusterer::from_config(&config.clustering),
            matcher: CatalogMatcher::from_config(&config.matching),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Model grid as `(width, height)`
    pub fn grid(&self) -> (usize, usize) {
        (self.config.segmentation.input_width, self.config.segmentation.input_height)
    }

    /// Random source for clustering: the configured seed, else OS entropy
    pub fn rng(&self) -> StdRng {
        match self.config.clustering.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Segment a frame and cluster its hair pixels into shades
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if the model or frame grid differs from the
    ///   configured grid, or the model returns a tensor on another grid
    /// - `InferenceError` or anything else the model reports
    pub fn detect_shades<M, R>(&self, model: &M, frame: &RgbFrame, rng: &mut R) -> Result<Vec<Shade>>
    where
        M: SegmentationModel + ?Sized,
        R: Rng + ?Sized,
    {
        let grid = self.grid();
        if model.input_size() != grid {
            return Err(grid_mismatch("model input size", grid, model.input_size()));
        }
        if (frame.width(), frame.height()) != grid {
            return Err(grid_mismatch("input frame", grid, (frame.width(), frame.height())));
        }

        let tensor = InputTensor::from_frame(frame);
        let output = model.segment(&tensor)?;
        debug!(
            channels = output.channels(),
            height = output.height(),
            width = output.width(),
            "segmentation output"
        );

        let mask = self.extractor.extract(&output)?;
        if mask.count() == 0 {
            warn!("no hair pixels detected");
        }

        let shades = self.clusterer.extract_shades(&frame.planes(), &mask, rng)?;
        info!(
            coverage = mask.coverage(),
            shades = shades.len(),
            "detected hair shades"
        );
        Ok(shades)
    }

    /// Detect shades and rank catalog entries against each one
    pub fn match_frame<M, R>(
        &self,
        model: &M,
        frame: &RgbFrame,
        catalog: &[CatalogEntry],
        rng: &mut R,
    ) -> Result<MatchReport>
    where
        M: SegmentationModel + ?Sized,
        R: Rng + ?Sized,
    {
        self.match_with(&self.matcher, model, frame, catalog, rng)
    }

    /// [`match_frame`](Self::match_frame) with a per-call match count
    pub fn match_frame_with_k<M, R>(
        &self,
        model: &M,
        frame: &RgbFrame,
        catalog: &[CatalogEntry],
        top_k: usize,
        rng: &mut R,
    ) -> Result<MatchReport>
    where
        M: SegmentationModel + ?Sized,
        R: Rng + ?Sized,
    {
        if top_k == 0 {
            return Err(AnalysisError::invalid_parameter("top_k", top_k));
        }
        self.match_with(&CatalogMatcher::new(top_k), model, frame, catalog, rng)
    }

    fn match_with<M, R>(
        &self,
        matcher: &CatalogMatcher,
        model: &M,
        frame: &RgbFrame,
        catalog: &[CatalogEntry],
        rng: &mut R,
    ) -> Result<MatchReport>
    where
        M: SegmentationModel + ?Sized,
        R: Rng + ?Sized,
    {
        let user_hair = self.detect_shades(model, frame, rng)?;
        let top_matches = matcher.match_shades(&user_hair, catalog);
        Ok(MatchReport {
            user_hair,
            top_matches,
        })
    }

    /// Load a photo at the model grid
    pub fn load_frame(&self, path: &Path) -> Result<RgbFrame> {
        let (width, height) = self.grid();
        image_loader::load_rgb(path, to_u32(width)?, to_u32(height)?)
    }

    /// Detect shades in a photo on disk
    pub fn analyze_file<M>(&self, model: &M, path: &Path) -> Result<Vec<Shade>>
    where
        M: SegmentationModel + ?Sized,
    {
        let frame = self.load_frame(path)?;
        self.detect_shades(model, &frame, &mut self.rng())
    }

    /// Detect shades in a photo on disk and match them against the stored catalog
    pub fn match_file<M, S>(&self, model: &M, path: &Path, store: &S) -> Result<MatchReport>
    where
        M: SegmentationModel + ?Sized,
        S: CatalogStore + ?Sized,
    {
        let frame = self.load_frame(path)?;
        let catalog = store.load()?;
        self.match_frame(model, &frame, catalog.entries(), &mut self.rng())
    }

    /// Add or replace a catalog entry from a sample image
    ///
    /// The entry color is the mean of the sample resized to the configured
    /// sample size. The sample is written as PNG to `data_dir/<id>.png`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if the trimmed id or name is empty
    /// - `ImageLoadError` if the sample cannot be decoded
    /// - `CatalogError` if the image or the catalog cannot be written
    pub fn save_extension<S>(&self, store: &S, id: &str, name: &str, image_path: &Path) -> Result<CatalogEntry>
    where
        S: CatalogStore + ?Sized,
    {
        let catalog_config = &self.config.catalog;
        let image = image_loader::load_image(image_path)?;
        let size = catalog_config.sample_size;
        let sample = image_loader::to_frame(&image, size, size)?;
        let entry = CatalogEntry::from_sample(id, name, &sample, &catalog_config.image_prefix)?;

        let dest = self.extension_image_path(&entry.id);
        fs::create_dir_all(&catalog_config.data_dir).map_err(|e| {
            AnalysisError::catalog(format!("Failed to create {}", catalog_config.data_dir.display()), e)
        })?;
        image
            .save_with_format(&dest, ImageFormat::Png)
            .map_err(|e| AnalysisError::catalog(format!("Failed to write {}", dest.display()), e))?;

        let replaced = store.upsert(entry.clone())? == Upsert::Replaced;
        info!(id = %entry.id, hex = %entry.hex, replaced, "saved extension");
        Ok(entry)
    }

    /// Where the image for catalog entry `id` is written
    pub fn extension_image_path(&self, id: &str) -> PathBuf {
        self.config.catalog.data_dir.join(format!("{}.png", id))
    }
}

fn grid_mismatch(context: &str, expected: (usize, usize), actual: (usize, usize)) -> AnalysisError {
    AnalysisError::DimensionMismatch {
        context: context.into(),
        expected: format!("{}x{}", expected.0, expected.1),
        actual: format!("{}x{}", actual.0, actual.1),
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| AnalysisError::invalid_parameter("grid size", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JsonCatalogStore;
    use crate::color::rgb_to_lab;
    use crate::segmentation::SegmentationOutput;

    /// Marks pixels whose red channel exceeds half intensity as hair
    struct RedModel {
        size: (usize, usize),
    }

    impl SegmentationModel for RedModel {
        fn input_size(&self) -> (usize, usize) {
            self.size
        }

        fn segment(&self, input: &InputTensor) -> Result<SegmentationOutput> {
            let [_, _, h, w] = input.shape();
            let red = input.data()[..h * w].iter().map(|&r| if r > 0.5 { 0.9 } else { 0.1 }).collect();
            SegmentationOutput::new([1, 1, h, w], red)
        }
    }

    struct FailingModel;

    impl SegmentationModel for FailingModel {
        fn input_size(&self) -> (usize, usize) {
            (4, 4)
        }

        fn segment(&self, _input: &InputTensor) -> Result<SegmentationOutput> {
            Err(AnalysisError::inference("session closed"))
        }
    }

    fn small_pipeline() -> HairPipeline {
        let mut config = PipelineConfig::default();
        config.segmentation.input_width = 4;
        config.segmentation.input_height = 4;
        config.clustering.seed = Some(1);
        HairPipeline::new(config).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.clustering.shade_count = 0;
        assert!(HairPipeline::new(config).is_err());
    }

    #[test]
    fn test_detect_shades_uses_masked_pixels() {
        let pipeline = small_pipeline();
        let mut frame = RgbFrame::filled(4, 4, [10, 10, 10]);
        for i in 0..8 {
            frame.set_pixel(i, [200, 100, 50]);
        }

        let shades = pipeline
            .detect_shades(&RedModel { size: (4, 4) }, &frame, &mut pipeline.rng())
            .unwrap();
        assert_eq!(shades.len(), 3);
        assert!(shades.iter().all(|s| s.hex == "#c86432"));
        assert_eq!(shades.iter().map(|s| s.pixels).sum::<usize>(), 8);
    }

    #[test]
    fn test_no_hair_gives_empty_report() {
        let pipeline = small_pipeline();
        let frame = RgbFrame::filled(4, 4, [0, 0, 0]);
        let catalog = vec![CatalogEntry::from_rgb("a", "A", [0.0, 0.0, 0.0], "data").unwrap()];

        let report = pipeline
            .match_frame(&RedModel { size: (4, 4) }, &frame, &catalog, &mut pipeline.rng())
            .unwrap();
        assert!(report.user_hair.is_empty());
        assert!(report.top_matches.is_empty());
    }

    #[test]
    fn test_grid_mismatch() {
        let pipeline = small_pipeline();
        let frame = RgbFrame::filled(4, 4, [0, 0, 0]);
        let err = pipeline
            .detect_shades(&RedModel { size: (8, 8) }, &frame, &mut pipeline.rng())
            .unwrap_err();
        assert!(err.is_precondition_violation());

        let small = RgbFrame::filled(2, 2, [0, 0, 0]);
        let err = pipeline
            .detect_shades(&RedModel { size: (4, 4) }, &small, &mut pipeline.rng())
            .unwrap_err();
        assert!(err.is_precondition_violation());
    }

    #[test]
    fn test_model_failure_propagates() {
        let pipeline = small_pipeline();
        let frame = RgbFrame::filled(4, 4, [0, 0, 0]);
        let err = pipeline.detect_shades(&FailingModel, &frame, &mut pipeline.rng()).unwrap_err();
        assert!(matches!(err, AnalysisError::InferenceError { .. }));
    }

    #[test]
    fn test_match_frame_with_k() {
        let pipeline = small_pipeline();
        let frame = RgbFrame::filled(4, 4, [200, 0, 0]);
        let catalog: Vec<CatalogEntry> = [[200.0, 0.0, 0.0], [0.0, 0.0, 200.0], [190.0, 10.0, 0.0]]
            .iter()
            .enumerate()
            .map(|(i, &rgb)| CatalogEntry::from_rgb(&format!("e{}", i), "E", rgb, "data").unwrap())
            .collect();

        let report = pipeline
            .match_frame_with_k(&RedModel { size: (4, 4) }, &frame, &catalog, 2, &mut pipeline.rng())
            .unwrap();
        assert_eq!(report.top_matches.len(), report.user_hair.len());
        for matches in &report.top_matches {
            let ids: Vec<&str> = matches.iter().map(|m| m.entry.id.as_str()).collect();
            assert_eq!(ids, vec!["e0", "e2"]);
        }

        assert!(pipeline
            .match_frame_with_k(&RedModel { size: (4, 4) }, &frame, &catalog, 0, &mut pipeline.rng())
            .is_err());
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = MatchReport {
            user_hair: vec![Shade::from_rgb([1.0, 2.0, 3.0], 1)],
            top_matches: vec![Vec::new()],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("userHair").is_some());
        assert!(json.get("topMatches").is_some());
    }

    #[test]
    fn test_save_extension_writes_image_and_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.catalog.data_dir = dir.path().join("data");
        config.catalog.database_path = dir.path().join("data").join("extensions.json");
        config.catalog.sample_size = 8;
        let pipeline = HairPipeline::new(config).unwrap();
        let store = JsonCatalogStore::open(&pipeline.config().catalog.database_path).unwrap();

        let sample = dir.path().join("upload.png");
        image::RgbImage::from_pixel(20, 10, image::Rgb([139, 69, 19])).save(&sample).unwrap();

        let saved = pipeline.save_extension(&store, " chestnut ", "Chestnut", &sample).unwrap();
        assert_eq!(saved.id, "chestnut");
        assert_eq!(saved.hex, "#8b4513");
        assert_eq!(saved.image, "data/chestnut.png");
        assert_eq!(saved.lab, rgb_to_lab(139.0, 69.0, 19.0));
        assert!(pipeline.extension_image_path("chestnut").exists());

        let catalog = store.load().unwrap();
        assert_eq!(catalog.len(), 1);
        let stored = catalog.get("chestnut").unwrap();
        assert_eq!(stored.hex, saved.hex);
        assert_eq!(stored.image, saved.image);

        let err = pipeline.save_extension(&store, "x", "  ", &sample).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameter { .. }));
    }
}
