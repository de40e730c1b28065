//! Configuration structures for the hair shade pipeline.
//!
//! This module defines all tunable parameters, organized into the stages of
//! the pipeline: segmentation, clustering, matching and catalog storage.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use hair_shade_match::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), hair_shade_match::AnalysisError>(())
//! ```
//!
//! # Configuration Sections
//!
//! - [`SegmentationConfig`]: model grid and mask policy
//! - [`ClusteringConfig`]: shade count, round limit, optional seed
//! - [`MatchingConfig`]: matches returned per shade
//! - [`CatalogConfig`]: catalog file and extension image locations

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{catalog, clustering, matching, segmentation};
use crate::segmentation::MaskPolicy;
use crate::{AnalysisError, Result};

/// Complete pipeline configuration.
///
/// Serializable to/from JSON so a deployment can pin every parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Segmentation model grid and mask interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Model input/output width in pixels
    pub input_width: usize,

    /// Model input/output height in pixels
    pub input_height: usize,

    /// How the output tensor becomes a hair mask
    #[serde(default)]
    pub mask: MaskPolicy,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            input_width: segmentation::MODEL_INPUT_WIDTH,
            input_height: segmentation::MODEL_INPUT_HEIGHT,
            mask: MaskPolicy::default(),
        }
    }
}

/// k-means shade extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Number of shades to extract
    pub shade_count: usize,

    /// Maximum assignment/update rounds
    pub max_iterations: usize,

    /// Fixed seed for centroid initialization; `None` draws from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            shade_count: clustering::DEFAULT_SHADE_COUNT,
            max_iterations: clustering::MAX_ITERATIONS,
            seed: None,
        }
    }
}

/// Catalog matching parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Catalog entries returned per detected shade
    pub top_k: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            top_k: matching::DEFAULT_TOP_K,
        }
    }
}

/// Catalog storage locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON file holding every catalog entry
    pub database_path: PathBuf,

    /// Directory extension images are written into
    pub data_dir: PathBuf,

    /// Prefix recorded in each entry's image reference
    pub image_prefix: String,

    /// Side length extension images are resized to before averaging
    pub sample_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(catalog::DATABASE_FILE),
            data_dir: PathBuf::from(catalog::DATA_DIR),
            image_prefix: catalog::DATA_DIR.to_string(),
            sample_size: catalog::SAMPLE_SIZE,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::config(format!("Failed to read {}", path.display()), e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| AnalysisError::config(format!("Failed to parse {}", path.display()), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json)
            .map_err(|e| AnalysisError::config(format!("Failed to write {}", path.display()), e))?;
        Ok(())
    }

    /// Reject parameter combinations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let seg = &self.segmentation;
        if seg.input_width == 0 || seg.input_height == 0 {
            return Err(AnalysisError::invalid_parameter(
                "segmentation.input_size",
                format!("{}x{}", seg.input_width, seg.input_height),
            ));
        }
        let threshold = seg.mask.threshold();
        if !(0.0..1.0).contains(&threshold) {
            return Err(AnalysisError::invalid_parameter("segmentation.mask.threshold", threshold));
        }
        if self.clustering.shade_count == 0 {
            return Err(AnalysisError::invalid_parameter("clustering.shade_count", 0));
        }
        if self.clustering.max_iterations == 0 {
            return Err(AnalysisError::invalid_parameter("clustering.max_iterations", 0));
        }
        if self.matching.top_k == 0 {
            return Err(AnalysisError::invalid_parameter("matching.top_k", 0));
        }
        if self.catalog.sample_size == 0 {
            return Err(AnalysisError::invalid_parameter("catalog.sample_size", 0));
        }
        Ok(())
    }
}
