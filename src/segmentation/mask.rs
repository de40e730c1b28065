//! Hair mask extraction from raw segmentation output
//!
//! Two policies are supported because deployed models disagree on what the
//! output means:
//! - `MaxActivation`: a pixel is foreground when its strongest channel fires
//!   above the threshold (any confident class counts)
//! - `ClassIndex`: a pixel is foreground when a specific class wins the argmax
//!
//! Single-channel outputs are thresholded directly under either policy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::model::SegmentationOutput;
use crate::constants::segmentation::{HAIR_CLASS_INDEX, MASK_THRESHOLD};
use crate::{AnalysisError, Result};

/// How a multi-channel activation tensor becomes a binary mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MaskPolicy {
    /// Foreground when max over channels > threshold
    MaxActivation { threshold: f32 },
    /// Foreground when the argmax channel equals `class`
    ClassIndex { class: usize, threshold: f32 },
}

impl Default for MaskPolicy {
    fn default() -> Self {
        MaskPolicy::MaxActivation {
            threshold: MASK_THRESHOLD,
        }
    }
}

impl MaskPolicy {
    /// Class-index policy for human parsing models that label hair as class 17
    pub fn hair_class() -> Self {
        MaskPolicy::ClassIndex {
            class: HAIR_CLASS_INDEX,
            threshold: MASK_THRESHOLD,
        }
    }

    /// Threshold applied to single-channel outputs
    pub fn threshold(&self) -> f32 {
        match *self {
            MaskPolicy::MaxActivation { threshold } | MaskPolicy::ClassIndex { threshold, .. } => threshold,
        }
    }
}

/// Binary hair / non-hair grid, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HairMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl HairMask {
    /// # Errors
    ///
    /// Returns `LengthMismatch` if `bits.len() != width * height`
    pub fn new(width: usize, height: usize, bits: Vec<bool>) -> Result<Self> {
        if bits.len() != width * height {
            return Err(AnalysisError::LengthMismatch {
                what: "mask bits".into(),
                expected: width * height,
                actual: bits.len(),
            });
        }
        Ok(Self { width, height, bits })
    }

    /// A mask with no pixels set
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub fn set(&mut self, index: usize, value: bool) {
        self.bits[index] = value;
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of foreground pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    /// Fraction of the grid marked as foreground
    pub fn coverage(&self) -> f64 {
        if self.bits.is_empty() {
            0.0
        } else {
            self.count() as f64 / self.bits.len() as f64
        }
    }
}

/// Mask extractor bound to a policy and the model's fixed grid
#[derive(Debug, Clone)]
pub struct MaskExtractor {
    policy: MaskPolicy,
    width: usize,
    height: usize,
}

impl MaskExtractor {
    pub fn new(policy: MaskPolicy, width: usize, height: usize) -> Self {
        Self { policy, width, height }
    }

    pub fn policy(&self) -> MaskPolicy {
        self.policy
    }

    /// Convert model output into a binary mask
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if the output grid is not the configured grid
    /// - `InvalidParameter` if a class-index policy names a channel the
    ///   multi-channel output does not have
    pub fn extract(&self, output: &SegmentationOutput) -> Result<HairMask> {
        if output.width() != self.width || output.height() != self.height {
            return Err(AnalysisError::DimensionMismatch {
                context: "segmentation output grid".into(),
                expected: format!("{}x{}", self.width, self.height),
                actual: format!("{}x{}", output.width(), output.height()),
            });
        }

        let mask = apply_policy(output, self.policy)?;
        debug!(
            channels = output.channels(),
            foreground = mask.count(),
            coverage = mask.coverage(),
            "extracted hair mask"
        );
        Ok(mask)
    }
}

/// Extract a mask with the default max-activation policy (threshold 0.3)
///
/// The mask takes whatever grid the output carries.
pub fn extract_mask(output: &SegmentationOutput) -> HairMask {
    let threshold = MASK_THRESHOLD;
    let bits = (0..output.plane_len())
        .map(|i| max_activation(output, i) > threshold)
        .collect();
    HairMask {
        width: output.width(),
        height: output.height(),
        bits,
    }
}

fn max_activation(output: &SegmentationOutput, index: usize) -> f32 {
    (0..output.channels())
        .map(|c| output.activation(c, index))
        .fold(f32::NEG_INFINITY, f32::max)
}

/// First channel holding the maximum activation
fn argmax(output: &SegmentationOutput, index: usize) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;
    for c in 0..output.channels() {
        let value = output.activation(c, index);
        if value > best_value {
            best_value = value;
            best = c;
        }
    }
    best
}

fn apply_policy(output: &SegmentationOutput, policy: MaskPolicy) -> Result<HairMask> {
    let plane = output.plane_len();
    let bits: Vec<bool> = if output.channels() == 1 {
        let threshold = policy.threshold();
        (0..plane).map(|i| output.activation(0, i) > threshold).collect()
    } else {
        match policy {
            MaskPolicy::MaxActivation { threshold } => {
                (0..plane).map(|i| max_activation(output, i) > threshold).collect()
            }
            MaskPolicy::ClassIndex { class, .. } => {
                if class >= output.channels() {
                    return Err(AnalysisError::invalid_parameter(
                        "mask.class",
                        format!("{} (model has {} channels)", class, output.channels()),
                    ));
                }
                (0..plane).map(|i| argmax(output, i) == class).collect()
            }
        }
    };

    Ok(HairMask {
        width: output.width(),
        height: output.height(),
        bits,
    })
}
