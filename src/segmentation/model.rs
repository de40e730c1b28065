//! Inference collaborator seam
//!
//! The segmentation network itself lives outside this crate. Callers create a
//! model handle once (e.g. an ONNX session), keep it for the service
//! lifetime, and pass it into each pipeline call. The core only prepares the
//! input tensor and validates the output shape.

use crate::image_loader::RgbFrame;
use crate::{AnalysisError, Result};

/// Model input: shape (1, 3, H, W), channel-major, values in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl InputTensor {
    /// Normalize an RGB frame into a channel-major tensor
    pub fn from_frame(frame: &RgbFrame) -> Self {
        let plane = frame.pixel_count();
        let mut data = vec![0.0f32; 3 * plane];
        for (i, px) in frame.as_bytes().chunks_exact(3).enumerate() {
            data[i] = px[0] as f32 / 255.0;
            data[i + plane] = px[1] as f32 / 255.0;
            data[i + 2 * plane] = px[2] as f32 / 255.0;
        }
        Self {
            height: frame.height(),
            width: frame.width(),
            data,
        }
    }

    /// `[batch, channels, height, width]`
    pub fn shape(&self) -> [usize; 4] {
        [1, 3, self.height, self.width]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

/// Raw model output: shape (1, C, H, W), channel-major
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOutput {
    channels: usize,
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl SegmentationOutput {
    /// Wrap a flat output buffer with its reported shape
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if the batch size is not 1 or there are no channels
    /// - `LengthMismatch` if `data.len() != C * H * W`
    pub fn new(shape: [usize; 4], data: Vec<f32>) -> Result<Self> {
        let [batch, channels, height, width] = shape;
        if batch != 1 || channels == 0 {
            return Err(AnalysisError::DimensionMismatch {
                context: "segmentation output".into(),
                expected: "(1, C>=1, H, W)".into(),
                actual: format!("{:?}", shape),
            });
        }
        let expected = channels * height * width;
        if data.len() != expected {
            return Err(AnalysisError::LengthMismatch {
                what: "segmentation output buffer".into(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            channels,
            height,
            width,
            data,
        })
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of grid cells (H × W)
    pub fn plane_len(&self) -> usize {
        self.height * self.width
    }

    /// Activation of `channel` at row-major pixel `index`
    pub fn activation(&self, channel: usize, index: usize) -> f32 {
        self.data[channel * self.plane_len() + index]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// A loaded segmentation model
///
/// Implementations wrap whatever runtime hosts the network. `segment` must
/// return a tensor on the same H × W grid as its input.
pub trait SegmentationModel {
    /// Fixed input grid as `(width, height)`
    fn input_size(&self) -> (usize, usize);

    /// Run inference on one prepared input
    fn segment(&self, input: &InputTensor) -> Result<SegmentationOutput>;
}

impl<M: SegmentationModel + ?Sized> SegmentationModel for &M {
    fn input_size(&self) -> (usize, usize) {
        (**self).input_size()
    }

    fn segment(&self, input: &InputTensor) -> Result<SegmentationOutput> {
        (**self).segment(input)
    }
}

impl<M: SegmentationModel + ?Sized> SegmentationModel for Box<M> {
    fn input_size(&self) -> (usize, usize) {
        (**self).input_size()
    }

    fn segment(&self, input: &InputTensor) -> Result<SegmentationOutput> {
        (**self).segment(input)
    }
}
