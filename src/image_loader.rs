//! Image loading at a fixed model resolution
//!
//! Decodes any format the `image` crate reads, drops alpha, and resizes to
//! exactly the requested grid (center-cropped to fill, so aspect ratio is
//! preserved). The result is an interleaved RGB byte buffer that can also be
//! split into the parallel R/G/B planes the shade clusterer consumes.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Interleaved 8-bit RGB pixels (no alpha) at a known resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Parallel red/green/blue planes, one byte per pixel each
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RgbPlanes {
    pub red: Vec<u8>,
    pub green: Vec<u8>,
    pub blue: Vec<u8>,
}

impl RgbPlanes {
    /// Number of pixels in the red plane
    pub fn len(&self) -> usize {
        self.red.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty()
    }
}

impl RgbFrame {
    /// Wrap an interleaved RGB buffer
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` if `data.len() != width * height * 3`
    pub fn from_interleaved(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(AnalysisError::LengthMismatch {
                what: "interleaved RGB buffer".into(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// A frame where every pixel has the same color
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let data = rgb.iter().copied().cycle().take(width * height * 3).collect();
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGB triple at a row-major pixel index
    pub fn pixel(&self, index: usize) -> [u8; 3] {
        let i = index * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Overwrite the RGB triple at a row-major pixel index
    pub fn set_pixel(&mut self, index: usize, rgb: [u8; 3]) {
        let i = index * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Split into parallel channel planes
    pub fn planes(&self) -> RgbPlanes {
        let n = self.pixel_count();
        let mut planes = RgbPlanes {
            red: Vec::with_capacity(n),
            green: Vec::with_capacity(n),
            blue: Vec::with_capacity(n),
        };
        for px in self.data.chunks_exact(3) {
            planes.red.push(px[0]);
            planes.green.push(px[1]);
            planes.blue.push(px[2]);
        }
        planes
    }

    /// Mean color over all pixels, or `None` for an empty frame
    pub fn mean_rgb(&self) -> Option<[f64; 3]> {
        let n = self.pixel_count();
        if n == 0 {
            return None;
        }
        let mut sums = [0u64; 3];
        for px in self.data.chunks_exact(3) {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
        }
        Some(sums.map(|s| s as f64 / n as f64))
    }
}

/// Decode an image file, guessing the format from its content
///
/// # Errors
///
/// Returns `AnalysisError::ImageLoadError` if:
/// - File cannot be opened
/// - Format is not supported
/// - Decoding fails
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .map_err(|e| AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e))?
        .with_guessed_format()
        .map_err(|e| AnalysisError::image_load(format!("Failed to read image header: {}", path.display()), e))?;

    reader
        .decode()
        .map_err(|e| AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e))
}

/// Resize a decoded image to exactly `width` × `height` RGB
pub fn to_frame(image: &DynamicImage, width: u32, height: u32) -> Result<RgbFrame> {
    if width == 0 || height == 0 {
        return Err(AnalysisError::invalid_parameter(
            "target size",
            format!("{}x{}", width, height),
        ));
    }
    let resized = image.resize_to_fill(width, height, FilterType::Lanczos3).to_rgb8();
    debug!(
        source_width = image.width(),
        source_height = image.height(),
        width,
        height,
        "resized image to model grid"
    );
    RgbFrame::from_interleaved(width as usize, height as usize, resized.into_raw())
}

/// Load an image from disk as RGB at exactly `width` × `height`
///
/// # Example
///
/// ```rust,no_run
/// use hair_shade_match::image_loader::load_rgb;
/// use std::path::Path;
///
/// let frame = load_rgb(Path::new("photo.jpg"), 320, 320)?;
/// assert_eq!(frame.pixel_count(), 320 * 320);
/// # Ok::<(), hair_shade_match::AnalysisError>(())
/// ```
pub fn load_rgb(path: &Path, width: u32, height: u32) -> Result<RgbFrame> {
    let image = load_image(path)?;
    to_frame(&image, width, height)
}

/// Check if a file extension names a format the decoder can read
pub fn is_supported_extension(ext: &str) -> bool {
    image::ImageFormat::from_extension(ext)
        .map(|format| format.reading_enabled())
        .unwrap_or(false)
}
