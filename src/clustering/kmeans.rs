//! Hair shade extraction by k-means over masked RGB pixels
//!
//! Lloyd iterations in 3-D RGB space with squared Euclidean distance:
//! 1. Collect pixels under the mask
//! 2. Seed k centroids from randomly ordered pixels, distinct colors first
//! 3. Assign / recompute until no centroid moves or the round limit is hit
//! 4. Report each centroid as hex + L*a*b*
//!
//! The random source is injected so callers can seed it for reproducible
//! results; production callers seed from OS entropy.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{rgb_to_lab, to_hex, LabColor};
use crate::config::ClusteringConfig;
use crate::constants::clustering::{DEFAULT_SHADE_COUNT, MAX_ITERATIONS};
use crate::image_loader::RgbPlanes;
use crate::segmentation::HairMask;
use crate::{AnalysisError, Result};

type Rgb = [f64; 3];

/// One representative hair shade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shade {
    /// `#rrggbb`, byte-clamped
    pub hex: String,
    /// CIE L*a*b* of the centroid
    pub lab: LabColor,
    /// Pixels assigned to this shade in the last assignment pass
    #[serde(default)]
    pub pixels: usize,
}

impl Shade {
    /// Build a shade from an RGB centroid in [0, 255]
    pub fn from_rgb(rgb: Rgb, pixels: usize) -> Self {
        let [r, g, b] = rgb;
        Self {
            hex: to_hex(r, g, b),
            lab: rgb_to_lab(r, g, b),
            pixels,
        }
    }
}

/// k-means shade clusterer
#[derive(Debug, Clone)]
pub struct ShadeClusterer {
    shade_count: usize,
    max_iterations: usize,
}

impl Default for ShadeClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_SHADE_COUNT)
    }
}

impl ShadeClusterer {
    /// Clusterer producing up to `shade_count` shades with the default round limit
    pub fn new(shade_count: usize) -> Self {
        Self {
            shade_count,
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            shade_count: config.shade_count,
            max_iterations: config.max_iterations,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn shade_count(&self) -> usize {
        self.shade_count
    }

    /// Cluster the masked pixels into at most `shade_count` shades
    ///
    /// Shades come back in centroid order, not sorted by size. An empty mask
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` if any color plane differs in length from the mask
    pub fn extract_shades<R: Rng + ?Sized>(
        &self,
        planes: &RgbPlanes,
        mask: &HairMask,
        rng: &mut R,
    ) -> Result<Vec<Shade>> {
        for (name, plane) in [("red", &planes.red), ("green", &planes.green), ("blue", &planes.blue)] {
            if plane.len() != mask.len() {
                return Err(AnalysisError::LengthMismatch {
                    what: format!("{} plane vs mask", name),
                    expected: mask.len(),
                    actual: plane.len(),
                });
            }
        }

        let pixels: Vec<Rgb> = (0..mask.len())
            .filter(|&i| mask.is_set(i))
            .map(|i| [planes.red[i] as f64, planes.green[i] as f64, planes.blue[i] as f64])
            .collect();

        if pixels.is_empty() || self.shade_count == 0 {
            debug!("no masked pixels, skipping clustering");
            return Ok(Vec::new());
        }

        let mut centroids = initial_centroids(&pixels, self.shade_count, rng);
        let k = centroids.len();
        let mut assignments = vec![0usize; pixels.len()];
        let mut counts = vec![0usize; k];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            for (pixel, slot) in pixels.iter().zip(assignments.iter_mut()) {
                *slot = nearest_centroid(&centroids, pixel);
            }

            let mut sums = vec![[0.0f64; 3]; k];
            counts.iter_mut().for_each(|c| *c = 0);
            for (pixel, &cluster) in pixels.iter().zip(&assignments) {
                for channel in 0..3 {
                    sums[cluster][channel] += pixel[channel];
                }
                counts[cluster] += 1;
            }

            let mut moved = false;
            for (cluster, centroid) in centroids.iter_mut().enumerate() {
                // empty clusters keep their previous position
                if counts[cluster] == 0 {
                    continue;
                }
                let n = counts[cluster] as f64;
                let mean = sums[cluster].map(|s| s / n);
                if mean != *centroid {
                    *centroid = mean;
                    moved = true;
                }
            }

            iterations += 1;
            if !moved {
                converged = true;
                break;
            }
        }

        debug!(
            pixels = pixels.len(),
            shades = k,
            iterations,
            converged,
            "clustered hair pixels"
        );

        Ok(centroids
            .into_iter()
            .zip(counts)
            .map(|(centroid, count)| Shade::from_rgb(centroid, count))
            .collect())
    }
}

/// Pick `min(k, pixels.len())` starting centroids without replacement
///
/// Pixels are visited in random order; distinct colors are taken first so
/// separated clusters each receive a seed. Duplicated colors fill any
/// remaining slots.
fn initial_centroids<R: Rng + ?Sized>(pixels: &[Rgb], k: usize, rng: &mut R) -> Vec<Rgb> {
    let k = k.min(pixels.len());
    let mut chosen: Vec<Rgb> = Vec::with_capacity(k);
    let mut spare: Vec<usize> = Vec::with_capacity(k);

    for i in index::sample(rng, pixels.len(), pixels.len()) {
        if chosen.len() == k {
            break;
        }
        let candidate = pixels[i];
        if chosen.contains(&candidate) {
            if spare.len() < k {
                spare.push(i);
            }
        } else {
            chosen.push(candidate);
        }
    }

    for i in spare {
        if chosen.len() == k {
            break;
        }
        chosen.push(pixels[i]);
    }
    chosen
}

/// Index of the nearest centroid; ties go to the lowest index
fn nearest_centroid(centroids: &[Rgb], pixel: &Rgb) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let dist = (pixel[0] - c[0]).powi(2) + (pixel[1] - c[1]).powi(2) + (pixel[2] - c[2]).powi(2);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}
