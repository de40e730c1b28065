//! Nearest-shade catalog matching
//!
//! Each detected shade is compared against every catalog entry with
//! CIEDE2000 and the `top_k` closest entries are kept. Sorting is stable, so
//! entries at equal distance keep their catalog order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entry::CatalogEntry;
use crate::clustering::Shade;
use crate::color::{delta_e_2000, LabColor, MatchQuality};
use crate::config::MatchingConfig;
use crate::constants::matching::DEFAULT_TOP_K;

/// A catalog entry annotated with its distance to a shade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    #[serde(rename = "deltaE")]
    pub delta_e: f64,
}

impl RankedEntry {
    pub fn quality(&self) -> MatchQuality {
        MatchQuality::from_delta_e(self.delta_e)
    }
}

/// Ranks catalog entries by perceptual distance
#[derive(Debug, Clone)]
pub struct CatalogMatcher {
    top_k: usize,
}

impl Default for CatalogMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl CatalogMatcher {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.top_k)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The `top_k` entries closest to `lab`, ascending by ΔE00
    pub fn rank(&self, lab: LabColor, entries: &[CatalogEntry]) -> Vec<RankedEntry> {
        let mut ranked: Vec<RankedEntry> = entries
            .iter()
            .map(|entry| RankedEntry {
                delta_e: delta_e_2000(lab, entry.lab),
                entry: entry.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| a.delta_e.total_cmp(&b.delta_e));
        ranked.truncate(self.top_k);
        ranked
    }

    /// One ranked list per shade, in shade order
    pub fn match_shades(&self, shades: &[Shade], entries: &[CatalogEntry]) -> Vec<Vec<RankedEntry>> {
        let matches: Vec<Vec<RankedEntry>> = shades.iter().map(|s| self.rank(s.lab, entries)).collect();
        debug!(
            shades = shades.len(),
            catalog = entries.len(),
            top_k = self.top_k,
            "matched shades against catalog"
        );
        matches
    }
}
