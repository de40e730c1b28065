//! Catalog records and the in-memory catalog
//!
//! A catalog entry is a reference extension color keyed by a unique id.
//! The catalog keeps insertion order; saving an entry whose id already
//! exists replaces the old record in place.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{rgb_to_lab, to_hex, LabColor};
use crate::image_loader::RgbFrame;
use crate::{AnalysisError, Result};

/// One reference extension color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique key
    pub id: String,
    /// Display name
    pub name: String,
    /// `#rrggbb`
    pub hex: String,
    /// CIE L*a*b*, serialized as `[L, a, b]`
    pub lab: LabColor,
    /// Reference to the entry's image, e.g. `data/<id>.png`
    pub image: String,
}

/// Outcome of [`Catalog::upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

impl CatalogEntry {
    /// Build an entry from a mean RGB color in [0, 255]
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the trimmed id or name is empty, or the
    /// id contains path separators
    pub fn from_rgb(id: &str, name: &str, rgb: [f64; 3], image_prefix: &str) -> Result<Self> {
        let id = id.trim();
        let name = name.trim();
        if id.is_empty() {
            return Err(AnalysisError::invalid_parameter("id", id));
        }
        if name.is_empty() {
            return Err(AnalysisError::invalid_parameter("name", name));
        }
        if id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(AnalysisError::invalid_parameter("id", id));
        }

        let [r, g, b] = rgb;
        let prefix = image_prefix.trim_end_matches('/');
        let image = if prefix.is_empty() {
            format!("{}.png", id)
        } else {
            format!("{}/{}.png", prefix, id)
        };

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            hex: to_hex(r, g, b),
            lab: rgb_to_lab(r, g, b),
            image,
        })
    }

    /// Build an entry from the mean color of a sample image
    pub fn from_sample(id: &str, name: &str, sample: &RgbFrame, image_prefix: &str) -> Result<Self> {
        let mean = sample
            .mean_rgb()
            .ok_or_else(|| AnalysisError::invalid_parameter("sample image", "0 pixels"))?;
        debug!(id, mean_r = mean[0], mean_g = mean[1], mean_b = mean[2], "sampled extension color");
        Self::from_rgb(id, name, mean, image_prefix)
    }
}

/// Ordered collection of catalog entries with unique ids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, later duplicates of an id replacing earlier ones
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut catalog = Self::new();
        for entry in entries {
            catalog.upsert(entry);
        }
        catalog
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Insert a new entry or replace the one with the same id in place
    pub fn upsert(&mut self, entry: CatalogEntry) -> Upsert {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => {
                *existing = entry;
                Upsert::Replaced
            }
            None => {
                self.entries.push(entry);
                Upsert::Inserted
            }
        }
    }

    /// Remove an entry by id, returning it if present
    pub fn remove(&mut self, id: &str) -> Option<CatalogEntry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }
}
