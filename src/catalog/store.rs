//! Catalog persistence
//!
//! The catalog is one JSON array on disk. Every save rewrites the whole file
//! through a sibling temp file and a rename, so readers never observe a
//! half-written catalog.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::entry::{Catalog, CatalogEntry, Upsert};
use crate::{AnalysisError, Result};

/// Load/save backend for the extension catalog
pub trait CatalogStore {
    /// Read every entry
    fn load(&self) -> Result<Catalog>;

    /// Replace the stored catalog with `catalog`
    fn save(&self, catalog: &Catalog) -> Result<()>;

    /// Load, insert or replace by id, save
    fn upsert(&self, entry: CatalogEntry) -> Result<Upsert> {
        let mut catalog = self.load()?;
        let outcome = catalog.upsert(entry);
        self.save(&catalog)?;
        Ok(outcome)
    }
}

/// Catalog stored as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    /// Store at `path`; nothing is touched until the first load or save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `path`, creating parent directories and an empty `[]`
    /// catalog if the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        if !store.path.exists() {
            store.save(&Catalog::new())?;
            info!(path = %store.path.display(), "initialized empty catalog");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogStore for JsonCatalogStore {
    fn load(&self) -> Result<Catalog> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "catalog file missing, treating as empty");
                return Ok(Catalog::new());
            }
            Err(e) => {
                return Err(AnalysisError::catalog(
                    format!("Failed to read {}", self.path.display()),
                    e,
                ))
            }
        };

        let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
            .map_err(|e| AnalysisError::catalog(format!("Failed to parse {}", self.path.display()), e))?;
        debug!(path = %self.path.display(), entries = entries.len(), "loaded catalog");
        Ok(Catalog::from_entries(entries))
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AnalysisError::catalog(format!("Failed to create {}", parent.display()), e)
            })?;
        }

        let json = serde_json::to_string_pretty(catalog)
            .map_err(|e| AnalysisError::catalog("Failed to serialize catalog", e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)
            .map_err(|e| AnalysisError::catalog(format!("Failed to write {}", tmp.display()), e))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| AnalysisError::catalog(format!("Failed to replace {}", self.path.display()), e))?;

        debug!(path = %self.path.display(), entries = catalog.len(), "saved catalog");
        Ok(())
    }
}
