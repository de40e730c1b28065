//! Extension catalog: records, persistence and matching

pub mod entry;
pub mod matcher;
pub mod store;

pub use entry::{Catalog, CatalogEntry, Upsert};
pub use matcher::{CatalogMatcher, RankedEntry};
pub use store::{CatalogStore, JsonCatalogStore};
