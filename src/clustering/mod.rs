//! Shade clustering
//!
//! Groups masked hair pixels into a small set of representative shades.

pub mod kmeans;

pub use kmeans::{Shade, ShadeClusterer};
