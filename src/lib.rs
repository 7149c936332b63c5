//! Compiles a corpus of pixel-art images annotated with tiling grids into a
//! deduplicated dataset of fixed-size patches
//!
//! Tiles are enumerated from each tiling's lattice, filtered by manual
//! annotations and exact content hashes, and packed into an atlas together
//! with a metadata record and a per-patch table.

#![forbid(unsafe_code)]

/// Tile annotations and the label preset
pub mod annotation;
/// Sources, images and their persisted sidecars
pub mod catalog;
/// Compilation pipeline, duplicate filtering and artifact output
pub mod dataset;
/// Input/output operations, configuration and error handling
pub mod io;
/// Tiling geometry and lattice enumeration
pub mod spatial;

pub use io::error::{DatasetError, Result};
