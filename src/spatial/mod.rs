//! Spatial data structures for tilings
//!
//! This module contains:
//! - Lattice enumeration and pixel/lattice coordinate mapping
//! - Tiling configuration records and the default tiling factory

/// Lattice enumeration and coordinate mapping
pub mod lattice;
/// Tiling configuration records
pub mod tiling;

pub use lattice::{LatticePos, PixelRect, TileLattice};
pub use tiling::TilingConfig;
