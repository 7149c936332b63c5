//! Ordered catalog of sources, images and tilings

/// Duplicates sidecar written by compile passes
pub mod duplicates;
/// Per-source annotation sidecars
pub mod sidecar;
/// Sources, images and cache scanning
pub mod source;

pub use source::{Catalog, Source, SourceImage};
