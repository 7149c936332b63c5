//! Manual and derived tile annotations

/// Label preset persistence and lookup
pub mod labels;
/// Ignore, duplicate and label sets of a tiling
pub mod store;

pub use store::{IgnoreToggle, TileAnnotations};
