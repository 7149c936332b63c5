//! Tiling configuration records
//!
//! A tiling is one grid overlay on one image: its geometry plus the manual
//! (ignore, labels) and derived (duplicates) annotations of its tiles.

use crate::annotation::store::TileAnnotations;
use crate::io::configuration::{DEFAULT_TILING_PATCH_SIZE, SINGLE_PATCH_MAX_EXTENT};
use crate::io::error::Result;
use crate::spatial::lattice::TileLattice;
use serde::{Deserialize, Serialize};

const fn default_patch_size() -> i32 {
    DEFAULT_TILING_PATCH_SIZE
}

/// Geometry and annotations of one grid overlay
///
/// Signed fields mirror the persisted JSON; [`TileLattice::new`] rejects
/// negative values before any processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilingConfig {
    /// Horizontal position of the first tile
    #[serde(default)]
    pub offset_x: i32,
    /// Vertical position of the first tile
    #[serde(default)]
    pub offset_y: i32,
    /// Tile width
    #[serde(default = "default_patch_size")]
    pub patch_size_x: i32,
    /// Tile height
    #[serde(default = "default_patch_size")]
    pub patch_size_y: i32,
    /// Horizontal gap between tiles
    #[serde(default)]
    pub spacing_x: i32,
    /// Vertical gap between tiles
    #[serde(default)]
    pub spacing_y: i32,
    /// Maximum number of columns (0 is unbounded)
    #[serde(default)]
    pub size_x: i32,
    /// Maximum number of rows (0 is unbounded)
    #[serde(default)]
    pub size_y: i32,
    /// Ignored, duplicate and labeled tiles
    #[serde(flatten)]
    pub annotations: TileAnnotations,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self::default_for(None)
    }
}

impl TilingConfig {
    /// Default tiling for an image of the given (width, height)
    ///
    /// Square images no larger than [`SINGLE_PATCH_MAX_EXTENT`] become a
    /// single tile; everything else uses the fixed default patch size.
    pub fn default_for(image_size: Option<(u32, u32)>) -> Self {
        let patch = image_size
            .filter(|&(w, h)| w == h && w <= SINGLE_PATCH_MAX_EXTENT && w > 0)
            .map_or(DEFAULT_TILING_PATCH_SIZE, |(w, _)| w as i32);

        Self {
            offset_x: 0,
            offset_y: 0,
            patch_size_x: patch,
            patch_size_y: patch,
            spacing_x: 0,
            spacing_y: 0,
            size_x: 0,
            size_y: 0,
            annotations: TileAnnotations::default(),
        }
    }

    /// Validate this configuration into a lattice
    ///
    /// # Errors
    ///
    /// Returns an invalid parameter error for a patch size below 1 or any
    /// negative offset, spacing or size cap.
    pub fn lattice(&self) -> Result<TileLattice> {
        TileLattice::new(self)
    }
}
