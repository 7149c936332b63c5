//! Duplicates sidecar produced by a compile pass
//!
//! Layout: source url -> image path relative to the cache root ->
//! tiling index (string key) -> `[row, col]` positions in enumeration order.

use crate::io::error::{DatasetError, Result, file_system};
use crate::spatial::lattice::LatticePos;
use std::collections::BTreeMap;
use std::path::Path;

type TilingPositions = BTreeMap<String, Vec<LatticePos>>;

/// Duplicate tile positions of the whole corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DuplicatesMap {
    sources: BTreeMap<String, BTreeMap<String, TilingPositions>>,
}

impl DuplicatesMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a duplicate position
    pub fn record(&mut self, url: &str, cache_path: &str, tiling_index: usize, pos: LatticePos) {
        self.sources
            .entry(url.to_string())
            .or_default()
            .entry(cache_path.to_string())
            .or_default()
            .entry(tiling_index.to_string())
            .or_default()
            .push(pos);
    }

    /// Recorded positions of one tiling, empty if none
    pub fn positions(&self, url: &str, cache_path: &str, tiling_index: usize) -> &[LatticePos] {
        self.sources
            .get(url)
            .and_then(|images| images.get(cache_path))
            .and_then(|tilings| tilings.get(&tiling_index.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of recorded positions
    pub fn len(&self) -> usize {
        self.sources
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the sidecar; missing or malformed files yield an empty map
    pub fn load(path: &Path) -> Self {
        if !path.is_file() {
            return Self::default();
        }
        Self::read(path).unwrap_or_else(|error| {
            log::warn!("{error}; ignoring stored duplicates");
            Self::default()
        })
    }

    /// Strictly read the sidecar
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| file_system(path, "read", e))?;
        serde_json::from_str(&text).map_err(|e| DatasetError::Serialization {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the sidecar
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or file cannot be written
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string(self).map_err(|e| DatasetError::Serialization {
            path: path.to_path_buf(),
            source: e,
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| file_system(parent, "create directory", e))?;
        }
        std::fs::write(path, text).map_err(|e| file_system(path, "write", e))
    }
}
