//! Per-source annotation sidecars
//!
//! Each source keeps its edited tilings in `<data>/sources/<segment>.json`,
//! with images keyed by their path relative to the source folder.

use crate::catalog::source::{Catalog, Source};
use crate::io::error::{DatasetError, Result, file_system};
use crate::spatial::tiling::TilingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted annotations of one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path relative to the source folder
    pub filename: String,
    /// Matte colors, omitted when empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<Vec<[u8; 3]>>,
    /// Tilings in creation order
    #[serde(default)]
    pub tilings: Vec<TilingConfig>,
}

/// Persisted annotations of one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSidecar {
    /// Source url
    pub url: String,
    /// Annotated images
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

impl SourceSidecar {
    /// Capture the current annotations of a source
    pub fn from_source(source: &Source) -> Self {
        Self {
            url: source.url.clone(),
            images: source
                .images
                .iter()
                .map(|image| ImageRecord {
                    filename: image.relative_path.clone(),
                    alpha: (!image.matte.is_empty()).then(|| image.matte.clone()),
                    tilings: image.tilings.clone(),
                })
                .collect(),
        }
    }

    /// Strictly read a sidecar file
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

    /// Overwrite matte colors and tilings of matching images
    ///
    /// Records for images no longer in the cache are ignored.
    pub fn apply_to(&self, source: &mut Source) {
        for record in &self.images {
            if let Some(image) = source
                .images
                .iter_mut()
                .find(|image| image.relative_path == record.filename)
            {
                image.matte = record.alpha.clone().unwrap_or_default();
                image.tilings = record.tilings.clone();
            }
        }
    }
}

/// Sidecar location of a source
pub fn sidecar_path(sources_dir: &Path, source: &Source) -> PathBuf {
    sources_dir.join(format!("{}.json", source.segment()))
}

/// Apply every existing sidecar to the catalog
///
/// Missing sidecars leave the defaults; malformed ones are reported and
/// treated as absent.
pub fn load_sidecars(catalog: &mut Catalog, sources_dir: &Path) {
    for source in catalog.sources_mut() {
        let path = sidecar_path(sources_dir, source);
        if !path.is_file() {
            continue;
        }

        match SourceSidecar::read(&path) {
            Ok(sidecar) => sidecar.apply_to(source),
            Err(error) => log::warn!("{error}; using default tilings"),
        }
    }
}

/// Persist the annotations of one source
///
/// # Errors
///
/// Returns an error if the sidecar directory or file cannot be written
pub fn save_sidecar(sources_dir: &Path, source: &Source) -> Result<PathBuf> {
    let path = sidecar_path(sources_dir, source);
    let text = serde_json::to_string_pretty(&SourceSidecar::from_source(source)).map_err(|e| {
        DatasetError::Serialization {
            path: path.clone(),
            source: e,
        }
    })?;

    std::fs::create_dir_all(sources_dir)
        .map_err(|e| file_system(sources_dir, "create directory", e))?;
    std::fs::write(&path, text).map_err(|e| file_system(&path, "write", e))?;
    Ok(path)
}
