//! Dataset constants and runtime configuration defaults

use std::path::{Path, PathBuf};

// Tiling defaults
/// Patch edge length used by the default tiling factory
pub const DEFAULT_TILING_PATCH_SIZE: i32 = 16;
/// Square images up to this edge length are tiled as a single patch by default
pub const SINGLE_PATCH_MAX_EXTENT: u32 = 64;

// Compile defaults
/// Default edge length of output patches
pub const DEFAULT_PATCH_SIZE: u32 = 16;
/// Default minimum source tile edge length (0 accepts everything)
pub const DEFAULT_MIN_SOURCE_SIZE: u32 = 0;
/// Default maximum number of accepted patches (0 is unbounded)
pub const DEFAULT_MAX_PATCHES: usize = 0;
/// Channels per output pixel (RGBA)
pub const PATCH_CHANNELS: u32 = 4;

// Labels
/// Composite label of a tile without any label assignment
pub const UNDEFINED_LABEL: &str = "undefined";
/// Separator between label names in a composite label
pub const LABEL_SEPARATOR: &str = "/";

// Catalog
/// File extensions treated as source images (compared lowercase)
pub const IMAGE_EXTENSIONS: [&str; 2] = ["png", "gif"];
/// Url list inside the data directory
pub const URLS_FILENAME: &str = "urls.txt";
/// Label preset inside the data directory
pub const LABELS_FILENAME: &str = "labels.json";
/// Duplicates sidecar inside the data directory
pub const DUPLICATES_FILENAME: &str = "duplicates.json";
/// Directory of per-source sidecars inside the data directory
pub const SOURCES_DIRNAME: &str = "sources";

// Output artifacts
/// Packed atlas image
pub const ATLAS_FILENAME: &str = "tiles.png";
/// Dataset metadata record
pub const METADATA_FILENAME: &str = "tiles.json";
/// One row per accepted patch
pub const TABLE_FILENAME: &str = "tiles.csv";
/// Header row of the patch table
pub const TABLE_HEADER: [&str; 3] = ["index", "source_id", "label"];

// Environment
/// Environment variable overriding the image cache directory
pub const WEBCACHE_PATH_ENV: &str = "PIXELSET_WEBCACHE_PATH";
/// Environment variable overriding the data directory
pub const DATA_PATH_ENV: &str = "PIXELSET_DATA_PATH";
/// Default image cache directory
pub const DEFAULT_WEBCACHE_PATH: &str = "web-cache";
/// Default data directory
pub const DEFAULT_DATA_PATH: &str = "data";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Resolved storage locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    /// Root of the downloaded image cache; one folder per source
    pub cache_root: PathBuf,
    /// Directory holding urls, labels and sidecars
    pub data_dir: PathBuf,
}

impl StoragePaths {
    /// Build storage paths, expanding a leading `~`
    pub fn new(cache_root: &Path, data_dir: &Path) -> Self {
        Self {
            cache_root: expand_home(cache_root),
            data_dir: expand_home(data_dir),
        }
    }

    /// Location of the url list
    pub fn urls_file(&self) -> PathBuf {
        self.data_dir.join(URLS_FILENAME)
    }

    /// Location of the label preset
    pub fn labels_file(&self) -> PathBuf {
        self.data_dir.join(LABELS_FILENAME)
    }

    /// Location of the duplicates sidecar
    pub fn duplicates_file(&self) -> PathBuf {
        self.data_dir.join(DUPLICATES_FILENAME)
    }

    /// Directory of per-source sidecars
    pub fn sources_dir(&self) -> PathBuf {
        self.data_dir.join(SOURCES_DIRNAME)
    }
}

/// Replace a leading `~` component with the user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}
