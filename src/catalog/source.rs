//! Sources, their images and the ordered catalog
//!
//! The compiler only relies on the ordering contract kept here: sources
//! sorted by url, images in path order, tilings in stored order.

use crate::catalog::duplicates::DuplicatesMap;
use crate::io::configuration::IMAGE_EXTENSIONS;
use crate::io::error::{Result, file_system};
use crate::spatial::tiling::TilingConfig;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// An image file with its matte colors and tilings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Full path of the image file
    pub filename: PathBuf,
    /// Path relative to the cache root, used as duplicates key
    pub cache_path: String,
    /// Path relative to the source folder, used as sidecar key
    pub relative_path: String,
    /// RGB values decoded as fully transparent
    pub matte: Vec<[u8; 3]>,
    /// Grid overlays in creation order
    pub tilings: Vec<TilingConfig>,
}

impl SourceImage {
    /// Create an image entry; relative paths fall back to the full path
    pub fn new(filename: PathBuf, cache_root: &Path, folder: &Path) -> Self {
        let cache_path = relative_key(&filename, cache_root);
        let relative_path = relative_key(&filename, folder);
        Self {
            filename,
            cache_path,
            relative_path,
            matte: Vec::new(),
            tilings: Vec::new(),
        }
    }

    /// Builder-style tilings
    #[must_use]
    pub fn with_tilings(mut self, tilings: Vec<TilingConfig>) -> Self {
        self.tilings = tilings;
        self
    }

    /// Builder-style matte colors
    #[must_use]
    pub fn with_matte(mut self, matte: Vec<[u8; 3]>) -> Self {
        self.matte = matte;
        self
    }
}

/// One downloaded art page and its images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Page url, unique per source
    pub url: String,
    /// Display name, the decoded last url segment
    pub name: String,
    /// Folder the images were downloaded to
    pub folder: PathBuf,
    /// Images in path order
    pub images: Vec<SourceImage>,
}

impl Source {
    /// Create an empty source for `url` below `cache_root`
    pub fn new(url: &str, cache_root: &Path) -> Self {
        let segment = url_segment(url);
        Self {
            url: url.to_string(),
            name: percent_decode_str(segment).decode_utf8_lossy().into_owned(),
            folder: cache_root.join(segment),
            images: Vec::new(),
        }
    }

    /// Raw last url segment, also the folder and sidecar name
    pub fn segment(&self) -> &str {
        url_segment(&self.url)
    }
}

/// Sources in url order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    cache_root: PathBuf,
    sources: Vec<Source>,
}

impl Catalog {
    /// Build a catalog, sorting sources by url
    ///
    /// Urls identify sources; of several sources sharing a url only the first is kept.
    pub fn from_sources(cache_root: impl Into<PathBuf>, mut sources: Vec<Source>) -> Self {
        sources.sort_by(|a, b| a.url.cmp(&b.url));
        sources.dedup_by(|later, earlier| later.url == earlier.url);
        Self {
            cache_root: cache_root.into(),
            sources,
        }
    }

    /// Scan the image cache for every url
    ///
    /// Repeated urls are scanned once. Each `.png`/`.gif` file below the
    /// source folder becomes an image with one default tiling. Sources without
    /// images are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if a source folder exists but cannot be walked
    pub fn scan(urls: &[String], cache_root: &Path) -> Result<Self> {
        let mut unique: Vec<&String> = urls.iter().collect();
        unique.sort();
        unique.dedup();

        let mut sources = Vec::new();
        for url in unique {
            let mut source = Source::new(url, cache_root);
            if !source.folder.is_dir() {
                log::debug!("No cached images for {url}");
                continue;
            }

            let mut files = Vec::new();
            for entry in WalkDir::new(&source.folder) {
                let entry = entry.map_err(|e| {
                    let path = e.path().map_or_else(|| source.folder.clone(), Path::to_path_buf);
                    file_system(path, "scan", e.into())
                })?;
                if entry.file_type().is_file() && is_image_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            files.sort();

            source.images = files
                .into_iter()
                .map(|file| {
                    let size = image::image_dimensions(&file).ok();
                    SourceImage::new(file, cache_root, &source.folder)
                        .with_tilings(vec![TilingConfig::default_for(size)])
                })
                .collect();

            if !source.images.is_empty() {
                sources.push(source);
            }
        }

        Ok(Self::from_sources(cache_root, sources))
    }

    /// Root of the image cache
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Sources in url order
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Mutable sources; the url order must be preserved
    pub fn sources_mut(&mut self) -> &mut [Source] {
        &mut self.sources
    }

    /// Total number of images
    pub fn image_count(&self) -> usize {
        self.sources.iter().map(|s| s.images.len()).sum()
    }

    /// Load the duplicate overlay of every tiling from a previous pass
    ///
    /// Tilings missing from the map end up with an empty overlay.
    pub fn apply_duplicates(&mut self, duplicates: &DuplicatesMap) {
        for source in &mut self.sources {
            for image in &mut source.images {
                for (index, tiling) in image.tilings.iter_mut().enumerate() {
                    let positions = duplicates.positions(&source.url, &image.cache_path, index);
                    tiling.annotations.replace_duplicates(positions.iter().copied());
                }
            }
        }
    }

    /// Remove every duplicate overlay
    pub fn clear_duplicates(&mut self) {
        for tiling in self
            .sources
            .iter_mut()
            .flat_map(|s| s.images.iter_mut())
            .flat_map(|i| i.tilings.iter_mut())
        {
            tiling.annotations.clear_duplicates();
        }
    }
}

/// Read source urls, keeping lines that start with `http`
///
/// # Errors
///
/// Returns an error if the url list cannot be read
pub fn read_urls(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| file_system(path, "read", e))?;
    Ok(text
        .lines()
        .filter(|line| line.starts_with("http"))
        .map(|line| line.trim().to_string())
        .collect())
}

fn is_image_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_none_or(|n| n.starts_with('.'));
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    !hidden && extension.is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

fn relative_key(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn url_segment(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}
