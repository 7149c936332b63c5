//! Dataset artifacts: packed atlas, metadata record and patch table
//!
//! Table row `i` and atlas cell `(i mod width, i div width)` always describe
//! the same patch.

use crate::dataset::compiler::{AcceptedPatch, Compilation};
use crate::dataset::statistics::CountEntry;
use crate::io::configuration::{
    ATLAS_FILENAME, METADATA_FILENAME, PATCH_CHANNELS, TABLE_FILENAME, TABLE_HEADER,
};
use crate::io::error::{DatasetError, Result, file_system};
use crate::io::image::{blank_canvas, save_rgba};
use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Metadata record written next to the atlas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Number of accepted patches
    pub count: usize,
    /// Channels per pixel
    pub channels: u32,
    /// Patch (height, width)
    pub patch_shape: [u32; 2],
    /// Minimum source tile (height, width) that was accepted
    pub min_source_shape: [u32; 2],
    /// Accepted patches per composite label
    pub labels: Vec<CountEntry>,
    /// Accepted patches per source url
    pub sources: Vec<CountEntry>,
    /// Source id to url
    pub source_ids: BTreeMap<u32, String>,
}

impl DatasetMetadata {
    /// Summarize a compilation
    pub fn from_compilation(compilation: &Compilation) -> Self {
        let size = compilation.options.patch_size;
        let min = compilation.options.min_source_size;
        Self {
            count: compilation.patches.len(),
            channels: PATCH_CHANNELS,
            patch_shape: [size, size],
            min_source_shape: [min, min],
            labels: compilation.statistics.labels.ranked(),
            sources: compilation.statistics.sources.ranked(),
            source_ids: compilation.source_ids.to_map(),
        }
    }
}

/// Paths of the written artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetArtifacts {
    /// Atlas image, absent when nothing was accepted
    pub atlas: Option<PathBuf>,
    /// Metadata record
    pub metadata: PathBuf,
    /// Patch table
    pub table: PathBuf,
}

/// Writes the artifacts of a compilation into one directory
#[derive(Debug, Clone)]
pub struct DatasetWriter {
    directory: PathBuf,
}

impl DatasetWriter {
    /// Create a writer for `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Output directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Write atlas, metadata and table
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any artifact cannot be written,
    /// or if accepted patches carry no pixel data (a dry-run compilation)
    pub fn write(&self, compilation: &Compilation) -> Result<DatasetArtifacts> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|e| file_system(&self.directory, "create directory", e))?;

        let atlas = if compilation.patches.is_empty() {
            log::warn!("No patches accepted, skipping atlas");
            None
        } else {
            let path = self.directory.join(ATLAS_FILENAME);
            let image = pack_atlas(&compilation.patches, compilation.options.patch_size)?;
            log::info!("Creating {}x{} atlas", image.width(), image.height());
            save_rgba(&image, &path)?;
            Some(path)
        };

        let metadata = self.directory.join(METADATA_FILENAME);
        write_metadata(&DatasetMetadata::from_compilation(compilation), &metadata)?;

        let table = self.directory.join(TABLE_FILENAME);
        write_table(&compilation.patches, &table)?;

        Ok(DatasetArtifacts {
            atlas,
            metadata,
            table,
        })
    }
}

/// Cells per atlas row: the smallest width whose square holds `count` patches
pub fn atlas_width(count: usize) -> u32 {
    let mut width = (count as f64).sqrt() as usize;
    while width * width < count {
        width += 1;
    }
    while width > 0 && (width - 1) * (width - 1) >= count {
        width -= 1;
    }
    width as u32
}

/// Atlas (column, row) of the patch with acceptance index `index`
pub const fn atlas_cell(index: usize, width: u32) -> (u32, u32) {
    let width = width as usize;
    if width == 0 {
        return (0, 0);
    }
    ((index % width) as u32, (index / width) as u32)
}

/// Copy patches row-major into a transparent square atlas
///
/// # Errors
///
/// Returns an invalid parameter error if a patch has no pixel data
pub fn pack_atlas(patches: &[AcceptedPatch], patch_size: u32) -> Result<RgbaImage> {
    let width = atlas_width(patches.len());
    let extent = width.saturating_mul(patch_size);
    let mut atlas = blank_canvas(extent, extent);

    for patch in patches {
        let pixels = patch.pixels.as_ref().ok_or_else(|| {
            crate::io::error::invalid_parameter(
                "pixels",
                &patch.index,
                &"patch was compiled without pixel data",
            )
        })?;
        let (col, row) = atlas_cell(patch.index, width);
        imageops::replace(
            &mut atlas,
            pixels,
            i64::from(col) * i64::from(patch_size),
            i64::from(row) * i64::from(patch_size),
        );
    }

    Ok(atlas)
}

/// Write the metadata record as pretty JSON
///
/// # Errors
///
/// Returns an error if the record cannot be serialized or written
pub fn write_metadata(metadata: &DatasetMetadata, path: &Path) -> Result<()> {
    let text =
        serde_json::to_string_pretty(metadata).map_err(|e| DatasetError::Serialization {
            path: path.to_path_buf(),
            source: e,
        })?;
    std::fs::write(path, text).map_err(|e| file_system(path, "write", e))
}

/// Write one header row and one `index,source_id,label` row per patch
///
/// # Errors
///
/// Returns an error if the file cannot be created or written
pub fn write_table(patches: &[AcceptedPatch], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| file_system(path, "create", e))?;
    let mut out = BufWriter::new(file);

    let write_rows = |out: &mut BufWriter<std::fs::File>| -> std::io::Result<()> {
        writeln!(out, "{}", TABLE_HEADER.join(","))?;
        for patch in patches {
            writeln!(
                out,
                "{},{},{}",
                patch.index,
                patch.source_id,
                csv_field(&patch.label)
            )?;
        }
        out.flush()
    };

    write_rows(&mut out).map_err(|e| file_system(path, "write", e))
}

/// Quote a field containing separators, quotes or line breaks
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
