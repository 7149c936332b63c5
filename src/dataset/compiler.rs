//! Single-pass dataset compilation
//!
//! Walks the catalog in canonical order (source url, image, tiling, lattice
//! raster order) and runs every candidate tile through the filters:
//!
//! 1. ignored tiles are dropped
//! 2. duplicates (known overlay or content hash) are counted and recorded
//! 3. tiles smaller than the minimum source size are skipped
//! 4. unlabeled tiles are skipped when a label is required
//!
//! Whatever remains is accepted until the optional patch cap is reached.

use crate::catalog::duplicates::DuplicatesMap;
use crate::catalog::source::{Catalog, Source, SourceImage};
use crate::dataset::similarity::SimilarityFilter;
use crate::dataset::statistics::{DatasetStatistics, SourceIds};
use crate::io::configuration::{
    DEFAULT_MAX_PATCHES, DEFAULT_MIN_SOURCE_SIZE, DEFAULT_PATCH_SIZE, UNDEFINED_LABEL,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::image::ImageDecoder;
use crate::io::progress::ProgressManager;
use crate::spatial::lattice::{LatticePos, PixelRect, TileLattice};
use crate::spatial::tiling::TilingConfig;
use image::RgbaImage;
use std::ops::ControlFlow;
use std::path::PathBuf;

/// Parameters of one compile pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Edge length of output patches
    pub patch_size: u32,
    /// Hash every tile to recompute the duplicate overlay instead of trusting it
    pub find_duplicates: bool,
    /// Minimum width and height of a source tile before resampling
    pub min_source_size: u32,
    /// Stop after this many accepted patches (0 is unbounded)
    pub max_patches: usize,
    /// Skip tiles without any label
    pub require_label: bool,
    /// Output directory; `None` is a dry run that keeps no pixel data
    pub output: Option<PathBuf>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            patch_size: DEFAULT_PATCH_SIZE,
            find_duplicates: false,
            min_source_size: DEFAULT_MIN_SOURCE_SIZE,
            max_patches: DEFAULT_MAX_PATCHES,
            require_label: false,
            output: None,
        }
    }
}

impl CompileOptions {
    /// Whether artifacts will be written
    pub const fn is_dry_run(&self) -> bool {
        self.output.is_none()
    }

    /// Validate option values
    ///
    /// # Errors
    ///
    /// Returns an invalid parameter error for a zero patch size
    pub fn validate(&self) -> Result<()> {
        if self.patch_size == 0 {
            return Err(invalid_parameter(
                "patch_size",
                &self.patch_size,
                &"must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A patch that passed every filter
#[derive(Debug, Clone)]
pub struct AcceptedPatch {
    /// Acceptance ordinal, also the table row and atlas cell index
    pub index: usize,
    /// One-based id of the patch's source
    pub source_id: u32,
    /// Url of the patch's source
    pub source_url: String,
    /// Index of the image within its source
    pub image_index: usize,
    /// Index of the tiling within its image
    pub tiling_index: usize,
    /// Lattice position within the tiling
    pub position: LatticePos,
    /// Composite label
    pub label: String,
    /// Resampled pixels, kept only when artifacts are written
    pub pixels: Option<RgbaImage>,
}

/// Counters of one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileCounts {
    /// Tiles enumerated from successfully decoded images
    pub candidates: usize,
    /// Tiles excluded by hand
    pub ignored: usize,
    /// Tiles identical to an earlier tile
    pub duplicates: usize,
    /// Tiles rejected by the size or label filters
    pub skipped: usize,
    /// Tiles accepted into the dataset
    pub accepted: usize,
    /// Images that could not be decoded
    pub failed_images: usize,
}

/// Everything a pass produced
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// Options the pass ran with
    pub options: CompileOptions,
    /// Filter counters
    pub counts: CompileCounts,
    /// Whether the patch cap ended the scan before the catalog was exhausted
    pub stopped_early: bool,
    /// Duplicate positions found, keyed for the duplicates sidecar
    pub duplicates: DuplicatesMap,
    /// Accepted patches in acceptance order
    pub patches: Vec<AcceptedPatch>,
    /// Label and source distributions
    pub statistics: DatasetStatistics,
    /// Source ids in order of first acceptance
    pub source_ids: SourceIds,
}

/// Runs compile passes over a catalog
pub struct DatasetCompiler<'a, D: ImageDecoder> {
    options: CompileOptions,
    decoder: &'a D,
    progress: Option<&'a ProgressManager>,
}

// Per-pass mutable state, touched strictly in canonical order
struct PassState {
    filter: SimilarityFilter,
    compilation: Compilation,
}

impl<'a, D: ImageDecoder> DatasetCompiler<'a, D> {
    /// Create a compiler decoding images with `decoder`
    pub const fn new(options: CompileOptions, decoder: &'a D) -> Self {
        Self {
            options,
            decoder,
            progress: None,
        }
    }

    /// Report per-image progress
    #[must_use]
    pub const fn with_progress(mut self, progress: &'a ProgressManager) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run one pass over the catalog
    ///
    /// In duplicate-finding mode the catalog's duplicate overlay is cleared
    /// first, since this pass is what recomputes it.
    ///
    /// # Errors
    ///
    /// Returns an invalid parameter error before any image is decoded if the
    /// options or any tiling are invalid. Recoverable decode failures only skip
    /// the image; any other decoder error aborts the pass.
    pub fn compile(&self, catalog: &mut Catalog) -> Result<Compilation> {
        self.options.validate()?;
        let lattices = validate_tilings(catalog)?;

        if self.options.find_duplicates {
            catalog.clear_duplicates();
        }

        if let Some(progress) = self.progress {
            progress.initialize(catalog.image_count());
        }

        let mut state = PassState {
            filter: SimilarityFilter::new(),
            compilation: Compilation {
                options: self.options.clone(),
                ..Compilation::default()
            },
        };

        let mut image_lattices = lattices.iter();
        'sources: for source in catalog.sources() {
            for (image_index, image) in source.images.iter().enumerate() {
                let Some(tiling_lattices) = image_lattices.next() else {
                    break 'sources;
                };

                let flow =
                    self.compile_image(&mut state, source, image_index, image, tiling_lattices)?;

                if let Some(progress) = self.progress {
                    progress.advance(&image.relative_path);
                }

                if flow.is_break() {
                    state.compilation.stopped_early = true;
                    log::info!(
                        "Reached {} accepted patches, stopping early",
                        state.compilation.counts.accepted
                    );
                    break 'sources;
                }
            }
        }

        if let Some(progress) = self.progress {
            progress.finish();
        }

        Ok(state.compilation)
    }

    fn compile_image(
        &self,
        state: &mut PassState,
        source: &Source,
        image_index: usize,
        image: &SourceImage,
        lattices: &[TileLattice],
    ) -> Result<ControlFlow<()>> {
        if image.tilings.is_empty() {
            return Ok(ControlFlow::Continue(()));
        }

        // One decode per image, shared by all of its tilings
        let pixels = match self.decoder.decode(&image.filename, &image.matte) {
            Ok(pixels) => pixels,
            Err(error) if error.is_recoverable() => {
                log::warn!("{error}; skipping its tiles");
                state.compilation.counts.failed_images += 1;
                return Ok(ControlFlow::Continue(()));
            }
            Err(error) => return Err(error),
        };

        for (tiling_index, (tiling, lattice)) in image.tilings.iter().zip(lattices).enumerate() {
            let tile = TileRef {
                source,
                image,
                image_index,
                tiling_index,
                tiling,
            };
            for (rect, pos) in lattice.enumerate(pixels.width(), pixels.height()) {
                state.compilation.counts.candidates += 1;
                if self.compile_tile(state, &tile, &pixels, rect, pos).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn compile_tile(
        &self,
        state: &mut PassState,
        tile: &TileRef<'_>,
        pixels: &RgbaImage,
        rect: PixelRect,
        pos: LatticePos,
    ) -> ControlFlow<()> {
        let annotations = &tile.tiling.annotations;
        let compilation = &mut state.compilation;

        if annotations.is_ignored(pos) {
            compilation.counts.ignored += 1;
            return ControlFlow::Continue(());
        }

        // A known duplicate needs no hashing; the overlay is empty when finding duplicates
        let patch = if annotations.is_duplicate(pos) {
            None
        } else {
            let patch = self
                .decoder
                .crop_and_resample(pixels, rect, self.options.patch_size);
            (!state.filter.is_duplicate(patch.as_raw())).then_some(patch)
        };

        let Some(patch) = patch else {
            compilation.counts.duplicates += 1;
            compilation.duplicates.record(
                &tile.source.url,
                &tile.image.cache_path,
                tile.tiling_index,
                pos,
            );
            return ControlFlow::Continue(());
        };

        let min_size = self.options.min_source_size;
        if rect.width < min_size || rect.height < min_size {
            compilation.counts.skipped += 1;
            return ControlFlow::Continue(());
        }

        let label = annotations.composite_label(pos);
        if self.options.require_label && label == UNDEFINED_LABEL {
            compilation.counts.skipped += 1;
            return ControlFlow::Continue(());
        }

        let index = compilation.counts.accepted;
        let source_id = compilation.source_ids.assign(&tile.source.url);
        compilation.statistics.record(&label, &tile.source.url);
        compilation.patches.push(AcceptedPatch {
            index,
            source_id,
            source_url: tile.source.url.clone(),
            image_index: tile.image_index,
            tiling_index: tile.tiling_index,
            position: pos,
            label,
            pixels: (!self.options.is_dry_run()).then_some(patch),
        });
        compilation.counts.accepted += 1;

        let max = self.options.max_patches;
        if max > 0 && compilation.counts.accepted >= max {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

struct TileRef<'c> {
    source: &'c Source,
    image: &'c SourceImage,
    image_index: usize,
    tiling_index: usize,
    tiling: &'c TilingConfig,
}

// Fail fast on any invalid tiling, before decoding anything
fn validate_tilings(catalog: &Catalog) -> Result<Vec<Vec<TileLattice>>> {
    catalog
        .sources()
        .iter()
        .flat_map(|source| source.images.iter())
        .map(|image| {
            image
                .tilings
                .iter()
                .map(TilingConfig::lattice)
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}
