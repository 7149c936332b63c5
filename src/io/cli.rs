//! Command-line interface for compiling the patch dataset

use crate::catalog::duplicates::DuplicatesMap;
use crate::catalog::sidecar::load_sidecars;
use crate::catalog::source::{Catalog, read_urls};
use crate::dataset::compiler::{CompileCounts, CompileOptions, Compilation, DatasetCompiler};
use crate::dataset::writer::{DatasetArtifacts, DatasetWriter};
use crate::io::configuration::{
    DATA_PATH_ENV, DEFAULT_DATA_PATH, DEFAULT_MAX_PATCHES, DEFAULT_MIN_SOURCE_SIZE,
    DEFAULT_PATCH_SIZE, DEFAULT_WEBCACHE_PATH, StoragePaths, WEBCACHE_PATH_ENV,
};
use crate::io::error::Result;
use crate::io::image::FileDecoder;
use crate::io::progress::ProgressManager;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pixelset")]
#[command(
    author,
    version,
    about = "Compile annotated pixel-art tilings into a patch dataset"
)]
/// Command-line arguments for the dataset compiler
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Size of patches (width and height)
    #[arg(short, long, default_value_t = DEFAULT_PATCH_SIZE)]
    pub size: u32,

    /// Recompute duplicates and write the duplicates sidecar
    #[arg(short, long)]
    pub duplicates: bool,

    /// Directory to store the dataset (dry run when omitted)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Minimum width and height of a source tile in pixels
    #[arg(short, long, default_value_t = DEFAULT_MIN_SOURCE_SIZE)]
    pub min_size: u32,

    /// Stop after this many accepted patches (0 is unbounded)
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_PATCHES)]
    pub max_patches: usize,

    /// Only accept tiles carrying at least one label
    #[arg(short = 'l', long)]
    pub require_label: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Root of the downloaded image cache
    #[arg(long, env = WEBCACHE_PATH_ENV, default_value = DEFAULT_WEBCACHE_PATH)]
    pub cache_dir: PathBuf,

    /// Directory with urls, labels and sidecars
    #[arg(long, env = DATA_PATH_ENV, default_value = DEFAULT_DATA_PATH)]
    pub data_dir: PathBuf,
}

impl Cli {
    /// Compile options selected on the command line
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            patch_size: self.size,
            find_duplicates: self.duplicates,
            min_source_size: self.min_size,
            max_patches: self.max_patches,
            require_label: self.require_label,
            output: self.output.clone(),
        }
    }

    /// Resolved storage locations
    pub fn storage(&self) -> StoragePaths {
        StoragePaths::new(&self.cache_dir, &self.data_dir)
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Orchestrates catalog loading, compilation and artifact output
pub struct DatasetRunner {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

/// Outcome of a successful run
#[derive(Debug)]
pub struct RunSummary {
    /// Filter counters
    pub counts: CompileCounts,
    /// Whether the patch cap ended the scan early
    pub stopped_early: bool,
    /// Written artifacts, absent on a dry run
    pub artifacts: Option<DatasetArtifacts>,
    /// Duplicates sidecar, when written
    pub duplicates_file: Option<PathBuf>,
}

impl DatasetRunner {
    /// Create a runner for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Load the catalog from the storage locations
    ///
    /// Sidecar annotations are applied, and unless duplicates are being
    /// recomputed the stored duplicate overlay as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the url list cannot be read or the cache cannot be scanned
    pub fn load_catalog(&self) -> Result<Catalog> {
        let storage = self.cli.storage();
        let urls = read_urls(&storage.urls_file())?;
        let mut catalog = Catalog::scan(&urls, &storage.cache_root)?;
        load_sidecars(&mut catalog, &storage.sources_dir());

        if !self.cli.duplicates {
            catalog.apply_duplicates(&DuplicatesMap::load(&storage.duplicates_file()));
        }

        log::info!(
            "Loaded {} sources with {} images",
            catalog.sources().len(),
            catalog.image_count()
        );
        Ok(catalog)
    }

    /// Run a full compile with the configured options
    ///
    /// # Errors
    ///
    /// Returns an error for invalid options or tilings and for any failure
    /// writing the duplicates sidecar or the dataset. Counts are logged
    /// before anything is written.
    pub fn run(&self) -> Result<RunSummary> {
        let mut catalog = self.load_catalog()?;
        self.run_catalog(&mut catalog)
    }

    /// Run a full compile over an already loaded catalog
    ///
    /// # Errors
    ///
    /// Same as [`Self::run`], minus catalog loading.
    pub fn run_catalog(&self, catalog: &mut Catalog) -> Result<RunSummary> {
        let start_time = Instant::now();
        let decoder = FileDecoder;
        let mut compiler = DatasetCompiler::new(self.cli.compile_options(), &decoder);
        if let Some(ref pm) = self.progress_manager {
            compiler = compiler.with_progress(pm);
        }

        let compilation = compiler.compile(catalog)?;
        report(&compilation);

        let duplicates_file = if self.cli.duplicates {
            let path = self.cli.storage().duplicates_file();
            compilation.duplicates.save(&path)?;
            log::info!("Wrote {}", path.display());
            Some(path)
        } else {
            None
        };

        let artifacts = match &self.cli.output {
            Some(directory) => {
                let artifacts = DatasetWriter::new(directory).write(&compilation)?;
                log::info!("Wrote dataset to {}", directory.display());
                Some(artifacts)
            }
            None => None,
        };

        log::debug!("Finished in {:.2?}", start_time.elapsed());

        Ok(RunSummary {
            counts: compilation.counts,
            stopped_early: compilation.stopped_early,
            artifacts,
            duplicates_file,
        })
    }
}

fn report(compilation: &Compilation) {
    let counts = &compilation.counts;
    log::info!("candidates: {}", counts.candidates);
    log::info!("ignored: {}", counts.ignored);
    log::info!("duplicates: {}", counts.duplicates);
    log::info!("skipped: {}", counts.skipped);
    log::info!("patches: {}", counts.accepted);
    if counts.failed_images > 0 {
        log::warn!("failed images: {}", counts.failed_images);
    }
    for entry in compilation.statistics.labels.ranked() {
        log::debug!("label {}: {}", entry.name, entry.count);
    }
}
