//! CLI entry point for the patch dataset compiler

use clap::Parser;
use pixelset::io::cli::{Cli, DatasetRunner};

fn main() -> pixelset::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let runner = DatasetRunner::new(cli);
    runner.run().map(|_summary| ())
}
