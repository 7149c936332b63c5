//! Dataset compilation and output

/// Catalog traversal and per-tile filtering
pub mod compiler;
/// Exact duplicate detection
pub mod similarity;
/// Distributions and source ids
pub mod statistics;
/// Atlas, metadata and table artifacts
pub mod writer;
