/// Command-line interface and run orchestration
pub mod cli;
/// Constants and storage locations
pub mod configuration;
/// Error types
pub mod error;
/// Image decoding and patch resampling
pub mod image;
/// Progress display
pub mod progress;
