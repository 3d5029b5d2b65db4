//! Configuration, errors and everything that touches the outside world

/// Command-line interface and end-to-end runner
pub mod cli;
/// Defaults, raw configuration and validated parameters
pub mod configuration;
/// Error taxonomy and result alias
pub mod error;
/// PNG rendering of counts and limit shapes
pub mod image;
/// Cell, JSON, CSV and mesh files
pub mod persistence;
/// Console progress bars
pub mod progress;
