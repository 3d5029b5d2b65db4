//! Stochastic growth of monotone lattice diagrams with limit-shape estimation
//!
//! Diagrams grow one cell at a time by weighted random insertion on their frontier.
//! Many independent realizations are accumulated into per-cell visitation frequencies,
//! which are then rescaled and interpolated into a continuum approximation.

#![forbid(unsafe_code)]

/// Growth simulation, multi-run accumulation and progress observation
pub mod algorithm;
/// Accumulated frequency views and limit-shape estimation
pub mod analysis;
/// Configuration, errors, command line, persistence and rendering
pub mod io;
/// Sampling structures, interpolation and surface extraction
pub mod math;
/// Lattice cells, diagrams and weighting strategies
pub mod spatial;

pub use io::error::{GrowthError, Result};
