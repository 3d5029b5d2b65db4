//! Lattice cells, monotone diagrams and growth weights
//!
//! This module contains the combinatorial core:
//! - Cell coordinates and supported dimensions
//! - Diagrams closed under coordinate decrease, with their addable frontier
//! - Weighting strategies used to bias frontier selection

/// Cell coordinates and supported dimensions
pub mod cell;
/// Order-ideal diagrams with an incrementally maintained frontier
pub mod diagram;
/// Additive and multiplicative weighting strategies
pub mod weights;

pub use cell::{Cell, Dimension};
pub use diagram::LatticeDiagram;
pub use weights::WeightStrategy;
