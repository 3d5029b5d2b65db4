//! Mathematical utilities for sampling and limit-shape estimation

/// Planar convex hulls
pub mod hull;
/// Cubic spline interpolation and separable grid resampling
pub mod interpolation;
/// Marching-tetrahedra isosurface extraction
pub mod marching;
/// Cumulative weights for logarithmic-time weighted sampling
pub mod probability;
