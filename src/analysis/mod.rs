//! Analysis of accumulated runs: frequency views and limit-shape estimation

/// Per-cell visitation counts and their JSON report
pub mod counts;
/// Scaling, interpolation and isosurface extraction of accumulated counts
pub mod limit_shape;
