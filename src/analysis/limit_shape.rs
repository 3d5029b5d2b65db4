//! Continuum approximation of accumulated counts
//!
//! Coordinates are divided by a scaling factor `n^(1/D)`, where `n` is the
//! largest coordinate sum among counted cells, and counts are normalized by the
//! largest count. The normalized frequencies are laid out on the integer lattice,
//! with uncounted cells at zero, and resampled onto a regular grid by
//! tensor-product natural cubic splines.
//!
//! Planar estimates mask grid points outside the convex hull of the counted
//! cells. Solid estimates pad the lattice with one empty layer on the far side
//! of every axis so the extracted isosurface closes there.

use crate::analysis::counts::AccumulatedCounts;
use crate::io::configuration::{
    DEFAULT_GRID_RESOLUTION_2D, DEFAULT_GRID_RESOLUTION_3D, MIN_SAMPLES_2D, MIN_SAMPLES_3D,
};
use crate::io::error::{GrowthError, Result, computation_error, invalid_configuration};
use crate::math::hull::ConvexHull;
use crate::math::interpolation::{grid_positions, resample_grid};
use crate::math::marching::{TriangleMesh, extract_isosurface};
use ndarray::{Array2, Array3, ArrayD, Ix2, Ix3, IxDyn};

/// Tolerance, in scaled units, for grid points on the hull boundary
const HULL_TOLERANCE: f64 = 1e-9;

/// Interpolated planar frequency field
#[derive(Clone, Debug, PartialEq)]
pub struct LimitShape2D {
    /// Factor every lattice coordinate was divided by
    pub scaling: f64,
    /// Scaled grid coordinates along the first axis
    pub grid_x: Vec<f64>,
    /// Scaled grid coordinates along the second axis
    pub grid_y: Vec<f64>,
    /// Frequency at `(grid_x[i], grid_y[j])`, `None` outside the sampled region
    pub values: Array2<Option<f64>>,
}

impl LimitShape2D {
    /// Value at a grid index, `None` when undefined or out of range
    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get((i, j)).copied().flatten()
    }

    /// Number of grid points carrying a value
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}

/// Interpolated solid frequency volume
#[derive(Clone, Debug, PartialEq)]
pub struct DensityVolume {
    /// Factor every lattice coordinate was divided by
    pub scaling: f64,
    /// Scaled grid coordinates per axis
    pub grid: [Vec<f64>; 3],
    /// Frequency at every grid point, clamped to `[0, 1]`
    pub values: Array3<f64>,
}

impl DensityVolume {
    /// Distance between neighboring grid points along each axis
    pub fn spacing(&self) -> [f64; 3] {
        self.grid.each_ref().map(|axis| match axis.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        })
    }
}

/// Triangulated level set of a solid frequency volume
#[derive(Clone, Debug, PartialEq)]
pub struct IsoSurface {
    /// Factor every lattice coordinate was divided by
    pub scaling: f64,
    /// Frequency threshold the surface was extracted at
    pub level: f64,
    /// Vertex positions in scaled coordinates
    pub vertices: Vec<[f64; 3]>,
    /// Triangles as vertex index triples
    pub faces: Vec<[usize; 3]>,
}

/// Estimates limit shapes from accumulated counts
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LimitShapeEstimator {
    scaling_override: Option<f64>,
    resolution: Option<usize>,
}

impl LimitShapeEstimator {
    /// Estimator with automatic scaling and default resolution
    pub fn new() -> Self {
        Self::default()
    }

    /// Divide coordinates by a fixed factor instead of `n^(1/D)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless the factor is finite and positive
    pub fn with_scaling(mut self, scaling: f64) -> Result<Self> {
        if !scaling.is_finite() || scaling <= 0.0 {
            return Err(invalid_configuration(
                "scaling",
                &scaling,
                &"must be a finite number greater than zero",
            ));
        }
        self.scaling_override = Some(scaling);
        Ok(self)
    }

    /// Place `resolution` grid points along every axis
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for fewer than two points
    pub fn with_resolution(mut self, resolution: usize) -> Result<Self> {
        if resolution < 2 {
            return Err(invalid_configuration(
                "resolution",
                &resolution,
                &"needs at least 2 grid points per axis",
            ));
        }
        self.resolution = Some(resolution);
        Ok(self)
    }

    /// Factor lattice coordinates are divided by
    ///
    /// The characteristic size is the largest coordinate sum, taken as at least
    /// one so a lone origin still scales by one.
    ///
    /// # Errors
    ///
    /// Returns `NoDataAvailable` when nothing has been counted
    pub fn scaling_factor<const D: usize>(&self, counts: &AccumulatedCounts<D>) -> Result<f64> {
        if let Some(scaling) = self.scaling_override {
            return Ok(scaling);
        }
        let size = counts
            .iter()
            .map(|(cell, _)| cell.coordinate_sum())
            .max()
            .ok_or(GrowthError::NoDataAvailable {
                operation: "limit shape scaling",
            })?;
        Ok((size.max(1) as f64).powf(1.0 / D as f64))
    }

    /// Interpolate planar frequencies onto a regular grid
    ///
    /// # Errors
    ///
    /// Returns `NoDataAvailable` for empty counts and `InsufficientSamples` when
    /// fewer than three cells were counted, either axis spans a single lattice
    /// position, or the counted cells are collinear
    pub fn estimate_2d(&self, counts: &AccumulatedCounts<2>) -> Result<LimitShape2D> {
        let operation = "planar limit shape";
        let extents = counts
            .axis_extents()
            .ok_or(GrowthError::NoDataAvailable { operation })?;
        if counts.len() < MIN_SAMPLES_2D {
            return Err(GrowthError::InsufficientSamples {
                operation,
                required: MIN_SAMPLES_2D,
                available: counts.len(),
            });
        }
        let knots = extents.map(|extent| extent as usize + 1);
        ensure_axis_knots(operation, &knots)?;

        let scaling = self.scaling_factor(counts)?;
        let scaled_points: Vec<[f64; 2]> = counts
            .iter()
            .map(|(cell, _)| cell.coordinates().map(|c| f64::from(c) / scaling))
            .collect();
        let hull = ConvexHull::new(&scaled_points);
        if hull.is_degenerate() {
            return Err(GrowthError::InsufficientSamples {
                operation,
                required: MIN_SAMPLES_2D,
                available: hull.vertices().len(),
            });
        }

        let resolution = self.resolution.unwrap_or(DEFAULT_GRID_RESOLUTION_2D);
        let lattice = lattice_frequencies(counts, &knots)?;
        let field = resample_grid(&lattice, resolution)?
            .into_dimensionality::<Ix2>()
            .map_err(|e| computation_error(operation, &e))?;

        let [grid_x, grid_y] =
            knots.map(|count| scaled_positions(count, resolution, scaling));
        let values = Array2::from_shape_fn(field.dim(), |(i, j)| {
            let point = [
                grid_x.get(i).copied().unwrap_or(f64::NAN),
                grid_y.get(j).copied().unwrap_or(f64::NAN),
            ];
            if hull.contains(point, HULL_TOLERANCE) {
                field.get((i, j)).map(|v| v.clamp(0.0, 1.0))
            } else {
                None
            }
        });

        Ok(LimitShape2D {
            scaling,
            grid_x,
            grid_y,
            values,
        })
    }

    /// Interpolate solid frequencies onto a regular grid
    ///
    /// # Errors
    ///
    /// Returns `NoDataAvailable` for empty counts and `InsufficientSamples` when
    /// fewer than four cells were counted
    pub fn density_3d(&self, counts: &AccumulatedCounts<3>) -> Result<DensityVolume> {
        let operation = "solid limit shape";
        let extents = counts
            .axis_extents()
            .ok_or(GrowthError::NoDataAvailable { operation })?;
        if counts.len() < MIN_SAMPLES_3D {
            return Err(GrowthError::InsufficientSamples {
                operation,
                required: MIN_SAMPLES_3D,
                available: counts.len(),
            });
        }
        // One empty layer past the largest coordinate on every axis
        let knots = extents.map(|extent| extent as usize + 2);

        let scaling = self.scaling_factor(counts)?;
        let resolution = self.resolution.unwrap_or(DEFAULT_GRID_RESOLUTION_3D);
        let lattice = lattice_frequencies(counts, &knots)?;
        let values = resample_grid(&lattice, resolution)?
            .mapv(|v| v.clamp(0.0, 1.0))
            .into_dimensionality::<Ix3>()
            .map_err(|e| computation_error(operation, &e))?;

        Ok(DensityVolume {
            scaling,
            grid: knots.map(|count| scaled_positions(count, resolution, scaling)),
            values,
        })
    }

    /// Extract the surface where the solid frequency crosses `level`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` unless `0 < level < 1`, any error from
    /// [`LimitShapeEstimator::density_3d`], and `InsufficientSamples` when the
    /// level set is empty
    pub fn estimate_3d(&self, counts: &AccumulatedCounts<3>, level: f64) -> Result<IsoSurface> {
        if level.is_nan() || level <= 0.0 || level >= 1.0 {
            return Err(invalid_configuration(
                "level",
                &level,
                &"must lie strictly between 0 and 1",
            ));
        }

        let volume = self.density_3d(counts)?;
        let TriangleMesh { vertices, faces } =
            extract_isosurface(&volume.values, level, volume.spacing());
        if faces.is_empty() {
            return Err(GrowthError::InsufficientSamples {
                operation: "isosurface extraction",
                required: 1,
                available: 0,
            });
        }

        Ok(IsoSurface {
            scaling: volume.scaling,
            level,
            vertices,
            faces,
        })
    }
}

/// Every axis needs two lattice positions for a spline
fn ensure_axis_knots(operation: &'static str, knots: &[usize]) -> Result<()> {
    match knots.iter().copied().min() {
        Some(fewest) if fewest < 2 => Err(GrowthError::InsufficientSamples {
            operation,
            required: 2,
            available: fewest,
        }),
        _ => Ok(()),
    }
}

/// Grid coordinates covering lattice knots `0..count` after scaling
fn scaled_positions(count: usize, resolution: usize, scaling: f64) -> Vec<f64> {
    grid_positions(count, resolution)
        .into_iter()
        .map(|position| position / scaling)
        .collect()
}

/// Dense lattice of normalized frequencies, zero where nothing was counted
fn lattice_frequencies<const D: usize>(
    counts: &AccumulatedCounts<D>,
    knots: &[usize; D],
) -> Result<ArrayD<f64>> {
    let mut lattice = ArrayD::<f64>::zeros(IxDyn(knots));
    for (cell, frequency) in counts.normalized() {
        let index = cell.coordinates().map(|c| c as usize);
        let slot = lattice.get_mut(IxDyn(&index)).ok_or_else(|| {
            computation_error("lattice layout", &format!("cell {cell} outside lattice"))
        })?;
        *slot = frequency;
    }
    Ok(lattice)
}
