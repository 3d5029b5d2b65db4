//! Cubic spline interpolation and separable resampling of lattice data
//!
//! Splines use natural boundary conditions where second derivatives are zero at
//! the endpoints. Multi-dimensional lattice data is resampled one axis at a time,
//! which gives a tensor-product cubic interpolant on a regular grid.

use crate::io::error::{GrowthError, Result, computation_error};
use ndarray::{ArrayD, Axis, IxDyn};

/// Cubic spline interpolation with natural boundary conditions
///
/// Provides C2 continuous interpolation through a set of data points
/// using piecewise cubic polynomials
#[derive(Debug, Clone)]
pub struct Cubic {
    x_values: Vec<f64>,
    y_values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl Cubic {
    /// Create a spline through `(x, y)` pairs with strictly increasing `x`
    ///
    /// # Errors
    ///
    /// Returns `InsufficientSamples` for fewer than two points, and a computation
    /// error for mismatched lengths or non-increasing knots
    pub fn new(x_values: Vec<f64>, y_values: Vec<f64>) -> Result<Self> {
        if x_values.len() != y_values.len() {
            return Err(computation_error(
                "cubic spline",
                &format!(
                    "{} knots but {} values",
                    x_values.len(),
                    y_values.len()
                ),
            ));
        }
        if x_values.len() < 2 {
            return Err(GrowthError::InsufficientSamples {
                operation: "cubic spline",
                required: 2,
                available: x_values.len(),
            });
        }
        if x_values.windows(2).any(|pair| pair.first() >= pair.last()) {
            return Err(computation_error(
                "cubic spline",
                &"knots must be strictly increasing",
            ));
        }

        let n = x_values.len();
        let mut second_derivatives = vec![0.0; n];
        let mut decomposed = vec![0.0; n];

        // Forward sweep of the tridiagonal system over interior knots
        for (offset, (xs, ys)) in x_values.windows(3).zip(y_values.windows(3)).enumerate() {
            let (&[x0, x1, x2], &[y0, y1, y2]) = (xs, ys) else {
                continue;
            };
            let i = offset + 1;
            let previous_second = second_derivatives.get(i - 1).copied().unwrap_or(0.0);
            let previous_decomposed = decomposed.get(i - 1).copied().unwrap_or(0.0);

            let sig = (x1 - x0) / (x2 - x0);
            let p = sig.mul_add(previous_second, 2.0);
            let slope_change = (y2 - y1) / (x2 - x1) - (y1 - y0) / (x1 - x0);

            if let Some(value) = second_derivatives.get_mut(i) {
                *value = (sig - 1.0) / p;
            }
            if let Some(value) = decomposed.get_mut(i) {
                *value = sig.mul_add(-previous_decomposed, 6.0 * slope_change / (x2 - x0)) / p;
            }
        }

        // Natural boundary at the last knot, then back substitution
        if let Some(last) = second_derivatives.last_mut() {
            *last = 0.0;
        }
        for k in (0..n - 1).rev() {
            let next = second_derivatives.get(k + 1).copied().unwrap_or(0.0);
            let u = decomposed.get(k).copied().unwrap_or(0.0);
            if let Some(value) = second_derivatives.get_mut(k) {
                *value = value.mul_add(next, u);
            }
        }

        Ok(Self {
            x_values,
            y_values,
            second_derivatives,
        })
    }

    /// Create a spline over knots `0, 1, ..., n - 1`
    ///
    /// # Errors
    ///
    /// Returns `InsufficientSamples` for fewer than two values
    pub fn uniform(y_values: Vec<f64>) -> Result<Self> {
        let x_values = (0..y_values.len()).map(|i| i as f64).collect();
        Self::new(x_values, y_values)
    }

    /// Evaluate the spline at `x`
    ///
    /// Points outside the knot range return the nearest boundary value.
    ///
    /// # Errors
    ///
    /// Returns a computation error if the spline segment cannot be located
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        let missing = || computation_error("cubic spline", &"segment lookup out of range");

        let (Some(&first_x), Some(&last_x)) = (self.x_values.first(), self.x_values.last())
        else {
            return Err(missing());
        };
        if x <= first_x {
            return self.y_values.first().copied().ok_or_else(missing);
        }
        if x >= last_x {
            return self.y_values.last().copied().ok_or_else(missing);
        }

        let khi = self.x_values.partition_point(|&knot| knot <= x);
        let klo = khi.checked_sub(1).ok_or_else(missing)?;

        let x_lo = *self.x_values.get(klo).ok_or_else(missing)?;
        let x_hi = *self.x_values.get(khi).ok_or_else(missing)?;
        let y_lo = *self.y_values.get(klo).ok_or_else(missing)?;
        let y_hi = *self.y_values.get(khi).ok_or_else(missing)?;
        let sd_lo = *self.second_derivatives.get(klo).ok_or_else(missing)?;
        let sd_hi = *self.second_derivatives.get(khi).ok_or_else(missing)?;

        let h = x_hi - x_lo;
        let a = (x_hi - x) / h;
        let b = (x - x_lo) / h;

        Ok(a * y_lo
            + b * y_hi
            + ((a.powi(3) - a) * sd_lo + (b.powi(3) - b) * sd_hi) * h.powi(2) / 6.0)
    }
}

/// Evenly spaced positions covering `[0, knots - 1]` in knot units
///
/// Used to map a regular output grid onto integer lattice knots.
pub fn grid_positions(knots: usize, resolution: usize) -> Vec<f64> {
    let span = knots.saturating_sub(1) as f64;
    let last = resolution.saturating_sub(1).max(1) as f64;
    (0..resolution).map(|k| k as f64 * span / last).collect()
}

/// Resample one axis of a lattice array with natural cubic splines
///
/// Every one-dimensional lane along `axis` is treated as samples at knots
/// `0, 1, ..., n - 1` and evaluated at `targets`. Other axes are left untouched.
///
/// # Errors
///
/// Returns an error if the axis does not exist or has fewer than two knots
pub fn resample_axis(input: &ArrayD<f64>, axis: usize, targets: &[f64]) -> Result<ArrayD<f64>> {
    let mut shape = input.shape().to_vec();
    let extent = shape.get_mut(axis).ok_or_else(|| {
        computation_error("resampling", &format!("axis {axis} out of range"))
    })?;
    *extent = targets.len();

    let mut output = ArrayD::<f64>::zeros(IxDyn(&shape));
    for (lane_in, mut lane_out) in input
        .lanes(Axis(axis))
        .into_iter()
        .zip(output.lanes_mut(Axis(axis)))
    {
        let spline = Cubic::uniform(lane_in.to_vec())?;
        for (slot, &target) in lane_out.iter_mut().zip(targets) {
            *slot = spline.evaluate(target)?;
        }
    }

    Ok(output)
}

/// Resample every axis of a lattice array onto a regular grid
///
/// `resolution` points are placed per axis, spanning the full knot range.
///
/// # Errors
///
/// Returns `InsufficientSamples` if any axis has fewer than two knots
pub fn resample_grid(lattice: &ArrayD<f64>, resolution: usize) -> Result<ArrayD<f64>> {
    (0..lattice.ndim()).try_fold(lattice.clone(), |current, axis| {
        let targets = grid_positions(current.len_of(Axis(axis)), resolution);
        resample_axis(&current, axis, &targets)
    })
}
