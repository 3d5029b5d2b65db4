//! Weighting strategies biasing which frontier cell is inserted next

use crate::spatial::cell::{Cell, Dimension};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a frontier cell's weight is derived from its coordinates
///
/// The two strategies are independent: neither is a generalization of the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WeightStrategy {
    /// `S(c) = (sum of (c_i + 1))^alpha`, the default for planar diagrams
    Additive,
    /// `S(c) = (product of (c_i + 1))^alpha`, the default for solid diagrams
    Multiplicative,
}

impl WeightStrategy {
    /// Strategy used when none is chosen explicitly
    pub const fn for_dimension(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Two => Self::Additive,
            Dimension::Three => Self::Multiplicative,
        }
    }

    /// Weight of a cell for a positive exponent
    ///
    /// Every factor is at least one, so the result is at least one and
    /// non-decreasing in each coordinate for any `alpha > 0`. Finite for every
    /// cell when `alpha <= MAX_ALPHA`; larger exponents can overflow to infinity,
    /// use [`Self::log_weight`] for those.
    pub fn weight<const D: usize>(self, cell: &Cell<D>, alpha: f64) -> f64 {
        self.base(cell).powf(alpha)
    }

    /// Natural logarithm of [`Self::weight`], finite for any finite `alpha`
    pub fn log_weight<const D: usize>(self, cell: &Cell<D>, alpha: f64) -> f64 {
        alpha * self.base(cell).ln()
    }

    /// Sum or product of the shifted coordinates; at most `(2^32)^D`
    fn base<const D: usize>(self, cell: &Cell<D>) -> f64 {
        let shifted = cell.coordinates().iter().map(|&c| f64::from(c) + 1.0);
        match self {
            Self::Additive => shifted.sum::<f64>(),
            Self::Multiplicative => shifted.product::<f64>(),
        }
    }

    /// Lowercase strategy name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::Multiplicative => "multiplicative",
        }
    }
}

impl fmt::Display for WeightStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
