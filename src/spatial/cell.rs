//! Lattice cells with non-negative integer coordinates

use crate::io::error::{Result, invalid_configuration};
use std::fmt;

/// Supported diagram dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Planar diagrams (classic Young diagrams)
    Two,
    /// Solid diagrams (plane partitions)
    Three,
}

impl Dimension {
    /// Number of coordinate axes
    pub const fn axes(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Resolve an axis count into a supported dimension
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for any axis count other than 2 or 3
    pub fn from_axes(axes: usize) -> Result<Self> {
        match axes {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(invalid_configuration(
                "dimension",
                &axes,
                &"only 2 and 3 dimensional diagrams are supported",
            )),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.axes())
    }
}

/// A lattice point with `D` non-negative integer coordinates
///
/// Ordering is lexicographic over the coordinate tuple, which is also the
/// order used when cells are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell<const D: usize>(pub [u32; D]);

impl<const D: usize> Cell<D> {
    /// Create a cell from its coordinates
    pub const fn new(coordinates: [u32; D]) -> Self {
        Self(coordinates)
    }

    /// The all-zero cell
    pub const fn origin() -> Self {
        Self([0; D])
    }

    /// Coordinate tuple
    pub const fn coordinates(&self) -> &[u32; D] {
        &self.0
    }

    /// Coordinate along a single axis
    pub fn coordinate(&self, axis: usize) -> Option<u32> {
        self.0.get(axis).copied()
    }

    /// Neighbor one unit further along `axis`
    ///
    /// Returns `None` when the axis is out of range or the coordinate would overflow.
    pub fn successor(&self, axis: usize) -> Option<Self> {
        let mut coordinates = self.0;
        let slot = coordinates.get_mut(axis)?;
        *slot = slot.checked_add(1)?;
        Some(Self(coordinates))
    }

    /// Neighbor one unit back along `axis`, if it stays non-negative
    pub fn predecessor(&self, axis: usize) -> Option<Self> {
        let mut coordinates = self.0;
        let slot = coordinates.get_mut(axis)?;
        *slot = slot.checked_sub(1)?;
        Some(Self(coordinates))
    }

    /// Sum of all coordinates, the cell's distance from the origin in steps
    pub fn coordinate_sum(&self) -> u64 {
        self.0.iter().map(|&c| u64::from(c)).sum()
    }

    /// Build a cell from a slice that must hold exactly `D` values
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when the slice length differs from `D`
    pub fn try_from_slice(values: &[u32]) -> Result<Self> {
        <[u32; D]>::try_from(values).map(Self).map_err(|_mismatch| {
            invalid_configuration(
                "initial_cells",
                &format!("{values:?}"),
                &format!("expected {D} coordinates, found {}", values.len()),
            )
        })
    }
}

impl<const D: usize> From<[u32; D]> for Cell<D> {
    fn from(coordinates: [u32; D]) -> Self {
        Self(coordinates)
    }
}

impl<const D: usize> fmt::Display for Cell<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (axis, value) in self.0.iter().enumerate() {
            if axis > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}
