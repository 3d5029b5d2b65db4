//! Per-cell visitation counts accumulated over many runs

use crate::io::error::{GrowthError, Result};
use crate::spatial::{Cell, Dimension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many runs ended with each cell present
///
/// A cell contributes one per run regardless of when it was inserted, so every
/// count lies in `1..=runs`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccumulatedCounts<const D: usize> {
    counts: BTreeMap<Cell<D>, u64>,
    runs: u64,
}

impl<const D: usize> AccumulatedCounts<D> {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tally from explicit counts, e.g. when reading results back
    ///
    /// Zero counts are dropped; repeated cells add up.
    pub fn from_entries<I>(entries: I, runs: u64) -> Self
    where
        I: IntoIterator<Item = (Cell<D>, u64)>,
    {
        let mut counts = BTreeMap::new();
        for (cell, count) in entries.into_iter().filter(|&(_, count)| count > 0) {
            *counts.entry(cell).or_insert(0) += count;
        }
        Self { counts, runs }
    }

    /// Add one finished run's final diagram
    pub fn record_run<'a, I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = &'a Cell<D>>,
    {
        for cell in cells {
            *self.counts.entry(*cell).or_insert(0) += 1;
        }
        self.runs += 1;
    }

    /// Add another tally to this one
    pub fn merge(&mut self, other: Self) {
        for (cell, count) in other.counts {
            *self.counts.entry(cell).or_insert(0) += count;
        }
        self.runs += other.runs;
    }

    /// Whether no cell has been counted
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct cells
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Number of runs recorded
    pub const fn runs(&self) -> u64 {
        self.runs
    }

    /// Count for one cell, zero if never seen
    pub fn count(&self, cell: &Cell<D>) -> u64 {
        self.counts.get(cell).copied().unwrap_or(0)
    }

    /// Cells and counts in ascending coordinate order
    pub fn iter(&self) -> impl Iterator<Item = (&Cell<D>, u64)> {
        self.counts.iter().map(|(cell, &count)| (cell, count))
    }

    /// Sum of all counts, equal to the summed final sizes of the recorded runs
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Largest count
    pub fn max_count(&self) -> Option<u64> {
        self.counts.values().copied().max()
    }

    /// Largest coordinate seen along each axis
    pub fn axis_extents(&self) -> Option<[u32; D]> {
        let mut cells = self.counts.keys();
        let first = *cells.next()?.coordinates();
        Some(cells.fold(first, |mut extents, cell| {
            for (extent, &value) in extents.iter_mut().zip(cell.coordinates()) {
                *extent = (*extent).max(value);
            }
            extents
        }))
    }

    /// Counts divided by the largest count, each in `(0, 1]`
    pub fn normalized(&self) -> BTreeMap<Cell<D>, f64> {
        let max = self.max_count().unwrap_or(1).max(1) as f64;
        self.counts
            .iter()
            .map(|(&cell, &count)| (cell, count as f64 / max))
            .collect()
    }

    /// Serializable summary with raw and normalized counts and axis sizes
    ///
    /// # Errors
    ///
    /// Returns `NoDataAvailable` when nothing has been counted, or
    /// `InvalidConfiguration` for cells that are neither 2D nor 3D
    pub fn report(&self) -> Result<CountsReport> {
        let dimension = Dimension::from_axes(D)?;
        let (Some(max_count), Some(extents)) = (self.max_count(), self.axis_extents()) else {
            return Err(GrowthError::NoDataAvailable {
                operation: "counts report",
            });
        };

        let cells = self
            .counts
            .iter()
            .map(|(cell, &count)| CellRecord {
                x: cell.coordinate(0).unwrap_or(0),
                y: cell.coordinate(1).unwrap_or(0),
                z: cell.coordinate(2),
                count,
                normalized_count: count as f64 / max_count as f64,
            })
            .collect();

        let size = |axis: usize| extents.get(axis).map_or(0, |&max| max + 1);
        let dimensions = AxisExtents {
            max_x: size(0),
            max_y: size(1),
            max_z: (dimension == Dimension::Three).then(|| size(2)),
        };

        Ok(CountsReport {
            cells,
            max_count,
            runs: self.runs,
            dimensions,
        })
    }
}

/// One cell in a [`CountsReport`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    /// First coordinate
    pub x: u32,
    /// Second coordinate
    pub y: u32,
    /// Third coordinate, present for solid diagrams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<u32>,
    /// Runs that ended with this cell present
    pub count: u64,
    /// Count divided by the largest count
    pub normalized_count: f64,
}

/// Number of lattice positions spanned along each axis (largest coordinate + 1)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisExtents {
    /// Size along the first axis
    pub max_x: u32,
    /// Size along the second axis
    pub max_y: u32,
    /// Size along the third axis, present for solid diagrams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_z: Option<u32>,
}

/// JSON-ready view of accumulated counts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountsReport {
    /// Every counted cell in ascending coordinate order
    pub cells: Vec<CellRecord>,
    /// Largest count
    pub max_count: u64,
    /// Runs recorded
    pub runs: u64,
    /// Axis sizes
    pub dimensions: AxisExtents,
}
