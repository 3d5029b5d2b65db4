//! Monotone lattice diagrams with an incrementally maintained frontier
//!
//! A diagram is an order ideal: whenever a cell is present, every cell reached by
//! decreasing one coordinate by one (while staying non-negative) is present too.
//! The frontier holds exactly the absent cells whose insertion keeps that property.

use crate::io::error::{GrowthError, Result, invalid_configuration};
use crate::spatial::cell::Cell;
use crate::spatial::weights::WeightStrategy;
use indexmap::IndexSet;
use std::collections::BTreeSet;

/// Frontier bookkeeping produced by a successful insertion
///
/// The frontier is stored as an indexed set with swap-remove semantics: the inserted
/// cell's slot is filled by the previously last frontier cell, and newly addable
/// cells are appended in axis order. Parallel structures indexed by frontier slot
/// can replay these two edits to stay aligned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Insertion<const D: usize> {
    /// Frontier slot the inserted cell occupied before removal
    pub vacated: usize,
    /// Cells that became addable, in the order they were appended
    pub appended: Vec<Cell<D>>,
}

/// A growing order ideal of `D`-dimensional cells
#[derive(Clone, Debug)]
pub struct LatticeDiagram<const D: usize> {
    /// Present cells in insertion order
    cells: IndexSet<Cell<D>>,
    /// Number of cells the diagram started with
    initial_size: usize,
    /// Addable cells, kept in step with every insertion
    frontier: IndexSet<Cell<D>>,
    weighting: WeightStrategy,
}

impl<const D: usize> LatticeDiagram<D> {
    /// Create a diagram holding only the origin
    pub fn new(weighting: WeightStrategy) -> Self {
        let mut cells = IndexSet::new();
        cells.insert(Cell::origin());
        Self::from_validated(cells, weighting)
    }

    /// Create a diagram from a caller-supplied set of cells
    ///
    /// Cells are deduplicated and ordered lexicographically so that the resulting
    /// frontier order, and therefore any seeded growth, does not depend on the
    /// order the caller listed them in.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the set is empty or is not closed under
    /// coordinate decrease
    pub fn from_cells<I>(cells: I, weighting: WeightStrategy) -> Result<Self>
    where
        I: IntoIterator<Item = Cell<D>>,
    {
        let sorted: BTreeSet<Cell<D>> = cells.into_iter().collect();
        if sorted.is_empty() {
            return Err(invalid_configuration(
                "initial_cells",
                &"[]",
                &"an initial diagram needs at least one cell",
            ));
        }

        let cells: IndexSet<Cell<D>> = sorted.into_iter().collect();
        if let Some((below, cell)) = first_missing_predecessor(&cells) {
            return Err(invalid_configuration(
                "initial_cells",
                &cell,
                &format!("predecessor {below} is missing"),
            ));
        }

        Ok(Self::from_validated(cells, weighting))
    }

    fn from_validated(cells: IndexSet<Cell<D>>, weighting: WeightStrategy) -> Self {
        let initial_size = cells.len();
        let mut diagram = Self {
            cells,
            initial_size,
            frontier: IndexSet::new(),
            weighting,
        };
        diagram.frontier = diagram.addable_cells().into_iter().collect();
        diagram
    }

    /// Number of present cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Diagrams always hold at least one cell; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells present before any insertion
    pub const fn initial_size(&self) -> usize {
        self.initial_size
    }

    /// Weighting strategy used by [`Self::weight`]
    pub const fn weighting(&self) -> WeightStrategy {
        self.weighting
    }

    /// Whether a cell is present
    pub fn contains(&self, cell: &Cell<D>) -> bool {
        self.cells.contains(cell)
    }

    /// Present cells, initial cells first, then insertions in order
    pub fn cells(&self) -> impl Iterator<Item = &Cell<D>> {
        self.cells.iter()
    }

    /// Cells inserted since construction, in insertion order
    pub fn inserted(&self) -> impl Iterator<Item = &Cell<D>> {
        self.cells.iter().skip(self.initial_size)
    }

    /// Present cells in ascending coordinate order
    pub fn sorted_cells(&self) -> Vec<Cell<D>> {
        let mut cells: Vec<Cell<D>> = self.cells.iter().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Incrementally maintained addable cells, in frontier slot order
    pub fn frontier(&self) -> impl Iterator<Item = &Cell<D>> {
        self.frontier.iter()
    }

    /// Number of addable cells
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Addable cell stored at a frontier slot
    pub fn frontier_cell(&self, slot: usize) -> Option<&Cell<D>> {
        self.frontier.get_index(slot)
    }

    /// Whether an absent cell could be inserted without breaking the order ideal
    ///
    /// Every axis must either sit at zero or have its decremented neighbor present.
    pub fn is_addable(&self, cell: &Cell<D>) -> bool {
        !self.cells.contains(cell)
            && (0..D).all(|axis| {
                cell.predecessor(axis)
                    .is_none_or(|below| self.cells.contains(&below))
            })
    }

    /// Recompute the addable set from scratch
    ///
    /// Scans the unit-step successors of every present cell. The incremental
    /// frontier always holds the same set; this is the reference rule.
    pub fn addable_cells(&self) -> BTreeSet<Cell<D>> {
        let mut addable = BTreeSet::new();
        for cell in &self.cells {
            for axis in 0..D {
                if let Some(candidate) = cell.successor(axis) {
                    if self.is_addable(&candidate) {
                        addable.insert(candidate);
                    }
                }
            }
        }
        addable
    }

    /// Weight of a cell under this diagram's strategy
    pub fn weight(&self, cell: &Cell<D>, alpha: f64) -> f64 {
        self.weighting.weight(cell, alpha)
    }

    /// Log-weight of a cell under this diagram's strategy
    pub fn log_weight(&self, cell: &Cell<D>, alpha: f64) -> f64 {
        self.weighting.log_weight(cell, alpha)
    }

    /// Insert an addable cell
    ///
    /// Only the `D` successors of the inserted cell can become addable, so the
    /// frontier update touches at most `D` candidates.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` if the cell is not on the current frontier;
    /// the diagram is left unchanged in that case
    pub fn add_cell(&mut self, cell: Cell<D>) -> Result<Insertion<D>> {
        let Some((vacated, _)) = self.frontier.swap_remove_full(&cell) else {
            let reason = if self.cells.contains(&cell) {
                "cell is already present"
            } else {
                "a predecessor of the cell is missing"
            };
            return Err(GrowthError::InvariantViolation {
                cell: cell.to_string(),
                reason: reason.to_string(),
            });
        };

        self.cells.insert(cell);

        let mut appended = Vec::with_capacity(D);
        for axis in 0..D {
            if let Some(candidate) = cell.successor(axis) {
                if self.is_addable(&candidate) && self.frontier.insert(candidate) {
                    appended.push(candidate);
                }
            }
        }

        Ok(Insertion { vacated, appended })
    }

    /// Check the order-ideal property over the whole cell set
    pub fn is_order_ideal(&self) -> bool {
        first_missing_predecessor(&self.cells).is_none()
    }
}

/// Find a present cell whose predecessor along some axis is absent
fn first_missing_predecessor<const D: usize>(
    cells: &IndexSet<Cell<D>>,
) -> Option<(Cell<D>, Cell<D>)> {
    cells.iter().find_map(|cell| {
        (0..D)
            .filter_map(|axis| cell.predecessor(axis))
            .find(|below| !cells.contains(below))
            .map(|below| (below, *cell))
    })
}
