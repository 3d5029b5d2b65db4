//! Read-only progress notifications from running simulations

use crate::algorithm::executor::RunOutcome;
use crate::spatial::LatticeDiagram;

/// View of a diagram mid-run, handed to observers
#[derive(Clone, Copy, Debug)]
pub struct GrowthSnapshot<'a, const D: usize> {
    /// Index of the run within its accumulation
    pub run: usize,
    /// Insertions performed so far
    pub step: usize,
    /// Current diagram, borrowed immutably
    pub diagram: &'a LatticeDiagram<D>,
}

impl<const D: usize> GrowthSnapshot<'_, D> {
    /// Current number of cells
    pub fn size(&self) -> usize {
        self.diagram.len()
    }
}

/// Consumer of simulation progress
///
/// Observers only ever receive shared references, so they cannot alter the
/// simulation. Runs may execute on several threads at once, hence `Sync`.
pub trait GrowthObserver<const D: usize>: Sync {
    /// Called after the first insertion and every `PROGRESS_INTERVAL` insertions after that
    fn on_step(&self, snapshot: &GrowthSnapshot<'_, D>);

    /// Called once when a run reaches a terminal state
    fn on_run_finished(&self, _outcome: &RunOutcome) {}
}

/// Observer that ignores every notification
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl<const D: usize> GrowthObserver<D> for NoopObserver {
    fn on_step(&self, _snapshot: &GrowthSnapshot<'_, D>) {}
}
