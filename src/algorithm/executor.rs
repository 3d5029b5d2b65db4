use crate::{
    algorithm::observer::{GrowthObserver, GrowthSnapshot},
    io::configuration::PROGRESS_INTERVAL,
    io::error::{Result, computation_error, invalid_configuration},
    math::probability::{CumulativeWeights, ScaledWeights},
    spatial::{Cell, LatticeDiagram},
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Seeded random selector for reproducible stochastic choices
#[derive(Clone, Debug)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a seed for a derived, independent stream
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }

    /// Weighted random selection over a cumulative weight tree
    ///
    /// Consumes exactly one draw. Returns `None` for an empty tree or when no
    /// slot carries positive weight.
    pub fn weighted_choice(&mut self, weights: &CumulativeWeights) -> Option<usize> {
        let total = weights.total();
        if weights.is_empty() || total <= 0.0 {
            return None;
        }
        let target = self.rng.random::<f64>() * total;
        weights.find(target)
    }
}

/// Shared flag for cooperative cancellation
///
/// Clones observe the same flag. Once cancelled the token stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every run watching this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle of a single growth run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrowthState {
    /// Created, not yet started
    Idle,
    /// Inserting cells
    Running,
    /// Performed the requested number of insertions
    Completed,
    /// Frontier emptied before the requested number of insertions
    Stalled,
    /// Stopped by a cancellation request
    Cancelled,
}

impl GrowthState {
    /// Whether no further insertions will happen
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stalled | Self::Cancelled)
    }
}

impl fmt::Display for GrowthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stalled => "stalled",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Summary of a finished run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    /// Index of the run within its accumulation
    pub run: usize,
    /// Terminal state
    pub state: GrowthState,
    /// Successful insertions
    pub steps: usize,
    /// Final number of cells
    pub size: usize,
}

/// Weighted random growth of one diagram
///
/// Each step draws one frontier cell with probability proportional to its weight
/// and inserts it. Frontier weights live in a cumulative tree kept slot-aligned
/// with the diagram's frontier, so a step costs `O(D log n)`. The tree is scaled
/// by the largest log-weight whenever raw weights would overflow, so any finite
/// positive exponent samples the exact distribution.
#[derive(Clone, Debug)]
pub struct GrowthSimulator<const D: usize> {
    diagram: LatticeDiagram<D>,
    /// Weight per frontier slot, aligned with `diagram.frontier()`
    weights: ScaledWeights,
    selector: RandomSelector,
    alpha: f64,
    state: GrowthState,
    steps: usize,
    run: usize,
}

impl<const D: usize> GrowthSimulator<D> {
    /// Prepare a run starting from `diagram`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `alpha` is not a finite positive number
    pub fn new(diagram: LatticeDiagram<D>, alpha: f64, seed: u64) -> Result<Self> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(invalid_configuration(
                "alpha",
                &alpha,
                &"must be a finite number greater than zero",
            ));
        }

        let mut weights = ScaledWeights::with_capacity(diagram.frontier_len());
        for cell in diagram.frontier() {
            weights.push(diagram.weight(cell, alpha), diagram.log_weight(cell, alpha));
        }

        Ok(Self {
            diagram,
            weights,
            selector: RandomSelector::new(seed),
            alpha,
            state: GrowthState::Idle,
            steps: 0,
            run: 0,
        })
    }

    /// Tag the run with its index for observers and logs
    #[must_use]
    pub const fn with_run_index(mut self, run: usize) -> Self {
        self.run = run;
        self
    }

    /// Current lifecycle state
    pub const fn state(&self) -> GrowthState {
        self.state
    }

    /// Insertions performed so far
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Run index
    pub const fn run(&self) -> usize {
        self.run
    }

    /// Weight exponent
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Current diagram
    pub const fn diagram(&self) -> &LatticeDiagram<D> {
        &self.diagram
    }

    /// Give up the simulator, keeping the diagram
    pub fn into_diagram(self) -> LatticeDiagram<D> {
        self.diagram
    }

    /// Outcome as of now
    pub fn outcome(&self) -> RunOutcome {
        RunOutcome {
            run: self.run,
            state: self.state,
            steps: self.steps,
            size: self.diagram.len(),
        }
    }

    /// Draw and insert one frontier cell
    ///
    /// Returns `false` without drawing when the frontier is empty.
    fn step(&mut self) -> Result<bool> {
        let total = self.weights.scaled().total();
        if !total.is_finite() {
            return Err(computation_error(
                "growth step",
                &format!("frontier weight total is {total}"),
            ));
        }
        let Some(slot) = self.selector.weighted_choice(self.weights.scaled()) else {
            return Ok(false);
        };
        let cell: Cell<D> = self.diagram.frontier_cell(slot).copied().ok_or_else(|| {
            computation_error("growth step", &format!("frontier slot {slot} out of range"))
        })?;

        let insertion = self.diagram.add_cell(cell)?;

        // Replay the frontier's swap-remove and appends on the weight tree
        self.weights.swap_remove(insertion.vacated);
        for added in &insertion.appended {
            self.weights.push(
                self.diagram.weight(added, self.alpha),
                self.diagram.log_weight(added, self.alpha),
            );
        }

        self.steps += 1;
        Ok(true)
    }

    /// Perform up to `n_steps` insertions
    ///
    /// The observer is notified after the first insertion, every
    /// `PROGRESS_INTERVAL` insertions after that, and once at the end; it never
    /// influences the draws. Cancellation is checked before each
    /// step.
    ///
    /// # Errors
    ///
    /// Returns an error if the simulator has already run, or `InvariantViolation`
    /// if the frontier and weight tree ever disagree
    pub fn simulate(
        &mut self,
        n_steps: usize,
        observer: Option<&dyn GrowthObserver<D>>,
        cancellation: Option<&CancellationToken>,
    ) -> Result<RunOutcome> {
        if self.state != GrowthState::Idle {
            return Err(computation_error(
                "growth simulation",
                &format!("simulator is {}, expected idle", self.state),
            ));
        }
        self.state = GrowthState::Running;

        while self.steps < n_steps {
            if cancellation.is_some_and(CancellationToken::is_cancelled) {
                self.state = GrowthState::Cancelled;
                break;
            }
            if !self.step()? {
                self.state = GrowthState::Stalled;
                break;
            }
            if (self.steps - 1) % PROGRESS_INTERVAL == 0 {
                if let Some(observer) = observer {
                    observer.on_step(&GrowthSnapshot {
                        run: self.run,
                        step: self.steps,
                        diagram: &self.diagram,
                    });
                }
            }
        }

        if self.state == GrowthState::Running {
            self.state = GrowthState::Completed;
        }

        let outcome = self.outcome();
        if let Some(observer) = observer {
            observer.on_run_finished(&outcome);
        }
        Ok(outcome)
    }
}
