//! Multi-run accumulation of per-cell visitation counts
//!
//! Runs are independent: each owns a fresh diagram and its own random stream.
//! They execute on the rayon pool, fold into per-worker tallies and are reduced
//! by addition, so the merge order never matters.

use crate::algorithm::executor::{CancellationToken, GrowthSimulator, GrowthState, RandomSelector};
use crate::algorithm::observer::{GrowthObserver, NoopObserver};
use crate::analysis::counts::{AccumulatedCounts, CountsReport};
use crate::io::configuration::{GrowthParameters, SimulationConfig};
use crate::io::error::{GrowthError, Result, computation_error};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Run totals from one accumulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccumulationReport {
    /// Runs that performed every requested insertion
    pub completed_runs: usize,
    /// Runs whose frontier emptied early
    pub stalled_runs: usize,
    /// Runs stopped by cancellation; these contribute nothing
    pub cancelled_runs: usize,
    /// Summed final sizes of all recorded runs
    pub total_cells: u64,
}

impl AccumulationReport {
    /// Runs whose final diagram was counted
    pub const fn recorded_runs(&self) -> usize {
        self.completed_runs + self.stalled_runs
    }

    fn merge(self, other: Self) -> Self {
        Self {
            completed_runs: self.completed_runs + other.completed_runs,
            stalled_runs: self.stalled_runs + other.stalled_runs,
            cancelled_runs: self.cancelled_runs + other.cancelled_runs,
            total_cells: self.total_cells + other.total_cells,
        }
    }
}

/// Partial result of the runs handled by one worker
#[derive(Default)]
struct RunTally<const D: usize> {
    counts: AccumulatedCounts<D>,
    report: AccumulationReport,
}

impl<const D: usize> RunTally<D> {
    fn merge(mut self, other: Self) -> Self {
        self.counts.merge(other.counts);
        self.report = self.report.merge(other.report);
        self
    }
}

/// Aggregates many independent growth runs into visitation counts
///
/// Holds the counts of the most recent [`Accumulator::simulate`] call. Each call
/// starts from an empty tally; nothing is shared between instances.
#[derive(Debug, Default)]
pub struct Accumulator<const D: usize> {
    counts: Option<AccumulatedCounts<D>>,
    cancellation: CancellationToken,
    threads: Option<usize>,
}

impl<const D: usize> Accumulator<D> {
    /// Create an accumulator with no counts
    pub fn new() -> Self {
        Self::default()
    }

    /// Run on a dedicated pool of `threads` workers instead of the global pool
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Watch an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token that cancels in-flight and future runs of this accumulator
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Drop all counts
    pub fn reset(&mut self) {
        self.counts = None;
    }

    /// Validate a raw configuration, then simulate
    ///
    /// Invalid configurations are rejected before the previous counts are cleared
    /// and before any random stream is created.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for out-of-range options, or any error from
    /// [`Accumulator::simulate`]
    pub fn simulate_config(&mut self, config: &SimulationConfig) -> Result<AccumulationReport> {
        let parameters = config.validate::<D>()?;
        self.simulate(&parameters)
    }

    /// Replace the counts with those of `parameters.runs()` fresh runs
    ///
    /// # Errors
    ///
    /// Returns an error if a run breaks the diagram invariant or the worker pool
    /// cannot be built; no counts are kept in that case
    pub fn simulate(&mut self, parameters: &GrowthParameters<D>) -> Result<AccumulationReport> {
        self.simulate_observed(parameters, &NoopObserver)
    }

    /// Like [`Accumulator::simulate`], reporting progress to `observer`
    ///
    /// # Errors
    ///
    /// Same as [`Accumulator::simulate`]
    pub fn simulate_observed(
        &mut self,
        parameters: &GrowthParameters<D>,
        observer: &dyn GrowthObserver<D>,
    ) -> Result<AccumulationReport> {
        self.reset();

        let master_seed = parameters.seed().unwrap_or_else(rand::random);
        let mut master = RandomSelector::new(master_seed);
        let seeds: Vec<u64> = (0..parameters.runs()).map(|_| master.next_seed()).collect();
        debug!(
            master_seed,
            runs = parameters.runs(),
            n_steps = parameters.n_steps(),
            alpha = parameters.alpha(),
            weighting = %parameters.weighting(),
            "starting accumulation"
        );

        let tally = match self.threads {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| computation_error("worker pool", &e))?
                .install(|| self.run_all(parameters, seeds, observer))?,
            None => self.run_all(parameters, seeds, observer)?,
        };

        let report = tally.report;
        info!(
            recorded = report.recorded_runs(),
            stalled = report.stalled_runs,
            distinct_cells = tally.counts.len(),
            total_cells = report.total_cells,
            "accumulation finished"
        );
        if report.cancelled_runs > 0 {
            warn!(
                cancelled = report.cancelled_runs,
                "runs were cancelled and not counted"
            );
        }

        self.counts = Some(tally.counts);
        Ok(report)
    }

    fn run_all(
        &self,
        parameters: &GrowthParameters<D>,
        seeds: Vec<u64>,
        observer: &dyn GrowthObserver<D>,
    ) -> Result<RunTally<D>> {
        let cancellation = &self.cancellation;
        seeds
            .into_par_iter()
            .enumerate()
            .try_fold(
                RunTally::default,
                |mut tally: RunTally<D>, (run, seed): (usize, u64)| -> Result<RunTally<D>> {
                    let mut simulator = GrowthSimulator::new(
                        parameters.initial_diagram(),
                        parameters.alpha(),
                        seed,
                    )?
                    .with_run_index(run);
                    let outcome = simulator.simulate(
                        parameters.n_steps(),
                        Some(observer),
                        Some(cancellation),
                    )?;
                    debug!(
                        run,
                        size = outcome.size,
                        steps = outcome.steps,
                        state = %outcome.state,
                        "run finished"
                    );

                    match outcome.state {
                        GrowthState::Completed => tally.report.completed_runs += 1,
                        GrowthState::Stalled => tally.report.stalled_runs += 1,
                        GrowthState::Cancelled => {
                            tally.report.cancelled_runs += 1;
                            return Ok(tally);
                        }
                        GrowthState::Idle | GrowthState::Running => {
                            return Err(computation_error(
                                "accumulation",
                                &format!("run {run} ended in state {}", outcome.state),
                            ));
                        }
                    }
                    tally.report.total_cells += outcome.size as u64;
                    tally.counts.record_run(simulator.diagram().cells());
                    Ok(tally)
                },
            )
            .try_reduce(RunTally::default, |a, b| Ok(a.merge(b)))
    }

    /// Counts from the last accumulation
    ///
    /// # Errors
    ///
    /// Returns `NoDataAvailable` if no run has been recorded yet
    pub fn get_counts(&self) -> Result<&AccumulatedCounts<D>> {
        self.counts
            .as_ref()
            .filter(|counts| counts.runs() > 0)
            .ok_or(GrowthError::NoDataAvailable {
                operation: "get counts",
            })
    }

    /// Serializable report of the last accumulation
    ///
    /// # Errors
    ///
    /// Returns `NoDataAvailable` if no run has been recorded yet
    pub fn json_data(&self) -> Result<CountsReport> {
        self.get_counts()?.report()
    }
}
