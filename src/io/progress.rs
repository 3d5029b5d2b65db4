//! Console progress bars for accumulation runs

use crate::algorithm::executor::RunOutcome;
use crate::algorithm::observer::{GrowthObserver, GrowthSnapshot};
use crate::io::configuration::{PROGRESS_BAR_WIDTH, PROGRESS_INTERVAL};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static RUNS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Runs:  [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

static STEPS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Steps: [{{bar:{PROGRESS_BAR_WIDTH}.green/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress display for one accumulation
///
/// Shows finished runs and insertions summed over all runs. Safe to share
/// between the worker threads executing runs.
pub struct ProgressReporter {
    multi_progress: MultiProgress,
    runs_bar: ProgressBar,
    steps_bar: ProgressBar,
    n_steps: usize,
}

impl ProgressReporter {
    /// Create bars sized for `runs` runs of up to `n_steps` insertions each
    pub fn new(runs: usize, n_steps: usize) -> Self {
        let multi_progress = MultiProgress::new();
        let runs_bar = multi_progress.add(ProgressBar::new(runs as u64));
        runs_bar.set_style(RUNS_STYLE.clone());
        let total_steps = runs.saturating_mul(n_steps) as u64;
        let steps_bar = multi_progress.add(ProgressBar::new(total_steps));
        steps_bar.set_style(STEPS_STYLE.clone());

        Self {
            multi_progress,
            runs_bar,
            steps_bar,
            n_steps,
        }
    }

    /// Complete and clear all bars
    pub fn finish(&self) {
        self.runs_bar.finish();
        self.steps_bar.finish();
        let _ = self.multi_progress.clear();
    }
}

impl<const D: usize> GrowthObserver<D> for ProgressReporter {
    fn on_step(&self, snapshot: &GrowthSnapshot<'_, D>) {
        // The first snapshot follows one insertion, later ones a full interval
        self.steps_bar.inc(snapshot.step.min(PROGRESS_INTERVAL) as u64);
        self.steps_bar
            .set_message(format!("run {} size {}", snapshot.run, snapshot.size()));
    }

    fn on_run_finished(&self, outcome: &RunOutcome) {
        // Account for steps not yet reported, including those a stalled run skipped
        let reported = outcome
            .steps
            .checked_sub(1)
            .map_or(0, |last| last - last % PROGRESS_INTERVAL + 1);
        self.steps_bar
            .inc(self.n_steps.saturating_sub(reported) as u64);
        self.runs_bar.inc(1);
    }
}
