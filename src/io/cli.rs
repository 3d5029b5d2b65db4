//! Command-line interface running an accumulation and writing every result file

use crate::algorithm::accumulator::Accumulator;
use crate::analysis::limit_shape::LimitShapeEstimator;
use crate::io::configuration::{DEFAULT_ISO_LEVEL, DEFAULT_OUTPUT_DIR, SimulationConfig};
use crate::io::error::{GrowthError, Result};
use crate::io::image::{export_field_png, export_heatmap_png};
use crate::io::persistence::{
    read_cells, write_cells, write_counts_json, write_limit_shape_csv, write_mesh_obj,
};
use crate::io::progress::ProgressReporter;
use crate::spatial::{Dimension, WeightStrategy};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "youngsim")]
#[command(
    author,
    version,
    about = "Grow random Young diagrams and estimate their limit shapes",
    allow_negative_numbers = true
)]
/// Command-line arguments for the growth simulator
///
/// Options left unset fall back to the configuration file, then to the defaults.
pub struct Cli {
    /// Diagram dimension, 2 or 3
    #[arg(short, long)]
    pub dimension: Option<usize>,

    /// Maximum insertions per run
    #[arg(short = 'n', long)]
    pub steps: Option<i64>,

    /// Exponent of the weight function
    #[arg(short, long)]
    pub alpha: Option<f64>,

    /// Number of independent runs
    #[arg(short, long)]
    pub runs: Option<i64>,

    /// Random seed for reproducible growth
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Weighting strategy; additive for 2D and multiplicative for 3D by default
    #[arg(short, long, value_enum)]
    pub weighting: Option<WeightStrategy>,

    /// Cell file holding the starting diagram
    #[arg(short, long, value_name = "FILE")]
    pub initial: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for result files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Isosurface level for solid limit shapes
    #[arg(short, long, default_value_t = DEFAULT_ISO_LEVEL)]
    pub level: f64,

    /// Grid points per axis of the limit shape
    #[arg(short = 'g', long)]
    pub resolution: Option<usize>,

    /// Fixed coordinate scaling factor instead of n^(1/D)
    #[arg(long)]
    pub scaling: Option<f64>,

    /// Worker threads for parallel runs
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Merge the configuration file, if any, with command-line overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn resolve_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(dimension) = self.dimension {
            config.dimension = dimension;
        }
        if let Some(steps) = self.steps {
            config.n_steps = steps;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(runs) = self.runs {
            config.runs = runs;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.weighting.is_some() {
            config.weighting = self.weighting;
        }
        Ok(config)
    }

    /// Limit-shape estimator configured from the command line
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a bad scaling factor or resolution
    pub fn estimator(&self) -> Result<LimitShapeEstimator> {
        let mut estimator = LimitShapeEstimator::new();
        if let Some(scaling) = self.scaling {
            estimator = estimator.with_scaling(scaling)?;
        }
        if let Some(resolution) = self.resolution {
            estimator = estimator.with_resolution(resolution)?;
        }
        Ok(estimator)
    }
}

/// Runs one accumulation end to end and writes its outputs
pub struct SimulationRunner {
    cli: Cli,
}

impl SimulationRunner {
    /// Create a runner for the given arguments
    pub const fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Validate options, simulate, and write every result file
    ///
    /// A limit shape that cannot be estimated from too few samples is logged and
    /// skipped; the other files are still written.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid options or if any output cannot be written
    pub fn run(&self) -> Result<()> {
        let config = self.cli.resolve_config()?;
        let estimator = self.cli.estimator()?;
        let base = self.base_path(&config);

        match Dimension::from_axes(config.dimension)? {
            Dimension::Two => {
                let accumulator = self.accumulate::<2>(config)?;
                let counts = accumulator.get_counts()?;
                write_common(&base, &accumulator)?;

                match estimator.estimate_2d(counts) {
                    Ok(shape) => {
                        write_limit_shape_csv(&with_suffix(&base, "_limit_shape.csv"), &shape)?;
                        export_field_png(&with_suffix(&base, "_limit_shape.png"), &shape)?;
                    }
                    Err(error @ GrowthError::InsufficientSamples { .. }) => {
                        warn!(%error, "limit shape skipped");
                    }
                    Err(error) => return Err(error),
                }
            }
            Dimension::Three => {
                let accumulator = self.accumulate::<3>(config)?;
                let counts = accumulator.get_counts()?;
                write_common(&base, &accumulator)?;

                match estimator.estimate_3d(counts, self.cli.level) {
                    Ok(surface) => {
                        write_mesh_obj(&with_suffix(&base, "_limit_shape.obj"), &surface)?;
                    }
                    Err(error @ GrowthError::InsufficientSamples { .. }) => {
                        warn!(%error, "limit shape skipped");
                    }
                    Err(error) => return Err(error),
                }
            }
        }

        info!(output_dir = %self.cli.output_dir.display(), "results written");
        Ok(())
    }

    fn base_path(&self, config: &SimulationConfig) -> PathBuf {
        self.cli.output_dir.join(format!(
            "young_diagram_{}d_alpha_{:?}",
            config.dimension, config.alpha
        ))
    }

    fn accumulate<const D: usize>(
        &self,
        mut config: SimulationConfig,
    ) -> Result<Accumulator<D>> {
        if let Some(path) = &self.cli.initial {
            let cells = read_cells::<D>(path)?;
            config.initial_cells = Some(cells.iter().map(|c| c.coordinates().to_vec()).collect());
        }
        let parameters = config.validate::<D>()?;

        let mut accumulator = Accumulator::new();
        if let Some(threads) = self.cli.threads {
            accumulator = accumulator.with_threads(threads);
        }

        if self.cli.should_show_progress() {
            let reporter = ProgressReporter::new(parameters.runs(), parameters.n_steps());
            let result = accumulator.simulate_observed(&parameters, &reporter);
            reporter.finish();
            result?;
        } else {
            accumulator.simulate(&parameters)?;
        }
        Ok(accumulator)
    }
}

/// Write the cell file, JSON report and heatmap shared by both dimensions
fn write_common<const D: usize>(base: &Path, accumulator: &Accumulator<D>) -> Result<()> {
    let counts = accumulator.get_counts()?;
    write_cells(&with_suffix(base, "_cells.txt"), counts)?;
    write_counts_json(&with_suffix(base, "_counts.json"), &accumulator.json_data()?)?;
    export_heatmap_png(&with_suffix(base, "_heatmap.png"), counts)
}

/// Append a suffix to the final path component
fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    base.with_file_name(name)
}
