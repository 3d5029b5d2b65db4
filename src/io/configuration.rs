//! Simulation defaults, raw configuration and validated growth parameters

use crate::io::error::{GrowthError, Result, WithPath, invalid_configuration};
use crate::spatial::{Cell, Dimension, LatticeDiagram, WeightStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Defaults for configurable parameters
/// Default diagram dimension
pub const DEFAULT_DIMENSION: usize = 2;
/// Default maximum insertions per run
pub const DEFAULT_STEPS: i64 = 1000;
/// Default weight exponent
pub const DEFAULT_ALPHA: f64 = 1.0;
/// Default number of independent runs
pub const DEFAULT_RUNS: i64 = 10;
/// Largest accepted weight exponent
///
/// Keeps every cell weight finite in `f64`, even at `u32::MAX` coordinates.
pub const MAX_ALPHA: f64 = 5.0;

/// Steps between observer notifications
pub const PROGRESS_INTERVAL: usize = 10;

// Limit-shape estimation
/// Grid points per axis for planar limit shapes
pub const DEFAULT_GRID_RESOLUTION_2D: usize = 100;
/// Grid points per axis for solid limit shapes
pub const DEFAULT_GRID_RESOLUTION_3D: usize = 40;
/// Default isosurface level for solid limit shapes
pub const DEFAULT_ISO_LEVEL: f64 = 0.5;
/// Minimum distinct points for planar interpolation
pub const MIN_SAMPLES_2D: usize = 3;
/// Minimum distinct points for isosurface extraction
pub const MIN_SAMPLES_3D: usize = 4;

// Output settings
/// Default directory for result files
pub const DEFAULT_OUTPUT_DIR: &str = "results";
/// Pixel size of one lattice cell in heatmaps
pub const HEATMAP_CELL_PIXELS: u32 = 8;
/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "youngsim=info";

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Unvalidated simulation settings as supplied by a caller or a JSON file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of axes, 2 or 3
    pub dimension: usize,
    /// Maximum insertions per run; zero runs no insertions
    pub n_steps: i64,
    /// Exponent in the weight function
    pub alpha: f64,
    /// Number of independent realizations
    pub runs: i64,
    /// Starting diagram for every run; the origin alone when absent
    pub initial_cells: Option<Vec<Vec<u32>>>,
    /// Seed for reproducible draws; fresh entropy when absent
    pub seed: Option<u64>,
    /// Weighting override; chosen by dimension when absent
    pub weighting: Option<WeightStrategy>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            n_steps: DEFAULT_STEPS,
            alpha: DEFAULT_ALPHA,
            runs: DEFAULT_RUNS,
            initial_cells: None,
            seed: None,
            weighting: None,
        }
    }
}

impl SimulationConfig {
    /// Load settings from a JSON file; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_path(path, "read configuration")?;
        serde_json::from_str(&text).map_err(|source| GrowthError::Serialization {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every option and produce parameters for `D`-dimensional growth
    ///
    /// Nothing random is created here, so failures never consume draws.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for the first out-of-range option
    pub fn validate<const D: usize>(&self) -> Result<GrowthParameters<D>> {
        let dimension = Dimension::from_axes(self.dimension)?;
        if dimension.axes() != D {
            return Err(invalid_configuration(
                "dimension",
                &self.dimension,
                &format!("does not match {D}-dimensional cells"),
            ));
        }

        let n_steps = usize::try_from(self.n_steps).map_err(|_negative| {
            invalid_configuration("n_steps", &self.n_steps, &"must not be negative")
        })?;

        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(invalid_configuration(
                "alpha",
                &self.alpha,
                &"must be a finite number greater than zero",
            ));
        }
        if self.alpha > MAX_ALPHA {
            return Err(invalid_configuration(
                "alpha",
                &self.alpha,
                &format!("must be at most {MAX_ALPHA}"),
            ));
        }

        let runs = usize::try_from(self.runs)
            .ok()
            .filter(|&runs| runs > 0)
            .ok_or_else(|| invalid_configuration("runs", &self.runs, &"must be at least 1"))?;

        let weighting = self
            .weighting
            .unwrap_or_else(|| WeightStrategy::for_dimension(dimension));

        let initial = match &self.initial_cells {
            None => LatticeDiagram::new(weighting),
            Some(rows) => {
                let cells = rows
                    .iter()
                    .map(|row| Cell::<D>::try_from_slice(row))
                    .collect::<Result<Vec<_>>>()?;
                LatticeDiagram::from_cells(cells, weighting)?
            }
        };

        Ok(GrowthParameters {
            dimension,
            n_steps,
            alpha: self.alpha,
            runs,
            seed: self.seed,
            initial,
        })
    }
}

/// Validated parameters for `D`-dimensional growth
///
/// Only obtainable through [`SimulationConfig::validate`] or [`GrowthParameters::new`],
/// so every instance satisfies the configuration constraints.
#[derive(Clone, Debug)]
pub struct GrowthParameters<const D: usize> {
    dimension: Dimension,
    n_steps: usize,
    alpha: f64,
    runs: usize,
    seed: Option<u64>,
    /// Prototype diagram cloned at the start of every run
    initial: LatticeDiagram<D>,
}

impl<const D: usize> GrowthParameters<D> {
    /// Validate the core options with default weighting, origin start and no seed
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for out-of-range values or unsupported `D`
    pub fn new(n_steps: i64, alpha: f64, runs: i64) -> Result<Self> {
        SimulationConfig {
            dimension: D,
            n_steps,
            alpha,
            runs,
            ..SimulationConfig::default()
        }
        .validate()
    }

    /// Fix the seed used to derive every run's random stream
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the weighting strategy
    #[must_use]
    pub fn with_weighting(mut self, weighting: WeightStrategy) -> Self {
        if weighting != self.initial.weighting() {
            let cells = self.initial.sorted_cells();
            self.initial = LatticeDiagram::from_cells(cells, weighting)
                .unwrap_or_else(|_same_cells| LatticeDiagram::new(weighting));
        }
        self
    }

    /// Start every run from the given cells
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the cells do not form a non-empty order ideal
    pub fn with_initial_cells<I>(mut self, cells: I) -> Result<Self>
    where
        I: IntoIterator<Item = Cell<D>>,
    {
        self.initial = LatticeDiagram::from_cells(cells, self.initial.weighting())?;
        Ok(self)
    }

    /// Diagram dimension
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Maximum insertions per run
    pub const fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Weight exponent
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of independent runs
    pub const fn runs(&self) -> usize {
        self.runs
    }

    /// Configured seed, if any
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Weighting strategy applied to every run
    pub const fn weighting(&self) -> WeightStrategy {
        self.initial.weighting()
    }

    /// Fresh copy of the starting diagram
    pub fn initial_diagram(&self) -> LatticeDiagram<D> {
        self.initial.clone()
    }
}
