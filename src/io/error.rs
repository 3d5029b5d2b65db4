//! Error types for growth simulation, accumulation and limit-shape estimation

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all simulation operations
///
/// Stalled and cancelled runs are not represented here: they are normal
/// terminal outcomes reported through [`crate::algorithm::executor::RunOutcome`].
#[derive(Debug)]
pub enum GrowthError {
    /// A configuration value is out of range or malformed
    ///
    /// Always detected before any run starts.
    InvalidConfiguration {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Attempted insertion would break the order-ideal property
    InvariantViolation {
        /// Offending cell, formatted as a coordinate tuple
        cell: String,
        /// Description of the broken contract
        reason: String,
    },

    /// Counts or limit shapes were requested before any run completed
    NoDataAvailable {
        /// Operation that needed accumulated data
        operation: &'static str,
    },

    /// Too few distinct accumulated points for interpolation or mesh extraction
    InsufficientSamples {
        /// Operation that needed more samples
        operation: &'static str,
        /// Minimum number of distinct points required
        required: usize,
        /// Number of distinct usable points available
        available: usize,
    },

    /// Numerical computation produced invalid result
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Failed to save a rendered image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// JSON encoding or decoding failed
    Serialization {
        /// File being read or written
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// A persisted cell file contains a malformed line
    Parse {
        /// File being read
        path: PathBuf,
        /// One-based line number
        line: usize,
        /// Description of what is wrong with the line
        reason: String,
    },
}

impl fmt::Display for GrowthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration {
                parameter,
                value,
                reason,
            } => {
                write!(
                    f,
                    "Invalid configuration '{parameter}' = '{value}': {reason}"
                )
            }
            Self::InvariantViolation { cell, reason } => {
                write!(f, "Order-ideal invariant violated by cell {cell}: {reason}")
            }
            Self::NoDataAvailable { operation } => {
                write!(
                    f,
                    "No data available for {operation}: run a simulation first"
                )
            }
            Self::InsufficientSamples {
                operation,
                required,
                available,
            } => {
                write!(
                    f,
                    "Insufficient samples for {operation}: need at least {required} distinct points, have {available}"
                )
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::Serialization { path, source } => {
                write!(f, "JSON error for '{}': {source}", path.display())
            }
            Self::Parse { path, line, reason } => {
                write!(f, "Parse error in '{}' line {line}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for GrowthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileSystem { source, .. } => Some(source),
            Self::ImageExport { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for simulation results
pub type Result<T> = std::result::Result<T, GrowthError>;

/// Attaches a path and operation to raw I/O failures
pub trait WithPath<T> {
    /// Convert an I/O error into [`GrowthError::FileSystem`]
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path and operation applied
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T>;
}

impl<T> WithPath<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| GrowthError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

impl From<std::io::Error> for GrowthError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid configuration error
pub fn invalid_configuration(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> GrowthError {
    GrowthError::InvalidConfiguration {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> GrowthError {
    GrowthError::Computation {
        operation,
        reason: reason.to_string(),
    }
}
