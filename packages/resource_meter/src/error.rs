use std::io;
use std::path::PathBuf;

use itertools::Itertools;
use thiserror::Error;

use crate::logging::Capability;

/// Errors that can occur when collecting, exporting or visualizing resource usage records.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The logger handed to a [`LoggingFacade`](crate::LoggingFacade) does not declare every
    /// capability the facade requires.
    #[error(
        "logger must support info, error, debug, warning and log; missing: {}",
        .missing.iter().join(", ")
    )]
    MissingCapabilities {
        /// Every required capability the logger does not declare, in probe order.
        missing: Vec<Capability>,
    },

    /// A symbolic log level name did not match any known level.
    #[error("invalid log level: '{value}'")]
    InvalidLogLevel {
        /// The name that failed to resolve.
        value: String,
    },

    /// An export format other than `json` or `csv` was requested.
    #[error("format must be either 'json' or 'csv', got '{format}'")]
    UnsupportedFormat {
        /// The format that was requested.
        format: String,
    },

    /// A time source name did not match any known source.
    #[error("unknown time source '{value}', supported: execution_time, cpu_time, wall_time")]
    UnknownTimeSource {
        /// The name that failed to resolve.
        value: String,
    },

    /// A metric selection update named a metric the probe does not produce.
    #[error("unknown metric '{metric}', supported: {}", .supported.iter().join(", "))]
    UnknownMetric {
        /// The metric that was named.
        metric: String,

        /// The metrics the probe does produce.
        supported: Vec<&'static str>,
    },

    /// A metric selection would disable every metric of a probe, so its records would be empty.
    #[error("at least one metric must stay enabled")]
    EmptySelection,

    /// A configuration document could not be parsed or contained invalid values.
    #[error("invalid configuration: {problem}")]
    InvalidConfig {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// CSV export was requested for an empty record list, so no header can be derived.
    #[error("no records available to export")]
    NoRecords,

    /// The operating system or runtime counter source a probe depends on is unavailable.
    #[error("measurement source '{source_name}' is unavailable: {problem}")]
    MeasurementSource {
        /// Name of the counter source, e.g. `/proc/diskstats`.
        source_name: String,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// A file system operation failed.
    #[error("I/O error at '{}': {source}", .path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Records could not be serialized to or deserialized from JSON.
    #[error("records are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Records could not be written as CSV.
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// The chart could not be drawn or rasterized.
    #[error("chart rendering failed: {problem}")]
    Render {
        /// A human-readable description of the problem.
        problem: String,
    },
}

/// Broad classification of an [`Error`], for callers that react to the category of a failure
/// rather than to the specific variant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Something supplied by the caller at construction or call time is unusable.
    Configuration,

    /// An argument value could not be interpreted.
    InvalidArgument,

    /// The operation's precondition does not hold.
    Precondition,

    /// A counter source could not be read.
    MeasurementSource,

    /// The file system refused an operation.
    Io,

    /// Serialization or rendering of output failed.
    Output,
}

impl Error {
    /// Returns the broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCapabilities { .. }
            | Self::UnsupportedFormat { .. }
            | Self::UnknownTimeSource { .. }
            | Self::UnknownMetric { .. }
            | Self::EmptySelection
            | Self::InvalidConfig { .. } => ErrorKind::Configuration,
            Self::InvalidLogLevel { .. } => ErrorKind::InvalidArgument,
            Self::NoRecords => ErrorKind::Precondition,
            Self::MeasurementSource { .. } => ErrorKind::MeasurementSource,
            Self::Io { .. } => ErrorKind::Io,
            Self::Json(_) | Self::Csv(_) | Self::Render { .. } => ErrorKind::Output,
        }
    }

    pub(crate) fn source_unavailable(
        source_name: impl Into<String>,
        problem: impl ToString,
    ) -> Self {
        Self::MeasurementSource {
            source_name: source_name.into(),
            problem: problem.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn render(problem: impl ToString) -> Self {
        Self::Render {
            problem: problem.to_string(),
        }
    }
}

/// A specialized `Result` type for resource metering operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
