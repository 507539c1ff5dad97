use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Severity of a log message emitted by a collector.
///
/// Levels are ordered; a logger configured with a minimum level drops messages below it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,

    /// Regular progress output. This is the default level of collector summaries.
    #[default]
    Info,

    /// Something unexpected that does not prevent measurement.
    Warning,

    /// A failed operation.
    Error,

    /// A failure the process is unlikely to recover from.
    Critical,
}

impl LogLevel {
    /// All levels, from least to most severe.
    pub const ALL: [Self; 5] = [
        Self::Debug,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// The conventional numeric representation: 10, 20, 30, 40 or 50.
    #[must_use]
    pub const fn as_number(self) -> u8 {
        match self {
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// Resolves a numeric representation back to a level, if it is one of the five known values.
    #[must_use]
    pub const fn from_number(value: u8) -> Option<Self> {
        match value {
            10 => Some(Self::Debug),
            20 => Some(Self::Info),
            30 => Some(Self::Warning),
            40 => Some(Self::Error),
            50 => Some(Self::Critical),
            _ => None,
        }
    }

    /// The upper-case symbolic name, e.g. `WARNING`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// The closest `tracing` level. `tracing` has no level above error, so critical maps to it.
    #[must_use]
    pub const fn to_tracing(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error | Self::Critical => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    /// Parses a symbolic level name, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidLogLevel {
                value: s.to_string(),
            })
    }
}
