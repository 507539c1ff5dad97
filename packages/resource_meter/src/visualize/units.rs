use std::fmt;

const BYTES_PER_KB: f64 = 1024.0;

/// The display unit of a plotted metric.
///
/// Only the visualizer knows about units. Records carry bare numbers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum Unit {
    /// Byte counts, shown in kilobytes.
    Kilobytes,

    /// Durations.
    Seconds,

    /// Memory figures already expressed in megabytes.
    Megabytes,

    /// Plain counts.
    Counts,

    /// A metric the unit table does not know; values pass through unchanged.
    Unspecified,
}

impl Unit {
    /// Looks up the unit of a metric by its name.
    #[must_use]
    pub fn of_metric(metric: &str) -> Self {
        match metric {
            "write_bytes" | "read_bytes" | "bytes_sent" | "bytes_recv" => Self::Kilobytes,
            "execution_time" | "cpu_time" | "wall_time" => Self::Seconds,
            "peak_mb" | "current_mb" => Self::Megabytes,
            "call_count" | "read_count" | "write_count" | "packets_sent" | "packets_recv" => {
                Self::Counts
            }
            _ => Self::Unspecified,
        }
    }

    /// Converts a raw record value into this unit.
    #[must_use]
    pub fn convert(self, raw: f64) -> f64 {
        match self {
            Self::Kilobytes => raw / BYTES_PER_KB,
            Self::Seconds | Self::Megabytes | Self::Counts | Self::Unspecified => raw,
        }
    }

    /// The unit as shown in panel titles; empty for [`Unit::Unspecified`].
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kilobytes => "KB",
            Self::Seconds => "seconds",
            Self::Megabytes => "MB",
            Self::Counts => "counts",
            Self::Unspecified => "",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
