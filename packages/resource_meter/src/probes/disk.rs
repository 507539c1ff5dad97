use std::path::{Path, PathBuf};

use crate::pal::{DiskIoCounters, DiskSpace, Platform, PlatformFacade};
use crate::probes::bytes_to_gb;
use crate::{MetricSelection, MetricValue, Metrics, Probe, Result};

const METRICS: &[&str] = &[
    "read_bytes",
    "write_bytes",
    "read_count",
    "write_count",
    "disk_usage",
];

const IO_METRICS: &[&str] = &["read_bytes", "write_bytes", "read_count", "write_count"];

/// Disk counters when a measurement began. Only the counters a selected metric needs are read.
#[derive(Clone, Copy, Debug)]
pub struct DiskMark {
    io: Option<DiskIoCounters>,
    space: Option<DiskSpace>,
}

/// Measures system-wide block device I/O and the capacity of one file system.
///
/// I/O metrics are deltas over the measured region, summed over whole disks. They are
/// system-wide, so concurrent activity by other processes is included. `disk_usage` is a nested
/// snapshot `{before, after}` of `{total, used, free}` in gigabytes for the file system holding
/// the probe's path.
///
/// # Examples
///
/// ```
/// use resource_meter::DiskProbe;
///
/// let probe = DiskProbe::new()
///     .with_path("/tmp")
///     .with_metrics([("read_count", false), ("write_count", false)])
///     .unwrap();
///
/// assert_eq!(probe.path().to_str(), Some("/tmp"));
/// assert!(!probe.selection().is_enabled("read_count"));
/// ```
#[derive(Clone, Debug)]
pub struct DiskProbe {
    path: PathBuf,
    selection: MetricSelection,
    platform: PlatformFacade,
}

impl DiskProbe {
    /// Creates a probe for the root file system with every metric enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::real())
    }

    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            path: PathBuf::from("/"),
            selection: MetricSelection::all(METRICS),
            platform,
        }
    }

    /// Sets the path whose file system `disk_usage` reports on.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Enables or disables metrics by name.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is not one of `read_bytes`, `write_bytes`, `read_count`,
    /// `write_count` and `disk_usage`, or if every metric would end up disabled.
    pub fn with_metrics<'a>(
        mut self,
        updates: impl IntoIterator<Item = (&'a str, bool)>,
    ) -> Result<Self> {
        self.selection.update(updates)?;
        Ok(self)
    }

    /// The path whose file system `disk_usage` reports on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The enabled metrics.
    #[must_use]
    pub fn selection(&self) -> &MetricSelection {
        &self.selection
    }

    fn wants_io(&self) -> bool {
        IO_METRICS
            .iter()
            .any(|metric| self.selection.is_enabled(metric))
    }

    fn wants_space(&self) -> bool {
        self.selection.is_enabled("disk_usage")
    }

    fn read(&self) -> Result<DiskMark> {
        let io = if self.wants_io() {
            Some(self.platform.disk_io()?)
        } else {
            None
        };

        let space = if self.wants_space() {
            Some(self.platform.disk_space(&self.path)?)
        } else {
            None
        };

        Ok(DiskMark { io, space })
    }
}

impl Default for DiskProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn space_in_gb(space: DiskSpace) -> Metrics {
    Metrics::new()
        .with("total", bytes_to_gb(space.total))
        .with("used", bytes_to_gb(space.used))
        .with("free", bytes_to_gb(space.free))
}

impl Probe for DiskProbe {
    const KIND: &'static str = "disk";
    const BLOCK_LABEL: &'static str = "Disk block";
    const STATEMENT_LABEL: &'static str = "Disk line(s)";

    type Start = DiskMark;

    fn begin(&self) -> Result<DiskMark> {
        self.read()
    }

    fn finish(&self, start: DiskMark) -> Result<Metrics> {
        let end = self.read()?;
        let mut metrics = Metrics::new();

        for metric in self.selection.enabled() {
            if metric == "disk_usage" {
                if let (Some(before), Some(after)) = (start.space, end.space) {
                    metrics.insert(
                        metric,
                        Metrics::new()
                            .with("before", space_in_gb(before))
                            .with("after", space_in_gb(after)),
                    );
                }

                continue;
            }

            let (Some(before), Some(after)) = (start.io, end.io) else {
                continue;
            };

            let delta = match metric {
                "read_bytes" => after.read_bytes.saturating_sub(before.read_bytes),
                "write_bytes" => after.write_bytes.saturating_sub(before.write_bytes),
                "read_count" => after.read_count.saturating_sub(before.read_count),
                "write_count" => after.write_count.saturating_sub(before.write_count),
                _ => continue,
            };

            metrics.insert(metric, delta);
        }

        Ok(metrics)
    }

    fn describe(&self, label: &str, metrics: &Metrics) -> Vec<String> {
        let mut lines = Vec::new();

        for (name, value) in metrics.iter() {
            match name {
                "read_bytes" => lines.push(format!("{label} - Bytes read: {value}")),
                "write_bytes" => lines.push(format!("{label} - Bytes written: {value}")),
                "read_count" => lines.push(format!("{label} - Read operations: {value}")),
                "write_count" => lines.push(format!("{label} - Write operations: {value}")),
                "disk_usage" => {
                    let Some(usage) = value.as_nested() else {
                        continue;
                    };

                    for moment in ["before", "after"] {
                        let Some(snapshot) = usage.get(moment).and_then(MetricValue::as_nested)
                        else {
                            continue;
                        };

                        lines.push(format!(
                            "{label} - Disk space {moment}: Total={:.2}GB, Used={:.2}GB, Free={:.2}GB",
                            snapshot.get_f64("total").unwrap_or_default(),
                            snapshot.get_f64("used").unwrap_or_default(),
                            snapshot.get_f64("free").unwrap_or_default(),
                        ));
                    }
                }
                _ => {}
            }
        }

        lines
    }
}
