use crate::pal::{NetworkCounters, Platform, PlatformFacade};
use crate::{MetricSelection, Metrics, Probe, Result};

const METRICS: &[&str] = &["bytes_sent", "bytes_recv", "packets_sent", "packets_recv"];

/// Network counters when a measurement began.
#[derive(Clone, Copy, Debug)]
pub struct NetworkMark {
    counters: NetworkCounters,
}

/// Measures system-wide network traffic, summed over all interfaces.
///
/// Every metric is a delta over the measured region and includes traffic of other processes.
#[derive(Clone, Debug)]
pub struct NetworkProbe {
    selection: MetricSelection,
    platform: PlatformFacade,
}

impl NetworkProbe {
    /// Creates a probe with every metric enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::real())
    }

    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        Self {
            selection: MetricSelection::all(METRICS),
            platform,
        }
    }

    /// Enables or disables metrics by name.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is not one of `bytes_sent`, `bytes_recv`, `packets_sent` and
    /// `packets_recv`, or if every metric would end up disabled.
    pub fn with_metrics<'a>(
        mut self,
        updates: impl IntoIterator<Item = (&'a str, bool)>,
    ) -> Result<Self> {
        self.selection.update(updates)?;
        Ok(self)
    }

    /// The enabled metrics.
    #[must_use]
    pub fn selection(&self) -> &MetricSelection {
        &self.selection
    }
}

impl Default for NetworkProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for NetworkProbe {
    const KIND: &'static str = "network";
    const BLOCK_LABEL: &'static str = "Network block";
    const STATEMENT_LABEL: &'static str = "Network line(s)";

    type Start = NetworkMark;

    fn begin(&self) -> Result<NetworkMark> {
        Ok(NetworkMark {
            counters: self.platform.network_io()?,
        })
    }

    fn finish(&self, start: NetworkMark) -> Result<Metrics> {
        let before = start.counters;
        let after = self.platform.network_io()?;

        Ok(self
            .selection
            .enabled()
            .filter_map(|metric| {
                let delta = match metric {
                    "bytes_sent" => after.bytes_sent.saturating_sub(before.bytes_sent),
                    "bytes_recv" => after.bytes_recv.saturating_sub(before.bytes_recv),
                    "packets_sent" => after.packets_sent.saturating_sub(before.packets_sent),
                    "packets_recv" => after.packets_recv.saturating_sub(before.packets_recv),
                    _ => return None,
                };

                Some((metric, delta))
            })
            .collect())
    }

    fn describe(&self, label: &str, metrics: &Metrics) -> Vec<String> {
        metrics
            .iter()
            .filter_map(|(name, value)| {
                let what = match name {
                    "bytes_sent" => "Bytes sent",
                    "bytes_recv" => "Bytes received",
                    "packets_sent" => "Packets sent",
                    "packets_recv" => "Packets received",
                    _ => return None,
                };

                Some(format!("{label} - {what}: {value}"))
            })
            .collect()
    }
}
