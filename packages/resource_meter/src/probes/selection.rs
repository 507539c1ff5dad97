use crate::{Error, Result};

/// Which of a probe's metrics end up in its records.
///
/// Every metric starts enabled. Metrics keep the probe's canonical order regardless of the order
/// updates arrive in.
///
/// # Examples
///
/// ```
/// use resource_meter::NetworkProbe;
///
/// let probe = NetworkProbe::new()
///     .with_metrics([("packets_sent", false), ("packets_recv", false)])
///     .unwrap();
///
/// assert_eq!(
///     probe.selection().enabled().collect::<Vec<_>>(),
///     ["bytes_sent", "bytes_recv"]
/// );
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetricSelection {
    entries: Vec<(&'static str, bool)>,
}

impl MetricSelection {
    pub(crate) fn all(names: &[&'static str]) -> Self {
        Self {
            entries: names.iter().map(|name| (*name, true)).collect(),
        }
    }

    /// Applies a batch of enable/disable updates.
    ///
    /// The batch is applied atomically: if it fails, the selection is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMetric`] if an update names a metric this selection does not
    /// contain, and [`Error::EmptySelection`] if the result would have no enabled metric.
    pub fn update<'a>(&mut self, updates: impl IntoIterator<Item = (&'a str, bool)>) -> Result<()> {
        let mut entries = self.entries.clone();

        for (metric, enabled) in updates {
            let entry = entries
                .iter_mut()
                .find(|(name, _)| *name == metric)
                .ok_or_else(|| Error::UnknownMetric {
                    metric: metric.to_string(),
                    supported: self.supported(),
                })?;

            entry.1 = enabled;
        }

        if !entries.iter().any(|(_, enabled)| *enabled) {
            return Err(Error::EmptySelection);
        }

        self.entries = entries;
        Ok(())
    }

    /// Whether `metric` is enabled. Unknown metrics are never enabled.
    #[must_use]
    pub fn is_enabled(&self, metric: &str) -> bool {
        self.entries
            .iter()
            .any(|(name, enabled)| *enabled && *name == metric)
    }

    /// The enabled metrics, in canonical order.
    pub fn enabled(&self) -> impl Iterator<Item = &'static str> {
        self.entries
            .iter()
            .filter(|(_, enabled)| *enabled)
            .map(|(name, _)| *name)
    }

    /// Every metric this selection knows about, in canonical order.
    #[must_use]
    pub fn supported(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }
}
