use std::fmt;
use std::mem;

use crate::{Collector, Probe, Result, StatRecord};

/// An ongoing measurement, ended when dropped.
///
/// Returned by [`Collector::measure_block()`] and [`Collector::measure_statement()`]. The record
/// is appended when the guard goes out of scope, including during unwinding from a panic, so the
/// measured region cannot escape bookkeeping. Use [`finish()`](Self::finish) to end the
/// measurement early and inspect the record.
///
/// Guards of probes that track per-thread state, such as
/// [`MemoryProbe`](crate::MemoryProbe), cannot be sent to another thread.
#[must_use = "Measurements are taken between creation and drop"]
pub struct Measurement<P: Probe> {
    collector: Collector<P>,
    label: String,
    start: Option<P::Start>,
}

impl<P: Probe> Measurement<P> {
    pub(crate) fn new(collector: Collector<P>, label: String, start: P::Start) -> Self {
        Self {
            collector,
            label,
            start: Some(start),
        }
    }

    /// The label the record will carry.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Ends the measurement now and returns the record appended to the collector.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe cannot take its after-snapshot. Nothing is appended in
    /// that case.
    pub fn finish(mut self) -> Result<StatRecord> {
        let start = self
            .start
            .take()
            .expect("start snapshot is present until the guard is consumed");

        self.collector.complete(mem::take(&mut self.label), start)
    }
}

impl<P: Probe> Drop for Measurement<P> {
    fn drop(&mut self) {
        if let Some(start) = self.start.take() {
            // Failures are already logged by the collector and there is nobody to return them to.
            drop(self.collector.complete(mem::take(&mut self.label), start));
        }
    }
}

impl<P: Probe> fmt::Debug for Measurement<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measurement")
            .field("kind", &P::KIND)
            .field("label", &self.label)
            .field("active", &self.start.is_some())
            .finish_non_exhaustive()
    }
}
