use std::marker::PhantomData;

use crate::allocator::{self, ThreadMemory};
use crate::probes::bytes_to_mb;
use crate::{Error, Metrics, Probe, Result};

/// The calling thread's allocation counters when a measurement began.
///
/// Memory is tracked per thread, so a mark cannot move to another thread.
#[derive(Debug)]
pub struct MemoryMark {
    start: ThreadMemory,

    _single_threaded: PhantomData<*const ()>,
}

/// Measures heap usage of the measuring thread, in megabytes.
///
/// `current_mb` is the memory allocated during the region and still held at its end. `peak_mb`
/// is the highest amount held at any point during the region, relative to its start. Both only
/// count allocations made on the measuring thread.
///
/// Requires [`TrackingAllocator`](crate::TrackingAllocator) to be installed as the global
/// allocator.
#[derive(Clone, Debug, Default)]
pub struct MemoryProbe;

impl MemoryProbe {
    /// Creates a memory probe.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Probe for MemoryProbe {
    const KIND: &'static str = "memory";
    const BLOCK_LABEL: &'static str = "Memory block";
    const STATEMENT_LABEL: &'static str = "Memory line(s)";

    type Start = MemoryMark;

    fn begin(&self) -> Result<MemoryMark> {
        if !allocator::tracking_allocator_installed() {
            return Err(Error::source_unavailable(
                "tracking allocator",
                "TrackingAllocator is not installed as the global allocator",
            ));
        }

        let start = allocator::thread_memory();
        allocator::reset_thread_peak();

        Ok(MemoryMark {
            start,
            _single_threaded: PhantomData,
        })
    }

    fn finish(&self, start: MemoryMark) -> Result<Metrics> {
        let end = allocator::thread_memory();

        // An enclosing measurement must still see the highest point reached before this one
        // reset the mark.
        allocator::restore_thread_peak(start.start.peak);

        let current = end.live.saturating_sub(start.start.live);
        let peak = end.peak.saturating_sub(start.start.live);

        Ok(Metrics::new()
            .with("current_mb", bytes_to_mb(current))
            .with("peak_mb", bytes_to_mb(peak)))
    }

    fn describe(&self, label: &str, metrics: &Metrics) -> Vec<String> {
        let current = metrics.get_f64("current_mb").unwrap_or_default();
        let peak = metrics.get_f64("peak_mb").unwrap_or_default();

        vec![format!(
            "{label} memory usage: Current={current:.2}MB, Peak={peak:.2}MB"
        )]
    }
}
