//! Fake platform implementation for testing.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::pal::abstractions::{DiskIoCounters, DiskSpace, NetworkCounters, Platform};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct FakePlatformState {
    monotonic: Duration,
    cpu_time: Duration,
    wall_clock: Duration,
    disk_io: DiskIoCounters,
    disk_space: DiskSpace,
    network: NetworkCounters,
    sources_fail: bool,
    sources_fail_after: Option<usize>,
    source_reads: usize,
}

/// Fake implementation of the platform abstraction for testing.
///
/// Multiple clones of the same `FakePlatform` share the same underlying state, so tests can
/// change counter values after handing a clone to a probe to simulate activity during a
/// measured region.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakePlatform {
    state: Arc<Mutex<FakePlatformState>>,
}

impl FakePlatform {
    /// Creates a fake platform with every counter at zero.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_monotonic(&self, value: Duration) {
        self.state().monotonic = value;
    }

    pub(crate) fn set_cpu_time(&self, value: Duration) {
        self.state().cpu_time = value;
    }

    pub(crate) fn set_wall_clock(&self, value: Duration) {
        self.state().wall_clock = value;
    }

    pub(crate) fn set_disk_io(&self, value: DiskIoCounters) {
        self.state().disk_io = value;
    }

    pub(crate) fn set_disk_space(&self, value: DiskSpace) {
        self.state().disk_space = value;
    }

    pub(crate) fn set_network(&self, value: NetworkCounters) {
        self.state().network = value;
    }

    /// Makes every fallible source fail from now on.
    pub(crate) fn fail_sources(&self) {
        self.state().sources_fail = true;
    }

    /// Lets the next `reads` fallible source reads succeed and fails every one after them.
    pub(crate) fn fail_sources_after(&self, reads: usize) {
        let mut state = self.state();
        state.sources_fail_after = Some(state.source_reads.saturating_add(reads));
    }

    fn state(&self) -> MutexGuard<'_, FakePlatformState> {
        self.state
            .lock()
            .expect("FakePlatform state lock should not be poisoned")
    }

    fn read<T>(&self, source_name: &str, value: impl FnOnce(&FakePlatformState) -> T) -> Result<T> {
        let mut state = self.state();

        let reads = state.source_reads;
        state.source_reads = reads.saturating_add(1);

        let failing = state.sources_fail
            || state
                .sources_fail_after
                .is_some_and(|threshold| reads >= threshold);

        if failing {
            return Err(Error::source_unavailable(
                source_name,
                "simulated failure",
            ));
        }

        Ok(value(&state))
    }
}

impl Platform for FakePlatform {
    fn monotonic_now(&self) -> Duration {
        self.state().monotonic
    }

    fn process_cpu_time(&self) -> Result<Duration> {
        self.read("fake CPU time", |state| state.cpu_time)
    }

    fn wall_clock(&self) -> Result<Duration> {
        self.read("fake wall clock", |state| state.wall_clock)
    }

    fn disk_io(&self) -> Result<DiskIoCounters> {
        self.read("fake disk I/O", |state| state.disk_io)
    }

    fn disk_space(&self, _path: &Path) -> Result<DiskSpace> {
        self.read("fake disk space", |state| state.disk_space)
    }

    fn network_io(&self) -> Result<NetworkCounters> {
        self.read("fake network", |state| state.network)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn initializes_with_zero_counters() {
        let platform = FakePlatform::new();

        assert_eq!(platform.monotonic_now(), Duration::ZERO);
        assert_eq!(platform.disk_io().unwrap(), DiskIoCounters::default());
        assert_eq!(platform.network_io().unwrap(), NetworkCounters::default());
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();

        platform1.set_cpu_time(Duration::from_millis(100));
        assert_eq!(
            platform2.process_cpu_time().unwrap(),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn fails_after_given_reads() {
        let platform = FakePlatform::new();
        platform.fail_sources_after(1);

        platform.network_io().unwrap();
        platform.network_io().unwrap_err();

        // Clocks never fail.
        platform.monotonic_now();
    }
}
