//! Platform abstraction trait definitions.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use crate::Result;

/// Cumulative block device I/O since boot, summed over whole disks.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct DiskIoCounters {
    pub(crate) read_bytes: u64,
    pub(crate) write_bytes: u64,
    pub(crate) read_count: u64,
    pub(crate) write_count: u64,
}

/// Capacity of the file system holding a path, in bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct DiskSpace {
    pub(crate) total: u64,
    pub(crate) used: u64,
    pub(crate) free: u64,
}

/// Cumulative network traffic since boot, summed over all interfaces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct NetworkCounters {
    pub(crate) bytes_sent: u64,
    pub(crate) bytes_recv: u64,
    pub(crate) packets_sent: u64,
    pub(crate) packets_recv: u64,
}

/// The operating system counters the probes read.
///
/// Real implementations go to the OS; the fake one returns values set by tests. Clocks cannot
/// fail. Every other source may be unavailable on a given platform or in a given sandbox, which
/// is reported as a measurement-source error.
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Monotonic time elapsed since an arbitrary fixed origin.
    fn monotonic_now(&self) -> Duration;

    /// Processor time consumed by the whole process so far.
    fn process_cpu_time(&self) -> Result<Duration>;

    /// Wall-clock time since the Unix epoch. Not monotonic.
    fn wall_clock(&self) -> Result<Duration>;

    /// System-wide block device counters.
    fn disk_io(&self) -> Result<DiskIoCounters>;

    /// Capacity of the file system that holds `path`.
    fn disk_space(&self, path: &Path) -> Result<DiskSpace>;

    /// System-wide network counters.
    fn network_io(&self) -> Result<NetworkCounters>;
}
