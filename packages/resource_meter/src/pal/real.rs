//! Real platform implementation reading operating system counters.

use std::path::Path;
use std::sync::LazyLock;
use std::time::{Duration, Instant, SystemTime};

use cpu_time::ProcessTime;
use sysinfo::{Disks, Networks};

use crate::pal::abstractions::{DiskIoCounters, DiskSpace, NetworkCounters, Platform};
use crate::{Error, Result};

static MONOTONIC_ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Real implementation of the platform abstraction.
///
/// Process CPU time comes from the `cpu_time` crate, network totals and file system capacity from
/// `sysinfo`, disk I/O from `/proc/diskstats`.
#[derive(Clone, Debug)]
pub(crate) struct RealPlatform;

impl Platform for RealPlatform {
    fn monotonic_now(&self) -> Duration {
        MONOTONIC_ORIGIN.elapsed()
    }

    fn process_cpu_time(&self) -> Result<Duration> {
        ProcessTime::try_now()
            .map(|time| time.as_duration())
            .map_err(|e| Error::source_unavailable("process CPU time", e))
    }

    fn wall_clock(&self) -> Result<Duration> {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|e| Error::source_unavailable("system clock", e))
    }

    #[cfg(target_os = "linux")]
    fn disk_io(&self) -> Result<DiskIoCounters> {
        const DISKSTATS: &str = "/proc/diskstats";

        let contents = std::fs::read_to_string(DISKSTATS)
            .map_err(|e| Error::source_unavailable(DISKSTATS, e))?;

        // Whole disks are the ones with a directory under /sys/block; partitions are not listed
        // there.
        Ok(super::diskstats::sum_whole_disks(&contents, |name| {
            Path::new("/sys/block").join(name).exists()
        }))
    }

    #[cfg(not(target_os = "linux"))]
    fn disk_io(&self) -> Result<DiskIoCounters> {
        Err(Error::source_unavailable(
            "disk I/O counters",
            "only available on Linux",
        ))
    }

    fn disk_space(&self, path: &Path) -> Result<DiskSpace> {
        // Mount points are matched against the absolute path with symlinks resolved.
        let path = path.canonicalize().map_err(|e| {
            Error::source_unavailable("disk list", format!("{}: {e}", path.display()))
        })?;

        let disks = Disks::new_with_refreshed_list();

        // The disk whose mount point is the longest prefix of the path holds it.
        let disk = disks
            .iter()
            .filter(|disk| path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .ok_or_else(|| {
                Error::source_unavailable(
                    "disk list",
                    format!("no mounted disk holds {}", path.display()),
                )
            })?;

        Ok(DiskSpace {
            total: disk.total_space(),
            used: disk.total_space().saturating_sub(disk.available_space()),
            free: disk.available_space(),
        })
    }

    fn network_io(&self) -> Result<NetworkCounters> {
        let networks = Networks::new_with_refreshed_list();

        if networks.iter().next().is_none() {
            return Err(Error::source_unavailable(
                "network interfaces",
                "no network interfaces found",
            ));
        }

        Ok(networks
            .iter()
            .fold(NetworkCounters::default(), |totals, (_, data)| {
                NetworkCounters {
                    bytes_sent: totals.bytes_sent.saturating_add(data.total_transmitted()),
                    bytes_recv: totals.bytes_recv.saturating_add(data.total_received()),
                    packets_sent: totals
                        .packets_sent
                        .saturating_add(data.total_packets_transmitted()),
                    packets_recv: totals
                        .packets_recv
                        .saturating_add(data.total_packets_received()),
                }
            }))
    }
}
