//! Platform facade for switching between real and fake implementations.

use std::path::Path;
use std::time::Duration;

use crate::Result;
use crate::pal::abstractions::{DiskIoCounters, DiskSpace, NetworkCounters, Platform};
#[cfg(test)]
use crate::pal::fake::FakePlatform;
use crate::pal::real::RealPlatform;

/// Either the real platform or, in unit tests, a fake one.
#[derive(Clone, Debug)]
pub(crate) enum PlatformFacade {
    Real(RealPlatform),

    #[cfg(test)]
    Fake(FakePlatform),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(RealPlatform)
    }

    #[cfg(test)]
    pub(crate) fn fake(fake_platform: FakePlatform) -> Self {
        Self::Fake(fake_platform)
    }
}

impl Platform for PlatformFacade {
    fn monotonic_now(&self) -> Duration {
        match self {
            Self::Real(platform) => platform.monotonic_now(),
            #[cfg(test)]
            Self::Fake(platform) => platform.monotonic_now(),
        }
    }

    fn process_cpu_time(&self) -> Result<Duration> {
        match self {
            Self::Real(platform) => platform.process_cpu_time(),
            #[cfg(test)]
            Self::Fake(platform) => platform.process_cpu_time(),
        }
    }

    fn wall_clock(&self) -> Result<Duration> {
        match self {
            Self::Real(platform) => platform.wall_clock(),
            #[cfg(test)]
            Self::Fake(platform) => platform.wall_clock(),
        }
    }

    fn disk_io(&self) -> Result<DiskIoCounters> {
        match self {
            Self::Real(platform) => platform.disk_io(),
            #[cfg(test)]
            Self::Fake(platform) => platform.disk_io(),
        }
    }

    fn disk_space(&self, path: &Path) -> Result<DiskSpace> {
        match self {
            Self::Real(platform) => platform.disk_space(path),
            #[cfg(test)]
            Self::Fake(platform) => platform.disk_space(path),
        }
    }

    fn network_io(&self) -> Result<NetworkCounters> {
        match self {
            Self::Real(platform) => platform.network_io(),
            #[cfg(test)]
            Self::Fake(platform) => platform.network_io(),
        }
    }
}
