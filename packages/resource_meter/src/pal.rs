//! Platform abstraction layer for the operating system counters the probes read.
//!
//! Probes only ever talk to [`PlatformFacade`], which dispatches to the real implementation or,
//! in unit tests, to a fake whose counters the test controls.

mod abstractions;
#[cfg(any(target_os = "linux", test))]
mod diskstats;
mod facade;
#[cfg(test)]
mod fake;
mod real;

pub(crate) use abstractions::{DiskIoCounters, DiskSpace, NetworkCounters, Platform};
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
