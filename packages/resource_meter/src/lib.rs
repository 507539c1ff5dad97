#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Resource usage collectors with record export and normalized cross-collector charts.
//!
//! A [`Collector`] measures functions, code blocks and single statements with one [`Probe`] and
//! keeps one [`StatRecord`] per measured region. The built-in probes cover:
//!
//! - [`TimeProbe`] - monotonic, process CPU or wall clock time
//! - [`MemoryProbe`] - current and peak heap usage of the measuring thread
//! - [`DiskProbe`] - disk I/O counters and disk space of a file system
//! - [`NetworkProbe`] - network traffic summed over all interfaces
//! - [`CallProbe`] - calls marked with [`count_call()`]
//!
//! Records can be summarized through a pluggable [`Logger`], exported to JSON or CSV with
//! [`export_records()`] and compared across collectors with [`plot_stats()`], which draws one
//! normalized bar chart per metric.
//!
//! This package is meant as a development tool for finding out where a program spends its
//! resources, not as a production monitoring system.
//!
//! # Simple usage
//!
//! ```
//! use std::thread;
//! use std::time::Duration;
//!
//! use resource_meter::TimeCollector;
//!
//! let collector = TimeCollector::default();
//!
//! {
//!     let _measurement = collector.measure_block("t1").unwrap();
//!     thread::sleep(Duration::from_millis(100));
//! }
//!
//! let records = collector.get_records();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].label(), "t1");
//! assert!(records[0].metrics().get_f64("execution_time").unwrap() >= 0.09);
//!
//! // Logs "Summary of 1 profiling events:" followed by the record.
//! collector.summarize();
//! ```
//!
//! # Measuring functions
//!
//! Wrapping a function measures every call made through the wrapper. Wrappers from different
//! collectors compose, each measuring the calls that pass through it:
//!
//! ```
//! use resource_meter::{CallCollector, TimeCollector, count_call};
//!
//! fn fib(n: u64) -> u64 {
//!     count_call();
//!     if n < 2 { n } else { fib(n - 1) + fib(n - 2) }
//! }
//!
//! let time = TimeCollector::default();
//! let calls = CallCollector::default();
//!
//! let timed = time.measure_function("fib", fib);
//! let counted = calls.measure_function("fib", move |n: u64| timed.call((n,)));
//!
//! assert_eq!(counted.call((10,)).unwrap().unwrap(), 55);
//!
//! // 177 recursive calls plus the call through the wrapper.
//! assert_eq!(calls.get_records()[0].metrics().get_f64("call_count"), Some(178.0));
//! ```
//!
//! # Memory tracking
//!
//! [`MemoryProbe`] relies on [`TrackingAllocator`] being the global allocator:
//!
//! ```
//! use resource_meter::{MemoryCollector, TrackingAllocator};
//!
//! #[global_allocator]
//! static ALLOCATOR: TrackingAllocator<std::alloc::System> = TrackingAllocator::system();
//!
//! fn main() {
//!     let collector = MemoryCollector::default();
//!
//!     let buffer = collector
//!         .measure("buffer", || vec![0_u8; 4 * 1024 * 1024])
//!         .unwrap();
//!
//!     let peak = collector.get_records()[0].metrics().get_f64("peak_mb").unwrap();
//!     assert!(peak >= 4.0);
//!     drop(buffer);
//! }
//! ```
//!
//! # Threading
//!
//! Collectors are cheap to clone and can be shared between threads; clones share one record
//! list. Memory and call counts are tracked per thread, so their measurement guards cannot move
//! to another thread.

mod allocator;
mod collector;
mod config;
mod error;
mod export;
mod logging;
mod measured_fn;
mod measurement;
mod pal;
mod probes;
mod record;
mod source;
mod visualize;

pub use allocator::{TrackingAllocator, tracking_allocator_installed};
pub use collector::{
    CallCollector, Collector, CollectorBuilder, DiskCollector, MemoryCollector, NetworkCollector,
    TimeCollector,
};
pub use config::MeterConfig;
pub use error::{Error, ErrorKind, Result};
pub use export::{ExportFormat, export_records, export_records_as, read_json};
pub use logging::{
    Capability, LogHandler, LogLevel, Logger, LoggingFacade, MemoryLogger, TracingLogger,
};
pub use measured_fn::{Invoke, MeasuredFn};
pub use measurement::Measurement;
pub use probes::{
    CallMark, CallProbe, DiskMark, DiskProbe, MemoryMark, MemoryProbe, MetricSelection,
    NetworkMark, NetworkProbe, Probe, TimeMark, TimeProbe, TimeSource, count_call,
};
pub use record::{MetricValue, Metrics, StatRecord};
pub use source::{RecordSet, RecordSource};
pub use visualize::{
    Bar, ChartPlan, EmptyChart, Panel, PlotOptions, PlotOutcome, Section, Unit, plot_stats,
};
