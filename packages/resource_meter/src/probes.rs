//! The measurement logic behind each kind of collector.
//!
//! A [`Probe`] knows how to take a before-snapshot of some counter source and how to turn an
//! after-snapshot into [`Metrics`]. [`Collector`](crate::Collector) does everything else: labels,
//! record storage, logging and the function, block and statement entry points.

mod calls;
mod disk;
mod memory;
mod network;
mod selection;
mod time;

use std::fmt::Debug;

pub use calls::{CallMark, CallProbe, count_call};
pub use disk::{DiskMark, DiskProbe};
pub use memory::{MemoryMark, MemoryProbe};
pub use network::{NetworkMark, NetworkProbe};
pub use selection::MetricSelection;
pub use time::{TimeMark, TimeProbe, TimeSource};

use crate::{Metrics, Result};

/// Measures one kind of resource between two points in time.
///
/// Implement this to plug a custom measurement into [`Collector`](crate::Collector). The
/// before-snapshot is returned from [`begin()`](Self::begin) and handed back to
/// [`finish()`](Self::finish), so one probe can serve any number of overlapping measurements on
/// any number of threads.
///
/// # Examples
///
/// ```
/// use resource_meter::{Collector, Metrics, Probe, Result};
///
/// #[derive(Debug)]
/// struct Constant;
///
/// impl Probe for Constant {
///     const KIND: &'static str = "constant";
///     const BLOCK_LABEL: &'static str = "Constant block";
///     const STATEMENT_LABEL: &'static str = "Constant line(s)";
///
///     type Start = ();
///
///     fn begin(&self) -> Result<()> {
///         Ok(())
///     }
///
///     fn finish(&self, (): ()) -> Result<Metrics> {
///         Ok(Metrics::new().with("answer", 42_i64))
///     }
///
///     fn describe(&self, label: &str, metrics: &Metrics) -> Vec<String> {
///         vec![format!("{label}: {metrics}")]
///     }
/// }
///
/// let collector = Collector::new(Constant);
/// collector.measure("question", || {}).unwrap();
///
/// assert_eq!(collector.get_records()[0].metrics().get_f64("answer"), Some(42.0));
/// ```
pub trait Probe: Debug + Send + Sync + 'static {
    /// The collector kind, used to pick the metric a collector contributes to plots.
    const KIND: &'static str;

    /// Label used for blocks measured without a label.
    const BLOCK_LABEL: &'static str;

    /// Label used for statements measured without a label.
    const STATEMENT_LABEL: &'static str;

    /// The before-snapshot carried from [`begin()`](Self::begin) to [`finish()`](Self::finish).
    type Start;

    /// Takes the before-snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter source cannot be read.
    fn begin(&self) -> Result<Self::Start>;

    /// Takes the after-snapshot and computes the metrics of the measured region.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter source cannot be read.
    fn finish(&self, start: Self::Start) -> Result<Metrics>;

    /// Human-readable log lines describing a finished measurement.
    fn describe(&self, label: &str, metrics: &Metrics) -> Vec<String>;

    /// Called once per invocation of a function wrapped by
    /// [`Collector::measure_function()`](crate::Collector::measure_function), after
    /// [`begin()`](Self::begin) and before the function body runs.
    fn enter_function(&self) {}
}

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[expect(
    clippy::cast_precision_loss,
    reason = "megabyte figures are for display and plotting"
)]
pub(crate) fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

#[expect(
    clippy::cast_precision_loss,
    reason = "gigabyte figures are for display and plotting"
)]
pub(crate) fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}
