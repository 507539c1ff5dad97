use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    CallProbe, DiskProbe, ExportFormat, LogLevel, Logger, LoggingFacade, MeasuredFn,
    Measurement, MemoryProbe, NetworkProbe, Probe, RecordSource, Result, StatRecord, TimeProbe,
    export_records,
};

/// Measures code with one [`Probe`] and keeps the resulting records.
///
/// A collector offers three ways to measure: wrapping a function with
/// [`measure_function()`](Self::measure_function), guarding a scope with
/// [`measure_block()`](Self::measure_block) or [`measure_statement()`](Self::measure_statement),
/// and running a closure with [`measure()`](Self::measure). Each finished measurement appends one
/// [`StatRecord`] and, if logging is enabled, writes the probe's description of it to the
/// collector's logger at the collector's log level.
///
/// Cloning a collector is cheap and yields a handle to the same record list, so a clone can be
/// moved to another thread. Separately constructed collectors are independent.
///
/// # Examples
///
/// ```
/// use std::thread;
/// use std::time::Duration;
///
/// use resource_meter::TimeCollector;
///
/// let collector = TimeCollector::default();
///
/// {
///     let _measurement = collector.measure_block("nap").unwrap();
///     thread::sleep(Duration::from_millis(10));
/// }
///
/// let records = collector.get_records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].label(), "nap");
/// assert!(records[0].metrics().get_f64("execution_time").unwrap() >= 0.01);
/// ```
pub struct Collector<P: Probe> {
    inner: Arc<CollectorInner<P>>,
}

struct CollectorInner<P> {
    probe: P,
    records: Mutex<Vec<StatRecord>>,
    facade: LoggingFacade,
    log_level: LogLevel,
    logging_enabled: bool,
}

/// Which entry point started a measurement; decides the placeholder for an empty label.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Scope {
    Block,
    Statement,
    Function,
}

impl<P: Probe> Collector<P> {
    /// Creates a collector that logs through `tracing` at info level.
    #[must_use]
    pub fn new(probe: P) -> Self {
        Self::from_parts(probe, LoggingFacade::tracing(LogLevel::Info), LogLevel::Info, true)
    }

    /// Starts configuring a collector with a custom logger, log level or logging switch.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    ///
    /// use resource_meter::{CallCollector, CallProbe, LogLevel, MemoryLogger};
    ///
    /// let logger = Arc::new(MemoryLogger::new());
    /// let collector = CallCollector::builder(CallProbe::new())
    ///     .logger(Arc::<MemoryLogger>::clone(&logger))
    ///     .log_level(LogLevel::Debug)
    ///     .build()
    ///     .unwrap();
    ///
    /// collector.measure("noop", || {}).unwrap();
    ///
    /// assert_eq!(logger.messages(), ["noop made 0 function calls"]);
    /// ```
    #[must_use]
    pub fn builder(probe: P) -> CollectorBuilder<P> {
        CollectorBuilder {
            probe,
            logger: None,
            log_level: LogLevel::Info,
            logging_enabled: true,
        }
    }

    fn from_parts(
        probe: P,
        facade: LoggingFacade,
        log_level: LogLevel,
        logging_enabled: bool,
    ) -> Self {
        Self {
            inner: Arc::new(CollectorInner {
                probe,
                records: Mutex::new(Vec::new()),
                facade,
                log_level,
                logging_enabled,
            }),
        }
    }

    /// The probe this collector measures with.
    #[must_use]
    pub fn probe(&self) -> &P {
        &self.inner.probe
    }

    /// The logging facade this collector writes through.
    #[must_use]
    pub fn facade(&self) -> &LoggingFacade {
        &self.inner.facade
    }

    /// The level at which measurement descriptions and summaries are logged.
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.inner.log_level
    }

    /// Whether measurement descriptions and summaries are logged at all.
    #[must_use]
    pub fn logging_enabled(&self) -> bool {
        self.inner.logging_enabled
    }

    /// Starts measuring a block. The measurement ends when the returned guard is dropped or
    /// [finished](Measurement::finish), including when the scope is left by a panic.
    ///
    /// An empty label is replaced by the probe's block placeholder, e.g. `Code block`.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe cannot take its before-snapshot.
    pub fn measure_block(&self, label: &str) -> Result<Measurement<P>> {
        self.start(label, Scope::Block)
    }

    /// Starts measuring a single statement or a few lines.
    ///
    /// Identical to [`measure_block()`](Self::measure_block) except that an empty label is
    /// replaced by the probe's statement placeholder, e.g. `Line(s)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe cannot take its before-snapshot.
    pub fn measure_statement(&self, label: &str) -> Result<Measurement<P>> {
        self.start(label, Scope::Statement)
    }

    /// Measures one call of `f` and returns its result.
    ///
    /// If `f` panics, the record is still appended and the panic continues to unwind.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe cannot take its before-snapshot, in which case `f` is not
    /// called. A failure to take the after-snapshot is logged instead, so the result of `f` is
    /// never lost.
    pub fn measure<R>(&self, label: &str, f: impl FnOnce() -> R) -> Result<R> {
        let measurement = self.start(label, Scope::Block)?;
        let output = f();
        drop(measurement);

        Ok(output)
    }

    /// Wraps `function` so that every call through the wrapper is measured and recorded under
    /// `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_meter::TimeCollector;
    ///
    /// let collector = TimeCollector::default();
    /// let add = collector.measure_function("add", |a: u32, b: u32| a + b);
    ///
    /// assert_eq!(add.call((2, 3)).unwrap(), 5);
    /// assert_eq!(add.call((4, 4)).unwrap(), 8);
    ///
    /// assert_eq!(add.invocations(), 2);
    /// assert_eq!(collector.get_records().len(), 2);
    /// ```
    #[must_use]
    pub fn measure_function<F>(&self, name: impl Into<String>, function: F) -> MeasuredFn<P, F> {
        MeasuredFn::new(self.clone(), name.into(), function)
    }

    /// A snapshot of the records appended so far, in completion order.
    #[must_use]
    pub fn get_records(&self) -> Vec<StatRecord> {
        self.records().clone()
    }

    /// Removes every record.
    pub fn clear_records(&self) {
        self.records().clear();
    }

    /// Logs a count header and one line per record at the collector's log level.
    ///
    /// Logs a single notice instead if there are no records, and nothing at all if logging is
    /// disabled.
    pub fn summarize(&self) {
        if !self.inner.logging_enabled {
            return;
        }

        let records = self.get_records();
        let level = self.inner.log_level;
        let facade = &self.inner.facade;

        if records.is_empty() {
            facade.log(level, "No profiling statistics available.");
            return;
        }

        facade.log(
            level,
            &format!("Summary of {} profiling events:", records.len()),
        );

        for record in &records {
            facade.log(level, &record.to_string());
        }
    }

    /// Writes this collector's records to `path`. See [`export_records()`] for the formats.
    ///
    /// # Errors
    ///
    /// Returns an error if CSV is requested while there are no records, or if the file cannot
    /// be written.
    pub fn export(&self, format: ExportFormat, path: impl AsRef<Path>) -> Result<()> {
        export_records(&self.get_records(), format, path)
    }

    pub(crate) fn start(&self, label: &str, scope: Scope) -> Result<Measurement<P>> {
        let label = if label.is_empty() {
            match scope {
                Scope::Block | Scope::Function => P::BLOCK_LABEL,
                Scope::Statement => P::STATEMENT_LABEL,
            }
        } else {
            label
        };

        match self.inner.probe.begin() {
            Ok(start) => Ok(Measurement::new(self.clone(), label.to_string(), start)),
            Err(error) => {
                if self.inner.logging_enabled {
                    self.inner.facade.error(&format!(
                        "Error retrieving {} stats for {label}: {error}",
                        P::KIND
                    ));
                }

                Err(error)
            }
        }
    }

    pub(crate) fn complete(&self, label: String, start: P::Start) -> Result<StatRecord> {
        let metrics = match self.inner.probe.finish(start) {
            Ok(metrics) => metrics,
            Err(error) => {
                self.inner.facade.error(&format!(
                    "Error retrieving {} stats for {label}: {error}",
                    P::KIND
                ));

                return Err(error);
            }
        };

        let record = StatRecord::new(label, metrics);

        if self.inner.logging_enabled {
            for line in self.inner.probe.describe(record.label(), record.metrics()) {
                self.inner.facade.log(self.inner.log_level, &line);
            }
        }

        self.records().push(record.clone());

        Ok(record)
    }

    // No lock is held while user code runs and a push cannot leave the list half-written, so the
    // list stays usable after a poisoning panic.
    fn records(&self) -> MutexGuard<'_, Vec<StatRecord>> {
        self.inner
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: Probe> Clone for Collector<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: Probe + Default> Default for Collector<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<P: Probe> fmt::Debug for Collector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("kind", &P::KIND)
            .field("probe", &self.inner.probe)
            .field("records", &self.records().len())
            .field("log_level", &self.inner.log_level)
            .field("logging_enabled", &self.inner.logging_enabled)
            .finish_non_exhaustive()
    }
}

impl<P: Probe> RecordSource for Collector<P> {
    fn kind(&self) -> &str {
        P::KIND
    }

    fn records(&self) -> Vec<StatRecord> {
        self.get_records()
    }
}

/// Configures a [`Collector`]. Created by [`Collector::builder()`].
#[derive(Debug)]
#[must_use = "a builder does nothing until `build()` is called"]
pub struct CollectorBuilder<P: Probe> {
    probe: P,
    logger: Option<Arc<dyn Logger>>,
    log_level: LogLevel,
    logging_enabled: bool,
}

impl<P: Probe> CollectorBuilder<P> {
    /// Logs through `logger` instead of the default `tracing` backend.
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Logs descriptions and summaries at `level`. Defaults to [`LogLevel::Info`].
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Turns logging of descriptions and summaries on or off. Defaults to on.
    pub fn logging_enabled(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// Creates the collector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCapabilities`](crate::Error::MissingCapabilities) if a custom
    /// logger does not declare every required capability.
    pub fn build(self) -> Result<Collector<P>> {
        let facade = match self.logger {
            Some(logger) => LoggingFacade::new(logger, self.log_level)?,
            None => LoggingFacade::tracing(self.log_level),
        };

        Ok(Collector::from_parts(
            self.probe,
            facade,
            self.log_level,
            self.logging_enabled,
        ))
    }
}

/// Collector of elapsed time.
pub type TimeCollector = Collector<TimeProbe>;

/// Collector of heap usage.
pub type MemoryCollector = Collector<MemoryProbe>;

/// Collector of disk I/O and capacity.
pub type DiskCollector = Collector<DiskProbe>;

/// Collector of network traffic.
pub type NetworkCollector = Collector<NetworkProbe>;

/// Collector of call counts.
pub type CallCollector = Collector<CallProbe>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::time::Duration;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::pal::{FakePlatform, NetworkCounters, PlatformFacade};
    use crate::{
        Capability, Error, ErrorKind, MemoryLogger, MetricValue, Metrics, TimeSource,
    };

    assert_impl_all!(TimeCollector: Send, Sync, Clone);
    assert_impl_all!(MemoryCollector: Send, Sync, Clone);
    assert_impl_all!(DiskCollector: Send, Sync, Clone);
    assert_impl_all!(NetworkCollector: Send, Sync, Clone);
    assert_impl_all!(CallCollector: Send, Sync, Clone);

    fn fake_time_collector() -> (TimeCollector, FakePlatform, Arc<MemoryLogger>) {
        let platform = FakePlatform::new();
        let probe =
            TimeProbe::with_platform(TimeSource::Execution, PlatformFacade::fake(platform.clone()));
        let logger = Arc::new(MemoryLogger::new());

        let collector = Collector::builder(probe)
            .logger(Arc::<MemoryLogger>::clone(&logger))
            .build()
            .unwrap();

        (collector, platform, logger)
    }

    #[test]
    fn block_records_label_and_metric() {
        let (collector, platform, logger) = fake_time_collector();

        {
            let _measurement = collector.measure_block("t1").unwrap();
            platform.set_monotonic(Duration::from_millis(100));
        }

        let records = collector.get_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label(), "t1");
        assert_eq!(
            records[0].metrics().get("execution_time"),
            Some(&MetricValue::Float(0.1))
        );
        assert_eq!(
            logger.messages(),
            ["t1 took 0.1000 seconds of execution_time"]
        );
    }

    #[test]
    fn empty_labels_get_placeholders() {
        let (collector, _platform, _logger) = fake_time_collector();

        drop(collector.measure_block("").unwrap());
        drop(collector.measure_statement("").unwrap());
        collector.measure("", || {}).unwrap();

        let labels = collector
            .get_records()
            .iter()
            .map(|record| record.label().to_string())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["Code block", "Line(s)", "Code block"]);
    }

    #[test]
    fn records_in_completion_order() {
        let (collector, _platform, _logger) = fake_time_collector();

        let outer = collector.measure_block("outer").unwrap();
        collector.measure("inner", || {}).unwrap();
        drop(outer);

        let labels = collector
            .get_records()
            .iter()
            .map(|record| record.label().to_string())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["inner", "outer"]);
    }

    #[test]
    fn finish_returns_appended_record() {
        let (collector, platform, _logger) = fake_time_collector();

        let measurement = collector.measure_block("explicit").unwrap();
        platform.set_monotonic(Duration::from_secs(2));
        let record = measurement.finish().unwrap();

        assert_eq!(collector.get_records(), [record]);
    }

    #[test]
    fn panic_still_records() {
        let (collector, _platform, _logger) = fake_time_collector();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            collector.measure("explodes", || panic!("boom")).unwrap();
        }));

        assert!(outcome.is_err());
        assert_eq!(collector.get_records().len(), 1);
        assert_eq!(collector.get_records()[0].label(), "explodes");
    }

    #[test]
    fn begin_failure_skips_user_code() {
        let (collector, platform, logger) = {
            let platform = FakePlatform::new();
            let probe = crate::NetworkProbe::with_platform(PlatformFacade::fake(platform.clone()));
            let logger = Arc::new(MemoryLogger::new());
            let collector = Collector::builder(probe)
                .logger(Arc::<MemoryLogger>::clone(&logger))
                .build()
                .unwrap();
            (collector, platform, logger)
        };
        platform.fail_sources();

        let mut ran = false;
        let error = collector.measure("skipped", || ran = true).unwrap_err();

        assert!(!ran);
        assert_eq!(error.kind(), ErrorKind::MeasurementSource);
        assert!(collector.get_records().is_empty());
        assert_eq!(logger.entries().len(), 1);
        assert_eq!(logger.entries()[0].0, LogLevel::Error);
    }

    #[test]
    fn finish_failure_keeps_result_and_logs() {
        let platform = FakePlatform::new();
        let probe = crate::NetworkProbe::with_platform(PlatformFacade::fake(platform.clone()));
        let logger = Arc::new(MemoryLogger::new());
        let collector = Collector::builder(probe)
            .logger(Arc::<MemoryLogger>::clone(&logger))
            .build()
            .unwrap();

        platform.set_network(NetworkCounters::default());
        platform.fail_sources_after(1);

        let output = collector.measure("lost", || 42).unwrap();

        assert_eq!(output, 42);
        assert!(collector.get_records().is_empty());
        assert_eq!(logger.entries()[0].0, LogLevel::Error);
        assert!(logger.messages()[0].contains("network"));
    }

    #[test]
    fn disabled_logging_is_silent() {
        let logger = Arc::new(MemoryLogger::new());
        let collector = CallCollector::builder(CallProbe::new())
            .logger(Arc::<MemoryLogger>::clone(&logger))
            .logging_enabled(false)
            .build()
            .unwrap();

        collector.measure("quiet", || {}).unwrap();
        collector.summarize();

        assert_eq!(collector.get_records().len(), 1);
        assert!(logger.entries().is_empty());
    }

    #[test]
    fn summarize_logs_header_and_records() {
        let logger = Arc::new(MemoryLogger::new());
        let collector = CallCollector::builder(CallProbe::new())
            .logger(Arc::<MemoryLogger>::clone(&logger))
            .log_level(LogLevel::Warning)
            .build()
            .unwrap();

        collector.summarize();
        assert_eq!(
            logger.entries(),
            [(
                LogLevel::Warning,
                "No profiling statistics available.".to_string()
            )]
        );

        collector.measure("a", || {}).unwrap();
        collector.measure("b", || {}).unwrap();
        logger.clear();
        collector.summarize();

        assert_eq!(
            logger.messages(),
            [
                "Summary of 2 profiling events:",
                "a: {call_count: 0}",
                "b: {call_count: 0}",
            ]
        );
        assert!(
            logger
                .entries()
                .iter()
                .all(|(level, _)| *level == LogLevel::Warning)
        );
    }

    #[test]
    fn clear_records_empties_list() {
        let collector = CallCollector::default();
        collector.measure("x", || {}).unwrap();

        collector.clear_records();

        assert!(collector.get_records().is_empty());
    }

    #[test]
    fn clones_share_records_but_instances_do_not() {
        let first = CallCollector::default();
        let clone = first.clone();
        let second = CallCollector::default();

        clone.measure("shared", || {}).unwrap();

        assert_eq!(first.get_records().len(), 1);
        assert!(second.get_records().is_empty());
    }

    #[test]
    fn builder_rejects_incapable_logger() {
        #[derive(Debug)]
        struct NoErrors;

        impl Logger for NoErrors {
            fn supports(&self, capability: Capability) -> bool {
                capability.is_required() && capability != Capability::Error
            }

            fn log(&self, _level: LogLevel, _message: &str) {}
        }

        let error = CallCollector::builder(CallProbe::new())
            .logger(Arc::new(NoErrors))
            .build()
            .unwrap_err();

        assert!(matches!(error, Error::MissingCapabilities { .. }));
        assert!(error.to_string().contains("error"));
    }

    #[test]
    fn custom_probe_plugs_in() {
        #[derive(Debug)]
        struct Fixed;

        impl Probe for Fixed {
            const KIND: &'static str = "fixed";
            const BLOCK_LABEL: &'static str = "Fixed block";
            const STATEMENT_LABEL: &'static str = "Fixed line(s)";

            type Start = ();

            fn begin(&self) -> Result<()> {
                Ok(())
            }

            fn finish(&self, (): ()) -> Result<Metrics> {
                Ok(Metrics::new().with("v", 1_i64))
            }

            fn describe(&self, _label: &str, _metrics: &Metrics) -> Vec<String> {
                Vec::new()
            }
        }

        let collector = Collector::new(Fixed);
        collector.measure("", || {}).unwrap();

        assert_eq!(RecordSource::kind(&collector), "fixed");
        assert_eq!(collector.get_records()[0].label(), "Fixed block");
    }
}
