use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::pal::{Platform, PlatformFacade};
use crate::{Error, Metrics, Probe, Result};

/// The clock a [`TimeProbe`] reads.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum TimeSource {
    /// High-resolution monotonic elapsed time.
    #[default]
    Execution,

    /// Processor time consumed by the whole process, excluding time spent waiting.
    Cpu,

    /// Wall-clock time. Can jump if the system clock is adjusted.
    Wall,
}

impl TimeSource {
    /// Every source, in the order their names are listed in error messages.
    pub const ALL: [Self; 3] = [Self::Execution, Self::Cpu, Self::Wall];

    /// The source name, which is also the metric name: `execution_time`, `cpu_time` or
    /// `wall_time`.
    #[must_use]
    pub const fn metric_name(self) -> &'static str {
        match self {
            Self::Execution => "execution_time",
            Self::Cpu => "cpu_time",
            Self::Wall => "wall_time",
        }
    }
}

impl fmt::Display for TimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metric_name())
    }
}

impl FromStr for TimeSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|source| source.metric_name() == s)
            .ok_or_else(|| Error::UnknownTimeSource {
                value: s.to_string(),
            })
    }
}

/// Reading of the probe's clock when a measurement began.
#[derive(Clone, Copy, Debug)]
pub struct TimeMark {
    at: Duration,
}

/// Measures elapsed time on one [`TimeSource`], in seconds.
///
/// # Examples
///
/// ```
/// use resource_meter::{TimeCollector, TimeProbe, TimeSource};
///
/// let collector = TimeCollector::new(TimeProbe::new("cpu_time".parse::<TimeSource>().unwrap()));
///
/// collector.measure("spin", || (0..10_000_u64).sum::<u64>()).unwrap();
///
/// let records = collector.get_records();
/// assert!(records[0].metrics().get_f64("cpu_time").unwrap() >= 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct TimeProbe {
    source: TimeSource,
    platform: PlatformFacade,
}

impl TimeProbe {
    /// Creates a probe reading the given clock.
    #[must_use]
    pub fn new(source: TimeSource) -> Self {
        Self::with_platform(source, PlatformFacade::real())
    }

    pub(crate) fn with_platform(source: TimeSource, platform: PlatformFacade) -> Self {
        Self { source, platform }
    }

    /// The clock this probe reads.
    #[must_use]
    pub fn source(&self) -> TimeSource {
        self.source
    }

    fn now(&self) -> Result<Duration> {
        match self.source {
            TimeSource::Execution => Ok(self.platform.monotonic_now()),
            TimeSource::Cpu => self.platform.process_cpu_time(),
            TimeSource::Wall => self.platform.wall_clock(),
        }
    }
}

impl Default for TimeProbe {
    fn default() -> Self {
        Self::new(TimeSource::default())
    }
}

impl Probe for TimeProbe {
    const KIND: &'static str = "time";
    const BLOCK_LABEL: &'static str = "Code block";
    const STATEMENT_LABEL: &'static str = "Line(s)";

    type Start = TimeMark;

    fn begin(&self) -> Result<TimeMark> {
        Ok(TimeMark { at: self.now()? })
    }

    fn finish(&self, start: TimeMark) -> Result<Metrics> {
        let end = self.now()?;

        // The wall clock may step backwards; report that as a negative duration.
        let seconds = end.as_secs_f64() - start.at.as_secs_f64();

        Ok(Metrics::new().with(self.source.metric_name(), seconds))
    }

    fn describe(&self, label: &str, metrics: &Metrics) -> Vec<String> {
        let name = self.source.metric_name();

        metrics
            .get_f64(name)
            .map(|seconds| format!("{label} took {seconds:.4} seconds of {name}"))
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;
    use testing::f64_diff_abs;

    use super::*;
    use crate::ErrorKind;
    use crate::pal::FakePlatform;

    assert_impl_all!(TimeProbe: Send, Sync);
    assert_impl_all!(TimeMark: Send, Sync);

    fn fake_probe(source: TimeSource) -> (TimeProbe, FakePlatform) {
        let platform = FakePlatform::new();
        let probe = TimeProbe::with_platform(source, PlatformFacade::fake(platform.clone()));
        (probe, platform)
    }

    #[test]
    fn parses_source_names() {
        assert_eq!(
            "execution_time".parse::<TimeSource>().unwrap(),
            TimeSource::Execution
        );
        assert_eq!("cpu_time".parse::<TimeSource>().unwrap(), TimeSource::Cpu);
        assert_eq!("wall_time".parse::<TimeSource>().unwrap(), TimeSource::Wall);

        let error = "sundial".parse::<TimeSource>().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn execution_time_is_monotonic_delta() {
        let (probe, platform) = fake_probe(TimeSource::Execution);
        platform.set_monotonic(Duration::from_millis(1_000));

        let start = probe.begin().unwrap();
        platform.set_monotonic(Duration::from_millis(1_250));
        let metrics = probe.finish(start).unwrap();

        assert_eq!(metrics.keys().collect::<Vec<_>>(), ["execution_time"]);
        assert!(f64_diff_abs(metrics.get_f64("execution_time").unwrap(), 0.25, 1e-9) < 1e-9);
    }

    #[test]
    fn cpu_time_uses_process_clock() {
        let (probe, platform) = fake_probe(TimeSource::Cpu);

        let start = probe.begin().unwrap();
        platform.set_cpu_time(Duration::from_millis(40));
        platform.set_monotonic(Duration::from_secs(5));
        let metrics = probe.finish(start).unwrap();

        assert!(f64_diff_abs(metrics.get_f64("cpu_time").unwrap(), 0.04, 1e-9) < 1e-9);
    }

    #[test]
    fn wall_time_can_go_backwards() {
        let (probe, platform) = fake_probe(TimeSource::Wall);
        platform.set_wall_clock(Duration::from_secs(100));

        let start = probe.begin().unwrap();
        platform.set_wall_clock(Duration::from_secs(99));
        let metrics = probe.finish(start).unwrap();

        assert!(f64_diff_abs(metrics.get_f64("wall_time").unwrap(), -1.0, 1e-9) < 1e-9);
    }

    #[test]
    fn unreadable_clock_fails_begin() {
        let (probe, platform) = fake_probe(TimeSource::Cpu);
        platform.fail_sources();

        let error = probe.begin().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MeasurementSource);
    }

    #[test]
    fn describes_duration_with_source() {
        let probe = TimeProbe::default();
        let lines = probe.describe("load", &Metrics::new().with("execution_time", 0.123_456));

        assert_eq!(lines, ["load took 0.1235 seconds of execution_time"]);
    }
}
