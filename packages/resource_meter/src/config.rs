//! Collector and chart settings loaded from TOML.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! enabled = true
//!
//! [time]
//! source = "cpu_time"
//!
//! [disk]
//! path = "/var/lib/app"
//! metrics = { disk_usage = false }
//!
//! [network]
//! metrics = { packets_sent = false, packets_recv = false }
//!
//! [plot]
//! output_dir = "target/charts"
//! output_file = "run.svg"
//! metrics = { time = "cpu_time" }
//! ```
//!
//! Every section and key is optional. Plot metric entries are merged into the default mapping.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    CallCollector, CallProbe, Collector, DiskCollector, DiskProbe, Error, LogLevel,
    MemoryCollector, MemoryProbe, NetworkCollector, NetworkProbe, PlotOptions, Probe, Result,
    TimeCollector, TimeProbe, TimeSource,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    logging: RawLogging,
    time: RawTime,
    disk: RawDisk,
    network: RawNetwork,
    plot: RawPlot,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawLogging {
    level: String,
    enabled: bool,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self {
            level: LogLevel::default().name().to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawTime {
    source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawDisk {
    path: Option<PathBuf>,
    metrics: IndexMap<String, bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawNetwork {
    metrics: IndexMap<String, bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPlot {
    output_dir: Option<PathBuf>,
    output_file: Option<String>,
    single_metric: Option<String>,
    title: Option<String>,
    width: Option<u32>,
    panel_height: Option<u32>,
    metrics: IndexMap<String, String>,
}

/// Validated settings for building collectors and plotting their records.
///
/// # Examples
///
/// ```
/// use resource_meter::{LogLevel, MeterConfig, TimeSource};
///
/// let config = MeterConfig::from_toml_str(
///     r#"
///     [logging]
///     level = "warning"
///
///     [time]
///     source = "wall_time"
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.log_level(), LogLevel::Warning);
///
/// let collector = config.time_collector().unwrap();
/// assert_eq!(collector.probe().source(), TimeSource::Wall);
/// ```
#[derive(Clone, Debug)]
pub struct MeterConfig {
    log_level: LogLevel,
    logging_enabled: bool,
    time_probe: TimeProbe,
    disk_probe: DiskProbe,
    network_probe: NetworkProbe,
    plot: PlotOptions,
}

impl MeterConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is not valid TOML, contains unknown keys,
    /// or names an unknown log level, time source or metric.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text).map_err(|e| Error::InvalidConfig {
            problem: e.to_string(),
        })?;

        Self::from_raw(raw)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, plus every error
    /// [`from_toml_str()`](Self::from_toml_str) can return.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        Self::from_toml_str(&text)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let log_level = raw
            .logging
            .level
            .parse::<LogLevel>()
            .map_err(|e| Error::InvalidConfig {
                problem: e.to_string(),
            })?;

        let time_source = match raw.time.source {
            Some(name) => name.parse::<TimeSource>()?,
            None => TimeSource::default(),
        };

        let mut disk_probe = DiskProbe::new();
        if let Some(path) = raw.disk.path {
            disk_probe = disk_probe.with_path(path);
        }
        let disk_probe = disk_probe.with_metrics(
            raw.disk
                .metrics
                .iter()
                .map(|(name, enabled)| (name.as_str(), *enabled)),
        )?;

        let network_probe = NetworkProbe::new().with_metrics(
            raw.network
                .metrics
                .iter()
                .map(|(name, enabled)| (name.as_str(), *enabled)),
        )?;

        Ok(Self {
            log_level,
            logging_enabled: raw.logging.enabled,
            time_probe: TimeProbe::new(time_source),
            disk_probe,
            network_probe,
            plot: plot_options(raw.plot),
        })
    }

    /// The minimum level collectors log their output at.
    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Whether collectors log their output.
    #[must_use]
    pub fn logging_enabled(&self) -> bool {
        self.logging_enabled
    }

    /// Chart settings.
    #[must_use]
    pub fn plot_options(&self) -> &PlotOptions {
        &self.plot
    }

    /// Builds a collector around `probe` with the configured logging settings and the default
    /// `tracing` backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector cannot be built.
    pub fn collector<P: Probe>(&self, probe: P) -> Result<Collector<P>> {
        Collector::builder(probe)
            .log_level(self.log_level)
            .logging_enabled(self.logging_enabled)
            .build()
    }

    /// Builds a time collector with the configured time source.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector cannot be built.
    pub fn time_collector(&self) -> Result<TimeCollector> {
        self.collector(self.time_probe.clone())
    }

    /// Builds a memory collector.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector cannot be built.
    pub fn memory_collector(&self) -> Result<MemoryCollector> {
        self.collector(MemoryProbe::new())
    }

    /// Builds a disk collector with the configured path and metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector cannot be built.
    pub fn disk_collector(&self) -> Result<DiskCollector> {
        self.collector(self.disk_probe.clone())
    }

    /// Builds a network collector with the configured metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector cannot be built.
    pub fn network_collector(&self) -> Result<NetworkCollector> {
        self.collector(self.network_probe.clone())
    }

    /// Builds a call-count collector.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector cannot be built.
    pub fn call_collector(&self) -> Result<CallCollector> {
        self.collector(CallProbe::new())
    }
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            logging_enabled: true,
            time_probe: TimeProbe::default(),
            disk_probe: DiskProbe::default(),
            network_probe: NetworkProbe::default(),
            plot: PlotOptions::default(),
        }
    }
}

fn plot_options(raw: RawPlot) -> PlotOptions {
    let mut options = PlotOptions::new();

    for (kind, metric) in raw.metrics {
        options = options.with_metric_for(kind, metric);
    }

    if let Some(dir) = raw.output_dir {
        options = options.with_output_dir(dir);
    }

    if let Some(file) = raw.output_file {
        options = options.with_output_file(file);
    }

    if let Some(metric) = raw.single_metric {
        options = options.with_single_metric(metric);
    }

    if let Some(title) = raw.title {
        options = options.with_title(title);
    }

    if let Some(width) = raw.width {
        options = options.with_width(width);
    }

    if let Some(panel_height) = raw.panel_height {
        options = options.with_panel_height(panel_height);
    }

    options
}
