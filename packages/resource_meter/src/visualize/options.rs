use std::path::{Path, PathBuf};

use indexmap::IndexMap;

const DEFAULT_METRICS: [(&str, &str); 5] = [
    ("time", "execution_time"),
    ("disk", "write_bytes"),
    ("calls", "call_count"),
    ("memory", "peak_mb"),
    ("network", "bytes_sent"),
];

const DEFAULT_OUTPUT_FILE: &str = "profiling_stats.png";
const DEFAULT_TITLE: &str = "Profiling Statistics (Normalized)";
const DEFAULT_WIDTH: u32 = 1200;
const DEFAULT_PANEL_HEIGHT: u32 = 400;

/// What [`plot_stats()`](crate::plot_stats) draws and where it writes the figure.
///
/// # Examples
///
/// ```
/// use resource_meter::PlotOptions;
///
/// let options = PlotOptions::new()
///     .with_metric_for("time", "cpu_time")
///     .with_output_dir("target/charts")
///     .with_output_file("run.svg");
///
/// assert_eq!(options.metric_of_kind("time"), Some("cpu_time"));
/// assert!(options.output_path().ends_with("charts/run.svg"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PlotOptions {
    metrics: IndexMap<String, String>,
    single_metric: Option<String>,
    output_dir: PathBuf,
    output_file: String,
    title: String,
    width: u32,
    panel_height: u32,
}

impl PlotOptions {
    /// Creates options that plot the default metric of every built-in collector kind into
    /// `./profiling_stats.png`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: DEFAULT_METRICS
                .iter()
                .map(|(kind, metric)| ((*kind).to_string(), (*metric).to_string()))
                .collect(),
            single_metric: None,
            output_dir: PathBuf::from("."),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            panel_height: DEFAULT_PANEL_HEIGHT,
        }
    }

    /// Reads `metric` from the records of sources of the given collector kind, replacing the
    /// previous metric of that kind.
    #[must_use]
    pub fn with_metric_for(mut self, kind: impl Into<String>, metric: impl Into<String>) -> Self {
        self.metrics.insert(kind.into(), metric.into());
        self
    }

    /// Replaces the whole kind to metric mapping.
    #[must_use]
    pub fn with_metric_mapping<K, M>(mut self, mapping: impl IntoIterator<Item = (K, M)>) -> Self
    where
        K: Into<String>,
        M: Into<String>,
    {
        self.metrics = mapping
            .into_iter()
            .map(|(kind, metric)| (kind.into(), metric.into()))
            .collect();
        self
    }

    /// Plots only `metric` instead of every mapped metric.
    #[must_use]
    pub fn with_single_metric(mut self, metric: impl Into<String>) -> Self {
        self.single_metric = Some(metric.into());
        self
    }

    /// The directory the figure is written to. Created if missing.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// The file name of the figure. A name ending in `.svg` produces an SVG document, any other
    /// name a PNG image.
    #[must_use]
    pub fn with_output_file(mut self, file: impl Into<String>) -> Self {
        self.output_file = file.into();
        self
    }

    /// The title drawn above all panels.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Figure width in pixels.
    #[must_use]
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Height of one row of panels in pixels.
    #[must_use]
    pub fn with_panel_height(mut self, panel_height: u32) -> Self {
        self.panel_height = panel_height;
        self
    }

    /// The metric read from sources of `kind`, if that kind is mapped.
    #[must_use]
    pub fn metric_of_kind(&self, kind: &str) -> Option<&str> {
        self.metrics.get(kind).map(String::as_str)
    }

    /// The kind to metric mapping, in insertion order.
    pub fn metric_mapping(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metrics
            .iter()
            .map(|(kind, metric)| (kind.as_str(), metric.as_str()))
    }

    /// The metrics that get a panel: the single metric if one is set, otherwise every mapped
    /// metric once, in mapping order.
    #[must_use]
    pub fn requested_metrics(&self) -> Vec<&str> {
        if let Some(metric) = &self.single_metric {
            return vec![metric.as_str()];
        }

        let mut requested: Vec<&str> = Vec::with_capacity(self.metrics.len());

        for metric in self.metrics.values() {
            if !requested.contains(&metric.as_str()) {
                requested.push(metric);
            }
        }

        requested
    }

    /// The title drawn above all panels.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The directory the figure is written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the figure is written.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    /// Figure width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of one row of panels in pixels.
    #[must_use]
    pub fn panel_height(&self) -> u32 {
        self.panel_height
    }
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self::new()
    }
}
