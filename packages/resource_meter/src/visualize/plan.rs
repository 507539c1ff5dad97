use std::collections::BTreeSet;
use std::fmt;

use crate::{PlotOptions, RecordSource, StatRecord, Unit};

/// Why a chart has nothing to show.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum EmptyChart {
    /// None of the sources holds a record.
    NoLabels,

    /// The options request no metric.
    NoMetrics,

    /// Every requested metric is zero for every label.
    AllZero,
}

impl fmt::Display for EmptyChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoLabels => "No profiling data available to plot.",
            Self::NoMetrics => "No metrics to plot.",
            Self::AllZero => "Every requested metric is zero; nothing to plot.",
        })
    }
}

/// A record label and the short identifier it is shown as on the x axis.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Section {
    id: String,
    label: String,
}

impl Section {
    /// The short identifier, `S1`, `S2` and so on in label order.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The record label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// One bar of a panel.
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    raw: f64,
    value: f64,
    normalized: f64,
}

impl Bar {
    /// The value as stored in the record.
    #[must_use]
    pub fn raw(&self) -> f64 {
        self.raw
    }

    /// The value converted into the panel's unit.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The converted value divided by the largest converted value of the panel.
    #[must_use]
    pub fn normalized(&self) -> f64 {
        self.normalized
    }

    /// The text drawn above the bar.
    #[must_use]
    pub fn annotation(&self) -> String {
        format!("{:.2}", self.raw)
    }
}

/// The chart of one metric: one bar per section, in section order.
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    slot: usize,
    metric: String,
    unit: Unit,
    bars: Vec<Bar>,
}

impl Panel {
    /// Position of the panel in the grid, counted row by row.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// The plotted metric.
    #[must_use]
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// The unit the bars are converted into.
    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// One bar per section.
    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// The title drawn above the panel.
    #[must_use]
    pub fn title(&self) -> String {
        format!("Metric: {} ({})", self.metric, self.unit)
    }
}

/// The complete layout of a figure, computed without drawing anything.
///
/// Labels from all sources are merged and sorted. Each requested metric is read from the first
/// source whose collector kind maps to it; when that source has several records with the same
/// label, the last one wins. Missing and non-numeric values count as zero. Metrics that are zero
/// for every label keep their grid slot but get no panel.
///
/// # Examples
///
/// ```
/// use resource_meter::{ChartPlan, Metrics, PlotOptions, RecordSet, StatRecord};
///
/// let times = RecordSet::new(
///     "time",
///     vec![
///         StatRecord::new("load", Metrics::new().with("execution_time", 2.0)),
///         StatRecord::new("parse", Metrics::new().with("execution_time", 0.5)),
///     ],
/// );
///
/// let plan = ChartPlan::build(&[&times], &PlotOptions::new()).unwrap();
///
/// assert_eq!(plan.sections()[0].id(), "S1");
/// assert_eq!(plan.panels().len(), 1);
/// assert_eq!(plan.panels()[0].bars()[1].normalized(), 0.25);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ChartPlan {
    title: String,
    sections: Vec<Section>,
    panels: Vec<Panel>,
    rows: usize,
    columns: usize,
}

impl ChartPlan {
    /// Lays out a figure for the records of `sources`.
    ///
    /// # Errors
    ///
    /// Returns the reason the figure would be empty: no records at all, no requested metric, or
    /// only all-zero metrics.
    pub fn build(
        sources: &[&dyn RecordSource],
        options: &PlotOptions,
    ) -> Result<Self, EmptyChart> {
        let snapshots = sources
            .iter()
            .map(|source| (source.kind().to_string(), source.records()))
            .collect::<Vec<_>>();

        let labels = snapshots
            .iter()
            .flat_map(|(_, records)| records.iter().map(StatRecord::label))
            .collect::<BTreeSet<_>>();

        if labels.is_empty() {
            return Err(EmptyChart::NoLabels);
        }

        let requested = options.requested_metrics();

        if requested.is_empty() {
            return Err(EmptyChart::NoMetrics);
        }

        let columns = if requested.len() > 1 { 2 } else { 1 };
        let rows = requested.len().div_ceil(columns);

        let panels = requested
            .iter()
            .enumerate()
            .filter_map(|(slot, metric)| {
                let raws = labels
                    .iter()
                    .map(|label| raw_value(&snapshots, options, metric, label))
                    .collect::<Vec<_>>();

                build_panel(slot, metric, &raws)
            })
            .collect::<Vec<_>>();

        if panels.is_empty() {
            return Err(EmptyChart::AllZero);
        }

        let sections = labels
            .iter()
            .enumerate()
            .map(|(index, label)| Section {
                id: format!("S{}", index.saturating_add(1)),
                label: (*label).to_string(),
            })
            .collect();

        Ok(Self {
            title: options.title().to_string(),
            sections,
            panels,
            rows,
            columns,
        })
    }

    /// The figure title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Every label, sorted, with its short identifier.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The panels that have something to show.
    #[must_use]
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Number of grid rows, including rows whose panels were all skipped.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of grid columns, at most two.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }
}

fn raw_value(
    snapshots: &[(String, Vec<StatRecord>)],
    options: &PlotOptions,
    metric: &str,
    label: &str,
) -> f64 {
    snapshots
        .iter()
        .find(|(kind, _)| options.metric_of_kind(kind) == Some(metric))
        .and_then(|(_, records)| records.iter().rev().find(|record| record.label() == label))
        .and_then(|record| record.metrics().get_f64(metric))
        .unwrap_or(0.0)
}

fn build_panel(slot: usize, metric: &str, raws: &[f64]) -> Option<Panel> {
    let unit = Unit::of_metric(metric);
    let values = raws.iter().map(|raw| unit.convert(*raw)).collect::<Vec<_>>();

    if values.iter().all(|value| *value == 0.0) {
        return None;
    }

    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let scale = if max > 0.0 { max } else { 1.0 };

    let bars = raws
        .iter()
        .zip(values)
        .map(|(raw, value)| Bar {
            raw: *raw,
            value,
            normalized: value / scale,
        })
        .collect();

    Some(Panel {
        slot,
        metric: metric.to_string(),
        unit,
        bars,
    })
}
