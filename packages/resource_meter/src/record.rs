//! The statistics record shared by every collector.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One measured value in a [`StatRecord`].
///
/// Counters stay integers so they serialize as `1` rather than `1.0`. Durations and megabyte
/// figures are floats. Snapshots that carry more than one number (such as disk usage before and
/// after a measured region) nest a further [`Metrics`] mapping.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
#[non_exhaustive]
pub enum MetricValue {
    /// A whole-number counter or delta.
    Int(i64),

    /// A fractional quantity such as seconds or megabytes.
    Float(f64),

    /// A nested sub-mapping.
    Nested(Box<Metrics>),
}

impl MetricValue {
    /// Returns the value as a float, or `None` for nested sub-mappings.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "plotting and comparison tolerate precision loss above 2^53"
    )]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Nested(_) => None,
        }
    }

    /// Returns the nested sub-mapping, if this value is one.
    #[must_use]
    pub fn as_nested(&self) -> Option<&Metrics> {
        match self {
            Self::Nested(metrics) => Some(metrics.as_ref()),
            Self::Int(_) | Self::Float(_) => None,
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        // Counter deltas beyond i64::MAX are not realistic; clamp rather than wrap.
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Metrics> for MetricValue {
    fn from(value: Metrics) -> Self {
        Self::Nested(Box::new(value))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Nested(metrics) => write!(f, "{metrics}"),
        }
    }
}

/// Ordered mapping from metric name to value.
///
/// Insertion order is preserved; it defines the column order of CSV exports.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Metrics {
    values: IndexMap<String, MetricValue>,
}

impl Metrics {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a metric, replacing any previous value under the same name while keeping its
    /// original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`insert()`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.values.get(name)
    }

    /// Returns the value stored under `name` as a float, if present and numeric.
    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(MetricValue::as_f64)
    }

    /// Iterates over the metric names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates over the metrics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of metrics in the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the mapping holds no metrics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<MetricValue>> FromIterator<(K, V)> for Metrics {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;

        for (index, (name, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{name}: {value}")?;
        }

        f.write_str("}")
    }
}

/// The outcome of one measured region: what was measured and what it cost.
///
/// Records are immutable once created. Labels are not unique; repeated invocations of the same
/// function produce one record each.
///
/// # Examples
///
/// ```
/// use resource_meter::{Metrics, StatRecord};
///
/// let record = StatRecord::new("parse_config", Metrics::new().with("execution_time", 0.25));
///
/// assert_eq!(record.label(), "parse_config");
/// assert_eq!(record.metrics().get_f64("execution_time"), Some(0.25));
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StatRecord {
    label: String,
    metrics: Metrics,
}

impl StatRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(label: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            label: label.into(),
            metrics,
        }
    }

    /// The label identifying the measured unit of work.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The metrics captured for the measured region.
    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl fmt::Display for StatRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.metrics)
    }
}
