use crate::StatRecord;

/// Anything that can hand its records to the visualizer.
///
/// Implemented by every [`Collector`](crate::Collector) and by [`RecordSet`], which holds records
/// reloaded from an export file. The kind decides which metric the visualizer reads from the
/// source's records.
pub trait RecordSource {
    /// The collector kind, such as `time` or `disk`.
    fn kind(&self) -> &str;

    /// A snapshot of the records, in the order they were produced.
    fn records(&self) -> Vec<StatRecord>;
}

/// A detached list of records tagged with the kind of collector that produced them.
///
/// # Examples
///
/// ```
/// use resource_meter::{Metrics, RecordSet, RecordSource, StatRecord};
///
/// let set = RecordSet::new(
///     "time",
///     vec![StatRecord::new("load", Metrics::new().with("execution_time", 1.5))],
/// );
///
/// assert_eq!(set.kind(), "time");
/// assert_eq!(set.records().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RecordSet {
    kind: String,
    records: Vec<StatRecord>,
}

impl RecordSet {
    /// Creates a record set of the given collector kind.
    #[must_use]
    pub fn new(kind: impl Into<String>, records: Vec<StatRecord>) -> Self {
        Self {
            kind: kind.into(),
            records,
        }
    }
}

impl RecordSource for RecordSet {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn records(&self) -> Vec<StatRecord> {
        self.records.clone()
    }
}
