//! One-shot serialization of records to JSON or CSV files.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;

use crate::{Error, MetricValue, Result, StatRecord};

const JSON_INDENT: &[u8] = b"    ";

/// The file formats records can be exported to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ExportFormat {
    /// A pretty-printed array of `{label, metrics}` objects.
    Json,

    /// One row per record, with columns taken from the first record.
    Csv,
}

impl ExportFormat {
    /// The name used to select this format, as accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Writes `records` to `path` in the given format, creating missing parent directories.
///
/// CSV output has a `label` column followed by the metric names of the first record, in
/// insertion order. Later records are read by those names: metrics they lack are left blank and
/// metrics the first record lacks are not written. Nested values are written as compact JSON.
///
/// # Errors
///
/// Returns an error if CSV output is requested for an empty record list, or if the file cannot
/// be created or written.
///
/// # Examples
///
/// ```
/// use resource_meter::{ExportFormat, Metrics, StatRecord, export_records};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("runs").join("stats.csv");
///
/// let records = [
///     StatRecord::new("a", Metrics::new().with("v", 1_i64)),
///     StatRecord::new("b", Metrics::new().with("v", 2_i64)),
/// ];
/// export_records(&records, ExportFormat::Csv, &path).unwrap();
///
/// let text = std::fs::read_to_string(&path).unwrap();
/// assert_eq!(text.lines().collect::<Vec<_>>(), ["label,v", "a,1", "b,2"]);
/// ```
pub fn export_records(
    records: &[StatRecord],
    format: ExportFormat,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();

    if format == ExportFormat::Csv && records.is_empty() {
        return Err(Error::NoRecords);
    }

    create_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| Error::io(path, e))?;

    match format {
        ExportFormat::Json => write_json(records, file, path),
        ExportFormat::Csv => write_csv(records, file, path),
    }
}

/// Like [`export_records()`] but takes the format by name (`json` or `csv`).
///
/// # Errors
///
/// Returns an error if the format name is not recognized, plus every error
/// [`export_records()`] can return.
pub fn export_records_as(
    records: &[StatRecord],
    format: &str,
    path: impl AsRef<Path>,
) -> Result<()> {
    export_records(records, format.parse()?, path)
}

/// Loads records previously written by [`export_records()`] in JSON format.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not contain a record array.
pub fn read_json(path: impl AsRef<Path>) -> Result<Vec<StatRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

    Ok(serde_json::from_str(&text)?)
}

fn create_parent_dirs(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))
        }
        _ => Ok(()),
    }
}

fn write_json(records: &[StatRecord], file: File, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(file);

    let mut serializer =
        Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(JSON_INDENT));
    records.serialize(&mut serializer)?;

    writer.flush().map_err(|e| Error::io(path, e))
}

fn write_csv(records: &[StatRecord], file: File, path: &Path) -> Result<()> {
    let Some(first) = records.first() else {
        return Err(Error::NoRecords);
    };

    let columns = first.metrics().keys().collect::<Vec<_>>();

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["label"].into_iter().chain(columns.iter().copied()))?;

    for record in records {
        let mut row = Vec::with_capacity(columns.len().saturating_add(1));
        row.push(record.label().to_string());

        for column in &columns {
            row.push(match record.metrics().get(column) {
                Some(value) => csv_cell(value)?,
                None => String::new(),
            });
        }

        writer.write_record(&row)?;
    }

    writer.flush().map_err(|e| Error::io(path, e))
}

fn csv_cell(value: &MetricValue) -> Result<String> {
    Ok(match value {
        MetricValue::Nested(metrics) => serde_json::to_string(metrics)?,
        other => other.to_string(),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{ErrorKind, Metrics};

    fn sample() -> Vec<StatRecord> {
        vec![
            StatRecord::new(
                "load",
                Metrics::new()
                    .with("write_bytes", 4_096_i64)
                    .with("disk_usage", Metrics::new().with("before", 1.5)),
            ),
            StatRecord::new("store", Metrics::new().with("write_bytes", 0_i64)),
        ]
    }

    #[test]
    fn format_names() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::Csv.to_string(), "csv");

        let error = "JSON".parse::<ExportFormat>().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert!(error.to_string().contains("'JSON'"));
    }

    #[test]
    fn json_round_trips_nested_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        export_records(&sample(), ExportFormat::Json, &path).unwrap();

        assert_eq!(read_json(&path).unwrap(), sample());
    }

    #[test]
    fn json_is_indented_with_four_spaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        export_records(&sample(), ExportFormat::Json, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"label\": \"load\""), "{text}");
    }

    #[test]
    fn json_of_empty_list_is_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");

        export_records(&[], ExportFormat::Json, &path).unwrap();

        assert!(read_json(&path).unwrap().is_empty());
    }

    #[test]
    fn csv_uses_first_record_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");

        let records = [
            StatRecord::new("a", Metrics::new().with("x", 1_i64).with("y", 0.5)),
            StatRecord::new("b", Metrics::new().with("y", 2_i64).with("z", 9_i64)),
        ];

        export_records(&records, ExportFormat::Csv, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), ["label,x,y", "a,1,0.5", "b,,2"]);
    }

    #[test]
    fn csv_writes_nested_values_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");

        export_records(&sample(), ExportFormat::Csv, &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            [
                "label,write_bytes,disk_usage",
                r#"load,4096,"{""before"":1.5}""#,
                "store,0,",
            ]
        );
    }

    #[test]
    fn csv_of_empty_list_is_rejected_without_creating_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("empty.csv");

        let error = export_records(&[], ExportFormat::Csv, &path).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Precondition);
        assert!(!path.exists());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("stats.json");

        export_records_as(&sample(), "json", &path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn unknown_format_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let error = export_records_as(&sample(), "xml", dir.path().join("stats.xml")).unwrap_err();

        assert!(matches!(error, Error::UnsupportedFormat { format } if format == "xml"));
    }

    #[test]
    fn reading_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let error = read_json(&path).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(error.to_string().contains("missing.json"));
    }

    #[test]
    fn reading_malformed_file_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[{\"label\": ").unwrap();

        let error = read_json(&path).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Output);
        assert!(error.to_string().starts_with("records are not valid JSON"), "{error}");
    }

    #[test]
    fn json_preserves_every_float_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("precise.json");

        let records = vec![
            StatRecord::new(
                "a",
                Metrics::new().with("execution_time", 1.2736000000000001e-5),
            ),
            StatRecord::new("b", Metrics::new().with("cpu_time", 0.1 + 0.2)),
        ];

        export_records(&records, ExportFormat::Json, &path).unwrap();

        assert_eq!(read_json(&path).unwrap(), records);
    }

    #[test]
    fn csv_parses_back_to_original_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.csv");

        let records = [
            StatRecord::new(
                "a",
                Metrics::new()
                    .with("ratio", 0.1 + 0.2)
                    .with("delta", -42_i64)
                    .with("tiny", 1.2736000000000001e-5),
            ),
            StatRecord::new(
                "b,c",
                Metrics::new()
                    .with("ratio", -2.5)
                    .with("delta", i64::MIN)
                    .with("tiny", 0.0),
            ),
        ];

        export_records(&records, ExportFormat::Csv, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            ["label", "ratio", "delta", "tiny"]
        );

        let rows = reader
            .records()
            .collect::<csv::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(rows.len(), records.len());

        for (row, record) in rows.iter().zip(&records) {
            assert_eq!(row.get(0), Some(record.label()));

            let ratio = row.get(1).unwrap().parse::<f64>().unwrap();
            assert_eq!(
                record.metrics().get("ratio"),
                Some(&MetricValue::Float(ratio))
            );

            let delta = row.get(2).unwrap().parse::<i64>().unwrap();
            assert_eq!(
                record.metrics().get("delta"),
                Some(&MetricValue::Int(delta))
            );

            let tiny = row.get(3).unwrap().parse::<f64>().unwrap();
            assert_eq!(
                record.metrics().get("tiny"),
                Some(&MetricValue::Float(tiny))
            );
        }
    }
}
