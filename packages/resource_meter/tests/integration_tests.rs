//! Integration tests for `resource_meter` covering measurement, logging, export and plotting
//! through the public API only.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use resource_meter::{
    CallCollector, Capability, Collector, ErrorKind, ExportFormat, LogLevel, Logger,
    MemoryLogger, Metrics, PlotOptions, PlotOutcome, RecordSet, StatRecord, TimeCollector,
    TimeProbe, TimeSource, count_call, export_records, plot_stats, read_json,
};

#[test]
fn sleeping_block_is_measured() {
    let collector = TimeCollector::default();

    {
        let _measurement = collector.measure_block("t1").unwrap();
        thread::sleep(Duration::from_millis(100));
    }

    let records = collector.get_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].label(), "t1");
    assert_eq!(
        records[0].metrics().keys().collect::<Vec<_>>(),
        ["execution_time"]
    );
    assert!(records[0].metrics().get_f64("execution_time").unwrap() >= 0.09);
}

#[test]
fn every_call_produces_one_record_in_order() {
    let collector = TimeCollector::default();
    let square = collector.measure_function("square", |x: u64| x * x);

    for x in 0..10 {
        assert_eq!(square.call((x,)).unwrap(), x * x);
    }

    let statement = collector.measure_statement("").unwrap();
    drop(statement);

    let records = collector.get_records();
    assert_eq!(records.len(), 11);
    assert!(records[..10].iter().all(|record| record.label() == "square"));
    assert_eq!(records[10].label(), "Line(s)");
}

#[test]
fn panic_in_measured_function_is_recorded_and_propagated() {
    let collector = TimeCollector::default();
    let explode = collector.measure_function("explode", || -> u32 { panic!("boom") });

    let payload = panic::catch_unwind(AssertUnwindSafe(|| explode.call(()))).unwrap_err();

    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
    assert_eq!(collector.get_records().len(), 1);
    assert_eq!(collector.get_records()[0].label(), "explode");
}

#[test]
fn user_results_are_not_wrapped() {
    let collector = TimeCollector::default();
    let parse = collector.measure_function("parse", |text: &str| text.parse::<u32>());

    assert_eq!(parse.call(("42",)).unwrap(), Ok(42));
    assert!(parse.call(("forty-two",)).unwrap().is_err());
    assert_eq!(collector.get_records().len(), 2);
}

fn walk(depth: u32) {
    count_call();
    if depth > 0 {
        walk(depth - 1);
    }
}

#[test]
fn collectors_compose_around_one_function() {
    let time = TimeCollector::default();
    let cpu = Collector::new(TimeProbe::new(TimeSource::Cpu));
    let calls = CallCollector::default();

    let inner = time.measure_function("walk", walk);
    let middle = cpu.measure_function("walk", move |depth: u32| inner.call((depth,)));
    let outer = calls.measure_function("walk", move |depth: u32| middle.call((depth,)));

    outer.call((3,)).unwrap().unwrap().unwrap();

    assert_eq!(time.get_records().len(), 1);
    assert!(
        cpu.get_records()[0]
            .metrics()
            .get_f64("cpu_time")
            .is_some()
    );
    assert_eq!(
        calls.get_records()[0].metrics().get_f64("call_count"),
        Some(5.0)
    );
}

#[test]
fn summary_goes_through_custom_logger() {
    let logger = Arc::new(MemoryLogger::new());
    let collector = TimeCollector::builder(TimeProbe::default())
        .logger(Arc::<MemoryLogger>::clone(&logger))
        .log_level(LogLevel::Warning)
        .build()
        .unwrap();

    collector.summarize();
    assert_eq!(logger.messages(), ["No profiling statistics available."]);

    logger.clear();
    collector.measure("step", || ()).unwrap();
    logger.clear();
    collector.summarize();

    let entries = logger.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], (LogLevel::Warning, "Summary of 1 profiling events:".to_string()));
    assert!(entries[1].1.starts_with("step: {execution_time: "));
}

#[test]
fn logger_without_error_support_is_rejected() {
    #[derive(Debug)]
    struct NoErrors;

    impl Logger for NoErrors {
        fn supports(&self, capability: Capability) -> bool {
            capability != Capability::Error
        }

        fn log(&self, _level: LogLevel, _message: &str) {}
    }

    let error = TimeCollector::builder(TimeProbe::default())
        .logger(Arc::new(NoErrors))
        .build()
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Configuration);
    assert!(error.to_string().contains("missing: error"), "{error}");
}

#[test]
fn exported_json_reloads_into_identical_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("time.json");

    let collector = TimeCollector::default();
    collector.measure("a", || ()).unwrap();
    collector.measure("b", || ()).unwrap();

    collector.export(ExportFormat::Json, &path).unwrap();

    assert_eq!(read_json(&path).unwrap(), collector.get_records());
}

#[test]
fn csv_export_matches_expected_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("values.csv");

    let records = [
        StatRecord::new("a", Metrics::new().with("v", 1_i64)),
        StatRecord::new("b", Metrics::new().with("v", 2_i64)),
    ];

    export_records(&records, ExportFormat::Csv, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), ["label,v", "a,1", "b,2"]);
}

#[test]
fn empty_collector_cannot_export_csv() {
    let dir = tempfile::tempdir().unwrap();

    let error = CallCollector::default()
        .export(ExportFormat::Csv, dir.path().join("empty.csv"))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Precondition);
}

#[test]
fn plots_live_and_reloaded_records_together() {
    let dir = tempfile::tempdir().unwrap();

    let calls = CallCollector::default();
    calls
        .measure("load", || {
            count_call();
            count_call();
        })
        .unwrap();

    let json = dir.path().join("calls.json");
    calls.export(ExportFormat::Json, &json).unwrap();
    let reloaded = RecordSet::new("calls", read_json(&json).unwrap());

    let time = TimeCollector::default();
    time.measure("store", || thread::sleep(Duration::from_millis(5)))
        .unwrap();

    let options = PlotOptions::new()
        .with_output_dir(dir.path().join("charts"))
        .with_output_file("combined.svg");

    let outcome = plot_stats(&[&time, &reloaded], &options).unwrap();

    let path = dir.path().join("charts").join("combined.svg");
    assert_eq!(outcome, PlotOutcome::Written(path.clone()));

    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("S1: load"));
    assert!(svg.contains("S2: store"));
    assert!(svg.contains("Metric: execution_time (seconds)"));
    assert!(svg.contains("Metric: call_count (counts)"));
}

#[test]
fn plotting_nothing_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let options = PlotOptions::new().with_output_dir(dir.path().join("charts"));

    let outcome = plot_stats(&[&TimeCollector::default()], &options).unwrap();

    assert!(matches!(outcome, PlotOutcome::NothingToPlot(_)));
    assert!(!dir.path().join("charts").exists());
}
