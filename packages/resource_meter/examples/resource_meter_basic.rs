//! Measures a small workload with several collectors, then exports and plots the records.
//!
//! This example shows how the main `resource_meter` types work together:
//! - `TimeCollector`, `MemoryCollector` and `CallCollector` measuring the same function
//! - `summarize()` logging through `tracing`
//! - `export()` writing JSON and CSV files
//! - `plot_stats()` drawing one normalized chart for all collectors
//!
//! Set `RUST_LOG=resource_meter=debug` to see every record as it is taken.
//!
//! Run with: `cargo run --example resource_meter_basic`.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that does not need production-level safety"
)]

use std::env;
use std::hint::black_box;

use resource_meter::{
    CallCollector, ExportFormat, MemoryCollector, PlotOptions, PlotOutcome, TimeCollector,
    TrackingAllocator, count_call, plot_stats,
};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static ALLOCATOR: TrackingAllocator<std::alloc::System> = TrackingAllocator::system();

fn fib(n: u64) -> u64 {
    count_call();

    if n < 2 { n } else { fib(n - 1) + fib(n - 2) }
}

fn build_table(rows: usize) -> Vec<String> {
    count_call();

    (0..rows).map(|row| format!("row {row}")).collect()
}

fn main() -> resource_meter::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("resource_meter=info")),
        )
        .init();

    let time = TimeCollector::default();
    let memory = MemoryCollector::default();
    let calls = CallCollector::default();

    // Each collector wraps the previous wrapper, so one call is measured three times.
    let timed = time.measure_function("fib", fib);
    let sized = memory.measure_function("fib", move |n: u64| timed.call((n,)));
    let counted = calls.measure_function("fib", move |n: u64| sized.call((n,)));

    let result = counted.call((24,))???;
    println!("fib(24) = {result}");

    let timed = time.measure_function("build_table", build_table);
    let sized = memory.measure_function("build_table", move |rows: usize| timed.call((rows,)));
    let counted = calls.measure_function("build_table", move |rows: usize| sized.call((rows,)));

    let table = counted.call((50_000,))???;
    println!("built {} rows", black_box(table).len());

    {
        let _measurement = time.measure_block("sum")?;
        let sum = (0..1_000_000_u64).sum::<u64>();
        println!("sum = {}", black_box(sum));
    }

    time.summarize();
    memory.summarize();
    calls.summarize();

    let output_dir = env::temp_dir().join("resource_meter_basic");

    time.export(ExportFormat::Json, output_dir.join("time.json"))?;
    memory.export(ExportFormat::Csv, output_dir.join("memory.csv"))?;
    calls.export(ExportFormat::Json, output_dir.join("calls.json"))?;

    let options = PlotOptions::new().with_output_dir(&output_dir);

    match plot_stats(&[&time, &memory, &calls], &options)? {
        PlotOutcome::Written(path) => println!("chart written to {}", path.display()),
        PlotOutcome::NothingToPlot(reason) => println!("no chart: {reason}"),
        other => println!("{other:?}"),
    }

    println!("records and chart are in {}", output_dir.display());

    Ok(())
}
