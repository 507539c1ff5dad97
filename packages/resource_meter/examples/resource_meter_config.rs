//! Builds collectors from a TOML configuration file and compares their records in one chart.
//!
//! The configuration path is taken from the first command line argument. Without one, a
//! built-in configuration measuring CPU time is used.
//!
//! Run with: `cargo run --example resource_meter_config -- path/to/meter.toml`.
#![expect(
    clippy::arithmetic_side_effects,
    reason = "this is example code that does not need production-level safety"
)]

use std::env;
use std::hint::black_box;
use std::thread;
use std::time::Duration;

use resource_meter::{MeterConfig, PlotOutcome, RecordSet, plot_stats, read_json};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = r#"
[logging]
level = "info"

[time]
source = "cpu_time"

[plot]
output_file = "configured.svg"
metrics = { time = "cpu_time" }
"#;

fn main() -> resource_meter::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("resource_meter=info"))
        .init();

    let config = match env::args().nth(1) {
        Some(path) => MeterConfig::from_file(path)?,
        None => MeterConfig::from_toml_str(DEFAULT_CONFIG)?,
    };

    let output_dir = env::temp_dir().join("resource_meter_config");
    let options = config.plot_options().clone().with_output_dir(&output_dir);

    let time = config.time_collector()?;
    let calls = config.call_collector()?;

    for round in 1..=3_u64 {
        let label = format!("round {round}");

        calls.measure(&label, || {
            time.measure(&label, || {
                let spin = (0..round * 200_000).fold(0_u64, u64::wrapping_add);
                black_box(spin);
                thread::sleep(Duration::from_millis(10));
            })
        })??;
    }

    time.summarize();

    // Records written by an earlier run can be compared with live ones.
    let saved = output_dir.join("calls.json");
    calls.export("json".parse()?, &saved)?;
    let reloaded = RecordSet::new("calls", read_json(&saved)?);

    match plot_stats(&[&time, &reloaded], &options)? {
        PlotOutcome::Written(path) => println!("chart written to {}", path.display()),
        PlotOutcome::NothingToPlot(reason) => println!("no chart: {reason}"),
        other => println!("{other:?}"),
    }

    Ok(())
}
