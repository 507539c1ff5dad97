//! Normalized bar charts comparing records of several collectors.
//!
//! Collectors measure different things in different units, so every metric gets its own panel
//! with values scaled into `[0, 1]` and the raw value written above each bar. Labels are aligned
//! across collectors and shown as short identifiers (`S1`, `S2`, ...) explained in a legend.

mod options;
mod plan;
mod render;
mod units;

use std::path::PathBuf;

pub use options::PlotOptions;
pub use plan::{Bar, ChartPlan, EmptyChart, Panel, Section};
pub use units::Unit;

use crate::{RecordSource, Result};

/// What [`plot_stats()`] did.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PlotOutcome {
    /// The figure was written to this path.
    Written(PathBuf),

    /// There was nothing to draw, so no file was written.
    NothingToPlot(EmptyChart),
}

/// Draws one figure comparing the records of `sources` and writes it to
/// [`PlotOptions::output_path()`].
///
/// Having nothing to plot is not an error: the reason is logged and returned as
/// [`PlotOutcome::NothingToPlot`].
///
/// # Errors
///
/// Returns an error if the output directory cannot be created, the figure cannot be drawn or
/// the file cannot be written.
///
/// # Examples
///
/// ```
/// use resource_meter::{CallCollector, PlotOptions, PlotOutcome, TimeCollector, plot_stats};
///
/// let time = TimeCollector::default();
/// let calls = CallCollector::default();
///
/// let work = time.measure_function("work", |n: u64| (0..n).sum::<u64>());
/// let counted = calls.measure_function("work", move |n: u64| work.call((n,)));
/// counted.call((1_000,)).unwrap().unwrap();
///
/// let dir = tempfile::tempdir().unwrap();
/// let options = PlotOptions::new()
///     .with_output_dir(dir.path())
///     .with_output_file("work.svg");
///
/// let outcome = plot_stats(&[&time, &calls], &options).unwrap();
///
/// assert_eq!(outcome, PlotOutcome::Written(dir.path().join("work.svg")));
/// ```
pub fn plot_stats(sources: &[&dyn RecordSource], options: &PlotOptions) -> Result<PlotOutcome> {
    let plan = match ChartPlan::build(sources, options) {
        Ok(plan) => plan,
        Err(reason) => {
            tracing::info!(target: "resource_meter", "{reason}");
            return Ok(PlotOutcome::NothingToPlot(reason));
        }
    };

    let path = render::write_figure(&plan, options)?;

    tracing::info!(
        target: "resource_meter",
        path = %path.display(),
        "combined profiling plot saved"
    );

    Ok(PlotOutcome::Written(path))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fs;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::{Metrics, RecordSet, StatRecord};

    assert_impl_all!(PlotOptions: Send, Sync);
    assert_impl_all!(ChartPlan: Send, Sync);
    assert_impl_all!(PlotOutcome: Send, Sync);

    #[test]
    fn nothing_to_plot_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("charts");
        let options = PlotOptions::new().with_output_dir(&output_dir);

        let empty = RecordSet::new("time", Vec::new());
        let outcome = plot_stats(&[&empty], &options).unwrap();

        assert_eq!(outcome, PlotOutcome::NothingToPlot(EmptyChart::NoLabels));
        assert!(!output_dir.exists());
    }

    #[test]
    fn all_zero_metrics_write_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = PlotOptions::new().with_output_dir(dir.path());

        let idle = RecordSet::new(
            "network",
            vec![StatRecord::new("idle", Metrics::new().with("bytes_sent", 0_i64))],
        );
        let outcome = plot_stats(&[&idle], &options).unwrap();

        assert_eq!(outcome, PlotOutcome::NothingToPlot(EmptyChart::AllZero));
        assert!(!options.output_path().exists());
    }

    #[test]
    fn writes_png_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let options = PlotOptions::new().with_output_dir(dir.path());

        let time = RecordSet::new(
            "time",
            vec![StatRecord::new("t1", Metrics::new().with("execution_time", 0.1))],
        );
        let outcome = plot_stats(&[&time], &options).unwrap();

        let path = match outcome {
            PlotOutcome::Written(path) => path,
            other => panic!("expected a written figure, got {other:?}"),
        };

        assert_eq!(path.extension().unwrap(), "png");

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}
