use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use resvg::{tiny_skia, usvg};

use crate::visualize::{Panel, Section};
use crate::{ChartPlan, Error, PlotOptions, Result};

const FONT: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);

const TITLE_HEIGHT: u32 = 60;
const LEGEND_WIDTH: u32 = 280;
const LEGEND_LINE_HEIGHT: i32 = 20;

// Headroom above the tallest bar for its annotation.
const Y_MAX: f64 = 1.1;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Draws `plan` and writes it to the output path of `options`, as SVG or PNG depending on the
/// file extension.
pub(crate) fn write_figure(plan: &ChartPlan, options: &PlotOptions) -> Result<PathBuf> {
    let dir = options.output_dir();
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let svg = render_svg(plan, options.width(), options.panel_height())?;

    let path = options.output_path();
    let bytes = if is_svg(&path) {
        svg.into_bytes()
    } else {
        rasterize_png(&svg)?
    };

    fs::write(&path, bytes).map_err(|e| Error::io(&path, e))?;

    Ok(path)
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("svg"))
}

#[cfg_attr(test, mutants::skip)] // Layout details are only visible in the drawn figure.
pub(crate) fn render_svg(plan: &ChartPlan, width: u32, panel_height: u32) -> Result<String> {
    let rows = u32::try_from(plan.rows()).unwrap_or(u32::MAX);
    let height = panel_height.saturating_mul(rows).saturating_add(TITLE_HEIGHT);

    let mut svg = String::new();

    {
        let root = SVGBackend::with_string(&mut svg, (width.saturating_add(LEGEND_WIDTH), height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(Error::render)?;

        let (charts, legend) = root.split_horizontally(width);
        let charts = charts
            .titled(plan.title(), (FONT, 24))
            .map_err(Error::render)?;

        let cells = charts.split_evenly((plan.rows(), plan.columns()));
        let ids = plan.sections().iter().map(Section::id).collect::<Vec<_>>();

        for panel in plan.panels() {
            if let Some(cell) = cells.get(panel.slot()) {
                draw_panel(cell, panel, &ids)?;
            }
        }

        draw_legend(&legend, plan.sections())?;

        root.present().map_err(Error::render)?;
    }

    Ok(svg)
}

#[cfg_attr(test, mutants::skip)] // Layout details are only visible in the drawn figure.
fn draw_panel(cell: &Area<'_>, panel: &Panel, ids: &[&str]) -> Result<()> {
    let count = panel.bars().len();

    let mut chart = ChartBuilder::on(cell)
        .caption(panel.title(), (FONT, 16))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..count).into_segmented(), 0.0..Y_MAX)
        .map_err(Error::render)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(count)
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(index) => ids
                .get(*index)
                .map(|id| (*id).to_string())
                .unwrap_or_default(),
            SegmentValue::Exact(_) | SegmentValue::Last => String::new(),
        })
        .y_label_formatter(&|value| format!("{value:.1}"))
        .x_desc("Profiled Sections (S#)")
        .y_desc("Normalized Value (0-1)")
        .draw()
        .map_err(Error::render)?;

    chart
        .draw_series(panel.bars().iter().enumerate().map(|(index, bar)| {
            Rectangle::new(
                [
                    (SegmentValue::Exact(index), 0.0),
                    (SegmentValue::Exact(index.saturating_add(1)), bar.normalized()),
                ],
                BAR_COLOR.filled(),
            )
        }))
        .map_err(Error::render)?;

    let annotation_style =
        TextStyle::from((FONT, 12).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));

    chart
        .draw_series(panel.bars().iter().enumerate().map(|(index, bar)| {
            Text::new(
                bar.annotation(),
                (SegmentValue::CenterOf(index), bar.normalized()),
                annotation_style.clone(),
            )
        }))
        .map_err(Error::render)?;

    Ok(())
}

#[cfg_attr(test, mutants::skip)] // Layout details are only visible in the drawn figure.
fn draw_legend(area: &Area<'_>, sections: &[Section]) -> Result<()> {
    let style = TextStyle::from((FONT, 14).into_font());

    let lines = ["Section Mapping:".to_string()].into_iter().chain(
        sections
            .iter()
            .map(|section| format!("{}: {}", section.id(), section.label())),
    );

    let mut y = i32::try_from(TITLE_HEIGHT).unwrap_or(i32::MAX);

    for line in lines {
        area.draw(&Text::new(line, (10, y), style.clone()))
            .map_err(Error::render)?;
        y = y.saturating_add(LEGEND_LINE_HEIGHT);
    }

    Ok(())
}

#[cfg_attr(test, mutants::skip)] // Pixel output is not inspected by tests.
fn rasterize_png(svg: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options).map_err(Error::render)?;
    let size = tree.size().to_int_size();

    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::render("the figure has zero size"))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(Error::render)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{Metrics, RecordSet, StatRecord};

    fn plan() -> ChartPlan {
        let calls = RecordSet::new(
            "calls",
            vec![
                StatRecord::new("fetch", Metrics::new().with("call_count", 3_i64)),
                StatRecord::new("parse", Metrics::new().with("call_count", 12_i64)),
            ],
        );

        ChartPlan::build(&[&calls], &PlotOptions::new()).unwrap()
    }

    #[test]
    fn svg_contains_titles_annotations_and_legend() {
        let svg = render_svg(&plan(), 800, 300).unwrap();

        assert!(svg.contains("<svg"), "{svg}");
        assert!(svg.contains("Profiling Statistics (Normalized)"));
        assert!(svg.contains("Metric: call_count (counts)"));
        assert!(svg.contains("12.00"));
        assert!(svg.contains("S2: parse"));
    }

    #[test]
    fn svg_extension_is_detected_case_insensitively() {
        assert!(is_svg(Path::new("out/chart.SVG")));
        assert!(!is_svg(Path::new("out/chart.png")));
        assert!(!is_svg(Path::new("out/chart")));
    }

    #[test]
    fn writes_svg_into_created_directory() {
        let dir = tempfile::tempdir().unwrap();
        let options = PlotOptions::new()
            .with_output_dir(dir.path().join("charts"))
            .with_output_file("stats.svg");

        let path = write_figure(&plan(), &options).unwrap();

        assert_eq!(path, dir.path().join("charts").join("stats.svg"));
        assert!(fs::read_to_string(&path).unwrap().contains("<svg"));
    }
}
