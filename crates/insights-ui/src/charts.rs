//! SVG charts for the hourly, weekday and weekday/hour views.
//!
//! Every chart has a backend-generic `draw_*` function, a `*_svg` variant
//! that renders into a string, and a `write_*` variant that writes a fixed
//! file name into an output directory.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use insights_core::models::{
    weekday_name, DayHourMatrix, HourlyHistogram, WeekdayHistogram, HOURS_PER_DAY, WEEKDAYS,
};
use insights_core::{InsightsError, Result};

// ── Output files ──────────────────────────────────────────────────────────────

pub const HOURLY_CHART_FILE: &str = "posting_time_chart.svg";
pub const WEEKDAY_CHART_FILE: &str = "messages_per_weekday.svg";
pub const HEATMAP_FILE: &str = "heatmap_days_hours.svg";

const BAR_CHART_SIZE: (u32, u32) = (1000, 500);
const HEATMAP_SIZE: (u32, u32) = (1400, 1200);

const FONT: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(46, 139, 87);
const MISSING_CELL_COLOR: RGBColor = RGBColor(245, 245, 245);
const HEAT_LOW: RGBColor = RGBColor(255, 237, 160);
const HEAT_HIGH: RGBColor = RGBColor(189, 0, 38);

// ── Hourly ────────────────────────────────────────────────────────────────────

pub fn draw_hourly_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    hist: &HourlyHistogram,
) -> Result<()> {
    let labels: Vec<String> = (0..HOURS_PER_DAY).map(|h| h.to_string()).collect();
    draw_bar_chart(root, "Messages per hour", "Hour", &labels, &hist.counts)
}

pub fn hourly_chart_svg(hist: &HourlyHistogram) -> Result<String> {
    render_svg(BAR_CHART_SIZE, |root| draw_hourly_chart(root, hist))
}

/// Write the hourly chart to [`HOURLY_CHART_FILE`] inside `output_dir`.
pub fn write_hourly_chart(hist: &HourlyHistogram, output_dir: &Path) -> Result<PathBuf> {
    write_svg(output_dir, HOURLY_CHART_FILE, BAR_CHART_SIZE, |root| {
        draw_hourly_chart(root, hist)
    })
}

// ── Weekday ───────────────────────────────────────────────────────────────────

pub fn draw_weekday_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    hist: &WeekdayHistogram,
) -> Result<()> {
    let labels: Vec<String> = WEEKDAYS.iter().map(|d| weekday_name(*d).to_string()).collect();
    draw_bar_chart(root, "Messages per weekday", "Weekday", &labels, &hist.counts)
}

pub fn weekday_chart_svg(hist: &WeekdayHistogram) -> Result<String> {
    render_svg(BAR_CHART_SIZE, |root| draw_weekday_chart(root, hist))
}

/// Write the weekday chart to [`WEEKDAY_CHART_FILE`] inside `output_dir`.
pub fn write_weekday_chart(hist: &WeekdayHistogram, output_dir: &Path) -> Result<PathBuf> {
    write_svg(output_dir, WEEKDAY_CHART_FILE, BAR_CHART_SIZE, |root| {
        draw_weekday_chart(root, hist)
    })
}

// ── Weekday × hour heatmap ────────────────────────────────────────────────────

/// Draw the annotated heatmap: weekdays across, hours down (hour 0 on top).
///
/// Observed cells are shaded by count and labelled with it; missing cells
/// are left blank so they cannot be mistaken for a zero count.
pub fn draw_day_hour_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    matrix: &DayHourMatrix,
) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;

    let hours = HOURS_PER_DAY as f64;
    let mut chart = ChartBuilder::on(root)
        .caption("Most active hours per weekday", (FONT, 30))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..6.5f64, -0.5f64..(hours - 0.5))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(WEEKDAYS.len())
        .y_labels(HOURS_PER_DAY)
        .x_desc("Day")
        .y_desc("Hour")
        .axis_desc_style((FONT, 20))
        .x_label_formatter(&|x| {
            slot_index(*x, WEEKDAYS.len())
                .map(|i| weekday_name(WEEKDAYS[i]).to_string())
                .unwrap_or_default()
        })
        .y_label_formatter(&|y| {
            slot_index(*y, HOURS_PER_DAY)
                .map(|i| (HOURS_PER_DAY - 1 - i).to_string())
                .unwrap_or_default()
        })
        .draw()
        .map_err(render_err)?;

    let max = matrix.max_count().unwrap_or(0);
    let cells: Vec<(usize, usize, Option<u64>)> = WEEKDAYS
        .iter()
        .enumerate()
        .flat_map(|(d, day)| {
            matrix
                .row(*day)
                .iter()
                .enumerate()
                .map(move |(h, c)| (d, h, *c))
        })
        .collect();

    chart
        .draw_series(cells.iter().map(|&(d, h, count)| {
            let (x, y) = (d as f64, hour_to_y(h));
            let color = match count {
                Some(c) => heat_color(c, max),
                None => MISSING_CELL_COLOR,
            };
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
        }))
        .map_err(render_err)?;

    let label_style = |c: u64| {
        let color = if max > 0 && c * 2 > max { WHITE } else { BLACK };
        (FONT, 14)
            .into_font()
            .color(&color)
            .pos(Pos::new(HPos::Center, VPos::Center))
    };
    chart
        .draw_series(cells.iter().filter_map(|&(d, h, count)| {
            count.map(|c| Text::new(c.to_string(), (d as f64, hour_to_y(h)), label_style(c)))
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

pub fn day_hour_heatmap_svg(matrix: &DayHourMatrix) -> Result<String> {
    render_svg(HEATMAP_SIZE, |root| draw_day_hour_heatmap(root, matrix))
}

/// Write the heatmap to [`HEATMAP_FILE`] inside `output_dir`.
pub fn write_day_hour_heatmap(matrix: &DayHourMatrix, output_dir: &Path) -> Result<PathBuf> {
    write_svg(output_dir, HEATMAP_FILE, HEATMAP_SIZE, |root| {
        draw_day_hour_heatmap(root, matrix)
    })
}

// ── Shared drawing ────────────────────────────────────────────────────────────

/// One bar per label, centred on its integer slot.
fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    x_desc: &str,
    labels: &[String],
    counts: &[u64],
) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;

    let slots = labels.len();
    let y_max = counts.iter().copied().max().unwrap_or(0) as f64 * 1.1;
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 26))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(slots as f64 - 0.5), 0f64..y_max.max(1.0))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_desc(x_desc)
        .y_desc("Messages")
        .x_label_formatter(&|x| {
            slot_index(*x, slots)
                .and_then(|i| labels.get(i).cloned())
                .unwrap_or_default()
        })
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, c)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *c as f64)], BAR_COLOR.filled())
        }))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn render_svg<F>(size: (u32, u32), draw: F) -> Result<String>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw(&root)?;
    }
    Ok(svg)
}

fn write_svg<F>(output_dir: &Path, file_name: &str, size: (u32, u32), draw: F) -> Result<PathBuf>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
{
    let path = output_dir.join(file_name);
    {
        let root = SVGBackend::new(&path, size).into_drawing_area();
        draw(&root)?;
    }
    tracing::info!("Chart written to {}", path.display());
    Ok(path)
}

/// Index of the slot whose centre is `value`, if `value` sits on one.
fn slot_index(value: f64, slots: usize) -> Option<usize> {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= slots as f64 {
        return None;
    }
    Some(rounded as usize)
}

/// Hour 0 is drawn on the top row.
fn hour_to_y(hour: usize) -> f64 {
    (HOURS_PER_DAY - 1 - hour) as f64
}

/// Linear blend from [`HEAT_LOW`] to [`HEAT_HIGH`] by `count / max`.
fn heat_color(count: u64, max: u64) -> RGBColor {
    let t = if max == 0 {
        0.0
    } else {
        (count as f64 / max as f64).clamp(0.0, 1.0)
    };
    let mix = |lo: u8, hi: u8| (lo as f64 + (hi as f64 - lo as f64) * t).round() as u8;
    RGBColor(
        mix(HEAT_LOW.0, HEAT_HIGH.0),
        mix(HEAT_LOW.1, HEAT_HIGH.1),
        mix(HEAT_LOW.2, HEAT_HIGH.2),
    )
}

fn render_err<E: Display>(err: E) -> InsightsError {
    InsightsError::Render(err.to_string())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
