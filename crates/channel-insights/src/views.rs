//! Dispatch of the views requested on the command line.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use insights_core::models::ChannelTable;
use insights_core::settings::ViewRequest;
use insights_core::Result;
use insights_data::aggregator::ChannelAggregator;
use insights_ui::{charts, table_view};
use tracing::{error, info};

use crate::bootstrap::ensure_output_dir;

/// Where and how view output goes.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub output_dir: PathBuf,
    /// Print statistics and rankings as JSON instead of tables.
    pub json: bool,
}

/// Result of producing one view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput {
    /// A chart file was written.
    Chart(PathBuf),
    /// Text for stdout.
    Lines(Vec<String>),
}

pub fn view_label(view: &ViewRequest) -> &'static str {
    match view {
        ViewRequest::HourlyChart => "hourly chart",
        ViewRequest::DayHourHeatmap { .. } => "day/hour heatmap",
        ViewRequest::WeekdayChart => "weekday chart",
        ViewRequest::Statistics => "statistics",
        ViewRequest::MostActive { .. } => "most active members",
    }
}

/// Compute and render a single view.
pub fn produce_view(
    table: &ChannelTable,
    view: &ViewRequest,
    options: &OutputOptions,
) -> Result<ViewOutput> {
    match view {
        ViewRequest::HourlyChart => {
            let hist = ChannelAggregator::hourly_histogram(table);
            charts::write_hourly_chart(&hist, &options.output_dir).map(ViewOutput::Chart)
        }
        ViewRequest::DayHourHeatmap { users } => {
            let matrix = ChannelAggregator::day_hour_matrix(table, users);
            charts::write_day_hour_heatmap(&matrix, &options.output_dir).map(ViewOutput::Chart)
        }
        ViewRequest::WeekdayChart => {
            let hist = ChannelAggregator::weekday_histogram(table);
            charts::write_weekday_chart(&hist, &options.output_dir).map(ViewOutput::Chart)
        }
        ViewRequest::Statistics => {
            let stats = ChannelAggregator::summary_statistics(table)?;
            if options.json {
                Ok(ViewOutput::Lines(vec![serde_json::to_string_pretty(&stats)?]))
            } else {
                Ok(ViewOutput::Lines(table_view::render_statistics_table(&stats)))
            }
        }
        ViewRequest::MostActive { n } => {
            let ranking = ChannelAggregator::most_active(table, Some(*n))?;
            if options.json {
                Ok(ViewOutput::Lines(vec![serde_json::to_string_pretty(&ranking)?]))
            } else {
                Ok(ViewOutput::Lines(table_view::render_ranking_table(&ranking)))
            }
        }
    }
}

/// Create the chart directory when a chart is requested, then run the views.
///
/// If the directory cannot be created, every chart view counts as failed and
/// the text views still run.  Returns the number of views that failed.
pub fn run_requested_views<W: Write>(
    table: &ChannelTable,
    views: &[ViewRequest],
    options: &OutputOptions,
    out: &mut W,
) -> anyhow::Result<usize> {
    if !views.iter().any(ViewRequest::is_chart) {
        return run_views(table, views, options, out);
    }
    match ensure_output_dir(&options.output_dir) {
        Ok(()) => run_views(table, views, options, out),
        Err(err) => {
            let (chart_views, text_views): (Vec<ViewRequest>, Vec<ViewRequest>) =
                views.iter().cloned().partition(ViewRequest::is_chart);
            for view in &chart_views {
                error!("Could not produce {}: {:#}", view_label(view), err);
            }
            Ok(chart_views.len() + run_views(table, &text_views, options, out)?)
        }
    }
}

/// Produce every requested view in order, writing text output to `out`.
///
/// A failing view is logged and skipped; the remaining views still run.
/// Returns the number of views that failed.
pub fn run_views<W: Write>(
    table: &ChannelTable,
    views: &[ViewRequest],
    options: &OutputOptions,
    out: &mut W,
) -> anyhow::Result<usize> {
    let mut failures = 0usize;
    for view in views {
        match produce_view(table, view, options) {
            Ok(ViewOutput::Chart(path)) => {
                info!("{} saved to {}", view_label(view), path.display());
            }
            Ok(ViewOutput::Lines(lines)) => {
                for line in lines {
                    writeln!(out, "{}", line).context("failed to write to stdout")?;
                }
            }
            Err(err) => {
                error!("Could not produce {}: {}", view_label(view), err);
                failures += 1;
            }
        }
    }
    Ok(failures)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
