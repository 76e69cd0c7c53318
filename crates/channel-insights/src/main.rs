mod bootstrap;
mod views;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use insights_core::settings::Settings;
use insights_data::analysis::run_pipeline;

use crate::views::{run_requested_views, OutputOptions};

fn main() -> ExitCode {
    let settings = Settings::parse();

    if let Err(err) = bootstrap::setup_logging(settings.effective_log_level()) {
        eprintln!("{:#}", err);
    }

    match run(&settings) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            tracing::error!("{} view(s) failed", failures);
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Load the export, then produce each requested view.  Returns the number
/// of views that failed; load errors abort the run.
fn run(settings: &Settings) -> Result<usize> {
    tracing::info!("Channel Insights v{} starting", env!("CARGO_PKG_VERSION"));

    let output = run_pipeline(&settings.file)
        .with_context(|| format!("could not load {}", settings.file.display()))?;
    tracing::info!(
        "Loaded {} messages from {}",
        output.metadata.rows_loaded,
        settings.file.display()
    );

    let views = settings.requested_views();
    if views.is_empty() {
        tracing::warn!(
            "No view requested; pass -t, -w, -s, --days-hours or --most-active"
        );
        return Ok(0);
    }

    let options = OutputOptions {
        output_dir: settings.output_dir.clone(),
        json: settings.json_output(),
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_requested_views(&output.table, &views, &options, &mut out)
}
