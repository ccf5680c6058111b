use std::path::PathBuf;

use anyhow::{Context, Result};
use care_dash::app::CareDashApp;
use care_dash::config::DashboardConfig;
use care_dash::state::AppState;
use clap::Parser;
use eframe::egui;

/// Healthcare encounter dashboard.
///
/// Loads a CSV or Parquet file of patient encounters, cleans it and shows
/// filterable summary statistics and charts.
#[derive(Parser)]
#[command(name = "care-dash", version, about)]
struct Cli {
    /// Data file to load at startup (.csv, .txt, .parquet, .pq).
    data: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    let mut state = AppState::new(config);
    if let Some(path) = cli.data.or_else(|| state.config.data_path.clone()) {
        // A source named up front must load; no UI is shown otherwise.
        state
            .open(&path)
            .inspect_err(|e| log::error!("{e}"))
            .with_context(|| format!("loading {}", path.display()))?;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Healthcare Data Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CareDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
