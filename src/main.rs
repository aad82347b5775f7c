//! Metal Price Analyzer - LME copper, aluminum and iron price dashboard.

mod app;
mod cli;
mod color;
mod config;
mod data;
mod export;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use app::DashboardApp;
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;

/// Analyze and export historical LME metal price data
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file (can also be set via METAL_DASHBOARD_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the LME_*.csv files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<cli::Command>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = DashboardConfig::discover(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    match args.command {
        Some(command) => cli::run(command, &config, &mut std::io::stdout().lock()),
        None => run_gui(config),
    }
}

fn run_gui(config: DashboardConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Metal Price Analyzer",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
    .map_err(|e| anyhow!("running dashboard: {e}"))
}
