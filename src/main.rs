use anyhow::Context;
use clap::Parser;
use eframe::egui;
use okr_dashboard::common::AppPaths;
use okr_dashboard::gui::DashboardApp;
use okr_dashboard::logging;
use okr_dashboard::settings::Settings;
use okr_dashboard::store::storage::FileStorage;
use okr_dashboard::store::Store;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "okr_dashboard")]
#[command(about = "Personal OKR dashboard", long_about = None)]
struct Cli {
    /// Directory holding the snapshot and log files
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Enable debug logging regardless of the saved settings
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let paths = AppPaths::resolve(cli.data_dir.as_deref());
    let settings = Settings::load(paths.snapshot_file()).unwrap_or_default();
    logging::init(
        cli.debug || settings.debug_logging,
        Some(paths.log_file()),
    );
    tracing::info!(data_dir = %paths.data_dir().display(), "starting");

    let store = Store::open(Box::new(FileStorage::new(paths.snapshot_file())))
        .context("opening the dashboard state")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("OKR Dashboard")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "OKR Dashboard",
        native_options,
        Box::new(move |cc| Box::new(DashboardApp::new(&cc.egui_ctx, store))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
