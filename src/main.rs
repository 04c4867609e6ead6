use anyhow::{anyhow, Context};
use eframe::egui;

use titanic_dashboard::app::DashboardApp;
use titanic_dashboard::config::Config;
use titanic_dashboard::data::loader;
use titanic_dashboard::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env();
    let dataset = loader::load_file(&config.data_path)
        .inspect_err(|e| log::error!("Failed to load dataset: {e}"))
        .with_context(|| format!("loading {}", config.data_path.display()))?;

    let state = AppState::new(dataset);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([900.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Titanic Passenger Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("running dashboard window: {e}"))
}
