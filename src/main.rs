mod app;
mod color;
mod state;
mod ui;

use aqi_dashboard::config::AppConfig;
use app::AqiDashboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!("starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "India Air Quality Analytics Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(AqiDashboardApp::new(cc, &config)))),
    )
}
