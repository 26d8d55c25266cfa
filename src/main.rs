#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use gantt_scheduler::config::Settings;
use gantt_scheduler::logging::init_logging;

fn main() -> eframe::Result<()> {
    let loaded = Settings::load_or_default();
    init_logging(loaded.settings.log_level());
    loaded.report();
    let settings = loaded.settings;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Gantt Scheduler"),
        ..Default::default()
    };

    eframe::run_native(
        "Gantt Scheduler",
        options,
        Box::new(move |cc| Ok(Box::new(app::GanttApp::new(cc, &settings)))),
    )
}
