use eframe::egui;

use pull_refresh::mobile::RefreshConfig;

mod app;

use app::feed::FeedSource;
use app::WorkoutApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 820.0])
            .with_min_inner_size([320.0, 480.0]),
        ..Default::default()
    };

    let source = FeedSource::from_env();
    let config = RefreshConfig::default();

    eframe::run_native(
        "Workouts",
        options,
        Box::new(
            move |cc| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
                let app = WorkoutApp::new(&cc.egui_ctx, source, config)?;
                Ok(Box::new(app))
            },
        ),
    )
}
