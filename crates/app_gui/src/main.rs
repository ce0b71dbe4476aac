mod app;

use app::UiApp;
use eframe::NativeOptions;
use mri_core::{AppConfig, AppContext, DEFAULT_CONFIG_FILE};

fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load_or_default(DEFAULT_CONFIG_FILE).unwrap_or_else(|e| {
        tracing::error!("{e}; falling back to defaults");
        AppConfig::default()
    });
    // Loaded once for the whole session; a failure is kept and shown.
    let context = AppContext::load(config);

    let options = NativeOptions::default();
    let title = format!("MRI Vision {}", env!("MRI_VISION_VERSION"));
    if let Err(e) = eframe::run_native(
        &title,
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(UiApp::new(context)))
        }),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}
