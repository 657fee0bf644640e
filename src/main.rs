use eframe::egui;

use clipfeed::settings::{JsonFileStore, KeyValueStore, MemoryStore, Settings};

mod app;

use app::FeedApp;

/// Settings file location, overridable for multiple profiles.
const SETTINGS_ENV: &str = "CLIPFEED_SETTINGS";
const DEFAULT_SETTINGS_PATH: &str = "clipfeed-settings.json";

fn main() {
    env_logger::init();

    let settings_path =
        std::env::var(SETTINGS_ENV).unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 820.0])
            .with_min_inner_size([320.0, 480.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Clipfeed",
        options,
        Box::new(move |cc| {
            let settings = Settings::load(open_store(&settings_path))?;
            Ok(Box::new(FeedApp::new(cc, settings)))
        }),
    );

    if let Err(e) = result {
        log::error!("Clipfeed exited with error: {}", e);
        std::process::exit(1);
    }
}

/// File-backed store, or an in-memory one when the file is unusable.
fn open_store(path: &str) -> Box<dyn KeyValueStore> {
    match JsonFileStore::open(path) {
        Ok(store) => {
            log::info!("settings loaded from {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            log::error!("{}; settings will not persist this session", e);
            Box::new(MemoryStore::new())
        }
    }
}
