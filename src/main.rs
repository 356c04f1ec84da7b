mod engine;
mod model;
mod ui;

use eframe::egui;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::engine::llm_client::DialogueGateway;
use crate::model::settings::Settings;

fn main() -> eframe::Result<()> {
    init_tracing();
    info!("=== Village AI startup ===");

    let settings = ui::settings_io::load_settings();
    info!(base_url = %settings.base_url, model = %settings.model, "settings loaded");
    probe_dialogue_service(&settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Village AI Demo")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Village AI Demo",
        options,
        Box::new(move |_cc| Ok(Box::new(ui::app::VillageApp::new(settings)))),
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Logs whether the dialogue service answers. Runs off the main thread.
fn probe_dialogue_service(settings: &Settings) {
    let gateway = match DialogueGateway::new(settings) {
        Ok(gateway) => gateway,
        Err(err) => {
            warn!(error = %err, "could not build dialogue client");
            return;
        }
    };

    let spawned = std::thread::Builder::new()
        .name("probe".into())
        .spawn(move || match gateway.test_connection() {
            Ok(status) => info!("{status}"),
            Err(err) => warn!(error = %err, "dialogue service unreachable; villagers will apologise"),
        });

    if let Err(err) = spawned {
        warn!(error = %err, "could not start connection probe");
    }
}
