pub mod api; // HTTP adapter
pub mod config;
pub mod core_state; // Transport-agnostic state
pub mod models;
pub mod db;
pub mod vitals; // Validation + assessment engine
pub mod diet; // Diet and exercise plans
pub mod pregnancy; // Pregnancy calculator and tracker
pub mod records; // Health records
pub mod connections; // Doctor-patient linking
pub mod chat; // Messages + live hub
pub mod users; // Directory

use tracing_subscriber::EnvFilter;

/// Initialize logging, read settings from the environment and serve until Ctrl-C.
pub async fn run() -> Result<(), api::ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("HealthBridge starting v{}", config::APP_VERSION);

    let settings = config::Settings::from_env();
    api::serve(settings).await
}
