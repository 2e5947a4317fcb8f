pub mod config;
pub mod db;
pub mod feedback;
pub mod models;
pub mod questionnaire; // Symptom questionnaire + step-by-step session
pub mod records; // Patients, appointments, medical records
pub mod suggestions; // Rule-based condition suggestions
pub mod treatment; // OTC medicines + home remedies per condition

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins over the default filter.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!("{} v{} tracing ready", config::APP_NAME, config::APP_VERSION);
}
