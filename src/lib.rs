pub mod config;
pub mod models;
pub mod store;
pub mod schedule;
pub mod adherence;
pub mod i18n;
pub mod resolver;
pub mod tracker;
pub mod voice;
pub mod assistant;
pub mod console;

use tracing_subscriber::EnvFilter;

pub fn run() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let store = store::MedicationStore::new(Box::new(store::FileStore::open_default()));
    let tracker = tracker::MedicationTracker::open(store);
    console::Console::new(tracker).run()
}
