use discord_client::DiscordApiClient;
use score_db::Database;

use crate::app::SyncContext;
use crate::config::AppConfig;

/// Load .env and config, open the store and build the API client.
pub fn init_foundation() -> Result<SyncContext, anyhow::Error> {
    load_dotenv();
    let config = AppConfig::load()?;

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = config.db_path();
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let api = DiscordApiClient::new(config.authorization.clone(), config.fetch_timeout)?;

    tracing::info!(
        channels = ?config.channels,
        page_size = config.page_size,
        resync_interval_secs = config.resync_interval.as_secs(),
        "Settings loaded"
    );
    Ok(SyncContext::new(db, api, config))
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
