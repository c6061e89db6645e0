use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use picnest_db::StoreConfig;

/// Build the store config from the environment (after `.env` is loaded).
/// `path_override` comes from the command line and wins over
/// `PICNEST_DB_PATH`.
pub fn store_config(path_override: Option<PathBuf>) -> Result<StoreConfig> {
    let path = path_override.unwrap_or_else(|| {
        std::env::var("PICNEST_DB_PATH")
            .unwrap_or_else(|_| "picnest.db".into())
            .into()
    });

    let mut config = StoreConfig::new(path);

    if let Ok(raw) = std::env::var("PICNEST_READERS") {
        config.readers = raw
            .parse()
            .with_context(|| format!("PICNEST_READERS must be a number, got '{}'", raw))?;
    }
    if let Ok(raw) = std::env::var("PICNEST_BUSY_TIMEOUT_MS") {
        let ms: u64 = raw
            .parse()
            .with_context(|| format!("PICNEST_BUSY_TIMEOUT_MS must be a number, got '{}'", raw))?;
        config.busy_timeout = Duration::from_millis(ms);
    }

    Ok(config)
}
