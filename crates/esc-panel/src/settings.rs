//! Startup configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory. Variables already set win over the file.

use esc_core::config::{ConfigError, PanelConfig};
use log::{debug, info, warn};

pub fn load() -> Result<PanelConfig, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded settings from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file, using environment and defaults"),
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    let config = PanelConfig::from_lookup(|key| std::env::var(key).ok())?;
    info!(
        "ESC on GPIO {} via {}, pulse range {}..{}",
        config.esc.gpio,
        config.daemon_addr(),
        config.esc.range.min(),
        config.esc.range.max()
    );
    Ok(config)
}
