// ./src/config.rs

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::logging::level_from_str;

const CONFIG_PATH: &str = "./zync.toml";

/// Tunable knobs for the ledger demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory for the persistent record store.
    pub store_path: String,
    /// Live-feed size for the compact recent view.
    pub recent_feed_limit: usize,
    /// Live-feed size for the explorer view.
    pub explorer_feed_limit: usize,
    /// Artificial delay of the simulated proof check, in milliseconds.
    pub verify_delay_ms: u64,
    /// Delay before a successful submission clears the input form.
    pub form_reset_delay_ms: u64,
    /// Upper bound on the shielding secret length, in characters.
    pub secret_max_len: usize,
    /// Log level name: off, error, warn, info, debug, trace.
    pub log_level: String,
}

impl LedgerConfig {
    /// Creates a new `LedgerConfig` with default values.
    pub fn new() -> Self {
        Self {
            store_path: "./zync_db".to_string(),
            recent_feed_limit: 15,
            explorer_feed_limit: 50,
            verify_delay_ms: 1500,
            form_reset_delay_ms: 3000,
            secret_max_len: 64,
            log_level: "info".to_string(),
        }
    }

    /// Loads the configuration from `zync.toml`. If the file doesn't exist,
    /// it returns the default configuration.
    pub fn load() -> io::Result<Self> {
        let path = Path::new(CONFIG_PATH);
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents).unwrap_or_else(|_| {
                eprintln!("Failed to parse {}, using default config.", CONFIG_PATH);
                Self::new()
            });
            Ok(config)
        } else {
            Ok(Self::new())
        }
    }

    /// Saves the current configuration to `zync.toml`.
    pub fn save(&self) -> io::Result<()> {
        let contents =
            toml::to_string(self).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        fs::write(CONFIG_PATH, contents)
    }

    pub fn verify_delay(&self) -> Duration {
        Duration::from_millis(self.verify_delay_ms)
    }

    pub fn form_reset_delay(&self) -> Duration {
        Duration::from_millis(self.form_reset_delay_ms)
    }

    pub fn level_filter(&self) -> LevelFilter {
        level_from_str(&self.log_level)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::new()
    }
}
