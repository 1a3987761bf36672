//! Runtime configuration for the sync layer and the module binary.

use std::path::PathBuf;
use std::time::Duration;

use crowdsource_client::config::{parse_var, ClientConfig, ConfigError};

/// Default debounce between the last field edit and its remote update.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2048;

/// Default directory for locally cached drafts.
pub const DEFAULT_CACHE_DIR: &str = ".crowdsource-cache";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub client: ClientConfig,
    pub debounce_ms: u64,
    pub cache_dir: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default              |
    /// |--------------------|----------------------|
    /// | `SYNC_DEBOUNCE_MS` | `2048`               |
    /// | `CACHE_DIR`        | `.crowdsource-cache` |
    ///
    /// Backend settings come from [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let client = ClientConfig::from_env()?;
        let debounce_ms = parse_var("SYNC_DEBOUNCE_MS", "u64", DEFAULT_DEBOUNCE_MS)?;
        let cache_dir = std::env::var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR));

        Ok(Self {
            client,
            debounce_ms,
            cache_dir,
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_debounce_is_2048ms() {
        let config = SyncConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(2048));
        assert_eq!(config.cache_dir, PathBuf::from(".crowdsource-cache"));
    }
}
