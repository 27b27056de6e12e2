//! File-backed loader for the chat relay configuration.

use crate::relay::RelayConfig;
use std::fs;
use std::path::PathBuf;

/// Loads the per-project webhook/alias table from a JSON file in the
/// platform-specific config directory. Read once at startup; the
/// resulting [`RelayConfig`] stays immutable for the session.
pub struct RelayConfigManager {
    path: PathBuf,
}

impl RelayConfigManager {
    /// Creates a manager bound to the platform-specific config path.
    pub fn new() -> Self {
        let dirs = directories::ProjectDirs::from("ru", "sovego", "issuedash")
            .expect("Could not determine config directory");
        let path = dirs.config_dir().join("chat-relay.json");
        Self { path }
    }

    /// Loads relay config from disk, falling back to an empty table on
    /// missing files or read/parse errors.
    pub fn load(&self) -> RelayConfig {
        if self.path.exists() {
            let content = fs::read_to_string(&self.path).unwrap_or_default();
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            RelayConfig::default()
        }
    }

    /// Persists relay config to disk, creating parent directories when
    /// needed.
    pub fn save(&self, config: &RelayConfig) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Default for RelayConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
