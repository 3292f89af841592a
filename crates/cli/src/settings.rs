use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Remote service configuration: endpoint, credential, and target
/// identity group, persisted as JSON under the platform config dir.
///
/// Values left empty in the file must be supplied on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub endpoint: String,
    pub subscription_key: String,
    pub group_id: String,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_retry_delay_ms() -> u64 {
    facetrace_core::shared::constants::RETRY_DELAY.as_millis() as u64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            subscription_key: String::new(),
            group_id: String::new(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Facetrace").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(Self::load_from)
            .unwrap_or_default()
    }

    pub fn load_from(path: PathBuf) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(path);
        }
    }

    pub fn save_to(&self, path: PathBuf) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(json) = serde_json::to_string_pretty(self) {
            let _ = fs::write(path, json);
        }
    }
}
