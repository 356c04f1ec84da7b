use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const BASE_URL_ENV_VAR: &str = "VILLAGE_AI_BASE_URL";

/// Persisted user settings. Unknown or missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,

    /// Fixed RNG seed for reproducible wandering.
    pub seed: Option<u64>,

    pub ui_scale: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:1234".into(),
            model: "mistral-nemo-instruct-2407".into(),
            temperature: 0.7,
            max_tokens: 150,
            timeout_secs: 20,
            seed: None,
            ui_scale: 1.0,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV_VAR) {
            let url = url.trim();
            if !url.is_empty() {
                self.base_url = url.trim_end_matches('/').to_string();
            }
        }
        self
    }
}
