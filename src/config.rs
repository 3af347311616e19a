use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_API_BASE_URL, DEFAULT_MAX_TOKENS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
};
use crate::session::Settings;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persistent application configuration, stored as TOML.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the gateway, e.g. `http://localhost:8080/api/v1/llm`.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Render message content as raw HTML instead of escaping it.
    pub trust_message_html: bool,
    pub default_model: Option<String>,
    pub default_max_tokens: u32,
    pub default_temperature: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            trust_message_html: false,
            default_model: None,
            default_max_tokens: DEFAULT_MAX_TOKENS,
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl AppConfig {
    pub fn config_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(CONFIG_DIR_NAME);
        path
    }

    pub fn config_file() -> PathBuf {
        let mut path = Self::config_dir();
        path.push(CONFIG_FILE_NAME);
        path
    }

    /// Loads the configuration from the user's config directory, writing the
    /// defaults there when no usable file exists.
    pub fn load() -> Self {
        let path = Self::config_file();
        if let Some(config) = Self::load_from(&path) {
            return config;
        }
        let default = Self::default();
        if let Err(e) = default.save_to(&path) {
            tracing::warn!("Could not write default config to {:?}: {:#}", path, e);
        }
        default
    }

    /// Reads a config file, returning `None` when it is missing or malformed.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_file())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create config dir: {:?}", dir))?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config: {:?}", path))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Initial completion settings for a new session.
    pub fn initial_settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.set_model(self.default_model.as_deref().unwrap_or(""));
        settings.set_max_tokens(self.default_max_tokens);
        settings.set_temperature(self.default_temperature);
        settings
    }
}
