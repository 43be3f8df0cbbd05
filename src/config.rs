use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the Gemini API
    pub google_api_key: Option<String>,

    /// Base URL of the Gemini REST API
    pub base_url: String,

    /// Model for single-turn text responses
    pub text_model: String,

    /// Model for multi-turn chat sessions
    pub chat_model: String,

    /// Model for image analysis
    pub vision_model: String,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,

    /// UI preferences
    pub ui: UiConfig,

    /// Multibot home directory, resolved at load time
    #[serde(skip)]
    pub home: PathBuf,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Reveal replies progressively instead of all at once
    pub typing_effect: bool,
    pub typing_delay_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            typing_effect: true,
            typing_delay_ms: 20,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            google_api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            chat_model: "gemini-2.5-flash".to_string(),
            vision_model: "gemini-2.0-flash".to_string(),
            request_timeout_secs: 60,
            ui: UiConfig::default(),
            home: home.join(".multibot"),
        }
    }
}

impl Config {
    /// Load configuration from `~/.multibot/config.toml`, after pulling in a
    /// `.env` file from the working directory if there is one
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let multibot_home = home.join(".multibot");

        fs::create_dir_all(&multibot_home).context("Failed to create .multibot directory")?;

        // Values already in the environment win over the .env file
        dotenv::dotenv().ok();

        Self::load_from(&multibot_home)
    }

    /// Load configuration from `config.toml` inside the given directory
    pub fn load_from(multibot_home: &Path) -> Result<Self> {
        let config_path = multibot_home.join("config.toml");

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config::default()
        };

        config.home = multibot_home.to_path_buf();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(&self.home).context("Failed to create .multibot directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(self.config_path(), content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.home.join("multibot.log")
    }

    /// Check if API key is configured
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }

    /// Get API key from config or environment
    pub fn get_api_key(&self) -> Option<String> {
        self.google_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty()))
    }

    /// Update API key
    pub fn set_api_key(&mut self, key: String) {
        self.google_api_key = Some(key);
    }

    /// API key with everything but the last four characters hidden
    pub fn masked_api_key(&self) -> Option<String> {
        self.get_api_key().map(|key| {
            let visible: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{}", visible)
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.ui.typing_delay_ms)
    }
}
