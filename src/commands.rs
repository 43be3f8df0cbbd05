use crate::config::Config;
use crate::console::Console;
use crate::conversation::ConversationController;
use crate::llm::GeminiClient;
use crate::typing::TypingEffect;
use crate::ui;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::info;

/// Shown when no API key is configured anywhere
pub const MISSING_KEY_MESSAGE: &str =
    "GOOGLE_API_KEY not found. Add it to ~/.multibot/config.toml or a .env file.";

/// Build the Gemini client, or fail with a hint about where the key goes
pub fn client_for(config: &Config) -> Result<GeminiClient> {
    if !config.has_api_key() {
        bail!(MISSING_KEY_MESSAGE);
    }
    let client = GeminiClient::new(config).context("Failed to set up the Gemini client")?;
    Ok(client)
}

/// Typing effect as configured under `[ui]`
pub fn typing_for(config: &Config) -> TypingEffect {
    if config.ui.typing_effect {
        TypingEffect::new(config.typing_delay())
    } else {
        TypingEffect::disabled()
    }
}

/// Interactive main menu
pub async fn menu(config: &Config) -> Result<()> {
    let client = client_for(config)?;
    info!("starting main menu");
    Console::stdio(typing_for(config))
        .menu(&client, &config.chat_model)
        .await
}

/// One prompt, one response
pub async fn ask(config: &Config, prompt: String) -> Result<()> {
    let client = client_for(config)?;
    Console::stdio(typing_for(config))
        .ask(&client, Some(prompt))
        .await
}

/// Multi-turn chat, line based or full screen
pub async fn chat(config: &Config, tui: bool, model: Option<String>) -> Result<()> {
    let client = client_for(config)?;
    let model = model.unwrap_or_else(|| config.chat_model.clone());
    info!(model = %model, tui, "starting chat");

    let mut controller = ConversationController::new(client, model);
    if tui {
        ui::run_chat(controller, typing_for(config)).await
    } else {
        Console::stdio(typing_for(config)).chat(&mut controller).await
    }
}

/// Ask about an image file
pub async fn image(config: &Config, path: PathBuf, prompt: Option<String>) -> Result<()> {
    let client = client_for(config)?;
    Console::stdio(typing_for(config))
        .image(&client, Some(path), prompt)
        .await
}

/// Show the configuration, or store a new API key
pub fn config(config: &mut Config, set_key: Option<String>) -> Result<()> {
    if let Some(key) = set_key {
        let key = key.trim();
        if key.is_empty() {
            bail!("API key cannot be empty.");
        }

        config.set_api_key(key.to_string());
        config.save()?;
        info!("API key updated");
        println!("✅ API key saved to {}", config.config_path().display());
        return Ok(());
    }

    println!("{}", describe(config));
    Ok(())
}

/// Human-readable summary of the configuration
pub fn describe(config: &Config) -> String {
    let key = config
        .masked_api_key()
        .unwrap_or_else(|| "not set".to_string());

    let mut out = String::from("⚙️ MultiBot configuration\n");
    out.push_str(&"=".repeat(40));
    out.push('\n');
    out.push_str(&format!("Config file:   {}\n", config.config_path().display()));
    out.push_str(&format!("Log file:      {}\n", config.log_path().display()));
    out.push_str(&format!("API key:       {}\n", key));
    out.push_str(&format!("Base URL:      {}\n", config.base_url));
    out.push_str(&format!("Text model:    {}\n", config.text_model));
    out.push_str(&format!("Chat model:    {}\n", config.chat_model));
    out.push_str(&format!("Vision model:  {}\n", config.vision_model));
    out.push_str(&format!("Timeout:       {}s\n", config.request_timeout_secs));
    out.push_str(&format!(
        "Typing effect: {}",
        if config.ui.typing_effect {
            format!("on ({} ms per character)", config.ui.typing_delay_ms)
        } else {
            "off".to_string()
        }
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::API_KEY_ENV;
    use serial_test::serial;

    fn config_without_key() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        (dir, config)
    }

    #[test]
    #[serial]
    fn missing_key_is_reported() {
        temp_env::with_var_unset(API_KEY_ENV, || {
            let (_dir, config) = config_without_key();
            let err = client_for(&config).unwrap_err();
            assert_eq!(err.to_string(), MISSING_KEY_MESSAGE);
        });
    }

    #[test]
    #[serial]
    fn key_from_config_builds_client() {
        temp_env::with_var_unset(API_KEY_ENV, || {
            let (_dir, mut config) = config_without_key();
            config.set_api_key("test-key-1234".to_string());
            assert!(client_for(&config).is_ok());
        });
    }

    #[test]
    #[serial]
    fn set_key_saves_config() {
        temp_env::with_var_unset(API_KEY_ENV, || {
            let (dir, mut config) = config_without_key();
            super::config(&mut config, Some(" new-key-9876 ".to_string())).unwrap();

            let reloaded = Config::load_from(dir.path()).unwrap();
            assert_eq!(reloaded.get_api_key().as_deref(), Some("new-key-9876"));
            assert!(super::config(&mut config, Some("  ".to_string())).is_err());
        });
    }

    #[test]
    fn typing_effect_follows_ui_settings() {
        let (_dir, mut config) = config_without_key();
        assert!(typing_for(&config).is_enabled());

        config.ui.typing_effect = false;
        assert!(!typing_for(&config).is_enabled());
    }

    #[test]
    #[serial]
    fn describe_masks_key() {
        temp_env::with_var_unset(API_KEY_ENV, || {
            let (_dir, mut config) = config_without_key();
            assert!(describe(&config).contains("API key:       not set"));

            config.set_api_key("abcdefgh1234".to_string());
            let text = describe(&config);
            assert!(text.contains("****1234"));
            assert!(!text.contains("abcdefgh"));
        });
    }
}
