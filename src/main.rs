use anyhow::Context;
use clap::{Parser, Subcommand};
use multibot::commands;
use multibot::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "multibot")]
#[command(version = "0.1.0")]
#[command(about = "Text, chat and image assistant for the Gemini API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Get a single text response
    Ask {
        /// The prompt; several words are joined with spaces
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Start an interactive chat conversation
    Chat {
        /// Full-screen chat instead of the line-based one
        #[arg(long)]
        tui: bool,
        /// Model to chat with instead of the configured one
        #[arg(long)]
        model: Option<String>,
    },
    /// Ask a question about an image file
    Image {
        path: PathBuf,
        /// Question about the image; asked interactively when omitted
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Show the configuration or store an API key
    Config {
        #[arg(long, value_name = "KEY")]
        set_key: Option<String>,
    },
}

/// Logs go to ~/.multibot/multibot.log so they never mix with terminal output
fn init_logging(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.home).context("Failed to create .multibot directory")?;
    let log_file =
        std::fs::File::create(config.log_path()).context("Failed to create log file")?;

    let filter =
        EnvFilter::try_from_env("MULTIBOT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    init_logging(&config)?;

    match cli.command {
        None => commands::menu(&config).await,
        Some(Commands::Ask { prompt }) => commands::ask(&config, prompt.join(" ")).await,
        Some(Commands::Chat { tui, model }) => commands::chat(&config, tui, model).await,
        Some(Commands::Image { path, prompt }) => commands::image(&config, path, prompt).await,
        Some(Commands::Config { set_key }) => commands::config(&mut config, set_key),
    }
}
