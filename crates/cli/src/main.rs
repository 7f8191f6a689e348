//! Neura CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive conversation (default)
//! - `ask`      — Single message, optionally with an image
//! - `analyze`  — Describe an image
//! - `models`   — List installed models
//! - `status`   — Show configuration and server health
//! - `memory`   — Inspect or clear the conversation store
//! - `init`     — Write a default config file

use clap::{Parser, Subcommand};
use neura_config::AppConfig;
use std::path::{Path, PathBuf};

mod commands;
mod repl;

#[derive(Parser)]
#[command(
    name = "neura",
    about = "Neura — a local assistant on top of Ollama",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Talk to the server through the configured reverse tunnel
    #[arg(long, global = true)]
    remote: bool,

    /// Read configuration from this file instead of ~/.neura/config.toml
    #[arg(long, global = true, env = "NEURA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively
    Chat {
        /// Clear the conversation memory before starting
        #[arg(long)]
        fresh: bool,

        /// Do not read or write conversation memory
        #[arg(long)]
        no_memory: bool,
    },

    /// Send a single message and print the reply
    Ask {
        message: String,

        /// Analyze this image, using the message as the prompt
        #[arg(short, long)]
        image: Option<PathBuf>,
    },

    /// Describe an image with the vision model
    Analyze {
        path: PathBuf,

        /// Prompt for the vision model
        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// List models installed on the server
    Models,

    /// Show configuration and server status
    Status,

    /// Manage conversation memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Show memory statistics
    Stats,

    /// Delete every stored message
    Clear {
        /// Required to actually delete
        #[arg(long)]
        confirm: bool,
    },

    /// Print the most recent messages
    Show {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
    let command = cli.command.unwrap_or(Commands::Chat {
        fresh: false,
        no_memory: false,
    });

    match command {
        Commands::Init { force } => commands::init::run(&config_path, force).await?,
        Commands::Chat { fresh, no_memory } => {
            commands::chat::run(load_config(&config_path, cli.remote)?, fresh, no_memory).await?
        }
        Commands::Ask { message, image } => {
            let config = load_config(&config_path, cli.remote)?;
            commands::ask::run(&config, &message, image).await?
        }
        Commands::Analyze { path, prompt } => {
            let config = load_config(&config_path, cli.remote)?;
            commands::analyze::run(&config, &path, prompt).await?
        }
        Commands::Models => commands::models::run(&load_config(&config_path, cli.remote)?).await?,
        Commands::Status => {
            let config = load_config(&config_path, cli.remote)?;
            commands::status::run(&config, &config_path).await?
        }
        Commands::Memory { action } => {
            let config = load_config(&config_path, cli.remote)?;
            match action {
                MemoryAction::Stats => commands::memory::stats(&config).await?,
                MemoryAction::Clear { confirm } => commands::memory::clear(&config, confirm).await?,
                MemoryAction::Show { limit } => commands::memory::show(&config, limit).await?,
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path, remote: bool) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config =
        AppConfig::load_with(Some(path)).map_err(|e| format!("Failed to load config: {e}"))?;
    if remote {
        config.use_tunnel();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_and_config_flag_parse_together() {
        let cli = Cli::parse_from(["neura", "init", "--force", "--config", "/tmp/neura.toml"]);
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/neura.toml")));
    }

    #[tokio::test]
    async fn init_repairs_a_file_that_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = [unterminated").unwrap();

        let err = load_config(&path, false).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load config"));

        commands::init::run(&path, true).await.unwrap();
        assert!(load_config(&path, false).is_ok());
    }
}
