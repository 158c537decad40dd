//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod settings;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::settings::{apply_set, apply_unset, print_all, SettingError};
use crate::core::config::{CliOverrides, Config, SessionSettings};
use crate::logging::init_logging;
use crate::ui::chat_loop::run_chat;

#[derive(Parser, Debug)]
#[command(name = "parlance")]
#[command(version)]
#[command(about = "A terminal-based chat interface for OpenAI-compatible APIs")]
#[command(
    long_about = "Parlance is a full-screen terminal chat interface that connects to an \
OpenAI-compatible chat completion API. It streams responses as they arrive and keeps \
the whole conversation on screen.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    Your API key (required)\n\
  OPENAI_BASE_URL   Custom API base URL (optional, defaults to https://api.openai.com/v1)\n\
  PARLANCE_LOG      Log filter, e.g. 'parlance=debug' (enables file logging)\n\n\
Controls:\n\
  Enter / Ctrl+S    Send the message\n\
  Alt+Enter         Insert a newline\n\
  Esc               Cancel the reply in progress\n\
  Ctrl+L            Clear the draft\n\
  PageUp/PageDown   Scroll the conversation\n\
  Ctrl+C            Quit the application"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for chat
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL, overriding OPENAI_BASE_URL and the config file
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Wait for whole replies instead of streaming them
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Write diagnostic logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Set a configuration value
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the effective configuration
    Config,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            no_stream: self.no_stream,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    let overrides = args.overrides();
    match args.command.unwrap_or(Commands::Chat) {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let outcome = apply_set(&mut config, &key, &value);
            finish_setting(&mut config, outcome)
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            let outcome = apply_unset(&mut config, &key);
            finish_setting(&mut config, outcome)
        }
        Commands::Config => {
            let config = Config::load()?;
            print_all(&config);
            Ok(())
        }
        Commands::Chat => {
            let config = Config::load()?;
            let settings =
                match SessionSettings::resolve(&config, &overrides, |key| std::env::var(key).ok()) {
                    Ok(settings) => settings,
                    Err(message) => {
                        eprintln!("❌ {message}");
                        std::process::exit(1);
                    }
                };
            run_chat(settings).await
        }
    }
}

fn finish_setting(
    config: &mut Config,
    outcome: Result<String, SettingError>,
) -> Result<(), Box<dyn Error>> {
    match outcome {
        Ok(message) => {
            config
                .save()
                .map_err(|e| SettingError::ConfigError(e.to_string()))?;
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_defaults_to_chat() {
        let args = Args::try_parse_from(["parlance"]).expect("parse");
        assert!(args.command.is_none());
        assert!(!args.no_stream);
    }

    #[test]
    fn global_flags_become_overrides() {
        let args = Args::try_parse_from([
            "parlance",
            "chat",
            "-m",
            "gpt-4o",
            "--base-url",
            "http://localhost:8080/v1",
            "--no-stream",
        ])
        .expect("parse");
        assert_eq!(args.command, Some(Commands::Chat));
        let overrides = args.overrides();
        assert_eq!(overrides.model.as_deref(), Some("gpt-4o"));
        assert_eq!(
            overrides.base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
        assert!(overrides.no_stream);
    }

    #[test]
    fn set_collects_trailing_words() {
        let args = Args::try_parse_from(["parlance", "set", "system-prompt", "Be", "-brief"])
            .expect("parse");
        assert_eq!(
            args.command,
            Some(Commands::Set {
                key: "system-prompt".into(),
                value: vec!["Be".into(), "-brief".into()],
            })
        );
    }

    #[test]
    fn log_file_flag_is_a_path() {
        let args =
            Args::try_parse_from(["parlance", "--log-file", "/tmp/parlance.log"]).expect("parse");
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/parlance.log")));
    }
}
