use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::constants::{
    DEFAULT_BASE_URL, DEFAULT_INPUT_CHAR_LIMIT, DEFAULT_MODEL, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TICK_INTERVAL,
};

/// Persisted user preferences. Every field is optional so an absent key falls
/// back to the built-in default.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Model requested from the chat completion endpoint
    pub model: Option<String>,
    /// Base URL of the OpenAI-compatible API (e.g., "https://api.openai.com/v1")
    pub base_url: Option<String>,
    /// System preamble sent ahead of every request
    pub system_prompt: Option<String>,
    /// Stream responses token by token instead of waiting for the full reply
    pub stream: Option<bool>,
    /// Enable markdown rendering in the chat area
    pub markdown: Option<bool>,
    /// UI theme name ("dark" or "light")
    pub theme: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub tick_interval_ms: Option<u64>,
    pub input_char_limit: Option<usize>,
}

/// Keys accepted by `parlance set` / `parlance unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Model,
    BaseUrl,
    SystemPrompt,
    Stream,
    Markdown,
    Theme,
    RequestTimeoutSecs,
    TickIntervalMs,
    InputCharLimit,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 9] = [
        ConfigKey::Model,
        ConfigKey::BaseUrl,
        ConfigKey::SystemPrompt,
        ConfigKey::Stream,
        ConfigKey::Markdown,
        ConfigKey::Theme,
        ConfigKey::RequestTimeoutSecs,
        ConfigKey::TickIntervalMs,
        ConfigKey::InputCharLimit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Model => "model",
            ConfigKey::BaseUrl => "base-url",
            ConfigKey::SystemPrompt => "system-prompt",
            ConfigKey::Stream => "stream",
            ConfigKey::Markdown => "markdown",
            ConfigKey::Theme => "theme",
            ConfigKey::RequestTimeoutSecs => "request-timeout-secs",
            ConfigKey::TickIntervalMs => "tick-interval-ms",
            ConfigKey::InputCharLimit => "input-char-limit",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        let normalized = key.trim().replace('_', "-").to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == normalized)
    }
}

impl Config {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn stream(&self) -> bool {
        self.stream.unwrap_or(true)
    }

    pub fn markdown(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn theme(&self) -> &str {
        self.theme.as_deref().unwrap_or("dark")
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TICK_INTERVAL)
    }

    pub fn input_char_limit(&self) -> usize {
        self.input_char_limit.unwrap_or(DEFAULT_INPUT_CHAR_LIMIT)
    }

    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {}", key.as_str()));
        }
        match key {
            ConfigKey::Model => self.model = Some(value.to_string()),
            ConfigKey::BaseUrl => self.base_url = Some(value.to_string()),
            ConfigKey::SystemPrompt => self.system_prompt = Some(value.to_string()),
            ConfigKey::Stream => self.stream = Some(parse_bool(key, value)?),
            ConfigKey::Markdown => self.markdown = Some(parse_bool(key, value)?),
            ConfigKey::Theme => match value.to_ascii_lowercase().as_str() {
                theme @ ("dark" | "light") => self.theme = Some(theme.to_string()),
                _ => return Err(format!("Unknown theme: {value} (expected dark or light)")),
            },
            ConfigKey::RequestTimeoutSecs => {
                self.request_timeout_secs = Some(parse_number(key, value)?)
            }
            ConfigKey::TickIntervalMs => self.tick_interval_ms = Some(parse_number(key, value)?),
            ConfigKey::InputCharLimit => {
                self.input_char_limit = Some(parse_number::<u64>(key, value)? as usize)
            }
        }
        Ok(())
    }

    pub fn unset(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Model => self.model = None,
            ConfigKey::BaseUrl => self.base_url = None,
            ConfigKey::SystemPrompt => self.system_prompt = None,
            ConfigKey::Stream => self.stream = None,
            ConfigKey::Markdown => self.markdown = None,
            ConfigKey::Theme => self.theme = None,
            ConfigKey::RequestTimeoutSecs => self.request_timeout_secs = None,
            ConfigKey::TickIntervalMs => self.tick_interval_ms = None,
            ConfigKey::InputCharLimit => self.input_char_limit = None,
        }
    }

    /// Effective value for display, marking built-in defaults.
    pub fn describe(&self, key: ConfigKey) -> String {
        let (value, explicit) = match key {
            ConfigKey::Model => (self.model().to_string(), self.model.is_some()),
            ConfigKey::BaseUrl => (self.base_url().to_string(), self.base_url.is_some()),
            ConfigKey::SystemPrompt => (
                self.system_prompt().to_string(),
                self.system_prompt.is_some(),
            ),
            ConfigKey::Stream => (self.stream().to_string(), self.stream.is_some()),
            ConfigKey::Markdown => (self.markdown().to_string(), self.markdown.is_some()),
            ConfigKey::Theme => (self.theme().to_string(), self.theme.is_some()),
            ConfigKey::RequestTimeoutSecs => (
                self.request_timeout().as_secs().to_string(),
                self.request_timeout_secs.is_some(),
            ),
            ConfigKey::TickIntervalMs => (
                self.tick_interval().as_millis().to_string(),
                self.tick_interval_ms.is_some(),
            ),
            ConfigKey::InputCharLimit => (
                self.input_char_limit().to_string(),
                self.input_char_limit.is_some(),
            ),
        };
        if explicit {
            value
        } else {
            format!("{value} (default)")
        }
    }
}

fn parse_bool(key: ConfigKey, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(format!("{} expects true or false, got: {value}", key.as_str())),
    }
}

fn parse_number<T: std::str::FromStr>(key: ConfigKey, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{} expects a number, got: {value}", key.as_str()))
}

/// Get a user-friendly display string for a path
/// Converts absolute paths under the home directory to `~` notation on Unix.
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
