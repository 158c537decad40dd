//! Persistent configuration and its resolution against CLI flags and the
//! environment.

pub mod data;
pub mod io;

pub use data::{path_display, Config, ConfigKey};
pub use io::ConfigError;

use std::time::Duration;

use crate::core::constants::MAX_INPUT_ROWS;
use crate::utils::url::validate_base_url;

/// Overrides supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub no_stream: bool,
}

/// Fully resolved settings for one chat session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub system_prompt: String,
    pub stream: bool,
    pub markdown: bool,
    pub theme: String,
    pub request_timeout: Duration,
    pub tick_interval: Duration,
    pub input_char_limit: usize,
    pub max_input_rows: u16,
}

impl SessionSettings {
    /// Resolves settings with precedence CLI flag > environment > config file > default.
    pub fn resolve(
        config: &Config,
        overrides: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, String> {
        let api_key = env("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                "OPENAI_API_KEY environment variable not set\n\n\
                 Please set your API key:\n\
                 export OPENAI_API_KEY=\"your-api-key-here\"\n\n\
                 Optionally, you can also set a custom base URL:\n\
                 export OPENAI_BASE_URL=\"https://api.openai.com/v1\""
                    .to_string()
            })?;

        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| env("OPENAI_BASE_URL").filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| config.base_url().to_string());
        validate_base_url(&base_url)?;

        let model = overrides
            .model
            .clone()
            .unwrap_or_else(|| config.model().to_string());

        Ok(Self {
            model,
            base_url,
            api_key,
            system_prompt: config.system_prompt().to_string(),
            stream: config.stream() && !overrides.no_stream,
            markdown: config.markdown(),
            theme: config.theme().to_string(),
            request_timeout: config.request_timeout(),
            tick_interval: config.tick_interval(),
            input_char_limit: config.input_char_limit(),
            max_input_rows: MAX_INPUT_ROWS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TICK_INTERVAL};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = Config::load_from_path(&dir.path().join("config.toml")).expect("load");
        assert_eq!(config, Config::default());
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.tick_interval(), DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set(ConfigKey::Model, "gpt-4o").expect("model");
        config.set(ConfigKey::Stream, "off").expect("stream");
        config.set(ConfigKey::TickIntervalMs, "100").expect("tick");
        config.save_to_path(&path).expect("save");

        let loaded = Config::load_from_path(&path).expect("load");
        assert_eq!(loaded, config);
        assert!(!loaded.stream());
        assert_eq!(loaded.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn invalid_toml_reports_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [").expect("write");

        let err = Config::load_from_path(&path).expect_err("parse error");
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set(ConfigKey::Stream, "maybe").is_err());
        assert!(config.set(ConfigKey::Theme, "neon").is_err());
        assert!(config.set(ConfigKey::RequestTimeoutSecs, "soon").is_err());
        assert!(config.set(ConfigKey::Model, "   ").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn keys_parse_with_either_separator() {
        assert_eq!(ConfigKey::parse("base_url"), Some(ConfigKey::BaseUrl));
        assert_eq!(ConfigKey::parse("Base-URL"), Some(ConfigKey::BaseUrl));
        assert_eq!(ConfigKey::parse("provider"), None);
    }

    #[test]
    fn describe_marks_defaults() {
        let mut config = Config::default();
        assert_eq!(config.describe(ConfigKey::Theme), "dark (default)");
        config.set(ConfigKey::Theme, "light").expect("theme");
        assert_eq!(config.describe(ConfigKey::Theme), "light");
    }

    #[test]
    fn resolve_requires_api_key() {
        let err = SessionSettings::resolve(&Config::default(), &CliOverrides::default(), env_from(&[]))
            .expect_err("missing key");
        assert!(err.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn resolve_prefers_cli_then_env_then_config() {
        let mut config = Config::default();
        config.set(ConfigKey::BaseUrl, "https://config.example/v1").expect("url");
        config.set(ConfigKey::Model, "config-model").expect("model");

        let env = env_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "https://env.example/v1"),
        ]);
        let overrides = CliOverrides {
            model: Some("cli-model".into()),
            base_url: None,
            no_stream: true,
        };

        let settings = SessionSettings::resolve(&config, &overrides, env).expect("resolve");
        assert_eq!(settings.model, "cli-model");
        assert_eq!(settings.base_url, "https://env.example/v1");
        assert_eq!(settings.api_key, "sk-test");
        assert!(!settings.stream);
    }

    #[test]
    fn resolve_falls_back_to_defaults() {
        let settings = SessionSettings::resolve(
            &Config::default(),
            &CliOverrides::default(),
            env_from(&[("OPENAI_API_KEY", "sk-test")]),
        )
        .expect("resolve");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert!(settings.stream);
        assert!(settings.markdown);
    }

    #[test]
    fn resolve_rejects_unusable_base_url() {
        let overrides = CliOverrides {
            base_url: Some("localhost:8080".into()),
            ..CliOverrides::default()
        };
        let err = SessionSettings::resolve(
            &Config::default(),
            &overrides,
            env_from(&[("OPENAI_API_KEY", "sk-test")]),
        )
        .expect_err("bad url");
        assert!(err.contains("http://"));
    }
}
