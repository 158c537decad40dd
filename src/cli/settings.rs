//! `set`, `unset` and `config` subcommands.

use std::fmt;

use crate::core::config::{path_display, Config, ConfigKey};

/// Errors that can occur when modifying configuration settings.
#[derive(Debug, PartialEq)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The value did not parse for this key.
    InvalidValue(String),
    /// Required arguments are missing.
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
    /// An error occurred while persisting the configuration.
    ConfigError(String),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Known keys: {}", known_keys());
            }
            SettingError::InvalidValue(message) => {
                eprintln!("❌ {message}");
            }
            SettingError::MissingArgs { hint, example } => {
                eprintln!("⚠️  {hint}");
                eprintln!("Example: {example}");
            }
            SettingError::ConfigError(msg) => {
                eprintln!("❌ Failed to save configuration: {msg}");
            }
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::InvalidValue(message) => write!(f, "{message}"),
            SettingError::MissingArgs { hint, .. } => write!(f, "{hint}"),
            SettingError::ConfigError(msg) => write!(f, "Failed to save configuration: {msg}"),
        }
    }
}

impl std::error::Error for SettingError {}

fn known_keys() -> String {
    ConfigKey::ALL
        .iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_key(key: &str) -> Result<ConfigKey, SettingError> {
    ConfigKey::parse(key).ok_or_else(|| SettingError::UnknownKey(key.to_string()))
}

/// Applies `set <key> <value...>` to `config`. Multi-word values are joined
/// with spaces so prompts can be given unquoted.
pub fn apply_set(config: &mut Config, key: &str, value: &[String]) -> Result<String, SettingError> {
    let key = parse_key(key)?;
    if value.is_empty() {
        return Err(SettingError::MissingArgs {
            hint: "Specify a value to set.",
            example: "parlance set model gpt-4o",
        });
    }
    let value = value.join(" ");
    config
        .set(key, &value)
        .map_err(SettingError::InvalidValue)?;
    Ok(format!("✅ Set {} to: {}", key.as_str(), config.describe(key)))
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    let key = parse_key(key)?;
    config.unset(key);
    Ok(format!("✅ Unset {}", key.as_str()))
}

/// One `key: value` row per setting, defaults marked.
pub fn format_all(config: &Config) -> Vec<String> {
    ConfigKey::ALL
        .iter()
        .map(|&key| format!("  {}: {}", key.as_str(), config.describe(key)))
        .collect()
}

pub fn print_all(config: &Config) {
    match Config::config_path() {
        Ok(path) => println!("Configuration ({}):", path_display(path)),
        Err(_) => println!("Configuration:"),
    }
    for line in format_all(config) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn set_joins_words_and_reports_value() {
        let mut config = Config::default();
        let message =
            apply_set(&mut config, "system-prompt", &args(&["Be", "brief."])).expect("set");
        assert_eq!(config.system_prompt(), "Be brief.");
        assert!(message.contains("system-prompt"));
        assert!(message.contains("Be brief."));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut config = Config::default();
        assert_eq!(
            apply_set(&mut config, "colour", &args(&["red"])),
            Err(SettingError::UnknownKey("colour".into()))
        );
        assert_eq!(
            apply_unset(&mut config, "colour"),
            Err(SettingError::UnknownKey("colour".into()))
        );
        assert_eq!(config, Config::default());
    }

    #[test]
    fn set_without_value_asks_for_one() {
        let mut config = Config::default();
        assert!(matches!(
            apply_set(&mut config, "model", &[]),
            Err(SettingError::MissingArgs { .. })
        ));
    }

    #[test]
    fn invalid_values_surface_the_parse_message() {
        let mut config = Config::default();
        let err = apply_set(&mut config, "stream", &args(&["maybe"])).unwrap_err();
        assert!(matches!(err, SettingError::InvalidValue(_)));
        assert!(err.to_string().contains("stream"));
    }

    #[test]
    fn unset_restores_default_marker() {
        let mut config = Config::default();
        apply_set(&mut config, "model", &args(&["gpt-4o"])).expect("set");
        apply_unset(&mut config, "model").expect("unset");
        let rows = format_all(&config);
        assert_eq!(rows.len(), ConfigKey::ALL.len());
        assert!(rows
            .iter()
            .any(|row| row.starts_with("  model:") && row.ends_with("(default)")));
    }
}
