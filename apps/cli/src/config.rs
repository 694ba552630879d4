//! CLI configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use houseparty_core::{ClientConfig, HostAuthTrigger};
use serde::Deserialize;

/// CLI configuration loaded from YAML with environment overrides.
///
/// Core client settings sit at the top level of the file next to the
/// CLI-only ones:
///
/// ```yaml
/// base_url: http://party.local:8000
/// room_poll_interval_ms: 5000
/// host_auth_trigger: every_poll
/// room_code: AB12
/// json_events: true
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    #[serde(flatten)]
    pub client: ClientConfig,

    /// Room `watch` enters when no code is given and the backend reports none.
    /// Override: `HOUSEPARTY_ROOM_CODE`
    pub room_code: Option<String>,

    /// Print events as JSON lines instead of human-readable text.
    /// Override: `HOUSEPARTY_JSON_EVENTS`
    pub json_events: bool,
}

impl CliConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies `HOUSEPARTY_*` overrides looked up through `var`.
    ///
    /// Unparseable values are ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // HOUSEPARTY_BASE_URL and HOUSEPARTY_SESSION_COOKIE are handled by
        // clap via #[arg(env = ...)] in main.rs.
        if let Some(ms) = var("HOUSEPARTY_NOW_PLAYING_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.client.now_playing_interval_ms = ms;
        }
        if let Some(ms) = var("HOUSEPARTY_ROOM_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.client.room_poll_interval_ms = ms;
        }
        if let Some(secs) = var("HOUSEPARTY_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.client.http_timeout_secs = secs;
        }
        if let Some(trigger) = var("HOUSEPARTY_HOST_AUTH_TRIGGER").and_then(|v| parse_trigger(&v))
        {
            self.client.host_auth_trigger = trigger;
        }
        if let Some(code) = var("HOUSEPARTY_ROOM_CODE").filter(|c| !c.trim().is_empty()) {
            self.room_code = Some(code.trim().to_string());
        }
        if let Some(json) = var("HOUSEPARTY_JSON_EVENTS").and_then(|v| parse_bool(&v)) {
            self.json_events = json;
        }
    }

    /// Returns the core client configuration.
    pub fn to_core_config(&self) -> ClientConfig {
        self.client.clone()
    }
}

fn parse_trigger(value: &str) -> Option<HostAuthTrigger> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on_transition" => Some(HostAuthTrigger::OnTransition),
        "every_poll" => Some(HostAuthTrigger::EveryPoll),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(yaml: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_core_and_cli_fields_from_yaml() {
        let file = write_config(
            "base_url: http://party.local:8000\n\
             room_poll_interval_ms: 2000\n\
             host_auth_trigger: every_poll\n\
             room_code: AB12\n\
             json_events: true\n",
        );

        let mut config: CliConfig =
            serde_yaml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        config.apply_overrides(|_| None);

        assert_eq!(config.client.base_url, "http://party.local:8000");
        assert_eq!(config.client.room_poll_interval_ms, 2000);
        assert_eq!(config.client.now_playing_interval_ms, 1000);
        assert_eq!(config.client.host_auth_trigger, HostAuthTrigger::EveryPoll);
        assert_eq!(config.room_code.as_deref(), Some("AB12"));
        assert!(config.json_events);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CliConfig::load(Some(&dir.path().join("missing.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let file = write_config("room_poll_interval_ms: [not, a, number]\n");
        assert!(CliConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let file = write_config("room_poll_interval_ms: 2000\nroom_code: AB12\n");
        let mut config: CliConfig =
            serde_yaml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();

        let env: HashMap<&str, &str> = [
            ("HOUSEPARTY_ROOM_POLL_INTERVAL_MS", "7000"),
            ("HOUSEPARTY_HOST_AUTH_TRIGGER", "EVERY_POLL"),
            ("HOUSEPARTY_ROOM_CODE", " QW34 "),
            ("HOUSEPARTY_JSON_EVENTS", "yes"),
            ("HOUSEPARTY_HTTP_TIMEOUT_SECS", "soon"),
        ]
        .into_iter()
        .collect();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.client.room_poll_interval_ms, 7000);
        assert_eq!(config.client.host_auth_trigger, HostAuthTrigger::EveryPoll);
        assert_eq!(config.room_code.as_deref(), Some("QW34"));
        assert!(config.json_events);
        assert_eq!(config.client.http_timeout_secs, 10);
    }

    #[test]
    fn defaults_produce_valid_core_config() {
        let config = CliConfig::default();
        assert!(config.to_core_config().validate().is_ok());
        assert!(!config.json_events);
    }
}
