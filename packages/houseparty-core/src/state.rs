//! Core application state types.
//!
//! This module provides [`ClientConfig`], the tunables shared by every
//! front-end, and [`RoomState`], the shared runtime state of an entered room.

use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::protocol_constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_NOW_PLAYING_INTERVAL_MS, DEFAULT_RELEASE_COOLDOWN_MS,
    DEFAULT_ROOM_POLL_INTERVAL_MS, DEFAULT_SETTLE_COOLDOWN_MS,
};
use crate::types::{NowPlaying, RoomSession};

/// When the host's playback-account check runs after a room poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostAuthTrigger {
    /// Only when `is_host` flips from false to true (including the first fetch).
    #[default]
    OnTransition,
    /// After every room poll that reports `is_host`.
    EveryPoll,
}

/// Configuration for the House Party client core.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://localhost:8000`. Also used as the origin
    /// of shareable join links.
    pub base_url: String,

    // Polling
    /// Interval between current-song polls (milliseconds).
    pub now_playing_interval_ms: u64,

    /// Interval between room configuration polls (milliseconds).
    pub room_poll_interval_ms: u64,

    // Volume
    /// Delay after a drag ends before remote volume is accepted (milliseconds).
    pub release_cooldown_ms: u64,

    /// Minimum age of the last local volume edit before remote volume is
    /// accepted (milliseconds).
    pub settle_cooldown_ms: u64,

    // HTTP
    /// Timeout for each backend request (seconds).
    pub http_timeout_secs: u64,

    /// When to re-check the host's playback account.
    pub host_auth_trigger: HostAuthTrigger,

    /// Existing backend session cookie (`name=value`) to act as, e.g. the
    /// browser session of a room's host. A fresh session is used when unset.
    pub session_cookie: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            now_playing_interval_ms: DEFAULT_NOW_PLAYING_INTERVAL_MS,
            room_poll_interval_ms: DEFAULT_ROOM_POLL_INTERVAL_MS,
            release_cooldown_ms: DEFAULT_RELEASE_COOLDOWN_MS,
            settle_cooldown_ms: DEFAULT_SETTLE_COOLDOWN_MS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            host_auth_trigger: HostAuthTrigger::default(),
            session_cookie: None,
        }
    }
}

impl ClientConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.now_playing_interval_ms == 0 {
            return Err("now_playing_interval_ms must be >= 1".to_string());
        }
        if self.room_poll_interval_ms == 0 {
            return Err(
                "room_poll_interval_ms must be >= 1 (tokio::time::interval panics on 0)"
                    .to_string(),
            );
        }
        if self.http_timeout_secs == 0 {
            return Err("http_timeout_secs must be >= 1".to_string());
        }
        if let Some(cookie) = &self.session_cookie {
            if !cookie.contains('=') {
                return Err("session_cookie must have the form name=value".to_string());
            }
        }
        Ok(())
    }

    pub fn now_playing_interval(&self) -> Duration {
        Duration::from_millis(self.now_playing_interval_ms)
    }

    pub fn room_poll_interval(&self) -> Duration {
        Duration::from_millis(self.room_poll_interval_ms)
    }

    pub fn release_cooldown(&self) -> Duration {
        Duration::from_millis(self.release_cooldown_ms)
    }

    pub fn settle_cooldown(&self) -> Duration {
        Duration::from_millis(self.settle_cooldown_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Runtime state of an entered room.
///
/// Written by poller callbacks and read by views. Each field group has its
/// own lock and is replaced wholesale, so concurrent poll completions
/// resolve as last-writer-wins.
pub struct RoomState {
    pub session: RwLock<RoomSession>,
    pub now_playing: RwLock<NowPlaying>,
    pub show_settings: RwLock<bool>,
}

impl RoomState {
    pub fn new(room_code: &str) -> Self {
        Self {
            session: RwLock::new(RoomSession::new(room_code)),
            now_playing: RwLock::new(NowPlaying::Empty),
            show_settings: RwLock::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_web_client_timing() {
        let config = ClientConfig::default();
        assert_eq!(config.now_playing_interval(), Duration::from_secs(1));
        assert_eq!(config.room_poll_interval(), Duration::from_secs(5));
        assert_eq!(config.release_cooldown(), Duration::from_millis(300));
        assert_eq!(config.settle_cooldown(), Duration::from_millis(500));
        assert_eq!(config.host_auth_trigger, HostAuthTrigger::OnTransition);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = ClientConfig {
            room_poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            now_playing_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn session_cookie_needs_a_name() {
        let config = ClientConfig {
            session_cookie: Some("abc123".into()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ClientConfig {
            session_cookie: Some("sessionid=abc123".into()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://party:8000","host_auth_trigger":"every_poll"}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://party:8000");
        assert_eq!(config.host_auth_trigger, HostAuthTrigger::EveryPoll);
        assert_eq!(config.room_poll_interval_ms, 5000);
    }
}
