//! Event system for pushing room state to the presentation layer.
//!
//! This module provides:
//! - [`EventEmitter`] trait for services to emit events
//! - [`BroadcastEventBridge`] for fan-out to any number of subscribers
//! - Event types for the session and playback domains

mod bridge;
mod emitter;

pub use bridge::BroadcastEventBridge;
pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

use crate::types::{NowPlaying, RoomSession};

/// Events broadcast to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum BroadcastEvent {
    /// Events about the room session itself.
    Session(SessionEvent),

    /// Events about the track and volume.
    Playback(PlaybackEvent),
}

/// Why a room session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CloseReason {
    /// The user chose to leave.
    Left,
    /// The backend no longer knows the room (deleted, or the user was removed).
    RoomGone,
}

/// Events related to the room session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Room configuration or host status changed.
    Updated {
        session: RoomSession,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The settings panel was opened or closed.
    SettingsToggled {
        open: bool,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The host is being sent to link their playback account.
    AuthRedirect {
        url: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The session was torn down; no further events follow for this room.
    Closed {
        #[serde(rename = "roomCode")]
        room_code: String,
        reason: CloseReason,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

/// Where a displayed volume value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeOrigin {
    /// The user moved the slider.
    Local,
    /// A poll reported the device volume.
    Remote,
}

/// Events related to playback.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// A now-playing poll completed.
    NowPlaying {
        #[serde(rename = "nowPlaying")]
        now_playing: NowPlaying,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The displayed volume changed.
    VolumeChanged {
        volume: u8,
        origin: VolumeOrigin,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

// From implementations for converting inner events to BroadcastEvent
impl From<SessionEvent> for BroadcastEvent {
    fn from(event: SessionEvent) -> Self {
        BroadcastEvent::Session(event)
    }
}

impl From<PlaybackEvent> for BroadcastEvent {
    fn from(event: PlaybackEvent) -> Self {
        BroadcastEvent::Playback(event)
    }
}
