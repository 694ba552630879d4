//! Domain types for rooms and playback.

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{DEFAULT_VOTES_TO_SKIP, MAX_VOLUME};

/// Mutable settings of a room, as reported by the backend and posted by the
/// host's settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Number of guest votes required to skip the current track.
    pub votes_to_skip: u32,
    /// Whether guests may pause and resume playback.
    pub guest_can_pause: bool,
    /// Whether guests may change the playback volume.
    pub guest_can_control_volume: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            votes_to_skip: DEFAULT_VOTES_TO_SKIP,
            guest_can_pause: false,
            guest_can_control_volume: false,
        }
    }
}

/// Result of a successful room lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomDetails {
    pub settings: RoomSettings,
    /// Whether the calling session is the room's host.
    pub is_host: bool,
}

/// Client-side view of the room the user is in.
///
/// Created when the room view is entered. Only room configuration polls and
/// the host authentication check mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSession {
    room_code: String,
    pub votes_to_skip: u32,
    pub guest_can_pause: bool,
    pub guest_can_control_volume: bool,
    pub is_host: bool,
    pub playback_authenticated: bool,
}

impl RoomSession {
    /// Creates a session for `room_code` with the defaults shown before the
    /// first room fetch completes.
    pub fn new(room_code: impl Into<String>) -> Self {
        let settings = RoomSettings::default();
        Self {
            room_code: room_code.into(),
            votes_to_skip: settings.votes_to_skip,
            guest_can_pause: settings.guest_can_pause,
            guest_can_control_volume: settings.guest_can_control_volume,
            is_host: false,
            playback_authenticated: false,
        }
    }

    /// The room code this session was entered with. Never changes.
    pub fn room_code(&self) -> &str {
        &self.room_code
    }

    /// Current settings in the shape the settings form posts back.
    pub fn settings(&self) -> RoomSettings {
        RoomSettings {
            votes_to_skip: self.votes_to_skip,
            guest_can_pause: self.guest_can_pause,
            guest_can_control_volume: self.guest_can_control_volume,
        }
    }

    /// Overwrites the polled fields. Returns whether anything changed.
    pub fn apply(&mut self, details: &RoomDetails) -> bool {
        let before = (self.settings(), self.is_host);
        self.votes_to_skip = details.settings.votes_to_skip;
        self.guest_can_pause = details.settings.guest_can_pause;
        self.guest_can_control_volume = details.settings.guest_can_control_volume;
        self.is_host = details.is_host;
        before != (self.settings(), self.is_host)
    }

    /// Whether this participant may originate volume changes.
    pub fn can_control_volume(&self) -> bool {
        self.is_host || self.guest_can_control_volume
    }

    /// Whether this participant may pause or resume playback.
    pub fn can_pause(&self) -> bool {
        self.is_host || self.guest_can_pause
    }
}

/// A single poll result describing the track the host is playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub title: String,
    pub artist: String,
    pub image_url: String,
    pub is_playing: bool,
    pub progress_ms: u64,
    pub duration_ms: u64,
    pub votes: u32,
    pub votes_required: u32,
    pub song_id: Option<String>,
    /// Device volume reported alongside the track, if the service exposed it.
    pub volume: Option<u8>,
    pub user_has_voted: bool,
}

impl PlaybackSnapshot {
    /// Track progress as a percentage in `[0, 100]`.
    pub fn progress_percent(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.progress_ms as f64 / self.duration_ms as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// What the playback service is doing right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum NowPlaying {
    /// Nothing is playing, or the service could not be asked.
    #[default]
    Empty,
    Playing(PlaybackSnapshot),
}

impl NowPlaying {
    pub fn snapshot(&self) -> Option<&PlaybackSnapshot> {
        match self {
            NowPlaying::Empty => None,
            NowPlaying::Playing(snapshot) => Some(snapshot),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, NowPlaying::Empty)
    }

    /// Whether a track is actively playing (not paused).
    pub fn is_playing(&self) -> bool {
        self.snapshot().is_some_and(|s| s.is_playing)
    }
}

/// Clamps a volume percentage to the range the playback service accepts.
#[inline]
pub fn clamp_volume(volume: u8) -> u8 {
    volume.min(MAX_VOLUME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(progress_ms: u64, duration_ms: u64) -> PlaybackSnapshot {
        PlaybackSnapshot {
            title: "Song".into(),
            artist: "Artist".into(),
            image_url: String::new(),
            is_playing: true,
            progress_ms,
            duration_ms,
            votes: 0,
            votes_required: 2,
            song_id: None,
            volume: None,
            user_has_voted: false,
        }
    }

    #[test]
    fn new_session_uses_pre_fetch_defaults() {
        let session = RoomSession::new("AB12");
        assert_eq!(session.room_code(), "AB12");
        assert_eq!(session.votes_to_skip, 2);
        assert!(!session.is_host);
        assert!(!session.can_control_volume());
        assert!(!session.can_pause());
    }

    #[test]
    fn apply_reports_changes() {
        let mut session = RoomSession::new("AB12");
        let details = RoomDetails {
            settings: RoomSettings {
                votes_to_skip: 3,
                guest_can_pause: true,
                guest_can_control_volume: false,
            },
            is_host: false,
        };

        assert!(session.apply(&details));
        assert!(!session.apply(&details));
        assert_eq!(session.votes_to_skip, 3);
        assert!(session.can_pause());
        assert!(!session.can_control_volume());
    }

    #[test]
    fn host_may_do_everything() {
        let mut session = RoomSession::new("AB12");
        session.is_host = true;
        assert!(session.can_control_volume());
        assert!(session.can_pause());
    }

    #[test]
    fn progress_percent_handles_zero_duration() {
        assert_eq!(snapshot(500, 0).progress_percent(), 0.0);
        assert_eq!(snapshot(30_000, 120_000).progress_percent(), 25.0);
        assert_eq!(snapshot(200_000, 120_000).progress_percent(), 100.0);
    }

    #[test]
    fn now_playing_reports_play_state() {
        assert!(!NowPlaying::Empty.is_playing());
        let mut paused = snapshot(0, 1000);
        paused.is_playing = false;
        assert!(!NowPlaying::Playing(paused).is_playing());
        assert!(NowPlaying::Playing(snapshot(0, 1000)).is_playing());
    }

    #[test]
    fn clamp_volume_caps_at_100() {
        assert_eq!(clamp_volume(150), 100);
        assert_eq!(clamp_volume(42), 42);
    }
}
