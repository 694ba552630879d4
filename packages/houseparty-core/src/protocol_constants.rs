//! Fixed protocol constants shared with the House Party backend.
//!
//! Endpoint paths are defined by the backend's URL configuration and must
//! match it exactly. Timing defaults mirror the behavior of the web client.

// ─────────────────────────────────────────────────────────────────────────────
// Room API
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the room code the current session is a member of, if any.
pub const USER_IN_ROOM_PATH: &str = "/api/user-in-room";

/// Fetches a room's settings and whether the caller is its host.
pub const GET_ROOM_PATH: &str = "/api/get-room";

/// Query parameter carrying the room code for [`GET_ROOM_PATH`].
pub const ROOM_CODE_PARAM: &str = "code";

/// Joins the room given in the request body.
pub const JOIN_ROOM_PATH: &str = "/api/join-room";

/// Leaves the current room (deletes it when called by the host).
pub const LEAVE_ROOM_PATH: &str = "/api/leave-room";

/// Updates a room's settings (host only).
pub const UPDATE_ROOM_PATH: &str = "/api/update-room";

// ─────────────────────────────────────────────────────────────────────────────
// Playback service API
// ─────────────────────────────────────────────────────────────────────────────

/// Current track as seen by the room's host account.
pub const CURRENT_SONG_PATH: &str = "/spotify/current-song";

/// Casts a skip vote (host skips immediately).
pub const SKIP_PATH: &str = "/spotify/skip";

/// Pauses playback.
pub const PAUSE_PATH: &str = "/spotify/pause";

/// Resumes playback.
pub const PLAY_PATH: &str = "/spotify/play";

/// Sets the playback device volume.
pub const SET_VOLUME_PATH: &str = "/spotify/set-volume";

/// Reports whether the host's playback account is linked.
pub const IS_AUTHENTICATED_PATH: &str = "/spotify/is-authenticated";

/// Returns the provider authorization URL used to link the host's account.
pub const AUTH_URL_PATH: &str = "/spotify/get-auth-url";

// ─────────────────────────────────────────────────────────────────────────────
// Client routes
// ─────────────────────────────────────────────────────────────────────────────

/// Path of the join screen; shared join links point here with `?code=`.
pub const JOIN_ROUTE: &str = "/join";

// ─────────────────────────────────────────────────────────────────────────────
// Timing defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Interval between current-song polls (milliseconds).
pub const DEFAULT_NOW_PLAYING_INTERVAL_MS: u64 = 1000;

/// Interval between room configuration polls (milliseconds).
pub const DEFAULT_ROOM_POLL_INTERVAL_MS: u64 = 5000;

/// Delay after a volume drag ends before remote updates are accepted again
/// (milliseconds).
pub const DEFAULT_RELEASE_COOLDOWN_MS: u64 = 300;

/// Minimum age of the last local volume edit before a remote value may
/// replace it (milliseconds).
pub const DEFAULT_SETTLE_COOLDOWN_MS: u64 = 500;

/// Timeout applied to every backend request (seconds).
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Volume shown before the backend has reported one.
pub const DEFAULT_VOLUME: u8 = 50;

/// Maximum volume percentage accepted by the playback service.
pub const MAX_VOLUME: u8 = 100;

/// Skip threshold shown before the first room fetch completes.
pub const DEFAULT_VOTES_TO_SKIP: u32 = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Capacity of the room event broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 100;
