//! Trait abstractions for backend operations.
//!
//! These traits enable dependency injection for testability. Services depend
//! on the narrowest trait they need rather than on [`HttpRemoteClient`].
//!
//! [`HttpRemoteClient`]: super::HttpRemoteClient

use std::sync::Arc;

use async_trait::async_trait;

use super::ApiResult;
use crate::types::{NowPlaying, RoomDetails, RoomSettings};

/// Outcome of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// The backend rejected the code.
    NotFound,
}

/// Trait for room registry operations.
///
/// Used by `Lobby` for entry and joining, and by the room session for
/// configuration polls, leaving and settings updates.
#[async_trait]
pub trait RoomApi: Send + Sync {
    /// Returns the code of the room the current user already belongs to.
    async fn user_in_room(&self) -> ApiResult<Option<String>>;

    /// Fetches a room by code.
    ///
    /// Returns `Ok(None)` when the backend answers with any non-OK status,
    /// which is how a deleted room or a removed user is detected.
    async fn get_room_state(&self, code: &str) -> ApiResult<Option<RoomDetails>>;

    /// Attempts to join the room identified by `code`.
    async fn join_room(&self, code: &str) -> ApiResult<JoinOutcome>;

    /// Leaves the current room.
    async fn leave_room(&self) -> ApiResult<()>;

    /// Replaces the settings of room `code`. Only the host may do this.
    async fn update_room(&self, code: &str, settings: &RoomSettings) -> ApiResult<()>;
}

/// Trait for playback control operations against the host's player.
///
/// Used by `NowPlayingPoller` for status and by `VolumeControl` and the room
/// session for user actions.
#[async_trait]
pub trait PlaybackControl: Send + Sync {
    /// Fetches the current track. Any non-200 answer is [`NowPlaying::Empty`].
    async fn get_playback_state(&self) -> ApiResult<NowPlaying>;

    /// Sets the device volume (0-100, values > 100 are clamped).
    async fn set_playback_volume(&self, percent: u8) -> ApiResult<()>;

    /// Resumes playback.
    async fn playback_play(&self) -> ApiResult<()>;

    /// Pauses playback.
    async fn playback_pause(&self) -> ApiResult<()>;

    /// Votes to skip (the host skips immediately).
    async fn playback_skip(&self) -> ApiResult<()>;
}

/// Trait for linking the host's playback account.
#[async_trait]
pub trait PlaybackAuth: Send + Sync {
    /// Whether the host's playback account is linked.
    async fn is_service_authenticated(&self) -> ApiResult<bool>;

    /// Authorization URL the host must be redirected to.
    async fn get_service_auth_url(&self) -> ApiResult<String>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Combined Traits (for trait objects)
// ─────────────────────────────────────────────────────────────────────────────

/// Combined trait for all backend operations.
pub trait RemoteStateClient: RoomApi + PlaybackControl + PlaybackAuth {}

/// Blanket implementation for any type implementing all traits.
impl<T: RoomApi + PlaybackControl + PlaybackAuth> RemoteStateClient for T {}

/// One client viewed through each of the narrow traits.
///
/// Services store the trait object they need; this bundles the three views
/// of a single [`RemoteStateClient`] so they can be handed around together.
#[derive(Clone)]
pub struct RemoteHandles {
    pub rooms: Arc<dyn RoomApi>,
    pub playback: Arc<dyn PlaybackControl>,
    pub auth: Arc<dyn PlaybackAuth>,
}

impl RemoteHandles {
    /// Coerces a concrete client into all three trait objects.
    pub fn from_client<C: RemoteStateClient + 'static>(client: Arc<C>) -> Self {
        Self {
            rooms: Arc::clone(&client) as Arc<dyn RoomApi>,
            playback: Arc::clone(&client) as Arc<dyn PlaybackControl>,
            auth: client as Arc<dyn PlaybackAuth>,
        }
    }
}
