//! JSON bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::types::{clamp_volume, PlaybackSnapshot, RoomDetails, RoomSettings};

#[derive(Debug, Deserialize)]
pub(crate) struct UserInRoomResponse {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoomResponse {
    pub votes_to_skip: u32,
    pub guest_can_pause: bool,
    pub guest_can_control_volume: bool,
    pub is_host: bool,
}

impl From<RoomResponse> for RoomDetails {
    fn from(res: RoomResponse) -> Self {
        RoomDetails {
            settings: RoomSettings {
                votes_to_skip: res.votes_to_skip,
                guest_can_pause: res.guest_can_pause,
                guest_can_control_volume: res.guest_can_control_volume,
            },
            is_host: res.is_host,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JoinRoomRequest<'a> {
    pub code: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateRoomRequest<'a> {
    pub code: &'a str,
    pub votes_to_skip: u32,
    pub guest_can_pause: bool,
    pub guest_can_control_volume: bool,
}

/// Body of `/spotify/current-song`. `time` and `duration` are milliseconds.
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentSongResponse {
    pub title: String,
    pub artist: String,
    pub duration: u64,
    pub time: u64,
    pub image_url: String,
    pub is_playing: bool,
    pub votes: u32,
    pub votes_required: u32,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub volume: Option<u8>,
    #[serde(default)]
    pub user_has_voted: bool,
}

impl From<CurrentSongResponse> for PlaybackSnapshot {
    fn from(res: CurrentSongResponse) -> Self {
        PlaybackSnapshot {
            title: res.title,
            artist: res.artist,
            image_url: res.image_url,
            is_playing: res.is_playing,
            progress_ms: res.time,
            duration_ms: res.duration,
            votes: res.votes,
            votes_required: res.votes_required,
            song_id: res.id,
            volume: res.volume.map(clamp_volume),
            user_has_voted: res.user_has_voted,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SetVolumeRequest {
    pub volume_percent: u8,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthStatusResponse {
    pub status: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthUrlResponse {
    pub url: String,
}
