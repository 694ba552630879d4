//! HTTP implementation of the backend contract.
//!
//! Handles URL building, JSON bodies and status interpretation. What a
//! non-OK status means differs per call and is decided here, so callers only
//! see domain results.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::traits::{JoinOutcome, PlaybackAuth, PlaybackControl, RoomApi};
use super::wire::{
    AuthStatusResponse, AuthUrlResponse, CurrentSongResponse, JoinRoomRequest, RoomResponse,
    SetVolumeRequest, UpdateRoomRequest, UserInRoomResponse,
};
use crate::protocol_constants::{
    AUTH_URL_PATH, CURRENT_SONG_PATH, GET_ROOM_PATH, IS_AUTHENTICATED_PATH, JOIN_ROOM_PATH,
    LEAVE_ROOM_PATH, PAUSE_PATH, PLAY_PATH, ROOM_CODE_PARAM, SET_VOLUME_PATH, SKIP_PATH,
    UPDATE_ROOM_PATH, USER_IN_ROOM_PATH,
};
use crate::types::{clamp_volume, NowPlaying, RoomDetails, RoomSettings};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the body could not be read/decoded.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// An endpoint URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenient Result alias for backend operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Returns true if the failure says nothing about the room itself
    /// (network trouble, timeouts, server errors).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::HttpStatus(status, _) => *status >= 500,
            ApiError::InvalidUrl(_) => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Backend client over a shared `reqwest` client.
///
/// The backend identifies users by session cookie, so the `reqwest` client
/// must be built with a cookie store (see `bootstrap`).
#[derive(Clone)]
pub struct HttpRemoteClient {
    http: Client,
    base_url: Url,
}

impl HttpRemoteClient {
    /// Creates a client for the backend at `base_url` (scheme, host, port).
    pub fn new(http: Client, base_url: &str) -> ApiResult<Self> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    /// Sends a request and logs its outcome and latency.
    async fn send(&self, name: &str, req: RequestBuilder) -> ApiResult<Response> {
        let start = Instant::now();
        let res = req.send().await;
        log::debug!(
            "[Api] {} completed in {:?}: {:?}",
            name,
            start.elapsed(),
            res.as_ref().map(|r| r.status())
        );
        Ok(res?)
    }

    /// Sends a request whose response body is irrelevant.
    async fn send_ack(&self, name: &str, req: RequestBuilder) -> ApiResult<()> {
        let res = self.send(name, req).await?;
        ensure_success(res).await.map(|_| ())
    }

    /// Sends a request and decodes a JSON body from a success response.
    async fn send_json<T: DeserializeOwned>(&self, name: &str, req: RequestBuilder) -> ApiResult<T> {
        let res = self.send(name, req).await?;
        Ok(ensure_success(res).await?.json::<T>().await?)
    }
}

/// Converts a non-success response into [`ApiError::HttpStatus`].
async fn ensure_success(res: Response) -> ApiResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(ApiError::HttpStatus(status.as_u16(), body))
}

#[async_trait]
impl RoomApi for HttpRemoteClient {
    async fn user_in_room(&self) -> ApiResult<Option<String>> {
        let req = self.request(Method::GET, USER_IN_ROOM_PATH)?;
        let body: UserInRoomResponse = self.send_json("UserInRoom", req).await?;
        Ok(body.code.filter(|c| !c.is_empty()))
    }

    async fn get_room_state(&self, code: &str) -> ApiResult<Option<RoomDetails>> {
        let mut url = self.endpoint(GET_ROOM_PATH)?;
        url.query_pairs_mut().append_pair(ROOM_CODE_PARAM, code);

        let res = self.send("GetRoom", self.http.get(url)).await?;
        if !res.status().is_success() {
            log::debug!("[Api] Room {} not found ({})", code, res.status());
            return Ok(None);
        }
        let body: RoomResponse = res.json().await?;
        Ok(Some(body.into()))
    }

    async fn join_room(&self, code: &str) -> ApiResult<JoinOutcome> {
        let req = self
            .request(Method::POST, JOIN_ROOM_PATH)?
            .json(&JoinRoomRequest { code });
        let res = self.send("JoinRoom", req).await?;
        if res.status().is_success() {
            Ok(JoinOutcome::Joined)
        } else {
            log::info!("[Api] Join rejected for {}: {}", code, res.status());
            Ok(JoinOutcome::NotFound)
        }
    }

    async fn leave_room(&self) -> ApiResult<()> {
        let req = self.request(Method::POST, LEAVE_ROOM_PATH)?;
        self.send_ack("LeaveRoom", req).await
    }

    async fn update_room(&self, code: &str, settings: &RoomSettings) -> ApiResult<()> {
        let req = self
            .request(Method::PATCH, UPDATE_ROOM_PATH)?
            .json(&UpdateRoomRequest {
                code,
                votes_to_skip: settings.votes_to_skip,
                guest_can_pause: settings.guest_can_pause,
                guest_can_control_volume: settings.guest_can_control_volume,
            });
        self.send_ack("UpdateRoom", req).await
    }
}

#[async_trait]
impl PlaybackControl for HttpRemoteClient {
    async fn get_playback_state(&self) -> ApiResult<NowPlaying> {
        let req = self.request(Method::GET, CURRENT_SONG_PATH)?;
        let res = self.send("CurrentSong", req).await?;
        // 204 means nothing is playing; 404 means the room is gone.
        if res.status() != StatusCode::OK {
            return Ok(NowPlaying::Empty);
        }
        let body: CurrentSongResponse = res.json().await?;
        Ok(NowPlaying::Playing(body.into()))
    }

    async fn set_playback_volume(&self, percent: u8) -> ApiResult<()> {
        let req = self
            .request(Method::PUT, SET_VOLUME_PATH)?
            .json(&SetVolumeRequest {
                volume_percent: clamp_volume(percent),
            });
        self.send_ack("SetVolume", req).await
    }

    async fn playback_play(&self) -> ApiResult<()> {
        let req = self.request(Method::PUT, PLAY_PATH)?;
        self.send_ack("Play", req).await
    }

    async fn playback_pause(&self) -> ApiResult<()> {
        let req = self.request(Method::PUT, PAUSE_PATH)?;
        self.send_ack("Pause", req).await
    }

    async fn playback_skip(&self) -> ApiResult<()> {
        let req = self.request(Method::POST, SKIP_PATH)?;
        self.send_ack("Skip", req).await
    }
}

#[async_trait]
impl PlaybackAuth for HttpRemoteClient {
    async fn is_service_authenticated(&self) -> ApiResult<bool> {
        let req = self.request(Method::GET, IS_AUTHENTICATED_PATH)?;
        let body: AuthStatusResponse = self.send_json("IsAuthenticated", req).await?;
        Ok(body.status)
    }

    async fn get_service_auth_url(&self) -> ApiResult<String> {
        let req = self.request(Method::GET, AUTH_URL_PATH)?;
        let body: AuthUrlResponse = self.send_json("GetAuthUrl", req).await?;
        Ok(body.url)
    }
}
