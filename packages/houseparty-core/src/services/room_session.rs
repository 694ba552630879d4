//! Room session orchestration.
//!
//! [`RoomSessionController`] owns everything that lives while the user is in
//! a room: the two pollers, the volume override, the host's playback-account
//! check and the leave transitions. It is the only writer of [`RoomState`].
//!
//! Teardown (the user leaving, or the room disappearing under a poll) runs
//! exactly once: one `leave_room` call, the session token cancelled, the
//! cached room code cleared and one navigation to the entry screen.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::now_playing_poller::{NowPlayingObserver, NowPlayingPoller};
use super::poller::Poller;
use super::room_config_poller::{RoomConfigObserver, RoomConfigPoller};
use super::volume::{VolumeControl, VolumeCooldowns};
use crate::events::{CloseReason, EventEmitter, PlaybackEvent, SessionEvent, VolumeOrigin};
use crate::navigation::{Navigator, Route};
use crate::remote::{ApiError, RemoteHandles};
use crate::runtime::{TaskSpawner, TokioSpawner};
use crate::state::{ClientConfig, HostAuthTrigger, RoomState};
use crate::types::{NowPlaying, RoomDetails, RoomSession, RoomSettings};
use crate::utils::{join_url, now_millis};

/// Errors surfaced by room session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend does not know the room (or the user is not in it).
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Only the host may perform this operation.
    #[error("Only the host can change room settings")]
    NotHost,

    /// Settings were rejected before being sent.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The session has already been torn down.
    #[error("Room session is closed")]
    Closed,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Collaborators a room session needs.
#[derive(Clone)]
pub struct RoomSessionDeps {
    pub remote: RemoteHandles,
    pub navigator: Arc<dyn Navigator>,
    pub emitter: Arc<dyn EventEmitter>,
    pub config: ClientConfig,
    /// Cancelling this ends the session's background work (without leaving).
    pub parent_token: CancellationToken,
    pub spawner: TokioSpawner,
}

/// Read-only aggregate of everything the room screen renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub session: RoomSession,
    pub now_playing: NowPlaying,
    pub display_volume: u8,
    pub show_settings: bool,
    /// Shareable link encoded in the room's QR code.
    pub join_url: String,
    pub can_control_volume: bool,
    pub can_pause: bool,
}

/// State shared between the controller and its poller callbacks.
struct SessionInner {
    room_code: String,
    remote: RemoteHandles,
    state: Arc<RoomState>,
    volume: VolumeControl,
    navigator: Arc<dyn Navigator>,
    emitter: Arc<dyn EventEmitter>,
    config: ClientConfig,
    cancel: CancellationToken,
    closed: AtomicBool,
    spawner: TokioSpawner,
}

impl SessionInner {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.cancel.is_cancelled()
    }

    fn emit_session_updated(&self, session: RoomSession) {
        self.emitter.emit_session(SessionEvent::Updated {
            session,
            timestamp: now_millis(),
        });
    }

    /// Runs the teardown sequence once. Later calls are no-ops.
    fn teardown(&self, reason: CloseReason) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("[RoomSession] Closing room {} ({:?})", self.room_code, reason);

        let rooms = Arc::clone(&self.remote.rooms);
        self.spawner
            .spawn_detached("LeaveRoom", async move { rooms.leave_room().await });

        self.cancel.cancel();
        self.navigator.clear_room_code();
        self.navigator.navigate(Route::Home);

        self.emitter.emit_session(SessionEvent::Closed {
            room_code: self.room_code.clone(),
            reason,
            timestamp: now_millis(),
        });
    }

    /// Checks the host's playback account in the background and redirects to
    /// the authorization page if it is not linked. Not retried.
    fn spawn_auth_check(&self) {
        let auth = Arc::clone(&self.remote.auth);
        let state = Arc::clone(&self.state);
        let navigator = Arc::clone(&self.navigator);
        let emitter = Arc::clone(&self.emitter);
        let cancel = self.cancel.clone();

        self.spawner.spawn(async move {
            let authenticated = match auth.is_service_authenticated().await {
                Ok(authenticated) => authenticated,
                Err(e) => {
                    log::warn!("[RoomSession] Playback auth check failed: {}", e);
                    return;
                }
            };
            if cancel.is_cancelled() {
                return;
            }

            let updated = {
                let mut session = state.session.write();
                if session.playback_authenticated == authenticated {
                    None
                } else {
                    session.playback_authenticated = authenticated;
                    Some(session.clone())
                }
            };
            if let Some(session) = updated {
                emitter.emit_session(SessionEvent::Updated {
                    session,
                    timestamp: now_millis(),
                });
            }

            if authenticated {
                return;
            }

            match auth.get_service_auth_url().await {
                Ok(url) if !cancel.is_cancelled() => {
                    log::info!("[RoomSession] Host playback account not linked, redirecting");
                    navigator.redirect_external(&url);
                    emitter.emit_session(SessionEvent::AuthRedirect {
                        url,
                        timestamp: now_millis(),
                    });
                }
                Ok(_) => {}
                Err(e) => log::warn!("[RoomSession] Could not fetch playback auth URL: {}", e),
            }
        });
    }
}

impl RoomConfigObserver for SessionInner {
    fn on_room_details(&self, details: RoomDetails) {
        if self.is_closed() {
            return;
        }

        let (changed, became_host, session) = {
            let mut session = self.state.session.write();
            let was_host = session.is_host;
            let changed = session.apply(&details);
            (changed, !was_host && session.is_host, session.clone())
        };

        if changed {
            log::debug!(
                "[RoomSession] Room {} updated: host={} votes_to_skip={}",
                self.room_code,
                session.is_host,
                session.votes_to_skip
            );
            self.emit_session_updated(session.clone());
        }

        let check_auth = match self.config.host_auth_trigger {
            HostAuthTrigger::OnTransition => became_host,
            HostAuthTrigger::EveryPoll => session.is_host,
        };
        if check_auth {
            self.spawn_auth_check();
        }
    }

    fn on_room_missing(&self) {
        self.teardown(CloseReason::RoomGone);
    }
}

impl NowPlayingObserver for SessionInner {
    fn on_now_playing(&self, now_playing: NowPlaying) {
        if self.is_closed() {
            return;
        }

        if let Some(remote) = now_playing.snapshot().and_then(|s| s.volume) {
            let before = self.volume.display_value();
            if let Some(volume) = self.volume.on_external_update(remote) {
                if volume != before {
                    self.emitter.emit_playback(PlaybackEvent::VolumeChanged {
                        volume,
                        origin: VolumeOrigin::Remote,
                        timestamp: now_millis(),
                    });
                }
            }
        }

        *self.state.now_playing.write() = now_playing.clone();
        self.emitter.emit_playback(PlaybackEvent::NowPlaying {
            now_playing,
            timestamp: now_millis(),
        });
    }
}

/// Controller for one entered room.
///
/// Dropping the controller stops its pollers without leaving the room or
/// navigating; call [`leave`](Self::leave) for the full transition.
pub struct RoomSessionController {
    inner: Arc<SessionInner>,
    now_playing_poller: Poller<NowPlayingPoller>,
    room_poller: Poller<RoomConfigPoller>,
}

impl RoomSessionController {
    /// Enters room `room_code`.
    ///
    /// Fetches the room once before anything starts. If the backend does not
    /// know it, the cached room code is cleared, the user is sent to the entry
    /// screen and [`SessionError::RoomNotFound`] is returned. Otherwise both
    /// pollers start and the host's account check runs.
    pub async fn enter(room_code: &str, deps: RoomSessionDeps) -> Result<Self, SessionError> {
        let details = match deps.remote.rooms.get_room_state(room_code).await? {
            Some(details) => details,
            None => {
                log::info!("[RoomSession] Room {} not found on entry", room_code);
                deps.navigator.clear_room_code();
                deps.navigator.navigate(Route::Home);
                return Err(SessionError::RoomNotFound(room_code.to_string()));
            }
        };

        let cancel = deps.parent_token.child_token();
        let volume = VolumeControl::new(
            Arc::clone(&deps.remote.playback),
            VolumeCooldowns {
                release: deps.config.release_cooldown(),
                settle: deps.config.settle_cooldown(),
            },
            &deps.spawner,
            cancel.clone(),
        );

        let inner = Arc::new(SessionInner {
            room_code: room_code.to_string(),
            remote: deps.remote.clone(),
            state: Arc::new(RoomState::new(room_code)),
            volume,
            navigator: deps.navigator,
            emitter: deps.emitter,
            config: deps.config.clone(),
            cancel: cancel.clone(),
            closed: AtomicBool::new(false),
            spawner: deps.spawner.clone(),
        });

        inner.on_room_details(details);

        let now_playing_poller = Poller::new(
            Arc::new(NowPlayingPoller::new(
                Arc::clone(&deps.remote.playback),
                Arc::clone(&inner) as Arc<dyn NowPlayingObserver>,
            )),
            deps.config.now_playing_interval(),
            cancel.clone(),
            deps.spawner.clone(),
        );
        let room_poller = Poller::new(
            Arc::new(RoomConfigPoller::new(
                room_code,
                Arc::clone(&deps.remote.rooms),
                Arc::clone(&inner) as Arc<dyn RoomConfigObserver>,
            )),
            deps.config.room_poll_interval(),
            cancel,
            deps.spawner,
        );

        now_playing_poller.start();
        room_poller.start();
        log::info!("[RoomSession] Entered room {}", room_code);

        Ok(Self {
            inner,
            now_playing_poller,
            room_poller,
        })
    }

    pub fn room_code(&self) -> &str {
        &self.inner.room_code
    }

    /// Snapshot of everything the room screen shows.
    pub fn view(&self) -> RoomView {
        let session = self.inner.state.session.read().clone();
        RoomView {
            now_playing: self.inner.state.now_playing.read().clone(),
            display_volume: self.inner.volume.display_value(),
            show_settings: *self.inner.state.show_settings.read(),
            join_url: join_url(&self.inner.config.base_url, &self.inner.room_code),
            can_control_volume: session.can_control_volume(),
            can_pause: session.can_pause(),
            session,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Whether both pollers are still running.
    pub fn is_polling(&self) -> bool {
        self.now_playing_poller.is_running() && self.room_poller.is_running()
    }

    /// Resolves once the session is torn down or its parent token is cancelled.
    pub async fn closed(&self) {
        self.inner.cancel.cancelled().await;
    }

    /// Leaves the room. The backend call is not awaited.
    pub fn leave(&self) {
        self.inner.teardown(CloseReason::Left);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Settings panel
    // ─────────────────────────────────────────────────────────────────────────

    pub fn open_settings(&self) {
        if !self.inner.state.session.read().is_host {
            log::debug!("[RoomSession] Ignoring settings open from non-host");
            return;
        }
        self.set_show_settings(true);
    }

    pub fn close_settings(&self) {
        self.set_show_settings(false);
    }

    fn set_show_settings(&self, open: bool) {
        if self.is_closed() {
            return;
        }
        {
            let mut show = self.inner.state.show_settings.write();
            if *show == open {
                return;
            }
            *show = open;
        }
        self.inner.emitter.emit_session(SessionEvent::SettingsToggled {
            open,
            timestamp: now_millis(),
        });
    }

    /// Replaces the room's settings, then re-reads the room.
    pub async fn update_settings(&self, settings: RoomSettings) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        if !self.inner.state.session.read().is_host {
            return Err(SessionError::NotHost);
        }
        if settings.votes_to_skip == 0 {
            return Err(SessionError::InvalidSettings(
                "votes_to_skip must be at least 1".to_string(),
            ));
        }

        let rooms = &self.inner.remote.rooms;
        rooms.update_room(&self.inner.room_code, &settings).await?;
        log::info!("[RoomSession] Updated settings of room {}", self.inner.room_code);

        match rooms.get_room_state(&self.inner.room_code).await? {
            Some(details) => self.inner.on_room_details(details),
            None => self.inner.on_room_missing(),
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Volume
    // ─────────────────────────────────────────────────────────────────────────

    fn may_control_volume(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        let allowed = self.inner.state.session.read().can_control_volume();
        if !allowed {
            log::debug!("[RoomSession] Volume control not permitted for this participant");
        }
        allowed
    }

    pub fn on_volume_drag_start(&self) {
        if self.may_control_volume() {
            self.inner.volume.on_drag_start();
        }
    }

    pub fn on_volume_change(&self, value: u8) {
        if !self.may_control_volume() {
            return;
        }
        let volume = self.inner.volume.on_change(value);
        self.inner.emitter.emit_playback(PlaybackEvent::VolumeChanged {
            volume,
            origin: VolumeOrigin::Local,
            timestamp: now_millis(),
        });
    }

    pub fn on_volume_drag_end(&self) {
        if self.may_control_volume() {
            self.inner.volume.on_drag_end();
        }
    }

    /// Drag start, one change and drag end in a single step, as a keyboard
    /// or command-line front-end would issue them.
    pub fn set_volume(&self, value: u8) {
        if !self.may_control_volume() {
            return;
        }
        self.on_volume_drag_start();
        self.on_volume_change(value);
        self.on_volume_drag_end();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────────────────

    /// Pauses if a track is playing, otherwise resumes.
    pub fn toggle_playback(&self) {
        if self.is_closed() {
            return;
        }
        if !self.inner.state.session.read().can_pause() {
            log::debug!("[RoomSession] Pause/play not permitted for this participant");
            return;
        }

        let playback = Arc::clone(&self.inner.remote.playback);
        if self.inner.state.now_playing.read().is_playing() {
            self.inner
                .spawner
                .spawn_detached("Pause", async move { playback.playback_pause().await });
        } else {
            self.inner
                .spawner
                .spawn_detached("Play", async move { playback.playback_play().await });
        }
    }

    /// Votes to skip the current track.
    pub fn skip(&self) {
        if self.is_closed() {
            return;
        }
        let playback = Arc::clone(&self.inner.remote.playback);
        self.inner
            .spawner
            .spawn_detached("Skip", async move { playback.playback_skip().await });
    }
}

impl Drop for RoomSessionController {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}
