//! Client bootstrap and dependency wiring.
//!
//! This module contains the composition root: the single place where the
//! HTTP client, backend client, event bridge and root cancellation token are
//! created and handed to the lobby and room sessions.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{HousePartyError, HousePartyResult};
use crate::events::{BroadcastEventBridge, EventEmitter};
use crate::navigation::Navigator;
use crate::protocol_constants::EVENT_CHANNEL_CAPACITY;
use crate::remote::{HttpRemoteClient, RemoteHandles};
use crate::runtime::TokioSpawner;
use crate::services::{Lobby, RoomSessionController, RoomSessionDeps, SessionError};
use crate::state::ClientConfig;

/// Container for the wired client infrastructure.
#[derive(Clone)]
pub struct BootstrappedClient {
    /// Backend client viewed through each service trait.
    pub remote: RemoteHandles,
    /// Event bridge every room session emits through.
    pub event_bridge: Arc<BroadcastEventBridge>,
    /// Task spawner for background operations.
    pub spawner: TokioSpawner,
    /// Root token; cancelling it stops every session's background work.
    pub cancel_token: CancellationToken,
    pub config: ClientConfig,
}

impl BootstrappedClient {
    /// Entry-screen logic bound to this client.
    pub fn lobby(&self, navigator: Arc<dyn Navigator>) -> Lobby {
        Lobby::new(Arc::clone(&self.remote.rooms), navigator)
    }

    /// Enters room `code`, emitting through the shared event bridge.
    pub async fn enter_room(
        &self,
        code: &str,
        navigator: Arc<dyn Navigator>,
    ) -> Result<RoomSessionController, SessionError> {
        RoomSessionController::enter(
            code,
            RoomSessionDeps {
                remote: self.remote.clone(),
                navigator,
                emitter: Arc::clone(&self.event_bridge) as Arc<dyn EventEmitter>,
                config: self.config.clone(),
                parent_token: self.cancel_token.clone(),
                spawner: self.spawner.clone(),
            },
        )
        .await
    }

    /// Stops all background work, then waits for detached backend calls
    /// (such as a pending leave) for at most the HTTP timeout.
    ///
    /// Does not leave any room by itself.
    pub async fn shutdown(&self) {
        log::info!("[Bootstrap] Shutting down");
        self.cancel_token.cancel();
        self.spawner.drain(self.config.http_timeout()).await;
    }
}

/// Creates the shared HTTP client for all backend calls.
///
/// The backend tracks users by session cookie, so the client keeps a cookie
/// jar for the lifetime of the process, seeded with `session_cookie` if given.
fn create_http_client(
    timeout: Duration,
    base_url: &Url,
    session_cookie: Option<&str>,
) -> HousePartyResult<Client> {
    let jar = Arc::new(Jar::default());
    if let Some(cookie) = session_cookie {
        jar.add_cookie_str(&format!("{}; Path=/", cookie), base_url);
    }

    Client::builder()
        .timeout(timeout)
        .cookie_provider(jar)
        .build()
        .map_err(|e| HousePartyError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Bootstraps the client with its dependencies.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the base URL cannot
/// be parsed.
pub fn bootstrap_client(config: &ClientConfig) -> HousePartyResult<BootstrappedClient> {
    config.validate().map_err(HousePartyError::Configuration)?;

    let base_url = Url::parse(&config.base_url)
        .map_err(|e| HousePartyError::Configuration(format!("Invalid base_url: {}", e)))?;

    let spawner = TokioSpawner::current();
    let http_client = create_http_client(
        config.http_timeout(),
        &base_url,
        config.session_cookie.as_deref(),
    )?;

    let remote_client = Arc::new(
        HttpRemoteClient::new(http_client, base_url.as_str())
            .map_err(|e| HousePartyError::Internal(format!("Failed to create client: {}", e)))?,
    );
    let remote = RemoteHandles::from_client(remote_client);

    let event_bridge = Arc::new(BroadcastEventBridge::new(EVENT_CHANNEL_CAPACITY));
    let cancel_token = CancellationToken::new();

    log::debug!("[Bootstrap] Client ready for {}", config.base_url);

    Ok(BootstrappedClient {
        remote,
        event_bridge,
        spawner,
        cancel_token,
        config: config.clone(),
    })
}
