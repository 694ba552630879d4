//! House Party Core - room synchronization and playback control.
//!
//! This crate provides the client-side core of House Party, a shared
//! listening app where guests join a host's room by code, vote to skip
//! tracks and, when the host allows it, pause playback or change the volume.
//! It is presentation-agnostic; front-ends plug in through a handful of
//! traits and render [`RoomView`] snapshots or subscribe to events.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`remote`]: Backend HTTP contract and its trait seams
//! - [`services`]: Pollers, volume override, room session and lobby
//! - [`events`]: Event system for pushing state to the presentation layer
//! - [`navigation`]: Screen routing seam
//! - [`runtime`]: Task spawning abstraction for async runtime independence
//! - [`state`]: Client configuration and shared room state
//! - [`bootstrap`]: Composition root
//! - [`error`]: Error codes and setup errors
//!
//! # Abstraction Traits
//!
//! - [`RoomApi`], [`PlaybackControl`], [`PlaybackAuth`]: backend operations
//! - [`Navigator`]: moving the user between screens
//! - [`EventEmitter`]: emitting domain events
//! - [`TaskSpawner`]: spawning background tasks
//!
//! Each has a default implementation usable by a headless front-end.

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod bootstrap;
pub mod error;
pub mod events;
pub mod navigation;
pub mod protocol_constants;
pub mod remote;
pub mod runtime;
pub mod services;
pub mod state;
pub mod types;
pub mod utils;

// Re-export commonly used types at the crate root
pub use bootstrap::{bootstrap_client, BootstrappedClient};
pub use error::{ErrorCode, HousePartyError, HousePartyResult};
pub use events::{
    BroadcastEvent, BroadcastEventBridge, CloseReason, EventEmitter, LoggingEventEmitter,
    NoopEventEmitter, PlaybackEvent, SessionEvent, VolumeOrigin,
};
pub use navigation::{LoggingNavigator, Navigator, Route};
pub use remote::{
    ApiError, ApiResult, HttpRemoteClient, JoinOutcome, PlaybackAuth, PlaybackControl,
    RemoteHandles, RemoteStateClient, RoomApi,
};
pub use runtime::{TaskSpawner, TokioSpawner};
pub use services::{
    JoinError, Lobby, RoomSessionController, RoomSessionDeps, RoomView, SessionError,
    VolumeControl, VolumeOverride,
};
pub use state::{ClientConfig, HostAuthTrigger, RoomState};
pub use types::{NowPlaying, PlaybackSnapshot, RoomDetails, RoomSession, RoomSettings};
pub use utils::{join_url, now_millis};
