//! Backend access: the room registry and the host's playback service.
//!
//! # Module Structure
//!
//! - `traits` - Trait abstractions for testability
//! - `http` - `HttpRemoteClient` concrete implementation and `ApiError`
//! - `wire` - JSON request/response bodies

pub mod http;
pub mod traits;
pub(crate) mod wire;

pub use http::{ApiError, ApiResult, HttpRemoteClient};
pub use traits::{
    JoinOutcome, PlaybackAuth, PlaybackControl, RemoteHandles, RemoteStateClient, RoomApi,
};
