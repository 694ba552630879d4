//! Application services layer.
//!
//! This module contains the logic that sits between the presentation seams
//! (navigation, events) and the backend client (remote/).

pub mod lobby;
pub mod now_playing_poller;
pub mod poller;
pub mod room_config_poller;
pub mod room_session;
pub mod volume;

pub use lobby::{JoinError, Lobby};
pub use now_playing_poller::{NowPlayingObserver, NowPlayingPoller};
pub use poller::{PollTask, Poller};
pub use room_config_poller::{RoomConfigObserver, RoomConfigPoller};
pub use room_session::{RoomSessionController, RoomSessionDeps, RoomView, SessionError};
pub use volume::{VolumeControl, VolumeCooldowns, VolumeOverride};
