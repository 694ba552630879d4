//! Entry-screen logic: rejoining and joining rooms by code.

use std::sync::Arc;

use thiserror::Error;

use crate::navigation::{Navigator, Route};
use crate::remote::{ApiError, JoinOutcome, RoomApi};

/// Errors shown inline on the join form.
#[derive(Debug, Error)]
pub enum JoinError {
    #[error("Please enter a room code.")]
    EmptyCode,

    /// The backend rejected the code.
    #[error("Room not found.")]
    RoomNotFound,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Decides where a user lands and handles join-by-code.
pub struct Lobby {
    rooms: Arc<dyn RoomApi>,
    navigator: Arc<dyn Navigator>,
}

impl Lobby {
    pub fn new(rooms: Arc<dyn RoomApi>, navigator: Arc<dyn Navigator>) -> Self {
        Self { rooms, navigator }
    }

    /// Returns the user's current room screen if they are already in a room,
    /// otherwise the entry screen.
    pub async fn resolve_entry(&self) -> Route {
        match self.rooms.user_in_room().await {
            Ok(Some(code)) => Route::Room(code),
            Ok(None) => Route::Home,
            Err(e) => {
                log::warn!("[Lobby] Could not look up current room: {}", e);
                Route::Home
            }
        }
    }

    /// Joins the room with `code` and navigates to it.
    ///
    /// A rejected code produces [`JoinError::RoomNotFound`] and no navigation.
    pub async fn join(&self, code: &str) -> Result<Route, JoinError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(JoinError::EmptyCode);
        }

        match self.rooms.join_room(code).await? {
            JoinOutcome::Joined => {
                log::info!("[Lobby] Joined room {}", code);
                let route = Route::Room(code.to_string());
                self.navigator.navigate(route.clone());
                Ok(route)
            }
            JoinOutcome::NotFound => {
                log::debug!("[Lobby] Join rejected for code {}", code);
                Err(JoinError::RoomNotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ApiResult;
    use crate::types::{RoomDetails, RoomSettings};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockRooms {
        current: Option<String>,
        known_code: &'static str,
        join_calls: AtomicUsize,
        fail_lookup: bool,
    }

    impl MockRooms {
        fn new(current: Option<&str>) -> Self {
            Self {
                current: current.map(str::to_string),
                known_code: "AB12",
                join_calls: AtomicUsize::new(0),
                fail_lookup: false,
            }
        }
    }

    #[async_trait]
    impl RoomApi for MockRooms {
        async fn user_in_room(&self) -> ApiResult<Option<String>> {
            if self.fail_lookup {
                return Err(ApiError::HttpStatus(503, "unavailable".into()));
            }
            Ok(self.current.clone())
        }
        async fn get_room_state(&self, _code: &str) -> ApiResult<Option<RoomDetails>> {
            Ok(None)
        }
        async fn join_room(&self, code: &str) -> ApiResult<JoinOutcome> {
            self.join_calls.fetch_add(1, Ordering::SeqCst);
            if code == self.known_code {
                Ok(JoinOutcome::Joined)
            } else {
                Ok(JoinOutcome::NotFound)
            }
        }
        async fn leave_room(&self) -> ApiResult<()> {
            Ok(())
        }
        async fn update_room(&self, _code: &str, _settings: &RoomSettings) -> ApiResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        routes: Mutex<Vec<Route>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: Route) {
            self.routes.lock().push(route);
        }
        fn redirect_external(&self, _url: &str) {}
        fn clear_room_code(&self) {}
    }

    #[tokio::test]
    async fn unknown_code_reports_room_not_found() {
        let rooms = Arc::new(MockRooms::new(None));
        let navigator = Arc::new(RecordingNavigator::default());
        let lobby = Lobby::new(rooms, navigator.clone());

        let err = lobby.join("ZZZZ").await.unwrap_err();

        assert!(matches!(err, JoinError::RoomNotFound));
        assert_eq!(err.to_string(), "Room not found.");
        assert!(navigator.routes.lock().is_empty());
    }

    #[tokio::test]
    async fn known_code_navigates_to_room() {
        let rooms = Arc::new(MockRooms::new(None));
        let navigator = Arc::new(RecordingNavigator::default());
        let lobby = Lobby::new(rooms, navigator.clone());

        let route = lobby.join(" AB12 ").await.unwrap();

        assert_eq!(route, Route::Room("AB12".into()));
        assert_eq!(*navigator.routes.lock(), vec![Route::Room("AB12".into())]);
    }

    #[tokio::test]
    async fn blank_code_is_rejected_without_a_call() {
        let rooms = Arc::new(MockRooms::new(None));
        let lobby = Lobby::new(rooms.clone(), Arc::new(RecordingNavigator::default()));

        assert!(matches!(lobby.join("   ").await, Err(JoinError::EmptyCode)));
        assert_eq!(rooms.join_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn entry_resolves_existing_room() {
        let lobby = Lobby::new(
            Arc::new(MockRooms::new(Some("QW34"))),
            Arc::new(RecordingNavigator::default()),
        );
        assert_eq!(lobby.resolve_entry().await, Route::Room("QW34".into()));

        let lobby = Lobby::new(
            Arc::new(MockRooms::new(None)),
            Arc::new(RecordingNavigator::default()),
        );
        assert_eq!(lobby.resolve_entry().await, Route::Home);
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_home() {
        let rooms = MockRooms {
            fail_lookup: true,
            ..MockRooms::new(Some("QW34"))
        };
        let lobby = Lobby::new(Arc::new(rooms), Arc::new(RecordingNavigator::default()));

        assert_eq!(lobby.resolve_entry().await, Route::Home);
    }
}
