//! Navigation seam between the core and the presentation layer.
//!
//! Screens, routing and rendering live outside this crate. Services that
//! need to move the user somewhere (leaving a room, the host's account
//! linking redirect) go through the [`Navigator`] trait.

use std::fmt;

use crate::protocol_constants::JOIN_ROUTE;

/// Client screens the core can send the user to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Entry screen.
    Home,
    Join,
    Create,
    Info,
    Room(String),
}

impl Route {
    /// Path of the screen, as used by the web client's router.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Join => JOIN_ROUTE.to_string(),
            Route::Create => "/create".to_string(),
            Route::Info => "/info".to_string(),
            Route::Room(code) => format!("/room/{}", code),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Trait for moving the user between screens.
///
/// Implementations must not block; they are called from poller callbacks.
pub trait Navigator: Send + Sync {
    /// Shows an in-app screen.
    fn navigate(&self, route: Route);

    /// Leaves the app for an external page (full navigation).
    fn redirect_external(&self, url: &str);

    /// Forgets the room code the entry screen would auto-redirect to.
    fn clear_room_code(&self);
}

/// Logging navigator for headless use.
///
/// Records navigation requests at info level and does nothing else.
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: Route) {
        log::info!("[Navigator] -> {}", route);
    }

    fn redirect_external(&self, url: &str) {
        log::info!("[Navigator] External redirect -> {}", url);
    }

    fn clear_room_code(&self) {
        log::debug!("[Navigator] Room code cleared");
    }
}
