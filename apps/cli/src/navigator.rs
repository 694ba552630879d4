//! Terminal stand-in for the web client's router.

use houseparty_core::{Navigator, Route};
use parking_lot::Mutex;

/// Prints navigation requests and remembers where the user was sent.
#[derive(Default)]
pub struct TerminalNavigator {
    route: Mutex<Option<Route>>,
    room_code: Mutex<Option<String>>,
    auth_url: Mutex<Option<String>>,
}

impl TerminalNavigator {
    /// The last screen navigated to.
    pub fn current_route(&self) -> Option<Route> {
        self.route.lock().clone()
    }

    /// The room the entry screen would send the user back to.
    pub fn room_code(&self) -> Option<String> {
        self.room_code.lock().clone()
    }

    pub fn auth_url(&self) -> Option<String> {
        self.auth_url.lock().clone()
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        log::debug!("[Navigator] -> {}", route);
        if let Route::Room(code) = &route {
            *self.room_code.lock() = Some(code.clone());
        }
        if route == Route::Home {
            println!("Back at the entry screen.");
        }
        *self.route.lock() = Some(route);
    }

    fn redirect_external(&self, url: &str) {
        println!("Link your playback account to control music in this room:");
        println!("  {}", url);
        *self.auth_url.lock() = Some(url.to_string());
    }

    fn clear_room_code(&self) {
        self.room_code.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_room_code_and_route() {
        let navigator = TerminalNavigator::default();

        navigator.navigate(Route::Room("AB12".into()));
        assert_eq!(navigator.room_code().as_deref(), Some("AB12"));

        navigator.clear_room_code();
        navigator.navigate(Route::Home);
        assert_eq!(navigator.room_code(), None);
        assert_eq!(navigator.current_route(), Some(Route::Home));
    }

    #[test]
    fn remembers_auth_redirect() {
        let navigator = TerminalNavigator::default();
        navigator.redirect_external("https://accounts.example/authorize");
        assert_eq!(
            navigator.auth_url().as_deref(),
            Some("https://accounts.example/authorize")
        );
    }
}
