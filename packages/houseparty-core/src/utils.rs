//! General utilities shared across the crate.

use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

use crate::protocol_constants::{JOIN_ROUTE, ROOM_CODE_PARAM};

// ─────────────────────────────────────────────────────────────────────────────
// Time Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the current Unix timestamp in milliseconds.
///
/// Returns 0 if the system clock is before the Unix epoch (shouldn't happen in practice).
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Join Links
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the shareable join link `<origin>/join?code=<code>`.
///
/// This is the value rendered as a QR code on the room screen. Any path on
/// `origin` is replaced. Falls back to plain concatenation when `origin` is
/// not an absolute URL, so a relative link is still produced.
#[must_use]
pub fn join_url(origin: &str, code: &str) -> String {
    match Url::parse(origin).and_then(|base| base.join(JOIN_ROUTE)) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(ROOM_CODE_PARAM, code);
            url.to_string()
        }
        Err(_) => format!(
            "{}{}?{}={}",
            origin.trim_end_matches('/'),
            JOIN_ROUTE,
            ROOM_CODE_PARAM,
            code
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_appends_code_to_origin() {
        assert_eq!(
            join_url("https://party.example", "AB12"),
            "https://party.example/join?code=AB12"
        );
    }

    #[test]
    fn join_url_replaces_existing_path() {
        assert_eq!(
            join_url("http://localhost:8000/room/AB12", "AB12"),
            "http://localhost:8000/join?code=AB12"
        );
    }

    #[test]
    fn join_url_encodes_code() {
        assert_eq!(
            join_url("http://localhost:8000", "A B&C"),
            "http://localhost:8000/join?code=A+B%26C"
        );
    }

    #[test]
    fn join_url_without_scheme_concatenates() {
        assert_eq!(join_url("party.local/", "AB12"), "party.local/join?code=AB12");
    }

    #[test]
    fn now_millis_is_after_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }
}
