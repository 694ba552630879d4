//! Centralized error types for the House Party core library.
//!
//! Each layer keeps its own `thiserror` enum ([`ApiError`], [`SessionError`],
//! [`JoinError`]). This module adds the [`ErrorCode`] trait for stable
//! machine-readable codes and [`HousePartyError`] for setup failures.

use serde::Serialize;
use thiserror::Error;

use crate::remote::ApiError;
use crate::services::{JoinError, SessionError};

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

impl ErrorCode for SessionError {
    fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound(_) => "room_not_found",
            Self::NotHost => "not_host",
            Self::InvalidSettings(_) => "invalid_settings",
            Self::Closed => "session_closed",
            Self::Api(e) => e.code(),
        }
    }
}

impl ErrorCode for JoinError {
    fn code(&self) -> &'static str {
        match self {
            Self::EmptyCode => "empty_room_code",
            Self::RoomNotFound => "room_not_found",
            Self::Api(e) => e.code(),
        }
    }
}

/// Application-wide error type for client setup.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum HousePartyError {
    /// Invalid or inconsistent configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure building runtime infrastructure (HTTP client, URLs).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ErrorCode for HousePartyError {
    fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Convenient Result alias for setup operations.
pub type HousePartyResult<T> = Result<T, HousePartyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_api_errors_keep_their_code() {
        let err = SessionError::Api(ApiError::HttpStatus(500, "boom".into()));
        assert_eq!(err.code(), "http_error_status");

        let err = JoinError::RoomNotFound;
        assert_eq!(err.code(), "room_not_found");
    }

    #[test]
    fn setup_errors_serialize_tagged() {
        let err = HousePartyError::Configuration("base_url must not be empty".into());
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "Configuration");
        assert_eq!(json["details"], "base_url must not be empty");
        assert_eq!(err.code(), "configuration_error");
    }
}
