//! Event emitter abstraction for decoupling services from transport.
//!
//! Services depend on the [`EventEmitter`] trait rather than concrete broadcast
//! channels, enabling testing and alternative front-ends.

use super::{PlaybackEvent, SessionEvent};

/// Trait for emitting domain events without knowledge of transport.
///
/// The room session emits through this trait; how events reach the screen
/// (broadcast channel, terminal output, a GUI binding) is up to the
/// implementation.
pub trait EventEmitter: Send + Sync {
    /// Emits a room session event.
    fn emit_session(&self, event: SessionEvent);

    /// Emits a playback event.
    fn emit_playback(&self, event: PlaybackEvent);
}

/// No-op emitter for testing or when nothing renders the room.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_session(&self, _event: SessionEvent) {}

    fn emit_playback(&self, _event: PlaybackEvent) {}
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_session(&self, event: SessionEvent) {
        tracing::debug!(?event, "session_event");
    }

    fn emit_playback(&self, event: PlaybackEvent) {
        tracing::debug!(?event, "playback_event");
    }
}
