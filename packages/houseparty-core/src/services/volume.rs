//! Interactive volume control with remote-update suppression.
//!
//! The now-playing poll reports the device volume about once a second. If
//! that value were applied while the user is dragging the slider, or right
//! after they let go, the slider would snap back to a stale position. Two
//! windows prevent that:
//!
//! - a release cooldown: the drag counts as active until this long after
//!   release,
//! - a settle cooldown: a remote value is only accepted once the last local
//!   edit is older than this.
//!
//! A remote value is also only considered when it differs from the previous
//! report, so a device that lags behind (or a set-volume call that failed)
//! does not pull the slider back to the pre-drag position.
//!
//! [`VolumeOverride`] is the clock-free state machine; [`VolumeControl`]
//! binds it to the clock and sends the backend calls, one per change, in the
//! order the changes were made.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::protocol_constants::DEFAULT_VOLUME;
use crate::remote::PlaybackControl;
use crate::runtime::TokioSpawner;
use crate::types::clamp_volume;

/// The two suppression windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeCooldowns {
    /// How long a drag stays active after release.
    pub release: Duration,
    /// How old the last local edit must be before remote values apply.
    pub settle: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragPhase {
    Idle,
    Dragging,
    /// Released; active until `until`.
    Releasing { until: Instant },
}

/// Displayed volume merged from local edits and remote reports.
#[derive(Debug, Clone)]
pub struct VolumeOverride {
    phase: DragPhase,
    value: u8,
    last_changed_at: Option<Instant>,
    /// Previous remote report, applied or not.
    last_remote: Option<u8>,
    cooldowns: VolumeCooldowns,
}

impl VolumeOverride {
    pub fn new(initial: u8, cooldowns: VolumeCooldowns) -> Self {
        Self {
            phase: DragPhase::Idle,
            value: clamp_volume(initial),
            last_changed_at: None,
            last_remote: None,
            cooldowns,
        }
    }

    /// The value the slider should show.
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn last_changed_at(&self) -> Option<Instant> {
        self.last_changed_at
    }

    /// Whether a drag is in progress or still inside its release cooldown.
    pub fn is_active(&self, now: Instant) -> bool {
        match self.phase {
            DragPhase::Idle => false,
            DragPhase::Dragging => true,
            DragPhase::Releasing { until } => now < until,
        }
    }

    /// Starts a drag. A pending release is discarded.
    pub fn drag_start(&mut self) {
        self.phase = DragPhase::Dragging;
    }

    /// Records a local edit and returns the (clamped) value to send.
    pub fn change(&mut self, value: u8, now: Instant) -> u8 {
        self.value = clamp_volume(value);
        self.last_changed_at = Some(now);
        self.value
    }

    /// Ends a drag; it stays active for the release cooldown.
    ///
    /// Calling this again restarts the cooldown from `now`.
    pub fn drag_end(&mut self, now: Instant) {
        self.phase = DragPhase::Releasing {
            until: now + self.cooldowns.release,
        };
    }

    /// Offers a remotely reported volume. Returns whether it was applied.
    ///
    /// Dropped when it equals the previous report, while the drag is active,
    /// and while the last local edit is not yet older than the settle cooldown.
    pub fn external_update(&mut self, remote: u8, now: Instant) -> bool {
        let remote = clamp_volume(remote);
        if self.last_remote.replace(remote) == Some(remote) {
            return false;
        }
        if self.is_active(now) {
            return false;
        }
        self.phase = DragPhase::Idle;

        if let Some(changed_at) = self.last_changed_at {
            if now.saturating_duration_since(changed_at) <= self.cooldowns.settle {
                return false;
            }
        }

        self.value = remote;
        true
    }
}

/// Volume slider controller bound to the backend.
///
/// Every change event produces exactly one `set_playback_volume` call. Calls
/// are queued to a single sender task and go out one at a time, so the device
/// ends on the last value the user picked. The sender stops when `cancel`
/// fires; a call already in flight is allowed to finish.
pub struct VolumeControl {
    state: Mutex<VolumeOverride>,
    requests: mpsc::UnboundedSender<u8>,
}

impl VolumeControl {
    pub fn new(
        playback: Arc<dyn PlaybackControl>,
        cooldowns: VolumeCooldowns,
        spawner: &TokioSpawner,
        cancel: CancellationToken,
    ) -> Self {
        let (requests, queue) = mpsc::unbounded_channel();
        spawner.spawn_tracked(send_in_order(playback, queue, cancel));

        Self {
            state: Mutex::new(VolumeOverride::new(DEFAULT_VOLUME, cooldowns)),
            requests,
        }
    }

    /// The value the slider should show.
    pub fn display_value(&self) -> u8 {
        self.state.lock().value()
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().is_active(Instant::now())
    }

    pub fn on_drag_start(&self) {
        self.state.lock().drag_start();
    }

    /// Applies a slider movement locally and queues it for the backend.
    /// Returns the value now displayed.
    pub fn on_change(&self, value: u8) -> u8 {
        let value = self.state.lock().change(value, Instant::now());
        if self.requests.send(value).is_err() {
            log::debug!("[Volume] Sender stopped, not sending {}", value);
        }
        value
    }

    pub fn on_drag_end(&self) {
        self.state.lock().drag_end(Instant::now());
    }

    /// Offers a polled volume. Returns the new display value if it was applied.
    pub fn on_external_update(&self, remote: u8) -> Option<u8> {
        let mut state = self.state.lock();
        if state.external_update(remote, Instant::now()) {
            Some(state.value())
        } else {
            log::trace!("[Volume] Ignored remote volume {}", remote);
            None
        }
    }
}

/// Sends queued volume values one at a time until cancelled.
async fn send_in_order(
    playback: Arc<dyn PlaybackControl>,
    mut queue: mpsc::UnboundedReceiver<u8>,
    cancel: CancellationToken,
) {
    loop {
        let value = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            value = queue.recv() => match value {
                Some(value) => value,
                None => break,
            },
        };

        if let Err(e) = playback.set_playback_volume(value).await {
            log::warn!("[Volume] Failed to set volume to {}: {}", value, e);
        }
    }
    log::trace!("[Volume] Sender stopped");
}
