//! Room configuration polling.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::poller::PollTask;
use crate::remote::RoomApi;
use crate::types::RoomDetails;

/// Receives room configuration poll outcomes.
pub trait RoomConfigObserver: Send + Sync {
    /// The room still exists; `details` is the fresh configuration.
    fn on_room_details(&self, details: RoomDetails);

    /// The backend no longer knows the room.
    fn on_room_missing(&self);
}

/// Re-reads the room's settings and host status once per tick.
///
/// Transport failures are ignored and the previous state is kept until the
/// next tick. Only a definitive not-found answer reaches
/// [`RoomConfigObserver::on_room_missing`].
pub struct RoomConfigPoller {
    room_code: String,
    rooms: Arc<dyn RoomApi>,
    observer: Arc<dyn RoomConfigObserver>,
}

impl RoomConfigPoller {
    pub fn new(
        room_code: impl Into<String>,
        rooms: Arc<dyn RoomApi>,
        observer: Arc<dyn RoomConfigObserver>,
    ) -> Self {
        Self {
            room_code: room_code.into(),
            rooms,
            observer,
        }
    }
}

#[async_trait]
impl PollTask for RoomConfigPoller {
    fn name(&self) -> &'static str {
        "RoomConfigPoller"
    }

    async fn tick(&self, cancel: &CancellationToken) {
        let result = self.rooms.get_room_state(&self.room_code).await;

        if cancel.is_cancelled() {
            log::trace!("[RoomConfigPoller] Discarding result after stop");
            return;
        }

        match result {
            Ok(Some(details)) => self.observer.on_room_details(details),
            Ok(None) => {
                log::info!("[RoomConfigPoller] Room {} no longer exists", self.room_code);
                self.observer.on_room_missing();
            }
            Err(e) if e.is_transient() => {
                log::debug!(
                    "[RoomConfigPoller] Fetch failed for {}, retrying next tick: {}",
                    self.room_code,
                    e
                );
            }
            Err(e) => {
                log::warn!(
                    "[RoomConfigPoller] Fetch failed for {}, keeping state: {}",
                    self.room_code,
                    e
                );
            }
        }
    }
}
