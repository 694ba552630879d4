//! Current-song polling.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::poller::PollTask;
use crate::remote::PlaybackControl;
use crate::types::NowPlaying;

/// Receives each now-playing poll result.
pub trait NowPlayingObserver: Send + Sync {
    fn on_now_playing(&self, now_playing: NowPlaying);
}

/// Fetches the host's current track once per tick.
///
/// The result always replaces the previous one. Failed fetches are reported
/// as [`NowPlaying::Empty`], never as the last good snapshot.
pub struct NowPlayingPoller {
    playback: Arc<dyn PlaybackControl>,
    observer: Arc<dyn NowPlayingObserver>,
}

impl NowPlayingPoller {
    pub fn new(playback: Arc<dyn PlaybackControl>, observer: Arc<dyn NowPlayingObserver>) -> Self {
        Self { playback, observer }
    }
}

#[async_trait]
impl PollTask for NowPlayingPoller {
    fn name(&self) -> &'static str {
        "NowPlayingPoller"
    }

    async fn tick(&self, cancel: &CancellationToken) {
        let now_playing = match self.playback.get_playback_state().await {
            Ok(now_playing) => now_playing,
            Err(e) => {
                log::debug!("[NowPlayingPoller] Fetch failed, assuming no playback: {}", e);
                NowPlaying::Empty
            }
        };

        if cancel.is_cancelled() {
            log::trace!("[NowPlayingPoller] Discarding result after stop");
            return;
        }

        self.observer.on_now_playing(now_playing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{ApiError, ApiResult};
    use crate::types::PlaybackSnapshot;
    use parking_lot::Mutex;

    struct ScriptedPlayback {
        responses: Mutex<Vec<ApiResult<NowPlaying>>>,
    }

    #[async_trait]
    impl PlaybackControl for ScriptedPlayback {
        async fn get_playback_state(&self) -> ApiResult<NowPlaying> {
            self.responses.lock().remove(0)
        }
        async fn set_playback_volume(&self, _percent: u8) -> ApiResult<()> {
            Ok(())
        }
        async fn playback_play(&self) -> ApiResult<()> {
            Ok(())
        }
        async fn playback_pause(&self) -> ApiResult<()> {
            Ok(())
        }
        async fn playback_skip(&self) -> ApiResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        seen: Mutex<Vec<NowPlaying>>,
    }

    impl NowPlayingObserver for RecordingObserver {
        fn on_now_playing(&self, now_playing: NowPlaying) {
            self.seen.lock().push(now_playing);
        }
    }

    fn track() -> NowPlaying {
        NowPlaying::Playing(PlaybackSnapshot {
            title: "Windowlicker".into(),
            artist: "Aphex Twin".into(),
            image_url: "https://img.example/1.jpg".into(),
            is_playing: true,
            progress_ms: 1000,
            duration_ms: 360_000,
            votes: 0,
            votes_required: 2,
            song_id: Some("abc".into()),
            volume: Some(40),
            user_has_voted: false,
        })
    }

    #[tokio::test]
    async fn errors_replace_snapshot_with_empty() {
        let playback = Arc::new(ScriptedPlayback {
            responses: Mutex::new(vec![
                Ok(track()),
                Err(ApiError::HttpStatus(500, "boom".into())),
                Ok(NowPlaying::Empty),
            ]),
        });
        let observer = Arc::new(RecordingObserver::default());
        let poller = NowPlayingPoller::new(playback, observer.clone());
        let token = CancellationToken::new();

        for _ in 0..3 {
            poller.tick(&token).await;
        }

        let seen = observer.seen.lock();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].is_playing());
        assert!(seen[1].is_empty());
        assert!(seen[2].is_empty());
    }

    #[tokio::test]
    async fn cancelled_tick_publishes_nothing() {
        let playback = Arc::new(ScriptedPlayback {
            responses: Mutex::new(vec![Ok(track())]),
        });
        let observer = Arc::new(RecordingObserver::default());
        let poller = NowPlayingPoller::new(playback, observer.clone());
        let token = CancellationToken::new();
        token.cancel();

        poller.tick(&token).await;

        assert!(observer.seen.lock().is_empty());
    }
}
