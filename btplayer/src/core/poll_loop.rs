//! Background task that mirrors the remote player's state into the host.
//!
//! The loop moves through three states:
//!
//! - **WaitingForStart**: waits for the start signal sent by `open`. If it
//!   does not arrive within the start timeout the loop exits without
//!   notifying the host.
//! - **Polling**: queries the daemon for track, status and position on a
//!   fixed interval and forwards changes to the host message bus.
//! - **Stopped**: reached when the session is closed, the stop token is
//!   cancelled or too many consecutive queries failed. The host is told
//!   that playback stopped.

use futures::{FutureExt, select};
use futures_timer::Delay;
use log::{debug, error, info, warn};
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::api::config::PlayerConfig;
use crate::api::host::{MediaPlayerDaemon, MessageBus, PlayerCallback};
use crate::api::models::{HostMessage, MediaItem, PlayerError};
use crate::core::session::PlayerState;
use crate::types::constants::MAX_PLAYLIST_ITEMS;

/// Result of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Continue,
    /// The consecutive failure threshold was reached.
    Exhausted,
}

pub(crate) struct PollLoop {
    state: Arc<PlayerState>,
    daemon: Arc<dyn MediaPlayerDaemon>,
    bus: Arc<dyn MessageBus>,
    callback: Arc<dyn PlayerCallback>,
    config: PlayerConfig,
    stop: CancellationToken,
    /// Consecutive failed daemon queries.
    errors: u32,
    /// Playlist size last announced to the host.
    number_of_tracks: u32,
}

impl PollLoop {
    pub(crate) fn new(
        state: Arc<PlayerState>,
        daemon: Arc<dyn MediaPlayerDaemon>,
        bus: Arc<dyn MessageBus>,
        callback: Arc<dyn PlayerCallback>,
        config: PlayerConfig,
        stop: CancellationToken,
    ) -> Self {
        Self {
            state,
            daemon,
            bus,
            callback,
            config,
            stop,
            errors: 0,
            number_of_tracks: 0,
        }
    }

    pub(crate) async fn run(mut self, start: oneshot::Receiver<()>) {
        if !self.wait_for_start(start).await {
            debug!("Poll loop did not receive its start signal");
            self.state.playing.store(false, Ordering::SeqCst);
            return;
        }

        self.callback.on_playback_started();

        while !self.stop.is_cancelled() {
            let Some(path) = self.state.session_path() else {
                break;
            };

            if self.poll_once(&path).await == PollOutcome::Exhausted {
                error!("Too many D-Bus errors, closing Bluetooth session {path}");
                break;
            }

            let mut tick = pin!(Delay::new(self.config.poll_interval).fuse());
            let mut stopped = pin!(self.stop.cancelled().fuse());
            select! {
                _ = tick => {}
                _ = stopped => {}
            }
        }

        debug!("Poll loop stopped");
        self.state.playing.store(false, Ordering::SeqCst);
        self.callback.on_playback_stopped();
    }

    async fn wait_for_start(&self, start: oneshot::Receiver<()>) -> bool {
        let mut timeout = pin!(Delay::new(self.config.start_timeout).fuse());
        let mut start = start.fuse();
        select! {
            _ = timeout => false,
            signal = start => signal.is_ok(),
        }
    }

    /// Counts a failed query. Returns `true` once the threshold is reached.
    ///
    /// The counter is only reset by a poll in which every query succeeded, so
    /// a property that always fails ends the session even if others answer.
    fn record_failure(&mut self, what: &str, path: &str, err: &PlayerError) -> bool {
        self.errors += 1;
        warn!(
            "Failed to read {what} of {path} ({}/{}): {err}",
            self.errors, self.config.max_dbus_errors
        );
        self.errors >= self.config.max_dbus_errors
    }

    async fn poll_once(&mut self, path: &str) -> PollOutcome {
        let mut failed = false;
        let mut changed = false;
        let mut number_of_tracks = self.number_of_tracks;

        match self.daemon.track(path).await {
            Ok(track) => {
                if track.differs_from(&self.state.track()) {
                    info!("Now playing: {track}");
                    changed = true;
                    number_of_tracks = track.number_of_tracks;
                    self.state.set_track(track.clone());
                }
                self.state.set_total_time(i64::from(track.duration));
            }
            Err(e) => {
                failed = true;
                if self.record_failure("track", path, &e) {
                    return PollOutcome::Exhausted;
                }
            }
        }

        match self.daemon.status(path).await {
            Ok(status) if status.is_playing() => match self.daemon.position(path).await {
                Ok(position) => self.state.set_time(i64::from(position)),
                Err(e) => {
                    failed = true;
                    if self.record_failure("position", path, &e) {
                        return PollOutcome::Exhausted;
                    }
                }
            },
            Ok(status) => debug!("Remote player is {status}"),
            Err(e) => {
                failed = true;
                if self.record_failure("status", path, &e) {
                    return PollOutcome::Exhausted;
                }
            }
        }

        if !failed {
            self.errors = 0;
        }

        if number_of_tracks != self.number_of_tracks {
            changed = true;
            self.number_of_tracks = number_of_tracks;
            if number_of_tracks > MAX_PLAYLIST_ITEMS {
                warn!("Ignoring remote playlist size {number_of_tracks} (limit {MAX_PLAYLIST_ITEMS})");
            } else {
                debug!("Remote playlist size changed to {number_of_tracks}");
                let items = (0..number_of_tracks).map(|_| MediaItem::new(path)).collect();
                self.bus.post(HostMessage::ClearPlaylist);
                self.bus.post(HostMessage::AddToPlaylist(items));
            }
        }

        self.bus.post(HostMessage::AudioInfoChanged);

        if changed {
            let track = self.state.track();
            let song_number = track.track_number;
            self.bus
                .post(HostMessage::UpdateCurrentItem(MediaItem::new(path).with_tag(track)));
            self.bus.post(HostMessage::SetSongNumber(song_number));
        }

        PollOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::api::models::{PlaybackStatus, TrackInfo};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        started: AtomicU32,
        stopped: AtomicU32,
        polls: AtomicU32,
        posts: AtomicU32,
    }

    struct Stub(Arc<Counters>);

    impl PlayerCallback for Stub {
        fn on_playback_started(&self) {
            self.0.started.fetch_add(1, Ordering::SeqCst);
        }
        fn on_playback_stopped(&self) {
            self.0.stopped.fetch_add(1, Ordering::SeqCst);
        }
        fn on_playback_paused(&self) {}
        fn on_playback_resumed(&self) {}
    }

    impl MessageBus for Stub {
        fn post(&self, _message: HostMessage) {
            self.0.posts.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl MediaPlayerDaemon for Stub {
        async fn track(&self, _path: &str) -> Result<TrackInfo> {
            self.0.polls.fetch_add(1, Ordering::SeqCst);
            Ok(TrackInfo::default())
        }
        async fn status(&self, _path: &str) -> Result<PlaybackStatus> {
            Ok(PlaybackStatus::Stopped)
        }
        async fn position(&self, _path: &str) -> Result<u32> {
            Ok(0)
        }
    }

    fn poll_loop(counters: &Arc<Counters>, state: &Arc<PlayerState>, stop: CancellationToken) -> PollLoop {
        let config = PlayerConfig::new()
            .with_start_timeout(Duration::from_millis(20))
            .with_poll_interval(Duration::from_millis(1));
        PollLoop::new(
            Arc::clone(state),
            Arc::new(Stub(Arc::clone(counters))),
            Arc::new(Stub(Arc::clone(counters))),
            Arc::new(Stub(Arc::clone(counters))),
            config,
            stop,
        )
    }

    #[tokio::test]
    async fn missing_start_signal_exits_silently() {
        let counters = Arc::new(Counters::default());
        let state = Arc::new(PlayerState::default());
        state.begin_session("/dev/bt1");
        state.playing.store(true, Ordering::SeqCst);

        let (_start_tx, start_rx) = oneshot::channel();
        poll_loop(&counters, &state, CancellationToken::new())
            .run(start_rx)
            .await;

        assert_eq!(counters.started.load(Ordering::SeqCst), 0);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 0);
        assert_eq!(counters.polls.load(Ordering::SeqCst), 0);
        assert!(!state.playing.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dropped_start_sender_exits_silently() {
        let counters = Arc::new(Counters::default());
        let state = Arc::new(PlayerState::default());
        state.begin_session("/dev/bt1");

        let (start_tx, start_rx) = oneshot::channel::<()>();
        drop(start_tx);
        poll_loop(&counters, &state, CancellationToken::new())
            .run(start_rx)
            .await;

        assert_eq!(counters.started.load(Ordering::SeqCst), 0);
        assert_eq!(counters.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn loop_ends_when_session_is_cleared() {
        let counters = Arc::new(Counters::default());
        let state = Arc::new(PlayerState::default());
        state.begin_session("/dev/bt1");

        let (start_tx, start_rx) = oneshot::channel();
        let task = tokio::spawn(poll_loop(&counters, &state, CancellationToken::new()).run(start_rx));
        start_tx.send(()).unwrap();

        while counters.polls.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        state.end_session();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("poll loop did not stop")
            .unwrap();

        assert_eq!(counters.started.load(Ordering::SeqCst), 1);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
        assert!(counters.posts.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_poll_interval() {
        let counters = Arc::new(Counters::default());
        let state = Arc::new(PlayerState::default());
        state.begin_session("/dev/bt1");

        let stop = CancellationToken::new();
        let mut poll = poll_loop(&counters, &state, stop.clone());
        poll.config.poll_interval = Duration::from_secs(3600);

        let (start_tx, start_rx) = oneshot::channel();
        let task = tokio::spawn(poll.run(start_rx));
        start_tx.send(()).unwrap();

        while counters.polls.load(Ordering::SeqCst) < 1 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        stop.cancel();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("poll loop ignored cancellation")
            .unwrap();

        assert_eq!(counters.polls.load(Ordering::SeqCst), 1);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
    }
}
