use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::config::PlayerConfig;
use crate::api::host::{AudioCallback, AudioEngine, MediaPlayerDaemon, MessageBus, Player, PlayerCallback};
use crate::api::models::{AudioStreamInfo, MediaItem, PlayerOptions, TrackInfo};
use crate::core::engine::{resume_engine, suspend_engine};
use crate::core::poll_loop::PollLoop;
use crate::core::session::PlayerState;
use crate::types::constants::NORMAL_SPEED;

/// Host services the player calls into.
#[derive(Clone)]
pub struct Host {
    /// The host's audio output engine.
    pub engine: Arc<dyn AudioEngine>,
    /// The host's playlist/UI message bus.
    pub bus: Arc<dyn MessageBus>,
    /// Receiver of playback notifications.
    pub callback: Arc<dyn PlayerCallback>,
}

/// A running poll loop and the token that stops it.
struct Worker {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl Worker {
    async fn stop(self) {
        self.stop.cancel();
        if let Err(e) = self.handle.await {
            warn!("Poll loop task failed: {e}");
        }
    }
}

/// Media-center player for an external Bluetooth playback session.
///
/// The remote device plays audio on its own (through BlueZ and the system
/// sound server). While a session is open the player keeps the host's audio
/// engine suspended, polls BlueZ for now-playing metadata and position, and
/// forwards them to the host's UI.
///
/// # Example
///
/// ```no_run
/// use btplayer::{BluezDaemon, BtPlayer, Host, MediaItem, PlayerOptions};
/// use std::sync::Arc;
///
/// # async fn example(host: Host) -> btplayer::Result<()> {
/// let daemon = Arc::new(BluezDaemon::system().await?);
/// let player = BtPlayer::new(daemon, host);
///
/// let item = MediaItem::new("/org/bluez/hci0/dev_00_1A_7D_DA_71_13/player0");
/// player.open(&item, &PlayerOptions::default()).await;
///
/// // ... the host receives HostMessage::UpdateCurrentItem as tracks change ...
///
/// player.close(false).await;
/// # Ok(())
/// # }
/// ```
///
/// # Concurrency
///
/// `open` and `close` are serialised: `open` always stops the previous poll
/// loop before starting a new one, so at most one loop runs at a time. Both
/// must be called from within a Tokio runtime.
///
/// Dropping a player with an open session stops its poll loop and resumes
/// the host audio engine without waiting for pending jobs.
pub struct BtPlayer {
    state: Arc<PlayerState>,
    daemon: Arc<dyn MediaPlayerDaemon>,
    host: Host,
    config: PlayerConfig,
    worker: Mutex<Option<Worker>>,
}

impl BtPlayer {
    /// Creates a player with default timings.
    pub fn new(daemon: Arc<dyn MediaPlayerDaemon>, host: Host) -> Self {
        Self::with_config(daemon, host, PlayerConfig::default())
    }

    /// Creates a player with custom timings.
    pub fn with_config(daemon: Arc<dyn MediaPlayerDaemon>, host: Host, config: PlayerConfig) -> Self {
        Self {
            state: Arc::new(PlayerState::default()),
            daemon,
            host,
            config,
            worker: Mutex::new(None),
        }
    }

    /// Returns the timings in use.
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Starts tracking the remote player at `item.path`.
    ///
    /// Any previous session's poll loop is stopped first. The host audio
    /// engine is suspended (waiting up to `suspend_timeout` for it to comply),
    /// then a new poll loop is started. Always returns `true`: a suspend
    /// timeout is logged, not reported.
    pub async fn open(&self, item: &MediaItem, _options: &PlayerOptions) -> bool {
        let mut worker = self.worker.lock().await;
        if let Some(previous) = worker.take() {
            debug!("Stopping previous poll loop");
            previous.stop().await;
        }

        info!("Opening Bluetooth session: {}", item.path);
        self.state.begin_session(&item.path);

        self.state.engine_held.store(true, Ordering::SeqCst);
        suspend_engine(
            &*self.host.engine,
            self.config.suspend_timeout,
            self.config.suspend_poll,
        )
        .await;

        let (start_tx, start_rx) = oneshot::channel();
        let stop = CancellationToken::new();
        let poll = PollLoop::new(
            Arc::clone(&self.state),
            Arc::clone(&self.daemon),
            Arc::clone(&self.host.bus),
            Arc::clone(&self.host.callback),
            self.config,
            stop.clone(),
        );

        self.state.playing.store(true, Ordering::SeqCst);
        let handle = tokio::spawn(poll.run(start_rx));
        *worker = Some(Worker { stop, handle });

        if start_tx.send(()).is_err() {
            debug!("Poll loop exited before it could be started");
        }
        true
    }

    /// Ends the session and gives the audio device back to the host.
    ///
    /// Stops the poll loop, waits for every pending queue operation to
    /// complete, then resumes the host audio engine. Always returns `true`;
    /// a failed resume is logged.
    pub async fn close(&self, reopen: bool) -> bool {
        debug!("Closing Bluetooth session (reopen: {reopen})");
        let mut worker = self.worker.lock().await;
        if let Some(current) = worker.as_ref() {
            current.stop.cancel();
        }
        self.state.end_session();
        if let Some(current) = worker.take() {
            current.stop().await;
        }
        self.state.playing.store(false, Ordering::SeqCst);

        self.state.drain_jobs(self.config.drain_interval).await;

        self.state.engine_held.store(false, Ordering::SeqCst);
        resume_engine(&*self.host.engine);
        true
    }

    /// Registers a queue operation. No queuing work is done.
    pub fn queue_next(&self, _item: &MediaItem) -> bool {
        self.state.job_started();
        true
    }

    /// Marks a queue operation complete and wakes a waiting `close`.
    pub fn on_job_complete(&self) {
        self.state.job_completed();
    }

    /// Number of queue operations still in flight.
    pub fn pending_jobs(&self) -> u32 {
        self.state.pending_jobs()
    }

    /// Called by the host when its playlist has nothing left to queue.
    pub fn on_nothing_to_queue(&self) {
        self.state.finished.store(true, Ordering::SeqCst);
    }

    /// Whether the host reported an exhausted playlist for this session.
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::SeqCst)
    }

    /// Object path of the active session, if any.
    pub fn session_path(&self) -> Option<String> {
        self.state.session_path()
    }

    /// Last track reported by the remote device.
    pub fn current_track(&self) -> TrackInfo {
        self.state.track()
    }

    /// Whether a session is open and its poll loop has not stopped.
    pub fn is_playing(&self) -> bool {
        self.state.playing.load(Ordering::SeqCst)
    }

    /// Whether the host paused the session through [`pause`](Self::pause).
    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }

    /// Toggles the paused flag and notifies the host.
    ///
    /// No command is sent to the remote device.
    pub fn pause(&self) {
        let was_paused = self.state.paused.fetch_xor(true, Ordering::SeqCst);
        if was_paused {
            self.host.callback.on_playback_resumed();
        } else {
            self.host.callback.on_playback_paused();
        }
    }

    /// Playback position in milliseconds.
    pub fn time(&self) -> i64 {
        self.state.gui().time
    }

    /// Track length in milliseconds.
    pub fn total_time(&self) -> i64 {
        self.state.gui().total_time
    }

    /// Playback progress in percent, or 0 when the length is unknown.
    pub fn percentage(&self) -> f32 {
        let gui = self.state.gui();
        if gui.total_time > 0 {
            gui.time as f32 * 100.0 / gui.total_time as f32
        } else {
            0.0
        }
    }

    /// Always 0: nothing is buffered on the host side.
    pub fn cache_level(&self) -> i32 {
        self.state.gui().cache_level
    }

    /// Always `false`: the remote device owns the transport.
    pub fn can_seek(&self) -> bool {
        self.state.gui().can_seek
    }

    /// Placeholder stream description with every field zeroed. The decoded
    /// stream never reaches the host, so codec and format are unknown.
    pub fn audio_stream_info(&self) -> AudioStreamInfo {
        self.state.gui().stream
    }
}

impl Drop for BtPlayer {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.stop.cancel();
        }
        self.state.end_session();
        if self.state.engine_held.swap(false, Ordering::SeqCst) {
            debug!("Player dropped with an open session, resuming audio engine");
            resume_engine(&*self.host.engine);
        }
    }
}

#[async_trait]
impl Player for BtPlayer {
    fn register_audio_callback(&self, callback: Arc<dyn AudioCallback>) {
        self.state.session().audio_callback = Some(callback);
    }

    fn unregister_audio_callback(&self) {
        self.state.session().audio_callback = None;
    }

    async fn open_file(&self, item: &MediaItem, options: &PlayerOptions) -> bool {
        self.open(item, options).await
    }

    fn queue_next_file(&self, item: &MediaItem) -> bool {
        self.queue_next(item)
    }

    fn on_nothing_to_queue(&self) {
        BtPlayer::on_nothing_to_queue(self);
    }

    async fn close_file(&self, reopen: bool) -> bool {
        self.close(reopen).await
    }

    fn is_playing(&self) -> bool {
        BtPlayer::is_playing(self)
    }

    fn pause(&self) {
        BtPlayer::pause(self);
    }

    fn is_paused(&self) -> bool {
        BtPlayer::is_paused(self)
    }

    fn has_video(&self) -> bool {
        false
    }

    fn has_audio(&self) -> bool {
        true
    }

    fn can_seek(&self) -> bool {
        BtPlayer::can_seek(self)
    }

    fn seek(&self, _forward: bool, _large_step: bool, _chapter_override: bool) {}

    fn seek_percentage(&self, _percent: f32) {}

    fn seek_time(&self, _time_ms: i64) {}

    fn skip_next(&self) -> bool {
        false
    }

    fn percentage(&self) -> f32 {
        BtPlayer::percentage(self)
    }

    fn set_volume(&self, _volume: f32) {}

    fn set_dynamic_range_compression(&self, _drc: i64) {}

    fn cache_level(&self) -> i32 {
        BtPlayer::cache_level(self)
    }

    fn total_time(&self) -> i64 {
        BtPlayer::total_time(self)
    }

    fn time(&self) -> i64 {
        BtPlayer::time(self)
    }

    fn set_speed(&self, _speed: f32) {}

    fn speed(&self) -> f32 {
        NORMAL_SPEED
    }

    fn audio_stream_info(&self, _index: usize) -> AudioStreamInfo {
        BtPlayer::audio_stream_info(self)
    }

    fn is_passthrough(&self) -> bool {
        true
    }
}
