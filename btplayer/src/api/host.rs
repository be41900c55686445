//! Interfaces the player consumes from, and offers to, its host.
//!
//! The media-center host owns the audio engine, the playlist/UI message bus
//! and the player callbacks. The Bluetooth daemon is reached through
//! [`MediaPlayerDaemon`]. All of them are injected into
//! [`BtPlayer`](crate::BtPlayer) at construction time.

use async_trait::async_trait;
use std::sync::Arc;

use crate::Result;
use crate::api::models::{AudioStreamInfo, HostMessage, MediaItem, PlaybackStatus, PlayerOptions, TrackInfo};

/// The host's audio output engine.
///
/// While a Bluetooth session is open the engine is suspended so that
/// exclusive or hog-mode sinks do not block the external player's access to
/// the audio device.
pub trait AudioEngine: Send + Sync {
    /// Requests suspension. Completion is observed through `is_suspended`.
    fn suspend(&self);

    /// Resumes native audio. Returns `false` if the engine failed to restart.
    fn resume(&self) -> bool;

    /// Whether the engine has released the output device.
    fn is_suspended(&self) -> bool;
}

/// Playback notifications delivered to the host.
pub trait PlayerCallback: Send + Sync {
    fn on_playback_started(&self);
    fn on_playback_stopped(&self);
    fn on_playback_paused(&self);
    fn on_playback_resumed(&self);
}

/// The host's asynchronous playlist/UI message bus.
///
/// Posting is fire-and-forget; no reply is expected.
pub trait MessageBus: Send + Sync {
    fn post(&self, message: HostMessage);
}

/// Visualisation sink registered by the host.
///
/// Bluetooth audio never passes through the player, so a registered
/// callback is stored but never fed.
pub trait AudioCallback: Send + Sync {
    fn on_initialize(&self, channels: u32, sample_rate: u32, bits_per_sample: u32);
    fn on_audio_data(&self, samples: &[f32]);
}

/// Property queries against the daemon that owns the remote media player.
///
/// [`BluezDaemon`](crate::BluezDaemon) implements this over D-Bus. Any error
/// is counted by the poll loop toward its failure threshold.
#[async_trait]
pub trait MediaPlayerDaemon: Send + Sync {
    /// Reads the `Track` property bag of the player at `path`.
    async fn track(&self, path: &str) -> Result<TrackInfo>;

    /// Reads the transport status of the player at `path`.
    async fn status(&self, path: &str) -> Result<PlaybackStatus>;

    /// Reads the playback position, in milliseconds, of the player at `path`.
    async fn position(&self, path: &str) -> Result<u32>;
}

/// The host's generic player contract.
///
/// Lifecycle calls report success as a `bool`, the way the host expects;
/// failures are logged by the implementation rather than returned.
#[async_trait]
pub trait Player: Send + Sync {
    fn register_audio_callback(&self, callback: Arc<dyn AudioCallback>);
    fn unregister_audio_callback(&self);

    async fn open_file(&self, item: &MediaItem, options: &PlayerOptions) -> bool;
    fn queue_next_file(&self, item: &MediaItem) -> bool;
    fn on_nothing_to_queue(&self);
    async fn close_file(&self, reopen: bool) -> bool;

    fn is_playing(&self) -> bool;
    fn pause(&self);
    fn is_paused(&self) -> bool;

    fn has_video(&self) -> bool;
    fn has_audio(&self) -> bool;
    fn can_seek(&self) -> bool;
    fn seek(&self, forward: bool, large_step: bool, chapter_override: bool);
    fn seek_percentage(&self, percent: f32);
    fn seek_time(&self, time_ms: i64);
    fn skip_next(&self) -> bool;

    fn percentage(&self) -> f32;
    fn set_volume(&self, volume: f32);
    fn set_dynamic_range_compression(&self, drc: i64);
    fn cache_level(&self) -> i32;
    fn total_time(&self) -> i64;
    fn time(&self) -> i64;
    fn set_speed(&self, speed: f32);
    fn speed(&self) -> f32;
    fn audio_stream_info(&self, index: usize) -> AudioStreamInfo;
    fn is_passthrough(&self) -> bool;
}
