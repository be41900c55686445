//! A media-center player adapter for external Bluetooth audio sessions.
//!
//! When a phone streams audio to the machine over A2DP, BlueZ and the
//! system sound server do the actual playback. This crate provides the
//! "player" a media-center host opens for such a session so that:
//!
//! - the host's audio engine releases the output device for the duration
//!   of the session,
//! - the remote device's now-playing metadata and position show up in the
//!   host's UI and playlist,
//! - the host's audio engine is restored when the session ends.
//!
//! # Example
//!
//! ```no_run
//! use btplayer::{BluezDaemon, BtPlayer, Host, MediaItem, PlayerOptions};
//! use std::sync::Arc;
//!
//! # async fn example(host: Host) -> btplayer::Result<()> {
//! let daemon = BluezDaemon::system().await?;
//! let players = daemon.list_players().await?;
//!
//! if let Some(path) = players.first() {
//!     let player = BtPlayer::new(Arc::new(daemon.clone()), host);
//!     player.open(&MediaItem::new(path.as_str()), &PlayerOptions::default()).await;
//!     // ...
//!     player.close(false).await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Host integration
//!
//! The host's audio engine, message bus and playback callbacks are passed in
//! as trait objects through [`Host`]. The Bluetooth daemon is reached through
//! [`MediaPlayerDaemon`]; [`BluezDaemon`] implements it over D-Bus.
//!
//! # Error Handling
//!
//! Daemon queries return `Result<T, PlayerError>`. The player's lifecycle
//! calls never fail: errors are logged and counted, and after too many
//! consecutive failed queries the session stops by itself.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod dbus;
mod types;
mod util;

// Public API modules
pub mod api;

// Re-exported public API
pub use api::config::PlayerConfig;
pub use api::host::{AudioCallback, AudioEngine, MediaPlayerDaemon, MessageBus, Player, PlayerCallback};
pub use api::models::{
    AudioStreamInfo, HostMessage, MediaItem, PlaybackStatus, PlayerError, PlayerOptions, TrackInfo,
};
pub use api::player::{BtPlayer, Host};
pub use dbus::BluezDaemon;

/// A specialized `Result` type for daemon queries.
pub type Result<T> = std::result::Result<T, PlayerError>;
