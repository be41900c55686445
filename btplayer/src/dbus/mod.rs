//! D-Bus access to BlueZ.
//!
//! This module contains the low-level proxy definitions for the BlueZ media
//! player and object manager interfaces, plus [`BluezDaemon`], the
//! [`MediaPlayerDaemon`](crate::MediaPlayerDaemon) implementation built on them.

mod daemon;
mod media_player;
mod object_manager;

pub use daemon::BluezDaemon;
pub(crate) use media_player::MediaPlayer1Proxy;
pub(crate) use object_manager::BluezObjectManagerProxy;
