//! BlueZ implementation of [`MediaPlayerDaemon`].

use async_trait::async_trait;
use log::debug;
use zbus::Connection;
use zbus::proxy::CacheProperties;

use crate::Result;
use crate::api::host::MediaPlayerDaemon;
use crate::api::models::{PlaybackStatus, PlayerError, TrackInfo};
use crate::dbus::{BluezObjectManagerProxy, MediaPlayer1Proxy};
use crate::types::constants::bluez;
use crate::util::utils::track_from_properties;

/// Reads remote media player state from BlueZ over the system bus.
///
/// Every query is a plain `org.freedesktop.DBus.Properties.Get` round trip:
/// property caching is disabled so each poll sees the daemon's current value.
///
/// # Example
///
/// ```no_run
/// use btplayer::{BluezDaemon, MediaPlayerDaemon};
///
/// # async fn example() -> btplayer::Result<()> {
/// let daemon = BluezDaemon::system().await?;
///
/// for path in daemon.list_players().await? {
///     let track = daemon.track(&path).await?;
///     println!("{path}: {track}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BluezDaemon {
    conn: Connection,
}

impl BluezDaemon {
    /// Connects to the system D-Bus.
    pub async fn system() -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self { conn })
    }

    /// Uses an existing D-Bus connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Lists the object paths of all media players BlueZ currently exposes.
    ///
    /// A player appears once a connected device has registered an AVRCP
    /// target. Paths are returned sorted.
    pub async fn list_players(&self) -> Result<Vec<String>> {
        let manager = BluezObjectManagerProxy::new(&self.conn).await?;
        let objects = manager.get_managed_objects().await?;

        let mut players: Vec<String> = objects
            .into_iter()
            .filter(|(_, interfaces)| interfaces.contains_key(bluez::MEDIA_PLAYER_INTERFACE))
            .map(|(path, _)| path.as_str().to_owned())
            .collect();
        players.sort();

        debug!("Found {} BlueZ media player(s)", players.len());
        Ok(players)
    }

    /// Returns the first media player from [`list_players`](Self::list_players).
    pub async fn first_player(&self) -> Result<String> {
        self.list_players()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PlayerError::NotFound("Bluetooth media player".into()))
    }

    async fn player(&self, path: &str) -> Result<MediaPlayer1Proxy<'_>> {
        Ok(MediaPlayer1Proxy::builder(&self.conn)
            .destination(bluez::SERVICE)?
            .path(path.to_owned())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?)
    }
}

#[async_trait]
impl MediaPlayerDaemon for BluezDaemon {
    async fn track(&self, path: &str) -> Result<TrackInfo> {
        let props = self.player(path).await?.track().await?;
        Ok(track_from_properties(&props))
    }

    async fn status(&self, path: &str) -> Result<PlaybackStatus> {
        let status = self.player(path).await?.status().await?;
        Ok(PlaybackStatus::from(status.as_str()))
    }

    async fn position(&self, path: &str) -> Result<u32> {
        Ok(self.player(path).await?.position().await?)
    }
}
