//! Constants for the BlueZ D-Bus interface and the adapter's timings.

/// BlueZ service and interface names.
pub mod bluez {
    pub const SERVICE: &str = "org.bluez";
    pub const MEDIA_PLAYER_INTERFACE: &str = "org.bluez.MediaPlayer1";
}

/// Keys of the `Track` property dictionary on `org.bluez.MediaPlayer1`.
pub mod track_keys {
    pub const ARTIST: &str = "Artist";
    pub const TITLE: &str = "Title";
    pub const ALBUM: &str = "Album";
    pub const TRACK_NUMBER: &str = "TrackNumber";
    pub const NUMBER_OF_TRACKS: &str = "NumberOfTracks";
    pub const DURATION: &str = "Duration";
}

/// Values of the `Status` property on `org.bluez.MediaPlayer1`.
pub mod status {
    pub const PLAYING: &str = "playing";
    pub const STOPPED: &str = "stopped";
    pub const PAUSED: &str = "paused";
    pub const FORWARD_SEEK: &str = "forward-seek";
    pub const REVERSE_SEEK: &str = "reverse-seek";
    pub const ERROR: &str = "error";
}

/// Default timings used by [`PlayerConfig`](crate::PlayerConfig).
///
/// The poll loop is timer driven rather than signal driven.
pub mod timeouts {
    use std::time::Duration;

    /// How long `open` waits for the audio engine to report it is suspended.
    const SUSPEND_TIMEOUT_MS: u64 = 2000;

    /// Interval between `is_suspended` checks while waiting.
    const SUSPEND_POLL_MS: u64 = 50;

    /// How long the poll loop waits for its start signal.
    const START_TIMEOUT_MS: u64 = 100;

    /// Interval between two daemon polls.
    const POLL_INTERVAL_MS: u64 = 500;

    /// Interval at which `close` re-checks the pending job counter.
    const DRAIN_INTERVAL_MS: u64 = 100;

    pub fn suspend_timeout() -> Duration {
        Duration::from_millis(SUSPEND_TIMEOUT_MS)
    }

    pub fn suspend_poll() -> Duration {
        Duration::from_millis(SUSPEND_POLL_MS)
    }

    pub fn start_timeout() -> Duration {
        Duration::from_millis(START_TIMEOUT_MS)
    }

    pub fn poll_interval() -> Duration {
        Duration::from_millis(POLL_INTERVAL_MS)
    }

    pub fn drain_interval() -> Duration {
        Duration::from_millis(DRAIN_INTERVAL_MS)
    }
}

/// Consecutive failed daemon queries after which a session is abandoned.
pub const MAX_DBUS_ERRORS: u32 = 50;

/// Largest remote playlist mirrored into the host. Larger `NumberOfTracks`
/// values are logged and not announced.
pub const MAX_PLAYLIST_ITEMS: u32 = 10_000;

/// Playback speed reported to the host. The session is locked at 1x.
pub const NORMAL_SPEED: f32 = 1.0;
