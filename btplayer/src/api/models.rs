use std::fmt::{self, Display};
use thiserror::Error;

use crate::types::constants::status;

/// Now-playing metadata reported by the remote device.
///
/// Mirrors the `Track` dictionary of `org.bluez.MediaPlayer1`. Durations are
/// in milliseconds, as BlueZ reports them.
///
/// # Example
///
/// ```rust
/// use btplayer::TrackInfo;
///
/// let current = TrackInfo {
///     artist: "Boards of Canada".into(),
///     title: "Roygbiv".into(),
///     track_number: 4,
///     ..Default::default()
/// };
///
/// let next = TrackInfo {
///     title: "Turquoise Hexagon Sun".into(),
///     ..current.clone()
/// };
///
/// assert!(next.differs_from(&current));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInfo {
    /// Track artist.
    pub artist: String,
    /// Track title.
    pub title: String,
    /// Album name.
    pub album: String,
    /// Position of the track in the remote playlist (1-based, 0 if unknown).
    pub track_number: u32,
    /// Size of the remote playlist (0 if unknown).
    pub number_of_tracks: u32,
    /// Track length in milliseconds (0 if unknown).
    pub duration: u32,
}

impl TrackInfo {
    /// Returns `true` when `other` describes a different track.
    ///
    /// Only the identifying fields take part in the comparison: artist, title,
    /// album and track number. Duration and playlist size are ignored.
    pub fn differs_from(&self, other: &TrackInfo) -> bool {
        self.artist != other.artist
            || self.title != other.title
            || self.album != other.album
            || self.track_number != other.track_number
    }
}

impl Display for TrackInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.artist.is_empty(), self.title.is_empty()) {
            (true, true) => write!(f, "<unknown track>"),
            (true, false) => write!(f, "{}", self.title),
            (false, true) => write!(f, "{}", self.artist),
            (false, false) => write!(f, "{} - {}", self.artist, self.title),
        }
    }
}

/// Transport status of the remote player.
///
/// Parsed from the `Status` property of `org.bluez.MediaPlayer1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// The remote device is playing.
    Playing,
    /// Playback is stopped.
    Stopped,
    /// Playback is paused.
    Paused,
    /// Fast-forwarding.
    ForwardSeek,
    /// Rewinding.
    ReverseSeek,
    /// The remote player reported an error.
    Error,
    /// A status string BlueZ did not document at the time of writing.
    Other(String),
}

impl PlaybackStatus {
    /// Whether the transport position is advancing.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl From<&str> for PlaybackStatus {
    fn from(value: &str) -> Self {
        match value {
            status::PLAYING => Self::Playing,
            status::STOPPED => Self::Stopped,
            status::PAUSED => Self::Paused,
            status::FORWARD_SEEK => Self::ForwardSeek,
            status::REVERSE_SEEK => Self::ReverseSeek,
            status::ERROR => Self::Error,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "{}", status::PLAYING),
            Self::Stopped => write!(f, "{}", status::STOPPED),
            Self::Paused => write!(f, "{}", status::PAUSED),
            Self::ForwardSeek => write!(f, "{}", status::FORWARD_SEEK),
            Self::ReverseSeek => write!(f, "{}", status::REVERSE_SEEK),
            Self::Error => write!(f, "{}", status::ERROR),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// An item handed to or produced by the player.
///
/// For a Bluetooth session the `path` is the D-Bus object path of the remote
/// media player, e.g. `/org/bluez/hci0/dev_00_1A_7D_DA_71_13/player0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaItem {
    /// Locator of the item.
    pub path: String,
    /// Music tag attached to the item, if any.
    pub tag: Option<TrackInfo>,
}

impl MediaItem {
    /// Creates an untagged item for the given locator.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tag: None,
        }
    }

    /// Attaches a music tag to the item.
    #[must_use]
    pub fn with_tag(mut self, tag: TrackInfo) -> Self {
        self.tag = Some(tag);
        self
    }
}

/// Options passed by the host when opening an item.
///
/// Bluetooth sessions cannot seek, so these are accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerOptions {
    /// Requested start offset in seconds.
    pub start_time: f64,
    /// Requested start position as a percentage of the track.
    pub start_percent: f64,
}

/// Audio stream description reported to the host.
///
/// Decoding happens outside the host, so every field stays at its zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioStreamInfo {
    pub bitrate: u32,
    pub channels: u32,
    pub codec_name: String,
    pub sample_rate: u32,
    pub bits_per_sample: u32,
}

/// Messages posted to the host's playlist/UI bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    /// The now-playing item changed.
    UpdateCurrentItem(MediaItem),
    /// Select the given (remote) playlist position.
    SetSongNumber(u32),
    /// Empty the host playlist.
    ClearPlaylist,
    /// Append items to the host playlist.
    AddToPlaylist(Vec<MediaItem>),
    /// Time or duration were refreshed; redraw the progress bar.
    AudioInfoChanged,
}

/// Errors raised while talking to the Bluetooth daemon.
///
/// The player itself never returns these to the host: they are counted by the
/// poll loop and logged.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// A D-Bus communication error occurred.
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    /// A D-Bus value had an unexpected type.
    #[error("unexpected D-Bus value: {0}")]
    Variant(#[from] zvariant::Error),

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(artist: &str, title: &str, album: &str, number: u32) -> TrackInfo {
        TrackInfo {
            artist: artist.into(),
            title: title.into(),
            album: album.into(),
            track_number: number,
            ..Default::default()
        }
    }

    #[test]
    fn identical_tracks_do_not_differ() {
        let a = track("A", "T1", "Album", 1);
        assert!(!a.differs_from(&a.clone()));
    }

    #[test]
    fn each_identifying_field_is_a_change() {
        let base = track("A", "T1", "Album", 1);
        assert!(track("B", "T1", "Album", 1).differs_from(&base));
        assert!(track("A", "T2", "Album", 1).differs_from(&base));
        assert!(track("A", "T1", "Other", 1).differs_from(&base));
        assert!(track("A", "T1", "Album", 2).differs_from(&base));
    }

    #[test]
    fn duration_and_count_are_not_a_change() {
        let base = track("A", "T1", "Album", 1);
        let longer = TrackInfo {
            duration: 180_000,
            number_of_tracks: 12,
            ..base.clone()
        };
        assert!(!longer.differs_from(&base));
    }

    #[test]
    fn status_parses_bluez_strings() {
        assert_eq!(PlaybackStatus::from("playing"), PlaybackStatus::Playing);
        assert_eq!(PlaybackStatus::from("paused"), PlaybackStatus::Paused);
        assert_eq!(
            PlaybackStatus::from("forward-seek"),
            PlaybackStatus::ForwardSeek
        );
        assert_eq!(
            PlaybackStatus::from("buffering"),
            PlaybackStatus::Other("buffering".into())
        );
        assert!(PlaybackStatus::Playing.is_playing());
        assert!(!PlaybackStatus::Paused.is_playing());
    }

    #[test]
    fn status_display_round_trips() {
        for s in ["playing", "stopped", "paused", "reverse-seek", "error"] {
            assert_eq!(PlaybackStatus::from(s).to_string(), s);
        }
    }

    #[test]
    fn track_display() {
        assert_eq!(track("A", "T1", "", 1).to_string(), "A - T1");
        assert_eq!(track("", "T1", "", 1).to_string(), "T1");
        assert_eq!(TrackInfo::default().to_string(), "<unknown track>");
    }

    #[test]
    fn media_item_with_tag() {
        let item = MediaItem::new("/org/bluez/hci0/dev_00_1A_7D_DA_71_13/player0")
            .with_tag(track("A", "T1", "", 1));
        assert_eq!(item.tag.as_ref().map(|t| t.title.as_str()), Some("T1"));
    }
}
