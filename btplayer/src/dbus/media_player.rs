//! BlueZ media player proxy.

use std::collections::HashMap;
use zbus::proxy;
use zvariant::OwnedValue;

/// Proxy for `org.bluez.MediaPlayer1`.
///
/// One object exists per remote AVRCP player, under the device path,
/// e.g. `/org/bluez/hci0/dev_00_1A_7D_DA_71_13/player0`.
#[proxy(interface = "org.bluez.MediaPlayer1", default_service = "org.bluez")]
pub(crate) trait MediaPlayer1 {
    /// Track metadata as a dictionary (`Title`, `Artist`, `Album`, `Genre`,
    /// `NumberOfTracks`, `TrackNumber`, `Duration`).
    #[zbus(property)]
    fn track(&self) -> zbus::Result<HashMap<String, OwnedValue>>;

    /// Playback status: "playing", "stopped", "paused", "forward-seek",
    /// "reverse-seek" or "error".
    #[zbus(property)]
    fn status(&self) -> zbus::Result<String>;

    /// Playback position in milliseconds.
    #[zbus(property)]
    fn position(&self) -> zbus::Result<u32>;
}
