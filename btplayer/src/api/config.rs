//! Timing configuration for [`BtPlayer`](crate::BtPlayer).

use std::time::Duration;

use crate::types::constants::{MAX_DBUS_ERRORS, timeouts};

/// Timings and limits used by the player.
///
/// The defaults match what a media-center host expects from a Bluetooth
/// session: the audio engine gets 2 seconds to let go of the output device
/// and the daemon is polled twice a second.
///
/// # Example
///
/// ```rust
/// use btplayer::PlayerConfig;
/// use std::time::Duration;
///
/// let config = PlayerConfig::new()
///     .with_poll_interval(Duration::from_millis(250))
///     .with_max_dbus_errors(10);
///
/// assert_eq!(config.poll_interval, Duration::from_millis(250));
/// assert_eq!(config.suspend_timeout, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// How long `open` waits for the audio engine to suspend.
    pub suspend_timeout: Duration,
    /// Interval between suspend checks.
    pub suspend_poll: Duration,
    /// How long the poll loop waits for its start signal before giving up.
    pub start_timeout: Duration,
    /// Interval between two daemon polls.
    pub poll_interval: Duration,
    /// Interval at which `close` re-checks pending jobs.
    pub drain_interval: Duration,
    /// Consecutive failed daemon queries tolerated before the session stops.
    pub max_dbus_errors: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            suspend_timeout: timeouts::suspend_timeout(),
            suspend_poll: timeouts::suspend_poll(),
            start_timeout: timeouts::start_timeout(),
            poll_interval: timeouts::poll_interval(),
            drain_interval: timeouts::drain_interval(),
            max_dbus_errors: MAX_DBUS_ERRORS,
        }
    }
}

impl PlayerConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_suspend_timeout(mut self, timeout: Duration) -> Self {
        self.suspend_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_suspend_poll(mut self, interval: Duration) -> Self {
        self.suspend_poll = interval;
        self
    }

    #[must_use]
    pub fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_drain_interval(mut self, interval: Duration) -> Self {
        self.drain_interval = interval;
        self
    }

    /// Sets the failure threshold. A value of 0 is treated as 1.
    #[must_use]
    pub fn with_max_dbus_errors(mut self, max: u32) -> Self {
        self.max_dbus_errors = max.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.suspend_timeout, Duration::from_secs(2));
        assert_eq!(config.suspend_poll, Duration::from_millis(50));
        assert_eq!(config.start_timeout, Duration::from_millis(100));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.drain_interval, Duration::from_millis(100));
        assert_eq!(config.max_dbus_errors, 50);
    }

    #[test]
    fn zero_error_threshold_is_clamped() {
        assert_eq!(PlayerConfig::new().with_max_dbus_errors(0).max_dbus_errors, 1);
    }
}
