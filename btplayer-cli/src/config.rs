//! CLI configuration loaded from `~/.config/btplayer/config.toml`.

use btplayer::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Player timings, in milliseconds.
///
/// Every field is optional in the file; missing ones keep the player's
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub suspend_timeout_ms: u64,
    pub suspend_poll_ms: u64,
    pub start_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub drain_interval_ms: u64,
    pub max_dbus_errors: u32,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Default for Config {
    fn default() -> Self {
        let defaults = PlayerConfig::default();
        Self {
            suspend_timeout_ms: millis(defaults.suspend_timeout),
            suspend_poll_ms: millis(defaults.suspend_poll),
            start_timeout_ms: millis(defaults.start_timeout),
            poll_interval_ms: millis(defaults.poll_interval),
            drain_interval_ms: millis(defaults.drain_interval),
            max_dbus_errors: defaults.max_dbus_errors,
        }
    }
}

impl Config {
    /// Load config from `~/.config/btplayer/config.toml`.
    /// Falls back to defaults if the file doesn't exist or has errors.
    pub fn load() -> Self {
        let Some(path) = config_file_path() else {
            return Self::default();
        };

        if !path.exists() {
            log::info!("No config file found, using defaults");
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Failed to parse config file: {e}, using defaults");
                Self::default()
            }),
            Err(e) => {
                log::warn!("Failed to read config file: {e}, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig::new()
            .with_suspend_timeout(Duration::from_millis(self.suspend_timeout_ms))
            .with_suspend_poll(Duration::from_millis(self.suspend_poll_ms))
            .with_start_timeout(Duration::from_millis(self.start_timeout_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_drain_interval(Duration::from_millis(self.drain_interval_ms))
            .with_max_dbus_errors(self.max_dbus_errors)
    }
}

/// Get the config file path: ~/.config/btplayer/config.toml
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("btplayer").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_player_defaults() {
        assert_eq!(Config::default().player_config(), PlayerConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse("poll_interval_ms = 250\nmax_dbus_errors = 10\n").unwrap();
        let player = config.player_config();

        assert_eq!(player.poll_interval, Duration::from_millis(250));
        assert_eq!(player.max_dbus_errors, 10);
        assert_eq!(player.suspend_timeout, Duration::from_secs(2));
    }

    #[test]
    fn invalid_file_is_an_error() {
        assert!(Config::parse("poll_interval_ms = \"fast\"").is_err());
    }
}
