//! Host services for running the player outside a media center.

use btplayer::{AudioEngine, HostMessage, MessageBus, PlayerCallback};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Stands in for a media-center audio engine.
///
/// The CLI never opens an output device, so suspending only flips a flag.
#[derive(Debug, Default)]
pub struct DetachedEngine {
    suspended: AtomicBool,
}

impl AudioEngine for DetachedEngine {
    fn suspend(&self) {
        debug!("Suspending (no audio engine to release)");
        self.suspended.store(true, Ordering::SeqCst);
    }

    fn resume(&self) -> bool {
        debug!("Resuming (no audio engine to restore)");
        self.suspended.store(false, Ordering::SeqCst);
        true
    }

    fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }
}

/// Prints now-playing changes to stdout.
#[derive(Debug, Default)]
pub struct ConsoleBus;

impl MessageBus for ConsoleBus {
    fn post(&self, message: HostMessage) {
        match message {
            HostMessage::UpdateCurrentItem(item) => {
                let Some(tag) = item.tag else {
                    return;
                };
                println!("Now playing: {tag}");
                if !tag.album.is_empty() {
                    println!("  Album: {}", tag.album);
                }
                if tag.duration > 0 {
                    let secs = tag.duration / 1000;
                    println!("  Length: {}:{:02}", secs / 60, secs % 60);
                }
            }
            HostMessage::AddToPlaylist(items) => {
                println!("Remote playlist has {} track(s)", items.len());
            }
            HostMessage::SetSongNumber(n) => debug!("Remote playlist position: {n}"),
            HostMessage::ClearPlaylist => debug!("Playlist cleared"),
            HostMessage::AudioInfoChanged => {}
        }
    }
}

/// Logs playback notifications and lets the CLI wait for the session to end.
#[derive(Debug, Default)]
pub struct SessionCallback {
    stopped: Notify,
}

impl SessionCallback {
    /// Completes once the player reports that playback stopped.
    pub async fn stopped(&self) {
        self.stopped.notified().await;
    }
}

impl PlayerCallback for SessionCallback {
    fn on_playback_started(&self) {
        info!("Following Bluetooth playback");
    }

    fn on_playback_stopped(&self) {
        info!("Bluetooth playback stopped");
        self.stopped.notify_one();
    }

    fn on_playback_paused(&self) {
        info!("Paused");
    }

    fn on_playback_resumed(&self) {
        info!("Resumed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn detached_engine_tracks_suspension() {
        let engine = DetachedEngine::default();
        assert!(!engine.is_suspended());
        engine.suspend();
        assert!(engine.is_suspended());
        assert!(engine.resume());
        assert!(!engine.is_suspended());
    }

    #[tokio::test]
    async fn stop_before_wait_is_not_lost() {
        let callback = SessionCallback::default();
        callback.on_playback_stopped();
        tokio::time::timeout(Duration::from_secs(1), callback.stopped())
            .await
            .expect("stop notification was lost");
    }
}
