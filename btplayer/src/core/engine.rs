//! Handing the audio output device over to the Bluetooth session and back.

use futures_timer::Delay;
use log::{debug, error};
use std::time::{Duration, Instant};

use crate::api::host::AudioEngine;

/// Suspends the host audio engine and waits for it to let go of the device.
///
/// Checks `is_suspended` every `poll` until `timeout` has elapsed. Returns
/// `false` on timeout; the caller carries on regardless.
pub(crate) async fn suspend_engine(engine: &dyn AudioEngine, timeout: Duration, poll: Duration) -> bool {
    engine.suspend();

    let deadline = Instant::now() + timeout;
    while !engine.is_suspended() {
        if Instant::now() >= deadline {
            error!("Audio engine did not suspend within {timeout:?}");
            return false;
        }
        Delay::new(poll).await;
    }

    debug!("Audio engine suspended");
    true
}

/// Resumes native audio processing in the host.
///
/// A failure here leaves the host without audio output; it is logged at the
/// highest level but not propagated.
pub(crate) fn resume_engine(engine: &dyn AudioEngine) -> bool {
    if engine.resume() {
        debug!("Audio engine resumed");
        true
    } else {
        error!("Failed to restart audio engine");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Reports suspended after `checks_needed` calls to `is_suspended`.
    struct SlowEngine {
        checks_needed: u32,
        checks: AtomicU32,
        resume_ok: AtomicBool,
    }

    impl SlowEngine {
        fn new(checks_needed: u32) -> Self {
            Self {
                checks_needed,
                checks: AtomicU32::new(0),
                resume_ok: AtomicBool::new(true),
            }
        }
    }

    impl AudioEngine for SlowEngine {
        fn suspend(&self) {}

        fn resume(&self) -> bool {
            self.resume_ok.load(Ordering::SeqCst)
        }

        fn is_suspended(&self) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst) + 1 >= self.checks_needed
        }
    }

    #[tokio::test]
    async fn suspend_waits_for_confirmation() {
        let engine = SlowEngine::new(3);
        let ok = suspend_engine(&engine, Duration::from_secs(5), Duration::from_millis(1)).await;
        assert!(ok);
        assert_eq!(engine.checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn suspend_times_out() {
        let engine = SlowEngine::new(u32::MAX);
        let ok = suspend_engine(&engine, Duration::from_millis(30), Duration::from_millis(5)).await;
        assert!(!ok);
    }

    #[test]
    fn resume_reports_failure() {
        let engine = SlowEngine::new(0);
        assert!(resume_engine(&engine));

        engine.resume_ok.store(false, Ordering::SeqCst);
        assert!(!resume_engine(&engine));
    }
}
