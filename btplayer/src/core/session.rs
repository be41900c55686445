//! State shared between the caller side of the player and its poll loop.
//!
//! The session lock guards the session path, the pending job counter and
//! the registered audio callback. It is only held for field updates, never
//! across an await point or a daemon query.

use futures::{FutureExt, select};
use futures_timer::Delay;
use log::debug;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

use crate::api::host::AudioCallback;
use crate::api::models::{AudioStreamInfo, TrackInfo};

/// Fields protected by the session lock.
#[derive(Default)]
pub(crate) struct Session {
    /// Object path of the remote player, `None` when no session is open.
    pub path: Option<String>,
    /// Queue operations that have started but not completed.
    pub pending_jobs: u32,
    pub audio_callback: Option<Arc<dyn AudioCallback>>,
}

/// Values the host reads to draw its player UI.
#[derive(Debug, Clone, Default)]
pub(crate) struct GuiData {
    pub time: i64,
    pub total_time: i64,
    pub cache_level: i32,
    pub can_seek: bool,
    pub stream: AudioStreamInfo,
}

#[derive(Default)]
pub(crate) struct PlayerState {
    session: Mutex<Session>,
    jobs_done: Notify,
    gui: Mutex<GuiData>,
    track: Mutex<TrackInfo>,
    pub playing: AtomicBool,
    pub paused: AtomicBool,
    pub finished: AtomicBool,
    /// Set while the host audio engine is suspended on our behalf.
    pub engine_held: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PlayerState {
    pub(crate) fn session(&self) -> MutexGuard<'_, Session> {
        lock(&self.session)
    }

    /// Records a new session and forgets everything known about the last one.
    pub(crate) fn begin_session(&self, path: &str) {
        self.session().path = Some(path.to_string());
        *lock(&self.gui) = GuiData::default();
        *lock(&self.track) = TrackInfo::default();
        self.paused.store(false, Ordering::SeqCst);
        self.finished.store(false, Ordering::SeqCst);
    }

    pub(crate) fn end_session(&self) {
        self.session().path = None;
    }

    pub(crate) fn session_path(&self) -> Option<String> {
        self.session().path.clone()
    }

    pub(crate) fn job_started(&self) {
        self.session().pending_jobs += 1;
    }

    pub(crate) fn job_completed(&self) {
        {
            let mut session = self.session();
            session.pending_jobs = session.pending_jobs.saturating_sub(1);
        }
        self.jobs_done.notify_waiters();
    }

    pub(crate) fn pending_jobs(&self) -> u32 {
        self.session().pending_jobs
    }

    /// Blocks until no queue operation is in flight.
    ///
    /// Wakes on every job completion and re-checks at least every `interval`.
    pub(crate) async fn drain_jobs(&self, interval: Duration) {
        loop {
            // Register before checking so a completion in between is not lost.
            let mut completed = pin!(self.jobs_done.notified().fuse());

            let pending = self.pending_jobs();
            if pending == 0 {
                return;
            }
            debug!("Waiting for {pending} pending job(s) to complete");

            let mut tick = pin!(Delay::new(interval).fuse());
            select! {
                _ = tick => {}
                _ = completed => {}
            }
        }
    }

    pub(crate) fn gui(&self) -> GuiData {
        lock(&self.gui).clone()
    }

    pub(crate) fn set_time(&self, time: i64) {
        lock(&self.gui).time = time;
    }

    pub(crate) fn set_total_time(&self, total_time: i64) {
        lock(&self.gui).total_time = total_time;
    }

    pub(crate) fn track(&self) -> TrackInfo {
        lock(&self.track).clone()
    }

    pub(crate) fn set_track(&self, track: TrackInfo) {
        *lock(&self.track) = track;
    }
}
