//! Serialized session access for hosts with a separate timer thread
//!
//! The browser drives everything from one event loop, so it owns a plain
//! [`Session`]. Native hosts run the one-second countdown on its own thread;
//! both sides then go through the single mutex in [`SharedSession`], which
//! keeps a late click from landing after the final stats were emitted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Vec2;

use super::state::{FinalStats, GameEvent, LiveStats};
use super::tick::Session;

/// A session behind one lock
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Lock the session. A panic on another thread does not make the state
    /// unreadable; every mutation leaves it consistent.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self, now_ms: f64) {
        self.lock().start(now_ms);
    }

    pub fn stop(&self) -> bool {
        self.lock().stop()
    }

    pub fn frame(&self, now_ms: f64) {
        self.lock().frame(now_ms);
    }

    pub fn click(&self, point: Vec2) -> bool {
        self.lock().click(point)
    }

    pub fn tick_second(&self) -> Option<FinalStats> {
        self.lock().tick_second()
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_running()
    }

    pub fn live_stats(&self) -> LiveStats {
        self.lock().live_stats()
    }

    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.lock().drain_events()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::Countdown;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::sync::mpsc::{self, RecvTimeoutError, Sender};
    use std::thread::JoinHandle;
    use std::time::Duration;

    use super::{FinalStats, SharedSession};

    /// Background thread ticking a [`SharedSession`] once per interval
    ///
    /// Dropping or cancelling the countdown stops the thread before it can
    /// tick again; it is joined before `cancel` returns.
    #[derive(Debug)]
    pub struct Countdown {
        cancel_tx: Option<Sender<()>>,
        handle: Option<JoinHandle<()>>,
    }

    impl Countdown {
        /// Start ticking. `on_end` runs on the timer thread, at most once,
        /// with the final stats of the session.
        pub fn spawn<F>(session: SharedSession, interval: Duration, on_end: F) -> Self
        where
            F: FnOnce(FinalStats) + Send + 'static,
        {
            let (cancel_tx, cancel_rx) = mpsc::channel::<()>();

            let handle = std::thread::spawn(move || {
                loop {
                    match cancel_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let mut guard = session.lock();
                    if !guard.is_running() {
                        break;
                    }
                    if let Some(stats) = guard.tick_second() {
                        drop(guard);
                        on_end(stats);
                        break;
                    }
                }
                log::debug!("Countdown thread exiting");
            });

            Self {
                cancel_tx: Some(cancel_tx),
                handle: Some(handle),
            }
        }

        /// Stop the countdown and wait for the thread to exit
        pub fn cancel(mut self) {
            self.shutdown();
        }

        /// True once the thread has finished (session ended or cancelled)
        pub fn is_finished(&self) -> bool {
            self.handle.as_ref().is_none_or(|h| h.is_finished())
        }

        fn shutdown(&mut self) {
            if let Some(tx) = self.cancel_tx.take() {
                let _ = tx.send(());
            }
            if let Some(handle) = self.handle.take() {
                if handle.join().is_err() {
                    log::warn!("Countdown thread panicked");
                }
            }
        }
    }

    impl Drop for Countdown {
        fn drop(&mut self) {
            self.shutdown();
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::sim::SessionPhase;
    use std::sync::mpsc;
    use std::time::Duration;

    fn shared(secs: u32) -> SharedSession {
        let session = Session::new(5, Vec2::new(800.0, 600.0)).with_duration(secs);
        let shared = SharedSession::new(session);
        shared.start(0.0);
        shared
    }

    #[test]
    fn test_countdown_emits_final_stats_once() {
        let session = shared(3);
        let (tx, rx) = mpsc::channel();
        let countdown = Countdown::spawn(session.clone(), Duration::from_millis(5), move |stats| {
            tx.send(stats).unwrap();
        });

        let stats = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(stats, FinalStats::default());
        countdown.cancel();

        assert!(rx.try_recv().is_err());
        assert_eq!(session.lock().phase(), SessionPhase::Ended);
        let ended = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Ended(_)))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_clicks_after_end_are_ignored() {
        let session = shared(1);
        let (tx, rx) = mpsc::channel();
        let _countdown = Countdown::spawn(session.clone(), Duration::from_millis(1), move |s| {
            tx.send(s).unwrap();
        });
        rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(!session.click(Vec2::new(400.0, 300.0)));
        assert_eq!(session.lock().state().total_clicks, 0);
    }

    #[test]
    fn test_cancel_halts_ticking() {
        let session = shared(30);
        let countdown = Countdown::spawn(session.clone(), Duration::from_secs(60), |_| {
            panic!("must not end");
        });
        countdown.cancel();
        assert_eq!(session.live_stats().time_left, 30);
        assert!(session.is_running());
    }

    #[test]
    fn test_stop_ends_thread_without_stats() {
        let session = shared(30);
        let (tx, rx) = mpsc::channel::<FinalStats>();
        let countdown = Countdown::spawn(session.clone(), Duration::from_millis(2), move |s| {
            tx.send(s).unwrap();
        });
        assert!(session.stop());

        // The next tick sees an ended session and exits
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !countdown.is_finished() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(countdown.is_finished());
        assert!(rx.try_recv().is_err());
    }
}
