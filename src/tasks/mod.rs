//! The two long-running loops and the little bit of machinery they share for waiting.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

pub mod producer;
pub mod publisher;

/// A stop request that can interrupt an idle wait. Nothing in normal operation ever sets it; it
/// exists for bounded runs and tests.
#[derive(Default)]
pub struct Shutdown {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }

    /// Sleeps for `period`, or less if a stop is requested. Returns true if we should keep
    /// going.
    pub fn idle(&self, period: Duration) -> bool {
        let stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = self
            .wake
            .wait_timeout_while(stopped, period, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        !*stopped
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;

    #[test]
    fn idle_runs_out_the_clock() {
        let shutdown = Shutdown::new();
        let start = Instant::now();
        assert!(shutdown.idle(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn stop_cuts_idle_short() {
        let shutdown = Arc::new(Shutdown::new());
        let waiter = {
            let shutdown = shutdown.clone();
            std::thread::spawn(move || {
                let start = Instant::now();
                let keep_going = shutdown.idle(Duration::from_secs(600));
                (keep_going, start.elapsed())
            })
        };
        std::thread::sleep(Duration::from_millis(20));
        shutdown.stop();

        let (keep_going, elapsed) = waiter.join().unwrap();
        assert!(!keep_going);
        assert!(elapsed < Duration::from_secs(60));
        assert!(!shutdown.idle(Duration::from_secs(600)));
    }
}
