use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Condvar, Mutex};

/// Time source shared by the surface, entities and animations.
///
/// Everything that waits goes through [`Clock::sleep`] so tests can drive
/// deferred work with a [`ManualClock`] instead of real time.
pub trait Clock: Send + Sync {
    /// Wall clock time used for document timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic time since the clock was created.
    fn elapsed(&self) -> Duration;

    fn sleep(&self, duration: Duration);
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn shared() -> SharedClock {
        Arc::new(Self::new())
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Default)]
struct ManualState {
    elapsed: Duration,
    sleepers: usize,
}

/// A clock that only moves when [`ManualClock::advance`] is called. Sleeping
/// threads block until enough time has been advanced past their deadline.
#[derive(Debug)]
pub struct ManualClock {
    epoch: DateTime<Utc>,
    state: Mutex<ManualState>,
    advanced: Condvar,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            state: Mutex::new(ManualState::default()),
            advanced: Condvar::new(),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock();
        state.elapsed += duration;
        self.advanced.notify_all();
    }

    /// Number of threads currently blocked in [`Clock::sleep`].
    pub fn sleepers(&self) -> usize {
        self.state.lock().sleepers
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.state.lock().elapsed;
        let delta = chrono::Duration::from_std(elapsed)
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.epoch + delta
    }

    fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock();
        let deadline = state.elapsed + duration;
        state.sleepers += 1;
        while state.elapsed < deadline {
            self.advanced.wait(&mut state);
        }
        state.sleepers -= 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::core::util::wait_until;

    #[test]
    fn manual_clock_now_follows_advance() {
        let clock = ManualClock::new();
        let before = clock.now();
        clock.advance(Duration::from_millis(1500));
        assert_eq!(clock.elapsed(), Duration::from_millis(1500));
        assert_eq!(
            (clock.now() - before).num_milliseconds(),
            1500,
            "wall time should move with elapsed time"
        );
    }

    #[test]
    fn manual_sleep_waits_for_deadline() {
        let clock = Arc::new(ManualClock::new());
        let woke = Arc::new(AtomicBool::new(false));

        let handle = {
            let clock = clock.clone();
            let woke = woke.clone();
            thread::spawn(move || {
                clock.sleep(Duration::from_secs(2));
                woke.store(true, Ordering::SeqCst);
            })
        };

        assert!(wait_until(Duration::from_secs(1), || clock.sleepers() == 1));
        clock.advance(Duration::from_millis(1999));
        thread::sleep(Duration::from_millis(20));
        assert!(!woke.load(Ordering::SeqCst));

        clock.advance(Duration::from_millis(1));
        handle.join().unwrap();
        assert!(woke.load(Ordering::SeqCst));
        assert_eq!(clock.sleepers(), 0);
    }

    #[test]
    fn system_clock_elapsed_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.elapsed();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.elapsed() > a);
    }
}
