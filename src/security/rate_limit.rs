//! Fixed-window ingress rate limiter.
//!
//! Process-local soft throttle keyed by source address. State is a plain
//! map behind a mutex; a background sweep drops elapsed windows so the map
//! stays bounded under address churn. Not shared across instances and not
//! the primary security control (signature verification is).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Monotonic clock seam; tests inject a fake to step through windows
/// without sleeping.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_requests,
            window,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true if the request from `source_key` is within budget.
    /// A fresh or elapsed window resets to count 1 and allows.
    pub fn allow(&self, source_key: &str) -> bool {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("rate limiter mutex poisoned");

        match entries.get_mut(source_key) {
            Some(entry) if now < entry.reset_at => {
                if entry.count < self.max_requests {
                    entry.count += 1;
                    true
                } else {
                    false
                }
            }
            _ => {
                entries.insert(
                    source_key.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    /// Drops entries whose window has elapsed.
    pub fn sweep(&self) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("rate limiter mutex poisoned");
        entries.retain(|_, entry| now < entry.reset_at);
    }

    pub fn tracked_sources(&self) -> usize {
        self.entries.lock().expect("rate limiter mutex poisoned").len()
    }
}

/// Periodic sweep so idle source entries do not accumulate.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            limiter.sweep();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fake clock starting at an arbitrary instant, advanced manually.
    struct FakeClock {
        start: Instant,
        offset_ms: AtomicU64,
    }

    impl FakeClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset_ms: AtomicU64::new(0),
            }
        }

        fn advance(&self, d: Duration) {
            self.offset_ms
                .fetch_add(d.as_millis() as u64, Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.start + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }
    }

    fn limiter(max: u32) -> (RateLimiter, Arc<FakeClock>) {
        let clock = Arc::new(FakeClock::new());
        let limiter = RateLimiter::with_clock(max, Duration::from_secs(60), clock.clone());
        (limiter, clock)
    }

    #[test]
    fn allows_up_to_the_limit_then_denies() {
        let (limiter, _clock) = limiter(50);
        for i in 0..50 {
            assert!(limiter.allow("10.0.0.1"), "request {} should pass", i + 1);
        }
        assert!(!limiter.allow("10.0.0.1"), "51st request must be denied");
    }

    #[test]
    fn window_elapse_resets_the_counter() {
        let (limiter, clock) = limiter(2);
        assert!(limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));

        clock.advance(Duration::from_secs(61));
        assert!(limiter.allow("10.0.0.1"), "first request after the window must pass");
    }

    #[test]
    fn sources_are_throttled_independently() {
        let (limiter, _clock) = limiter(1);
        assert!(limiter.allow("10.0.0.1"));
        assert!(!limiter.allow("10.0.0.1"));
        assert!(limiter.allow("10.0.0.2"));
    }

    #[test]
    fn denied_requests_do_not_extend_the_window() {
        let (limiter, clock) = limiter(1);
        assert!(limiter.allow("10.0.0.1"));
        for _ in 0..10 {
            assert!(!limiter.allow("10.0.0.1"));
        }
        clock.advance(Duration::from_secs(61));
        assert!(limiter.allow("10.0.0.1"));
    }

    #[test]
    fn sweep_drops_only_elapsed_windows() {
        let (limiter, clock) = limiter(5);
        assert!(limiter.allow("old"));
        clock.advance(Duration::from_secs(30));
        assert!(limiter.allow("fresh"));
        clock.advance(Duration::from_secs(31));

        limiter.sweep();
        assert_eq!(limiter.tracked_sources(), 1);

        // The swept source starts a new window.
        assert!(limiter.allow("old"));
    }
}
