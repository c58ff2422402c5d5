//! Process-wide rate limiter for external calls
//!
//! Both record sources share one quota (per process and per credential), so
//! every client holds a clone of the same `Arc<RateLimiter>`. The lock is held
//! across the sleep: concurrent callers queue up and each completion is at
//! least `min_interval` after the previous one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Default spacing: 1 request per second
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Minimum-spacing gate with a call counter
#[derive(Debug)]
pub struct RateLimiter {
    last_call: Mutex<Option<Instant>>,
    min_interval: Duration,
    calls: AtomicU64,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_interval,
            calls: AtomicU64::new(0),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait if necessary, then count one external call
    ///
    /// Returns the instant recorded as this call's slot.
    pub async fn acquire(&self) -> Instant {
        let mut last = self.last_call.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                debug!(wait_ms = wait_time.as_millis() as u64, "Rate limiting: waiting");
                sleep(wait_time).await;
            }
        }

        let now = Instant::now();
        *last = Some(now);
        self.calls.fetch_add(1, Ordering::SeqCst);
        now
    }

    /// External calls counted since creation or the last reset
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Zero the call counter at the start of a run
    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
