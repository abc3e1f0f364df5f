use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Time source for the limiter.
///
/// `now` is a monotonic offset from an arbitrary origin. Tests substitute a
/// manual clock whose `sleep` simply advances time.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by tokio's monotonic timer
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Default)]
struct LimiterState {
    /// Clock reading when the previous call was released
    last_call: Option<Duration>,
}

/// Cooperative calls-per-second pacing for private requests.
///
/// Each call is released no sooner than `1 / rate` seconds after the
/// previous one. The state lock is held across the wait, so callers sharing
/// one limiter queue behind each other instead of all sleeping the same
/// interval and firing together.
pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    rate: AtomicU64,
    state: Mutex<LimiterState>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("rate", &self.rate())
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new(rate: f64, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            rate: AtomicU64::new(rate.to_bits()),
            state: Mutex::new(LimiterState::default()),
        }
    }

    pub fn with_monotonic_clock(rate: f64) -> Self {
        Self::new(rate, Arc::new(MonotonicClock::new()))
    }

    /// Calls per second; zero, negative or non-finite disables pacing
    pub fn rate(&self) -> f64 {
        f64::from_bits(self.rate.load(Ordering::Relaxed))
    }

    /// Takes effect on the next `throttle`
    pub fn set_rate(&self, rate: f64) -> f64 {
        self.rate.store(rate.to_bits(), Ordering::Relaxed);
        rate
    }

    /// Wait for this call's slot; returns how long it slept
    pub async fn throttle(&self) -> Duration {
        let mut state = self.state.lock().await;
        let rate = self.rate();
        let mut slept = Duration::ZERO;

        let paced = rate.is_finite() && rate > 0.0;
        if let Some(last_call) = state.last_call.filter(|_| paced) {
            let required = Duration::try_from_secs_f64(1.0 / rate).unwrap_or(Duration::MAX);
            let elapsed = self.clock.now().saturating_sub(last_call);

            if elapsed < required {
                slept = required - elapsed;
                debug!(sleep_ms = slept.as_millis() as u64, rate, "throttling request");
                self.clock.sleep(slept).await;
            }
        }

        state.last_call = Some(self.clock.now());
        slept
    }
}
