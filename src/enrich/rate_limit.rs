//! Fixed-window rate limiter for provider calls.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

struct Window {
    started: Instant,
    calls: u32,
}

/// Allows `max_calls` acquisitions per window. Callers over the limit wait
/// for the next window instead of failing.
pub struct RateLimiter {
    max_calls: u32,
    window: Duration,
    state: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls: max_calls.max(1),
            window,
            state: Mutex::new(Window {
                started: Instant::now(),
                calls: 0,
            }),
        }
    }

    /// Wait until a call is allowed and count it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let now = Instant::now();
                if now.duration_since(state.started) >= self.window {
                    state.started = now;
                    state.calls = 0;
                }
                if state.calls < self.max_calls {
                    state.calls += 1;
                    return;
                }
                self.window - now.duration_since(state.started)
            };
            debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting for next window");
            tokio::time::sleep(wait).await;
        }
    }
}
