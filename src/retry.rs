//! Exponential backoff for transient network failures.

use std::{future::Future, time::Duration};

use log::{error, warn};

use crate::error::Result;

/// Longest pause between two attempts.
pub const MAX_DELAY: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub times: u32,
    pub delay: Duration,
    pub backoff: f64,
}

impl RetryPolicy {
    pub fn new(times: u32, delay: Duration, backoff: f64) -> Self {
        RetryPolicy {
            times: times.max(1),
            delay,
            backoff,
        }
    }

    /// A single attempt.
    pub fn none() -> Self {
        RetryPolicy::new(1, Duration::ZERO, 1.0)
    }

    /// Runs `op` until it succeeds, fails with a non-network error, or the
    /// attempts run out.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let times = self.times.max(1);
        let mut delay = self.delay;
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_network() && attempt < times => {
                    warn!(
                        "{}: attempt {} failed: {}. Retrying in {:.1}s...",
                        what,
                        attempt,
                        e,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                    delay = self.next_delay(delay);
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_network() && times > 1 {
                        error!("{}: failed after {} attempts: {}", what, times, e);
                    }
                    return Err(e);
                }
            }
        }
    }

    /// `delay` scaled by the backoff factor, capped at [`MAX_DELAY`].
    fn next_delay(&self, delay: Duration) -> Duration {
        let secs = delay.as_secs_f64() * self.backoff.max(0.0);
        Duration::try_from_secs_f64(secs).map_or(MAX_DELAY, |d| d.min(MAX_DELAY))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::none()
    }
}

// -- Tests -------------------------------------------------------------------
