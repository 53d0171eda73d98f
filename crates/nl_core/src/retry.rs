use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::{Error, Result};

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Same pause after every failed attempt.
    Fixed(Duration),
    /// `base * 2^attempt`: 1s, 2s, 4s for a 1s base.
    Exponential(Duration),
}

impl Backoff {
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(d) => *d,
            Backoff::Exponential(base) => *base * 2u32.saturating_pow(attempt),
        }
    }
}

/// A bounded retry loop as data: how many attempts, how long to pause, and
/// which errors are worth retrying at all. Call sites that widen their
/// request per attempt (the news search) read the attempt index passed to
/// the operation; call sites that don't (generation) ignore it.
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Whether a failed attempt should be retried; anything else propagates.
    pub retry_on: fn(&Error) -> bool,
    /// Whether a retried failure also pauses first. The search loop moves
    /// straight to a wider window when an attempt merely came back empty.
    pub pause_on: fn(&Error) -> bool,
}

impl RetryPolicy {
    /// Generation policy: only explicit rate limiting is retried, with
    /// exponential backoff. Any other failure propagates immediately.
    pub fn rate_limited() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Exponential(Duration::from_secs(1)),
            retry_on: Error::is_rate_limited,
            pause_on: |_| true,
        }
    }

    /// Search policy: every failure triggers the next widening attempt, but
    /// only a collaborator error pauses; an empty result set does not.
    pub fn widening_search() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Fixed(Duration::from_secs(2)),
            retry_on: |_| true,
            pause_on: |e| !matches!(e, Error::NoResults),
        }
    }

    /// Drive `op` until it succeeds, the error is not retryable, or the
    /// attempt budget runs out. The zero-based attempt index is passed in.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if attempt + 1 >= self.max_attempts || !(self.retry_on)(&e) {
                        return Err(e);
                    }
                    if (self.pause_on)(&e) {
                        let delay = self.backoff.delay(attempt);
                        debug!("attempt {} failed ({}), retrying in {:?}", attempt + 1, e, delay);
                        tokio::time::sleep(delay).await;
                    } else {
                        debug!("attempt {} failed ({}), retrying immediately", attempt + 1, e);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
