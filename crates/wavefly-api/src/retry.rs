// Bounded retry policies for write requests.
//
// A policy is an attempt cap plus a delay function. Callers drive one
// request at a time through `RetryPolicy::run`, deciding per failure
// whether another attempt is allowed.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::Error;

/// Delay between attempt `n` and attempt `n + 1` (1-based `n`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// `step * n`
    Linear(Duration),
    /// `factor * sqrt(n)`
    SqrtScaled(Duration),
}

impl Backoff {
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Linear(step) => step.saturating_mul(attempt),
            Self::SqrtScaled(factor) => factor.mul_f64(f64::from(attempt).sqrt()),
        }
    }
}

/// What to do with a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep per the backoff and try again, if attempts remain.
    Retry,
    /// Stop now and surface this error unchanged.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Single attempt, no sleeping.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::None,
        }
    }

    /// Event create/update/delete: one attempt by default, `n` seconds
    /// between attempts when the cap is raised.
    pub const fn event_writes() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::Linear(Duration::from_secs(1)),
        }
    }

    /// Source tag additions: ten attempts, `2 * sqrt(n)` seconds apart.
    pub const fn tag_writes() -> Self {
        Self {
            max_attempts: 10,
            backoff: Backoff::SqrtScaled(Duration::from_secs(2)),
        }
    }

    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub const fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Upper bound on total sleep time if every attempt fails.
    pub fn worst_case_delay(&self) -> Duration {
        (1..self.max_attempts).map(|n| self.backoff.delay(n)).sum()
    }

    /// Run `op` until it succeeds, `on_error` aborts, or attempts run out.
    ///
    /// `on_error` sees the 1-based attempt number of every failure. When
    /// the cap is reached the last error is wrapped in
    /// [`Error::RetriesExhausted`]; an aborted error is returned as-is.
    pub async fn run<T, F, Fut>(
        &self,
        mut op: F,
        mut on_error: impl FnMut(u32, &Error) -> RetryDecision,
    ) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if on_error(attempt, &err) == RetryDecision::Abort {
                return Err(err);
            }
            if attempt >= max_attempts {
                return Err(Error::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.backoff.delay(attempt);
            debug!(attempt, ?delay, "retrying after failure");
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }
}
