//! Generic retry wrapper for single-argument async operations
//!
//! `retry(op, n)` gives an operation that makes up to `n + 1` attempts,
//! re-attempting right after each failure. When every attempt fails the last
//! error is returned inside [`Exhausted`].

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// All attempts failed
#[derive(Debug, Error)]
#[error("No more attempts to retry after {attempts} attempts ({last})")]
pub struct Exhausted<E> {
    /// Attempts made, including the first
    pub attempts: u32,
    /// The error from the final attempt
    pub last: E,
}

/// An operation wrapped with a retry budget
#[derive(Debug, Clone)]
pub struct Retry<F> {
    op: F,
    retries: u32,
    delay: Duration,
}

/// Wrap `op` so that a failed call is retried up to `retries` more times
pub fn retry<F>(op: F, retries: u32) -> Retry<F> {
    Retry {
        op,
        retries,
        delay: Duration::ZERO,
    }
}

impl<F> Retry<F> {
    /// Wait `delay` before each re-attempt (default: none)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run the operation on `arg`, retrying on failure
    pub async fn call<A, T, E, Fut>(&self, arg: A) -> Result<T, Exhausted<E>>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Clone,
        E: Display,
    {
        let mut remaining = self.retries;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match (self.op)(arg.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if remaining > 0 => {
                    remaining -= 1;
                    tracing::warn!(
                        "Error occurred ({}). Retrying ({} attempts left)...",
                        e,
                        remaining
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(e) => return Err(Exhausted { attempts, last: e }),
            }
        }
    }
}
