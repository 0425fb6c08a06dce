//! Bounded async retry
//!
//! Provides the retry loop used around flaky steps:
//! - A fixed attempt budget
//! - No delay between attempts
//! - A per-failure observer for logging
//!
//! # Example
//!
//! ```rust,no_run
//! use picpik_core::retry::{retry_async, RetryConfig};
//!
//! # async fn run() {
//! let result = retry_async(
//!     &RetryConfig::immediate(3),
//!     |_attempt| async { Ok::<_, std::io::Error>("encoded") },
//!     |attempt, error| eprintln!("attempt {attempt} failed: {error}"),
//! )
//! .await;
//! # }
//! ```

use std::fmt;
use std::future::Future;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    /// Three attempts, back to back.
    fn default() -> Self {
        Self::immediate(3)
    }
}

impl RetryConfig {
    /// `max_attempts` attempts with no delay between them
    pub fn immediate(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Create a config with no retries
    pub fn no_retry() -> Self {
        Self::immediate(1)
    }
}

/// Retry result with attempt information
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub value: T,
    /// Number of attempts made
    pub attempts: u32,
}

/// Every attempt failed
#[derive(Debug)]
pub struct RetryError<E> {
    /// Number of attempts made
    pub attempts: u32,
    /// Error from the final attempt
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed after {} attempts: {}", self.attempts, self.last_error)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Run `operation` until it succeeds or the attempt budget is spent.
///
/// Attempts run strictly one after another. `operation` receives the 1-based
/// attempt number. `on_failure` sees every failed attempt, including the last.
/// A budget of zero is treated as one attempt.
pub async fn retry_async<F, Fut, T, E, O>(
    config: &RetryConfig,
    mut operation: F,
    mut on_failure: O,
) -> Result<RetryResult<T>, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    O: FnMut(u32, &E),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                return Ok(RetryResult {
                    value,
                    attempts: attempt,
                });
            }
            Err(e) => {
                on_failure(attempt, &e);
                if attempt >= max_attempts {
                    return Err(RetryError {
                        attempts: attempt,
                        last_error: e,
                    });
                }
            }
        }
    }
}
