//! Diagnostic sinks.
//!
//! Validation failures and resize attempts are reported here rather than
//! returned, since the public operations resolve to `Option`.

use crate::validate::ValidateError;
use crate::ImageError;

/// Receives diagnostics from the reader and the resizer.
pub trait Reporter: Send + Sync {
    /// A limit was exceeded and the rule has no handler of its own.
    fn validation_failed(&self, error: &ValidateError);

    /// One resize attempt failed; more may follow.
    fn resize_attempt_failed(&self, name: &str, attempt: u32, max_attempts: u32, error: &ImageError);

    /// Every resize attempt failed.
    fn resize_exhausted(&self, name: &str, attempts: u32, error: &ImageError);

    /// The target surface was refused before any attempt ran.
    fn resize_refused(&self, name: &str, error: &ImageError);
}

/// Logs through `tracing`. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn validation_failed(&self, error: &ValidateError) {
        tracing::error!(
            field = %error.field,
            value = error.selected_file_value,
            max = error.max,
            "{error}"
        );
    }

    fn resize_attempt_failed(&self, name: &str, attempt: u32, max_attempts: u32, error: &ImageError) {
        tracing::warn!(file = name, attempt, max_attempts, %error, "Resize attempt failed");
    }

    fn resize_exhausted(&self, name: &str, attempts: u32, error: &ImageError) {
        tracing::error!(file = name, attempts, %error, "Resize failed after all attempts");
    }

    fn resize_refused(&self, name: &str, error: &ImageError) {
        tracing::error!(file = name, %error, "Resize target refused");
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn validation_failed(&self, _error: &ValidateError) {}

    fn resize_attempt_failed(&self, _name: &str, _attempt: u32, _max_attempts: u32, _error: &ImageError) {}

    fn resize_exhausted(&self, _name: &str, _attempts: u32, _error: &ImageError) {}

    fn resize_refused(&self, _name: &str, _error: &ImageError) {}
}
