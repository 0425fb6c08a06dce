//! The configured pipeline behind the free functions.

use crate::codec::{ImageCodec, RasterCodec};
use crate::report::{Reporter, TracingReporter};
use crate::{ImageError, Result};
use picpik_core::config::ResizeConfig;
use picpik_core::retry::RetryConfig;
use std::fmt;
use std::sync::Arc;

/// Owns the codec, the diagnostic sink and the resize retry policy.
///
/// Cheap to clone. The default uses [`ImageCodec`], [`TracingReporter`] and
/// three immediate attempts.
#[derive(Clone)]
pub struct ImageProcessor {
    codec: Arc<dyn RasterCodec>,
    reporter: Arc<dyn Reporter>,
    retry: RetryConfig,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self {
            codec: Arc::new(ImageCodec::default()),
            reporter: Arc::new(TracingReporter),
            retry: RetryConfig::immediate(3),
        }
    }
}

impl fmt::Debug for ImageProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageProcessor")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl ImageProcessor {
    /// Processor built from the `[resize]` config section
    pub fn from_config(config: &ResizeConfig) -> Self {
        Self::default()
            .with_codec(Arc::new(ImageCodec::from_config(config)))
            .with_retry(RetryConfig::immediate(config.max_attempts))
    }

    /// Swap the raster codec
    #[must_use]
    pub fn with_codec<C: RasterCodec + 'static>(mut self, codec: Arc<C>) -> Self {
        self.codec = codec;
        self
    }

    /// Swap the diagnostic sink
    #[must_use]
    pub fn with_reporter<R: Reporter + 'static>(mut self, reporter: Arc<R>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Swap the resize retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Resize retry policy
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    pub(crate) fn codec(&self) -> Arc<dyn RasterCodec> {
        Arc::clone(&self.codec)
    }

    pub(crate) fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// Run CPU-bound codec work off the async runtime.
    pub(crate) async fn run_blocking<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(work)
            .await
            .map_err(|e| ImageError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picpik_core::config::ResampleFilter;

    #[test]
    fn test_default_retry_budget() {
        let processor = ImageProcessor::default();
        assert_eq!(processor.retry().max_attempts, 3);
    }

    #[test]
    fn test_from_config() {
        let config = ResizeConfig {
            filter: ResampleFilter::Lanczos3,
            jpeg_quality: 80,
            max_attempts: 5,
        };
        let processor = ImageProcessor::from_config(&config);
        assert_eq!(processor.retry().max_attempts, 5);
    }

    #[tokio::test]
    async fn test_run_blocking_panic_is_task_error() {
        let processor = ImageProcessor::default();
        let result: Result<()> = processor
            .run_blocking(|| panic!("codec blew up"))
            .await;
        assert!(matches!(result, Err(ImageError::Task(_))));
    }
}
