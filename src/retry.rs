use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::catalog::{CatalogError, CatalogResult};

/// Exponential backoff applied to platform calls that were answered with an
/// explicit rate limit. Any other failure is returned on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_times: usize,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_times: 5,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_times)
    }

    pub async fn run<T, F, Fut>(&self, description: &str, operation: F) -> CatalogResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CatalogResult<T>>,
    {
        operation
            .retry(self.backoff())
            .when(|report| *report.current_context() == CatalogError::RateLimited)
            .notify(|_, delay| {
                log::warn!("{description} was rate limited, retrying in {delay:?}");
            })
            .await
    }
}
