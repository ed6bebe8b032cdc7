//! Price source abstraction.

use crate::FeedError;
use async_trait::async_trait;
use tickwatch_core::PriceSample;

/// A quote backend the monitor can poll.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the latest intraday sample for a symbol.
    ///
    /// Implementations return `FeedError::DataUnavailable` when the backend
    /// answers but has no usable quote (unknown symbol, market closed with
    /// no session data yet).
    async fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError>;

    /// Close of the previous trading session, used for change columns.
    async fn previous_close(&self, symbol: &str) -> Result<f64, FeedError>;
}
