//! Watch band and price zone classification.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BandError {
    #[error("low threshold {low} must be strictly below high threshold {high}")]
    Inverted { low: f64, high: f64 },
}

/// Where a price sits relative to the watch band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// Strictly below the low threshold
    Below,
    /// Inside the band, thresholds included
    Normal,
    /// Strictly above the high threshold
    Above,
}

/// Inclusive price band between two alert thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    /// Low alert threshold
    pub low: f64,
    /// High alert threshold
    pub high: f64,
}

impl PriceBand {
    /// Create a band. The low threshold must be strictly below the high one.
    pub fn new(low: f64, high: f64) -> Result<Self, BandError> {
        if low >= high {
            return Err(BandError::Inverted { low, high });
        }
        Ok(Self { low, high })
    }

    /// Classify a price. Prices exactly on a threshold count as Normal.
    pub fn classify(&self, price: f64) -> Zone {
        if price > self.high {
            Zone::Above
        } else if price < self.low {
            Zone::Below
        } else {
            Zone::Normal
        }
    }
}
