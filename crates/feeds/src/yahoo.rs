//! Yahoo Finance chart endpoint client.
//!
//! Pulls daily bars from the public v8 chart API. One request per poll,
//! no streaming.

use crate::error::FeedError;
use crate::source::PriceSource;
use async_trait::async_trait;
use chrono::Local;
use serde_json::Value;
use std::time::Duration;
use tickwatch_core::PriceSample;
use tracing::debug;

/// Price source backed by the Yahoo Finance chart API.
pub struct YahooChartSource {
    client: reqwest::Client,
}

impl YahooChartSource {
    const BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    /// Create a source with a 10 second request timeout.
    pub fn new() -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; tickwatch/0.1)")
            .build()?;
        Ok(Self { client })
    }

    /// Fetch the chart document for a symbol over the given range.
    async fn fetch_chart(&self, symbol: &str, range: &str) -> Result<Value, FeedError> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            Self::BASE_URL,
            symbol,
            range
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FeedError::HttpStatus(response.status().as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FeedError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    async fn fetch(&self, symbol: &str) -> Result<PriceSample, FeedError> {
        let json = self.fetch_chart(symbol, "1d").await?;
        let result = chart_result(&json, symbol)?;
        let (open, high, low, close, volume) = latest_bar(result, symbol)?;

        let sample = PriceSample::new(
            symbol,
            Local::now().naive_local(),
            open,
            high,
            low,
            close,
            volume,
        );
        debug!(
            symbol = symbol,
            close = close,
            volume = volume,
            "Fetched intraday sample"
        );
        Ok(sample)
    }

    async fn previous_close(&self, symbol: &str) -> Result<f64, FeedError> {
        let json = self.fetch_chart(symbol, "2d").await?;
        let result = chart_result(&json, symbol)?;
        let closes = close_series(result);
        if closes.len() < 2 {
            return Err(FeedError::DataUnavailable(format!(
                "{}: no prior session close",
                symbol
            )));
        }
        Ok(closes[closes.len() - 2])
    }
}

/// Extract the first chart result, surfacing the API's own error text.
fn chart_result<'a>(json: &'a Value, symbol: &str) -> Result<&'a Value, FeedError> {
    let chart = &json["chart"];
    if let Some(description) = chart["error"]["description"].as_str() {
        return Err(FeedError::DataUnavailable(format!(
            "{}: {}",
            symbol, description
        )));
    }

    let result = &chart["result"][0];
    if result.is_null() {
        return Err(FeedError::DataUnavailable(symbol.to_string()));
    }
    Ok(result)
}

/// OHLCV values from the newest bar that has a close.
///
/// Yahoo pads the current session with nulls until trades happen, so walk
/// the close series backwards. Open/high/low fall back to the close and
/// volume to zero when the bar is partial.
fn latest_bar(result: &Value, symbol: &str) -> Result<(f64, f64, f64, f64, u64), FeedError> {
    let quote = &result["indicators"]["quote"][0];
    let closes = quote["close"]
        .as_array()
        .ok_or_else(|| FeedError::ParseError("missing close series".to_string()))?;

    let (index, close) = closes
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, v)| v.as_f64().map(|c| (i, c)))
        .ok_or_else(|| FeedError::DataUnavailable(symbol.to_string()))?;

    let open = quote["open"][index].as_f64().unwrap_or(close);
    let high = quote["high"][index].as_f64().unwrap_or(close);
    let low = quote["low"][index].as_f64().unwrap_or(close);
    let volume = quote["volume"][index].as_u64().unwrap_or(0);

    Ok((open, high, low, close, volume))
}

/// All non-null closes in the result, oldest first.
fn close_series(result: &Value) -> Vec<f64> {
    result["indicators"]["quote"][0]["close"]
        .as_array()
        .map(|closes| closes.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}
