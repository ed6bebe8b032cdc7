//! Price sample definitions.

use chrono::NaiveDateTime;
use compact_str::CompactString;

/// One observation of a security's intraday quote.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    /// Security symbol (e.g., "300300.SZ", "AAPL")
    pub symbol: CompactString,
    /// Wall-clock time the sample was taken
    pub taken_at: NaiveDateTime,
    /// Session open price
    pub open: f64,
    /// Session high so far
    pub high: f64,
    /// Session low so far
    pub low: f64,
    /// Latest traded price
    pub close: f64,
    /// Session volume so far
    pub volume: u64,
}

impl PriceSample {
    /// Create a sample for the given symbol and observation time.
    pub fn new(
        symbol: &str,
        taken_at: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            symbol: CompactString::new(symbol),
            taken_at,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Full timestamp, e.g. "2026-08-21T10:30:00".
    pub fn timestamp_string(&self) -> String {
        self.taken_at.format("%Y-%m-%dT%H:%M:%S").to_string()
    }

    /// Calendar date portion, e.g. "2026-08-21".
    pub fn date_string(&self) -> String {
        self.taken_at.format("%Y-%m-%d").to_string()
    }

    /// Time-of-day portion, e.g. "10:30:00".
    pub fn time_string(&self) -> String {
        self.taken_at.format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_at(hour: u32, min: u32, sec: u32) -> PriceSample {
        let taken_at = NaiveDate::from_ymd_opt(2026, 8, 21)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap();
        PriceSample::new("300300.SZ", taken_at, 12.1, 12.8, 12.0, 12.5, 1_234_567)
    }

    #[test]
    fn test_timestamp_formats() {
        let sample = sample_at(10, 30, 0);
        assert_eq!(sample.timestamp_string(), "2026-08-21T10:30:00");
        assert_eq!(sample.date_string(), "2026-08-21");
        assert_eq!(sample.time_string(), "10:30:00");
    }

    #[test]
    fn test_time_formats_pad_single_digits() {
        let sample = sample_at(9, 5, 7);
        assert_eq!(sample.time_string(), "09:05:07");
    }

    #[test]
    fn test_new_keeps_symbol() {
        let sample = sample_at(10, 0, 0);
        assert_eq!(sample.symbol, "300300.SZ");
    }
}
