//! CSV row layout for the journal.

use tickwatch_core::PriceSample;

/// Column header written once when the file is created.
pub const HEADER: &str =
    "timestamp,date,time,open,high,low,close,volume,price_change,change_percentage";

/// One journal row.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Observation timestamp, "%Y-%m-%dT%H:%M:%S"
    pub timestamp: String,
    /// Calendar date, "%Y-%m-%d"
    pub date: String,
    /// Time of day, "%H:%M:%S"
    pub time: String,
    /// Session open
    pub open: f64,
    /// Session high
    pub high: f64,
    /// Session low
    pub low: f64,
    /// Latest price
    pub close: f64,
    /// Session volume
    pub volume: u64,
    /// Close minus the previous session's close, 0.0 when unknown
    pub price_change: f64,
    /// Change as a percentage of the previous close, 0.0 when unknown
    pub change_percentage: f64,
}

impl LogRecord {
    /// Build a row from a sample and the previous session's close.
    ///
    /// Change columns stay at zero when no prior close is known.
    pub fn from_sample(sample: &PriceSample, previous_close: Option<f64>) -> Self {
        let (price_change, change_percentage) = match previous_close {
            Some(prev) if prev > 0.0 => {
                let change = sample.close - prev;
                (round2(change), round2(change / prev * 100.0))
            }
            _ => (0.0, 0.0),
        };

        Self {
            timestamp: sample.timestamp_string(),
            date: sample.date_string(),
            time: sample.time_string(),
            open: sample.open,
            high: sample.high,
            low: sample.low,
            close: sample.close,
            volume: sample.volume,
            price_change,
            change_percentage,
        }
    }

    /// Render as one CSV line, prices with two decimals.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{:.2},{:.2},{:.2},{:.2},{},{:.2},{:.2}",
            self.timestamp,
            self.date,
            self.time,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            self.price_change,
            self.change_percentage
        )
    }

    /// Parse a CSV line. Returns None for the header or a malformed row.
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim_end().split(',').collect();
        if fields.len() != 10 || fields[0] == "timestamp" {
            return None;
        }

        Some(Self {
            timestamp: fields[0].to_string(),
            date: fields[1].to_string(),
            time: fields[2].to_string(),
            open: fields[3].parse().ok()?,
            high: fields[4].parse().ok()?,
            low: fields[5].parse().ok()?,
            close: fields[6].parse().ok()?,
            volume: fields[7].parse().ok()?,
            price_change: fields[8].parse().ok()?,
            change_percentage: fields[9].parse().ok()?,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
