//! Alert message formatting.

use tickwatch_core::{AlertEvent, Crossing, PriceBand};

/// A rendered alert, independent of the delivery transport.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    /// One-line summary
    pub subject: String,
    /// Plaintext body
    pub body: String,
}

/// Format price with appropriate precision based on magnitude.
fn format_price(price: f64) -> String {
    if price.abs() >= 1.0 {
        format!("{:.2}", price)
    } else {
        format!("{:.4}", price)
    }
}

/// Format a crossing event as an alert message.
pub fn format_crossing_alert(symbol: &str, event: &AlertEvent, band: &PriceBand) -> AlertMessage {
    let (direction, threshold) = match event.kind {
        Crossing::AboveHigh => ("above", band.high),
        Crossing::BelowLow => ("below", band.low),
    };

    let subject = format!(
        "🚨 Price alert: {} {} {}",
        symbol,
        direction,
        format_price(threshold)
    );

    let mut body = format!(
        "Time: {}\n\
         Symbol: {}\n\
         Price: {}",
        event.at.format("%Y-%m-%d %H:%M:%S"),
        symbol,
        format_price(event.price)
    );
    body.push_str(&format!(
        "\nStatus: crossed {} threshold {}",
        direction,
        format_price(threshold)
    ));
    body.push_str(&format!(
        "\nWatch band: {} - {}",
        format_price(band.low),
        format_price(band.high)
    ));

    AlertMessage { subject, body }
}
