//! Threshold crossing detector.
//!
//! Compares each fresh price against the watch band and fires an alert
//! only on the cycle where the price enters the Above or Below zone.

use chrono::NaiveDateTime;
use tickwatch_core::{AlertEvent, Crossing, MonitorState, PriceBand, Zone};

/// Edge-triggered detector over a fixed watch band.
///
/// Holds no mutable state itself. Callers pass the previous cycle's
/// `MonitorState` in and store the returned one, so a failed cycle can
/// simply reuse the old state.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdDetector {
    band: PriceBand,
}

impl ThresholdDetector {
    /// Create a detector for the given band.
    pub fn new(band: PriceBand) -> Self {
        Self { band }
    }

    /// The band this detector watches.
    pub fn band(&self) -> PriceBand {
        self.band
    }

    /// Evaluate one price against the previous state.
    ///
    /// Returns the state to carry into the next cycle and, when the price
    /// moved into the Above or Below zone this cycle, the alert to send.
    /// Staying in an outside zone or returning to Normal never alerts.
    pub fn evaluate(
        &self,
        state: &MonitorState,
        price: f64,
        at: NaiveDateTime,
    ) -> (MonitorState, Option<AlertEvent>) {
        let zone = self.band.classify(price);

        let alert = if zone != state.last_zone {
            match zone {
                Zone::Above => Some(AlertEvent {
                    kind: Crossing::AboveHigh,
                    price,
                    at,
                }),
                Zone::Below => Some(AlertEvent {
                    kind: Crossing::BelowLow,
                    price,
                    at,
                }),
                Zone::Normal => None,
            }
        } else {
            None
        };

        (MonitorState::observed(price, zone), alert)
    }
}
