//! Threshold crossing events.

use crate::Zone;
use chrono::NaiveDateTime;

/// Which threshold was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// Price moved strictly above the high threshold
    AboveHigh,
    /// Price moved strictly below the low threshold
    BelowLow,
}

impl Crossing {
    /// The zone a price lands in after this crossing.
    pub fn zone(&self) -> Zone {
        match self {
            Crossing::AboveHigh => Zone::Above,
            Crossing::BelowLow => Zone::Below,
        }
    }
}

/// A single edge-triggered alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    /// Which threshold was crossed
    pub kind: Crossing,
    /// Price that triggered the crossing
    pub price: f64,
    /// When the triggering sample was observed
    pub at: NaiveDateTime,
}
