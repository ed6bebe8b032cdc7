//! Detector state carried between poll cycles.

use crate::Zone;

/// What the detector remembers about the previous cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorState {
    /// Close of the last successfully fetched sample, None before the first
    pub last_price: Option<f64>,
    /// Zone of the last sample; Normal before the first
    pub last_zone: Zone,
}

impl Default for MonitorState {
    fn default() -> Self {
        Self {
            last_price: None,
            last_zone: Zone::Normal,
        }
    }
}

impl MonitorState {
    /// State after observing a price in the given zone.
    pub fn observed(price: f64, zone: Zone) -> Self {
        Self {
            last_price: Some(price),
            last_zone: zone,
        }
    }
}
