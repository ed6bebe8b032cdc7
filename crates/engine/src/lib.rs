//! Threshold crossing detection.
//!
//! This crate contains the pure decision logic for the monitor: given the
//! previous cycle's state and a fresh price, decide whether an alert fires.

pub mod detector;

pub use detector::*;
