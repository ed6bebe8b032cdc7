//! Alert delivery for threshold crossings.
//!
//! This crate provides:
//! - Alert message formatting
//! - The `AlertSink` delivery trait
//! - Telegram and terminal sink implementations

pub mod message;
pub mod sink;
pub mod telegram;

pub use message::{format_crossing_alert, AlertMessage};
pub use sink::{AlertError, AlertSink, TerminalSink};
pub use telegram::TelegramSink;
