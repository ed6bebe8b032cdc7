//! Core data types for the price monitor.

pub mod alert;
pub mod band;
pub mod sample;
pub mod state;

pub use alert::*;
pub use band::*;
pub use sample::*;
pub use state::*;
