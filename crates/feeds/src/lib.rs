//! Quote retrieval for the price monitor.
//!
//! This crate provides the `PriceSource` trait and an HTTP implementation
//! backed by the Yahoo Finance chart endpoint.

pub mod error;
pub mod source;
pub mod yahoo;

pub use error::*;
pub use source::*;
pub use yahoo::*;
