//! Append-only CSV journal for price samples.
//!
//! Every successful poll appends one row. Rows carry the sample plus
//! change columns derived from the previous session's close. A repeated
//! date and time is skipped instead of written twice.

pub mod journal;
pub mod record;

pub use journal::*;
pub use record::*;
