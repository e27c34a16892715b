//! mycoach-core
//!
//! Pure domain types, calendar-date policy, and dashboard statistics.
//! No storage or model dependency; this is the shared vocabulary of MyCoach.

pub mod clock;
pub mod dates;
pub mod error;
pub mod models;
pub mod stats;
pub mod storage_keys;
