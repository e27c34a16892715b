//! mycoach-storage
//!
//! The persistent state store: one JSON document in one key-value slot,
//! read-modify-written in full by every mutation.

pub mod backend;
pub mod error;
pub mod migrate;
pub mod store;
