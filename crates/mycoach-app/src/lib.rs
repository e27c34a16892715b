//! mycoach-app
//!
//! Terminal shell over the coaching library: configuration, AWS setup,
//! input parsing and dashboard rendering. The chat loop lives in the
//! binary.

pub mod aws;
pub mod command;
pub mod config;
pub mod dashboard;
