//! mycoach-session
//!
//! The coaching session orchestrator. Turns user input into one model
//! request and one model reply into store mutations, and holds the plan
//! the user has not yet confirmed.

pub mod error;
pub mod session;
pub mod staging;
