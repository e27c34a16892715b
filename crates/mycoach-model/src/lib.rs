//! mycoach-model
//!
//! The language-model collaborator: prompt construction, Bedrock
//! invocation, and tolerant parsing of structured replies.

pub mod bedrock;
pub mod coach;
pub mod error;
pub mod model;
pub mod prompt;
pub mod reply;
