//! Agent domain module
//!
//! Deliberating participants and the terminal moderator that reduces their
//! final outputs.

pub mod entities;
pub mod moderator;

pub use entities::{Agent, AgentBuilder, AgentConfigError, AgentKey, Exchange};
pub use moderator::{Moderator, ModeratorBuilder};
