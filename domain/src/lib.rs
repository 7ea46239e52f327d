//! Domain layer for caucus
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure concerns and performs no IO.
//!
//! # Core Concepts
//!
//! ## Panel
//!
//! A panel is a group of agents deliberating one task under a declared
//! information-sharing layout:
//!
//! - **Ensemble**: agents answer independently; no information sharing
//! - **Chain**: agents answer in order, each seeing earlier outputs
//! - **Graph**: information flows along an explicit DAG of edges
//!
//! ## Moderator
//!
//! An optional terminal reducer that combines the panel's sink outputs into
//! one final response using the same combination mechanism agents use.

pub mod agent;
pub mod core;
pub mod panel;
pub mod prompt;

// Re-export commonly used types
pub use agent::{
    entities::{Agent, AgentBuilder, AgentConfigError, AgentKey, Exchange},
    moderator::{Moderator, ModeratorBuilder},
};
pub use core::{
    model::{ModelId, ModelParams},
    task::Task,
};
pub use panel::{
    entities::{Layout, Panel},
    run_state::RunState,
    topology::{Edge, Topology, TopologyError},
    value_objects::{AgentResponse, DeliberationResult},
};
pub use prompt::{
    combine::{combine, format_previous_responses},
    template::{Bindings, Placeholder, Template, TemplateError},
};
