//! Core domain concepts shared across all subdomains.
//!
//! - [`task::Task`] — a validated task for a panel to deliberate on
//! - [`model::ModelId`] — identifier of an LLM model
//! - [`model::ModelParams`] — sampling parameters forwarded to the provider

pub mod model;
pub mod task;
