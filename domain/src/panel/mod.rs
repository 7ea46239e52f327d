//! Panel domain
//!
//! The panel aggregate: topology validation, layered scheduling, run
//! bookkeeping, and the result types a finished run produces.

pub mod entities;
pub mod run_state;
pub mod topology;
pub mod value_objects;

pub use entities::{Layout, Panel};
pub use run_state::RunState;
pub use topology::{Edge, Topology, TopologyError};
pub use value_objects::{AgentResponse, DeliberationResult};
