//! Progress notification port
//!
//! Defines the interface for reporting progress during a panel run.

use caucus_domain::AgentKey;

/// Callback for progress updates during panel execution
///
/// Implementations live outside the application layer and can display
/// progress in various ways (console, logs, UI).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a layer starts
    fn on_layer_start(&self, layer: usize, agent_count: usize);

    /// Called when one agent invocation finishes within a layer
    fn on_agent_complete(&self, layer: usize, agent: &AgentKey, success: bool);

    /// Called when every invocation of a layer has finished
    fn on_layer_complete(&self, layer: usize);

    // ==================== Moderator Callbacks ====================

    /// Called when the moderator reduction starts.
    fn on_reduce_start(&self) {}

    /// Called when the moderator reduction finishes.
    fn on_reduce_complete(&self, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_layer_start(&self, _layer: usize, _agent_count: usize) {}
    fn on_agent_complete(&self, _layer: usize, _agent: &AgentKey, _success: bool) {}
    fn on_layer_complete(&self, _layer: usize) {}
}
