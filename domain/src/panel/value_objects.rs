//! Panel value objects - immutable result types for deliberation runs.
//!
//! - [`AgentResponse`] - One agent's output at one point of the run
//! - [`DeliberationResult`] - Complete outcome of a finished run

use serde::{Deserialize, Serialize};

use crate::agent::entities::AgentKey;
use crate::core::task::Task;

/// One agent response in the execution transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The agent that produced this response
    pub agent: AgentKey,
    /// The layer of the execution plan the agent ran in
    pub layer: usize,
    /// The response content
    pub content: String,
}

impl AgentResponse {
    pub fn new(agent: impl Into<AgentKey>, layer: usize, content: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            layer,
            content: content.into(),
        }
    }
}

/// Complete outcome of a deliberation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliberationResult {
    /// The task the panel deliberated on
    pub task: Task,
    /// Sink-agent outputs, in declaration order
    pub responses: Vec<String>,
    /// Every agent response of the run, in execution order
    pub transcript: Vec<AgentResponse>,
    /// The moderator's reduction, when a moderator was present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
}

impl DeliberationResult {
    pub fn new(task: Task, responses: Vec<String>, transcript: Vec<AgentResponse>) -> Self {
        Self {
            task,
            responses,
            transcript,
            final_response: None,
        }
    }

    /// Attach the moderator's reduction
    pub fn with_final_response(mut self, final_response: impl Into<String>) -> Self {
        self.final_response = Some(final_response.into());
        self
    }

    /// The single answer of the run: the moderator's reduction when present,
    /// otherwise the last sink output
    pub fn answer(&self) -> Option<&str> {
        self.final_response
            .as_deref()
            .or_else(|| self.responses.last().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_prefers_final_response() {
        let result = DeliberationResult::new(
            Task::new("T"),
            vec!["sink output".to_string()],
            vec![AgentResponse::new("a", 0, "sink output")],
        )
        .with_final_response("the reduction");
        assert_eq!(result.answer(), Some("the reduction"));
    }

    #[test]
    fn test_answer_falls_back_to_last_sink() {
        let result = DeliberationResult::new(
            Task::new("T"),
            vec!["first sink".to_string(), "second sink".to_string()],
            Vec::new(),
        );
        assert_eq!(result.answer(), Some("second sink"));
    }

    #[test]
    fn test_transcript_serializes() {
        let response = AgentResponse::new("economist", 1, "supply is elastic");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["agent"], "economist");
        assert_eq!(json["layer"], 1);
    }
}
