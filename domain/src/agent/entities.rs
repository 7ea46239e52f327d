//! Agent domain entities

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::model::{ModelId, ModelParams};
use crate::prompt::presets;
use crate::prompt::template::{Bindings, Template, TemplateError};

/// Stable identifier of an agent within a panel (Value Object)
///
/// Keys are the handles edges and results refer to; they must be unique
/// within a panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentKey(String);

impl AgentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One prompt/response pair in an agent's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// The full rendered prompt the agent received
    pub prompt: String,
    /// The response the model produced
    pub response: String,
}

impl Exchange {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// Errors from building an agent or moderator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentConfigError {
    #[error("Agent '{0}': system instructions cannot be combined with persona options")]
    SystemInstructionsConflict(AgentKey),

    #[error("Agent '{0}': a persona template was given without a persona")]
    PersonaTemplateWithoutPersona(AgentKey),

    #[error("Agent '{key}': {source}")]
    Template {
        key: AgentKey,
        #[source]
        source: TemplateError,
    },
}

/// A single deliberating participant (Entity)
///
/// An agent carries its persistent system instructions, the combination
/// template it uses to fold upstream outputs into its prompt, and a mutable
/// history of exchanges. The history belongs to the most recent run of the
/// panel that owns the agent.
#[derive(Debug, Clone)]
pub struct Agent {
    key: AgentKey,
    system_instructions: Option<String>,
    combination: Template,
    model: ModelId,
    params: ModelParams,
    history: Vec<Exchange>,
}

impl Agent {
    /// Start building an agent with the given key
    pub fn builder(key: impl Into<AgentKey>) -> AgentBuilder {
        AgentBuilder {
            key: key.into(),
            system_instructions: None,
            persona: None,
            persona_template: None,
            combination_instructions: "default".to_string(),
            model: ModelId::default(),
            params: ModelParams::default(),
        }
    }

    pub fn key(&self) -> &AgentKey {
        &self.key
    }

    /// The persistent system instructions, if any
    pub fn system_instructions(&self) -> Option<&str> {
        self.system_instructions.as_deref()
    }

    /// The combination-instructions template
    pub fn combination_template(&self) -> &Template {
        &self.combination
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Every exchange recorded during the current run, oldest first
    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// The response from the agent's most recent invocation
    pub fn last_response(&self) -> Option<&str> {
        self.history.last().map(|e| e.response.as_str())
    }

    /// Append one prompt/response pair to the history
    pub fn record(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.history.push(Exchange::new(prompt, response));
    }

    /// Clear the history so the next run starts fresh
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Builder for [`Agent`]
///
/// System instructions can be given directly or assembled from a persona and
/// a persona template; the two paths are mutually exclusive. Template
/// arguments accept a preset name or a literal template string.
#[derive(Debug, Clone)]
pub struct AgentBuilder {
    key: AgentKey,
    system_instructions: Option<String>,
    persona: Option<String>,
    persona_template: Option<String>,
    combination_instructions: String,
    model: ModelId,
    params: ModelParams,
}

impl AgentBuilder {
    /// Set the complete system instructions directly
    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = Some(instructions.into());
        self
    }

    /// Set the persona text rendered into the persona template
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Set the persona template (preset name or literal containing `${persona}`)
    pub fn with_persona_template(mut self, template: impl Into<String>) -> Self {
        self.persona_template = Some(template.into());
        self
    }

    /// Set the combination instructions (preset name or literal containing
    /// `${previous_responses}`)
    pub fn with_combination_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.combination_instructions = instructions.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Validate the configuration and build the agent
    pub fn build(self) -> Result<Agent, AgentConfigError> {
        let key = self.key;

        if self.system_instructions.is_some()
            && (self.persona.is_some() || self.persona_template.is_some())
        {
            return Err(AgentConfigError::SystemInstructionsConflict(key));
        }
        if self.persona_template.is_some() && self.persona.is_none() {
            return Err(AgentConfigError::PersonaTemplateWithoutPersona(key));
        }

        let combination =
            Template::combination(presets::combination_instructions(
                &self.combination_instructions,
            ))
            .map_err(|source| AgentConfigError::Template {
                key: key.clone(),
                source,
            })?;

        let system_instructions = match self.persona {
            Some(persona) => {
                let template_source = self.persona_template.as_deref().unwrap_or("default");
                let template = Template::persona(presets::persona_template(template_source))
                    .map_err(|source| AgentConfigError::Template {
                        key: key.clone(),
                        source,
                    })?;
                Some(template.render(&Bindings {
                    persona: &persona,
                    ..Bindings::default()
                }))
            }
            None => self.system_instructions,
        };

        Ok(Agent {
            key,
            system_instructions,
            combination,
            model: self.model,
            params: self.params,
            history: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::template::Placeholder;

    #[test]
    fn test_default_agent_build() {
        let agent = Agent::builder("economist").build().unwrap();
        assert_eq!(agent.key().as_str(), "economist");
        assert!(agent.system_instructions().is_none());
        assert!(agent
            .combination_template()
            .contains(Placeholder::PreviousResponses));
        assert!(agent.history().is_empty());
    }

    #[test]
    fn test_persona_renders_into_system_instructions() {
        let agent = Agent::builder("voter")
            .with_persona("a first-time voter from Ohio")
            .build()
            .unwrap();
        let instructions = agent.system_instructions().unwrap();
        assert!(instructions.contains("a first-time voter from Ohio"));
        assert!(!instructions.contains("${persona}"));
    }

    #[test]
    fn test_custom_persona_template() {
        let agent = Agent::builder("voter")
            .with_persona("a poll worker")
            .with_persona_template("Speak as ${persona} would.")
            .build()
            .unwrap();
        assert_eq!(
            agent.system_instructions(),
            Some("Speak as a poll worker would.")
        );
    }

    #[test]
    fn test_system_instructions_conflict_with_persona() {
        let err = Agent::builder("a")
            .with_system_instructions("You are terse.")
            .with_persona("a judge")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AgentConfigError::SystemInstructionsConflict(AgentKey::new("a"))
        );
    }

    #[test]
    fn test_persona_template_requires_persona() {
        let err = Agent::builder("a")
            .with_persona_template("You are ${persona}.")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AgentConfigError::PersonaTemplateWithoutPersona(AgentKey::new("a"))
        );
    }

    #[test]
    fn test_combination_preset_and_literal() {
        let preset = Agent::builder("a")
            .with_combination_instructions("debate")
            .build()
            .unwrap();
        assert!(preset.combination_template().source().contains("debate"));

        let literal = Agent::builder("b")
            .with_combination_instructions("Prior: ${previous_responses}")
            .build()
            .unwrap();
        assert_eq!(
            literal.combination_template().source(),
            "Prior: ${previous_responses}"
        );
    }

    #[test]
    fn test_invalid_combination_template_rejected() {
        let err = Agent::builder("a")
            .with_combination_instructions("no placeholder at all")
            .build()
            .unwrap_err();
        assert!(matches!(err, AgentConfigError::Template { .. }));
    }

    #[test]
    fn test_history_record_and_reset() {
        let mut agent = Agent::builder("a").build().unwrap();
        agent.record("prompt one", "answer one");
        agent.record("prompt two", "answer two");
        assert_eq!(agent.history().len(), 2);
        assert_eq!(agent.last_response(), Some("answer two"));

        agent.reset();
        assert!(agent.history().is_empty());
        assert_eq!(agent.last_response(), None);
    }
}
