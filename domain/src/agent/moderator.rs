//! Moderator: terminal reducer over sink outputs

use crate::core::model::{ModelId, ModelParams};
use crate::core::task::Task;
use crate::prompt::presets;
use crate::prompt::template::{Bindings, Template, TemplateError};

/// Reduces the sink outputs of a panel into one final response
///
/// A moderator is agent-shaped (persona, combination-style instructions,
/// model) but terminal: it never appears as a node in the topology and only
/// ever sees the outputs of the panel's sink agents.
#[derive(Debug, Clone)]
pub struct Moderator {
    persona: Template,
    instructions: Template,
    model: ModelId,
    params: ModelParams,
}

impl Moderator {
    /// Start building a moderator with the default presets
    pub fn builder() -> ModeratorBuilder {
        ModeratorBuilder {
            persona: "default".to_string(),
            instructions: "default".to_string(),
            model: ModelId::default(),
            params: ModelParams::default(),
        }
    }

    /// System instructions for a run, with `${task}` bound to the panel task
    pub fn system_instructions(&self, task: &Task) -> String {
        self.persona.render(&Bindings {
            task: task.content(),
            ..Bindings::default()
        })
    }

    /// The combination-style instructions applied to the sink outputs
    pub fn instructions_template(&self) -> &Template {
        &self.instructions
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }
}

/// Builder for [`Moderator`]
///
/// Persona and instructions accept a preset name (`"default"`, `"voting"`)
/// or a literal template string.
#[derive(Debug, Clone)]
pub struct ModeratorBuilder {
    persona: String,
    instructions: String,
    model: ModelId,
    params: ModelParams,
}

impl ModeratorBuilder {
    /// Set the persona (preset name or literal; `${task}` may appear)
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Set the instructions (preset name or literal containing
    /// `${previous_responses}`)
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
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

    /// Validate the templates and build the moderator
    pub fn build(self) -> Result<Moderator, TemplateError> {
        let persona = Template::moderator_persona(presets::moderator_persona(&self.persona))?;
        let instructions =
            Template::combination(presets::moderator_instructions(&self.instructions))?;
        Ok(Moderator {
            persona,
            instructions,
            model: self.model,
            params: self.params,
        })
    }
}
