//! Model identifier and sampling parameters

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of an LLM model (Value Object)
///
/// Caucus does not enumerate models: any string a provider accepts is a
/// valid identifier, so this is a thin newtype rather than an enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId(String);

impl ModelId {
    /// Create a model identifier from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelId {
    /// Returns the default model (gpt-4o)
    fn default() -> Self {
        Self("gpt-4o".to_string())
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ModelId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for ModelId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ModelId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self(s))
    }
}

/// Sampling parameters forwarded to the model provider (Value Object)
///
/// All fields are optional; `None` leaves the provider default in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Nucleus sampling cutoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl ModelParams {
    /// Create parameters with all provider defaults
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Builder Methods ====================

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of generated tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the nucleus sampling cutoff
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_roundtrip() {
        let model = ModelId::new("gpt-4o-mini");
        let s = model.to_string();
        let parsed: ModelId = s.parse().unwrap();
        assert_eq!(model, parsed);
    }

    #[test]
    fn test_model_id_default() {
        assert_eq!(ModelId::default().as_str(), "gpt-4o");
    }

    #[test]
    fn test_params_builder() {
        let params = ModelParams::new()
            .with_temperature(0.7)
            .with_max_tokens(1024);
        assert_eq!(params.temperature, Some(0.7));
        assert_eq!(params.max_tokens, Some(1024));
        assert_eq!(params.top_p, None);
    }

    #[test]
    fn test_params_default_is_empty() {
        let params = ModelParams::default();
        assert_eq!(params, ModelParams::new());
        assert!(params.temperature.is_none());
    }

    #[test]
    fn test_params_serialize_skips_none() {
        let params = ModelParams::new().with_temperature(0.2);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "temperature": 0.2 }));
    }
}
