//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the explicit config
//! structs the adapters take.

use std::time::Duration;

use caucus_domain::{ModelId, ModelParams};
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayConfig;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model gateway settings
    pub gateway: FileGatewayConfig,
    /// Panel defaults
    pub panel: FilePanelConfig,
}

/// Gateway configuration from TOML (`[gateway]` section)
///
/// # Example
///
/// ```toml
/// [gateway]
/// base_url = "http://localhost:8080/v1"
/// api_key_env = "OPENAI_API_KEY"
/// timeout_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the chat completions API.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_secs: 120,
        }
    }
}

impl FileGatewayConfig {
    /// Resolve the API key: direct value first, then the named env var.
    ///
    /// This is the only place credentials are read from the environment.
    /// The resulting [`GatewayConfig`] carries the key explicitly.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
    }

    /// Build the explicit gateway config the adapter takes.
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.clone(),
            api_key: self.resolve_api_key(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..GatewayConfig::default()
        }
    }
}

/// Panel defaults from TOML (`[panel]` section)
///
/// # Example
///
/// ```toml
/// [panel]
/// model = "gpt-4o-mini"
/// temperature = 0.7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePanelConfig {
    /// Default model for agents that do not set one.
    pub model: String,
    /// Default sampling temperature.
    pub temperature: Option<f32>,
    /// Default response token cap.
    pub max_tokens: Option<u32>,
}

impl Default for FilePanelConfig {
    fn default() -> Self {
        Self {
            model: ModelId::default().as_str().to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl FilePanelConfig {
    /// Parse the model string into a ModelId
    pub fn parse_model(&self) -> ModelId {
        ModelId::new(self.model.as_str())
    }

    /// Build default sampling params from this section
    pub fn params(&self) -> ModelParams {
        let mut params = ModelParams::new();
        if let Some(temperature) = self.temperature {
            params = params.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            params = params.with_max_tokens(max_tokens);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_default() {
        let config = FileConfig::default();
        assert_eq!(config.gateway.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.gateway.base_url, "https://api.openai.com/v1");
        assert_eq!(config.gateway.timeout_secs, 120);
        assert!(config.gateway.api_key.is_none());
        assert_eq!(config.panel.model, "gpt-4o");
    }

    #[test]
    fn test_file_config_deserialize() {
        let toml_str = r#"
[gateway]
base_url = "http://localhost:8080/v1"
timeout_secs = 30

[panel]
model = "gpt-4o-mini"
temperature = 0.2
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.base_url, "http://localhost:8080/v1");
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.panel.parse_model().as_str(), "gpt-4o-mini");
        assert_eq!(config.panel.params().temperature, Some(0.2));
        assert_eq!(config.panel.params().max_tokens, None);
    }

    #[test]
    fn test_direct_api_key_wins_over_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CAUCUS_TEST_KEY_VAR", "from-env");

            let mut gateway = FileGatewayConfig {
                api_key_env: "CAUCUS_TEST_KEY_VAR".to_string(),
                ..FileGatewayConfig::default()
            };
            assert_eq!(gateway.resolve_api_key().as_deref(), Some("from-env"));

            gateway.api_key = Some("direct".to_string());
            assert_eq!(gateway.resolve_api_key().as_deref(), Some("direct"));
            Ok(())
        });
    }

    #[test]
    fn test_to_gateway_config_carries_timeout() {
        let file = FileGatewayConfig {
            timeout_secs: 7,
            ..FileGatewayConfig::default()
        };
        let config = file.to_gateway_config();
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.base_url, "https://api.openai.com/v1");
    }
}
