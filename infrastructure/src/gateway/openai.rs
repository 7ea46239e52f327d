//! OpenAI-compatible model gateway.
//!
//! Implements the [`ModelGateway`] port over `POST {base_url}/chat/completions`.
//! Works against the OpenAI API and any server speaking the same protocol
//! (Azure OpenAI, local inference servers). One request per completion; any
//! retry policy belongs to a wrapper, not this adapter.

use std::time::Duration;

use async_trait::async_trait;
use caucus_application::ports::model_gateway::{GatewayError, ModelGateway};
use caucus_domain::{ModelId, ModelParams};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::protocol::{ChatRequest, ChatResponse, ErrorResponse, Message};

/// Connection settings for an OpenAI-compatible endpoint.
///
/// Credentials are passed in explicitly; this type never reads the
/// environment. The config loader resolves keys at startup.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL up to but not including `/chat/completions`.
    pub base_url: String,
    /// Bearer token. `None` for servers that do not authenticate.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(120),
            user_agent: concat!("caucus/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP gateway for OpenAI-compatible chat completion endpoints.
pub struct OpenAiGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGateway")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiGateway {
    /// Create a new gateway from explicit connection settings.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| {
                GatewayError::ConnectionError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn complete(
        &self,
        model: &ModelId,
        system_instructions: Option<&str>,
        prompt: &str,
        params: &ModelParams,
    ) -> Result<String, GatewayError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_instructions {
            messages.push(Message::system(system));
        }
        messages.push(Message::user(prompt));

        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
        };

        debug!(model = %model, "requesting chat completion");

        let mut builder = self.client.post(self.endpoint()).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout
            } else if e.is_connect() {
                GatewayError::ConnectionError(e.to_string())
            } else {
                GatewayError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status, &body, model));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                GatewayError::InvalidResponse("Response contained no completion text".to_string())
            })
    }
}

fn classify_failure(status: StatusCode, body: &str, model: &ModelId) -> GatewayError {
    let message = extract_error_message(body).unwrap_or_else(|| format!("HTTP {}", status));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::AuthenticationFailed(message)
        }
        StatusCode::NOT_FOUND => GatewayError::ModelNotAvailable(format!("{}: {}", model, message)),
        _ => GatewayError::RequestFailed(message),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config_for(server: &mockito::ServerGuard) -> GatewayConfig {
        GatewayConfig {
            base_url: server.url(),
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(5),
            ..GatewayConfig::default()
        }
    }

    #[tokio::test]
    async fn test_complete_sends_system_and_user_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "Be brief"},
                    {"role": "user", "content": "Q"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"A"}}]}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new(config_for(&server)).unwrap();
        let result = gateway
            .complete(
                &ModelId::new("gpt-4o"),
                Some("Be brief"),
                "Q",
                &ModelParams::new(),
            )
            .await;

        assert_eq!(result.unwrap(), "A");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_forwards_sampling_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({
                "temperature": 0.5,
                "max_tokens": 100
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new(config_for(&server)).unwrap();
        let params = ModelParams::new().with_temperature(0.5).with_max_tokens(100);
        let result = gateway
            .complete(&ModelId::new("gpt-4o"), None, "Q", &params)
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_without_api_key_sends_no_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create_async()
            .await;

        let config = GatewayConfig {
            base_url: server.url(),
            api_key: None,
            ..GatewayConfig::default()
        };
        let gateway = OpenAiGateway::new(config).unwrap();
        let result = gateway
            .complete(&ModelId::new("gpt-4o"), None, "Q", &ModelParams::new())
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_maps_unauthorized_to_authentication_failed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key","type":"invalid_request_error"}}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new(config_for(&server)).unwrap();
        let error = gateway
            .complete(&ModelId::new("gpt-4o"), None, "Q", &ModelParams::new())
            .await
            .unwrap_err();

        match error {
            GatewayError::AuthenticationFailed(message) => {
                assert!(message.contains("Incorrect API key"));
            }
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[tokio::test]
    async fn test_complete_maps_not_found_to_model_not_available() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(404)
            .with_body(r#"{"error":{"message":"The model does not exist"}}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new(config_for(&server)).unwrap();
        let error = gateway
            .complete(&ModelId::new("no-such-model"), None, "Q", &ModelParams::new())
            .await
            .unwrap_err();

        match error {
            GatewayError::ModelNotAvailable(message) => {
                assert!(message.contains("no-such-model"));
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected error variant: {other}"),
        }
    }

    #[tokio::test]
    async fn test_complete_maps_server_error_to_request_failed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let gateway = OpenAiGateway::new(config_for(&server)).unwrap();
        let error = gateway
            .complete(&ModelId::new("gpt-4o"), None, "Q", &ModelParams::new())
            .await
            .unwrap_err();

        assert!(matches!(error, GatewayError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_complete_rejects_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let gateway = OpenAiGateway::new(config_for(&server)).unwrap();
        let error = gateway
            .complete(&ModelId::new("gpt-4o"), None, "Q", &ModelParams::new())
            .await
            .unwrap_err();

        assert!(matches!(error, GatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_choices() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let gateway = OpenAiGateway::new(config_for(&server)).unwrap();
        let error = gateway
            .complete(&ModelId::new("gpt-4o"), None, "Q", &ModelParams::new())
            .await
            .unwrap_err();

        assert!(matches!(error, GatewayError::InvalidResponse(_)));
    }
}
