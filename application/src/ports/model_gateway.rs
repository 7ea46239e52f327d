//! Model gateway port
//!
//! Defines the interface for obtaining completions from a language-model
//! provider.

use async_trait::async_trait;
use caucus_domain::{ModelId, ModelParams};
use thiserror::Error;

/// Errors that can occur during model gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for model completions
///
/// This port defines how the application layer reaches a model provider.
/// Adapters live in the infrastructure layer and own credentials, timeouts,
/// and any retry policy; the engine treats every failure as opaque.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Produce one completion for the given prompt
    async fn complete(
        &self,
        model: &ModelId,
        system_instructions: Option<&str>,
        prompt: &str,
        params: &ModelParams,
    ) -> Result<String, GatewayError>;
}
