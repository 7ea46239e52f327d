//! Model gateway adapters.
//!
//! Provides [`OpenAiGateway`], an HTTP implementation of the
//! [`ModelGateway`](caucus_application::ModelGateway) port for
//! OpenAI-compatible chat completion endpoints.

mod openai;
pub mod protocol;

pub use openai::{GatewayConfig, OpenAiGateway};
