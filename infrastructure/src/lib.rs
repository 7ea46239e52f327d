//! Infrastructure layer for caucus
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod gateway;
pub mod logging;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, FileGatewayConfig, FilePanelConfig};
pub use gateway::{GatewayConfig, OpenAiGateway};
pub use logging::JsonlTranscriptLogger;
