//! Application layer for caucus
//!
//! This crate contains the use cases and port definitions for running panel
//! deliberations. It depends only on the domain layer; infrastructure
//! supplies the adapters behind the ports.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    model_gateway::{GatewayError, ModelGateway},
    progress::{NoProgress, ProgressNotifier},
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
};
pub use use_cases::run_panel::{ProcessError, RunPanelUseCase};
