//! Prompt domain
//!
//! The closed template language, the response combiner, and the named
//! instruction presets that agents and moderators are built from.

pub mod combine;
pub mod presets;
pub mod template;

pub use combine::{combine, format_previous_responses};
pub use template::{Bindings, Placeholder, Template, TemplateError};
