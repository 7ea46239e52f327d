//! Configuration file loading for caucus
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `CAUCUS_*` variables
//! 2. Explicitly specified config file
//! 3. Project root: `./caucus.toml` or `./.caucus.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/caucus/config.toml`
//! 5. Fallback: `~/.config/caucus/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileGatewayConfig, FilePanelConfig};
pub use loader::ConfigLoader;
