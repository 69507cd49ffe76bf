//! Configuration module for Trio
//!
//! Handles loading and parsing of `.trio.toml` configuration files
//! with support for environment variable expansion.

mod loader;
mod types;

pub use loader::{
    load_config, load_from_file, parse_config, sample_config, user_config_path, ConfigError,
};
pub use types::{
    DiscussionConfig, LlmConfig, ProviderConfig, RoleConfig, SdlcConfig, ServerConfig,
    SessionConfig, SpeechConfig, TrioConfig, DEFAULT_SUCCESS_SENTINEL,
};
