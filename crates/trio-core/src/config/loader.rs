//! Configuration loader with environment variable expansion
//!
//! Loads configuration from `.trio.toml` in the working directory or the
//! user config directory.

use super::types::{ProviderConfig, TrioConfig};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for crate::TrioError {
    fn from(err: ConfigError) -> Self {
        crate::TrioError::Config(err.to_string())
    }
}

/// Load configuration from various sources
///
/// Priority order:
/// 1. Project-level `.trio.toml`
/// 2. User-level `~/.config/trio/config.toml`
/// 3. Default configuration
pub fn load_config(project_dir: &Path) -> Result<TrioConfig, ConfigError> {
    let project_config = project_dir.join(".trio.toml");
    if project_config.exists() {
        return load_from_file(&project_config);
    }

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            return load_from_file(&user_config);
        }
    }

    Ok(apply_env_overrides(TrioConfig::default()))
}

/// User config file path
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("trio").join("config.toml"))
}

/// Load configuration from a specific file
pub fn load_from_file(path: &Path) -> Result<TrioConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse configuration text, expand `${VAR}` references and apply env overrides
pub fn parse_config(content: &str) -> Result<TrioConfig, ConfigError> {
    let mut config: TrioConfig = toml::from_str(content)?;
    expand_env_vars(&mut config);
    let config = apply_env_overrides(config);
    validate(&config)?;
    Ok(config)
}

fn validate(config: &TrioConfig) -> Result<(), ConfigError> {
    if config.sdlc.max_iterations == 0 {
        return Err(ConfigError::Invalid(
            "sdlc.max_iterations must be at least 1".to_string(),
        ));
    }
    if config.llm.timeout == 0 {
        return Err(ConfigError::Invalid(
            "llm.timeout must be at least 1 second".to_string(),
        ));
    }
    if config.discussion.roles.is_empty() {
        return Err(ConfigError::Invalid(
            "discussion.roles must name at least one role".to_string(),
        ));
    }
    Ok(())
}

fn env_regex() -> &'static Regex {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

/// Expand ${VAR} patterns in string values
fn expand_env_vars(config: &mut TrioConfig) {
    let regex = env_regex();

    for provider in config.llm.providers.values_mut() {
        if let Some(ref api_key) = provider.api_key {
            provider.api_key = Some(expand_string(api_key, regex));
        }
        if let Some(ref base_url) = provider.base_url {
            provider.base_url = Some(expand_string(base_url, regex));
        }
    }
}

/// Expand environment variables in a single string
fn expand_string(s: &str, regex: &Regex) -> String {
    regex
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}

fn set_provider_key(config: &mut TrioConfig, provider_id: &str, key: String) {
    let provider = config
        .llm
        .providers
        .entry(provider_id.to_string())
        .or_insert_with(ProviderConfig::default);
    provider.api_key = Some(key);
    provider.enabled = true;
}

/// Apply environment variable overrides for common settings
///
/// Supports direct environment variables:
/// - GEMINI_API_KEY / GOOGLE_API_KEY -> gemini.api_key
/// - OPENAI_API_KEY -> openai.api_key
/// - GROQ_API_KEY -> groq.api_key
/// - OLLAMA_BASE_URL -> ollama.base_url
/// - TRIO_DEFAULT_PROVIDER -> llm.default_provider
fn apply_env_overrides(mut config: TrioConfig) -> TrioConfig {
    for env_var in ["GEMINI_API_KEY", "GOOGLE_API_KEY"] {
        if let Ok(key) = std::env::var(env_var) {
            if !key.is_empty() {
                set_provider_key(&mut config, "gemini", key);
                break;
            }
        }
    }

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            set_provider_key(&mut config, "openai", key);
        }
    }

    if let Ok(key) = std::env::var("GROQ_API_KEY") {
        if !key.is_empty() {
            set_provider_key(&mut config, "groq", key);
        }
    }

    if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
        if !url.is_empty() {
            let provider = config
                .llm
                .providers
                .entry("ollama".to_string())
                .or_insert_with(ProviderConfig::default);
            provider.base_url = Some(url);
        }
    }

    if let Ok(provider) = std::env::var("TRIO_DEFAULT_PROVIDER") {
        if !provider.is_empty() {
            config.llm.default_provider = provider;
        }
    }

    config
}

/// Create a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Trio Configuration
# Place this file in your project root as .trio.toml
# or in ~/.config/trio/config.toml for global settings

[llm]
# Provider for model identifiers without a "provider/" prefix
default_provider = "gemini"

# Request timeout in seconds
timeout = 120

[llm.providers.gemini]
enabled = true
api_key = "${GEMINI_API_KEY}"

[llm.providers.groq]
enabled = true
api_key = "${GROQ_API_KEY}"

[llm.providers.ollama]
enabled = false
base_url = "http://localhost:11434"

[roles.rational]
model = "gemini/gemini-2.5-flash"

[roles.fun]
model = "gemini/gemini-2.5-flash"

[roles.philosopher]
model = "gemini/gemini-2.5-flash"

[roles.coder]
model = "groq/llama-3.3-70b-versatile"

[discussion]
roles = ["rational", "fun", "philosopher"]
personality = "user"

[sdlc]
max_iterations = 3
success_sentinel = "U EE A E A U EE EE A E"

[speech]
transcription_model = "gemini-2.5-flash"
synthesis_model = "gemini-2.5-flash-preview-tts"
voice = "Kore"
sample_rate = 24000

[server]
port = 8000
"#
}
