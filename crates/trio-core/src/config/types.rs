//! Configuration types for Trio
//!
//! Defines the structure of `.trio.toml` configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Success sentinel the tester persona is told to emit when the code passes
pub const DEFAULT_SUCCESS_SENTINEL: &str = "U EE A E A U EE EE A E";

const DEFAULT_MODEL: &str = "gemini/gemini-2.5-flash";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrioConfig {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Per-role model selection, keyed by role name
    #[serde(default = "default_roles")]
    pub roles: HashMap<String, RoleConfig>,

    /// Discussion fan-out settings
    #[serde(default)]
    pub discussion: DiscussionConfig,

    /// SDLC retry cycle settings
    #[serde(default)]
    pub sdlc: SdlcConfig,

    /// Speech collaborators
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Session bootstrap identifiers
    #[serde(default)]
    pub session: SessionConfig,

    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for TrioConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            roles: default_roles(),
            discussion: DiscussionConfig::default(),
            sdlc: SdlcConfig::default(),
            speech: SpeechConfig::default(),
            session: SessionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// LLM configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider used when a model identifier carries no `provider/` prefix
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Provider configurations
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            timeout: default_timeout(),
            providers: default_providers(),
        }
    }
}

/// Individual provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the API
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: None,
        }
    }
}

/// Create default provider configurations
fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();

    providers.insert(
        "gemini".to_string(),
        ProviderConfig {
            enabled: false, // Disabled by default until API key is set
            api_key: None,
            base_url: Some("https://generativelanguage.googleapis.com".to_string()),
        },
    );

    providers.insert(
        "openai".to_string(),
        ProviderConfig {
            enabled: false,
            api_key: None,
            base_url: Some("https://api.openai.com/v1".to_string()),
        },
    );

    providers.insert(
        "groq".to_string(),
        ProviderConfig {
            enabled: false,
            api_key: None,
            base_url: Some("https://api.groq.com/openai/v1".to_string()),
        },
    );

    // Ollama - local, no API key needed
    providers.insert(
        "ollama".to_string(),
        ProviderConfig {
            enabled: true,
            api_key: None,
            base_url: Some("http://localhost:11434".to_string()),
        },
    );

    providers
}

/// Model selection for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Model identifier, `provider/model` or a bare model name
    pub model: String,
}

impl RoleConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

fn default_roles() -> HashMap<String, RoleConfig> {
    let mut roles = HashMap::new();
    for name in ["rational", "fun", "philosopher", "planner", "tester", "fixer"] {
        roles.insert(name.to_string(), RoleConfig::new(DEFAULT_MODEL));
    }
    roles.insert(
        "coder".to_string(),
        RoleConfig::new("groq/llama-3.3-70b-versatile"),
    );
    roles
}

/// Discussion fan-out settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionConfig {
    /// Roles consulted, in response order
    #[serde(default = "default_discussion_roles")]
    pub roles: Vec<String>,

    /// Personality of the member whose input is being answered
    #[serde(default = "default_personality")]
    pub personality: String,
}

fn default_discussion_roles() -> Vec<String> {
    vec![
        "rational".to_string(),
        "fun".to_string(),
        "philosopher".to_string(),
    ]
}

fn default_personality() -> String {
    "user".to_string()
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            roles: default_discussion_roles(),
            personality: default_personality(),
        }
    }
}

/// SDLC retry cycle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdlcConfig {
    /// Maximum validation passes before giving up
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Marker the tester emits when the code passes
    #[serde(default = "default_sentinel")]
    pub success_sentinel: String,
}

fn default_max_iterations() -> u32 {
    3
}

fn default_sentinel() -> String {
    DEFAULT_SUCCESS_SENTINEL.to_string()
}

impl Default for SdlcConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            success_sentinel: default_sentinel(),
        }
    }
}

/// Speech collaborator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Model used for transcription
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    /// Model used for speech synthesis
    #[serde(default = "default_synthesis_model")]
    pub synthesis_model: String,

    /// Prebuilt voice name
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_transcription_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_synthesis_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_sample_rate() -> u32 {
    24_000
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            transcription_model: default_transcription_model(),
            synthesis_model: default_synthesis_model(),
            voice: default_voice(),
            sample_rate: default_sample_rate(),
        }
    }
}

/// Session bootstrap identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

fn default_app_name() -> String {
    "chat".to_string()
}

fn default_user_id() -> String {
    "user1".to_string()
}

fn default_session_id() -> String {
    "session1".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            user_id: default_user_id(),
            session_id: default_session_id(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl TrioConfig {
    /// Get a provider config by name
    pub fn get_provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.llm.providers.get(name)
    }

    /// Model identifier configured for a role, falling back to the default model
    pub fn role_model(&self, role: &str) -> String {
        self.roles
            .get(role)
            .map(|r| r.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// API key for the speech provider (Gemini)
    pub fn speech_api_key(&self) -> Option<&str> {
        self.get_provider("gemini")
            .and_then(|p| p.api_key.as_deref())
            .filter(|k| !k.is_empty())
    }
}
