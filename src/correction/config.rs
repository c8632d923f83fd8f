//! Correction client configuration.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "grok-beta";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Configuration for the correction client.
#[derive(Clone, PartialEq)]
pub struct CorrectionConfig {
    /// Whether the correction pass runs at all
    pub enabled: bool,
    /// Bearer credential for the chat-completion endpoint
    pub api_key: Option<String>,
    /// Chat-completion URL
    pub endpoint: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Maximum tokens in the completion
    pub max_tokens: u32,
    /// Sampling temperature; 0 keeps corrections deterministic
    pub temperature: f32,
    /// Whole-request timeout; `None` leaves the HTTP client default
    pub timeout: Option<Duration>,
}

impl CorrectionConfig {
    /// Enabled configuration with the given credential and defaults otherwise.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            enabled: true,
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// True when a call would actually be made.
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.is_some()
    }

    /// Why no call would be made, or `None` when the client is active.
    pub fn inactive_reason(&self) -> Option<&'static str> {
        if self.api_key.is_none() {
            Some("XAI_API_KEY not set")
        } else if !self.enabled {
            Some("turned off by configuration")
        } else {
            None
        }
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.0,
            timeout: None,
        }
    }
}

// Hand-written so the credential never ends up in logs
impl fmt::Debug for CorrectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrectionConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}
