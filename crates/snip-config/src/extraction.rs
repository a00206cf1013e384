use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Keys at or below this length are rejected before any request is made
pub const MIN_CREDENTIAL_LEN: usize = 10;

/// Value shipped in the sample env file
pub const PLACEHOLDER_CREDENTIAL: &str = "YOUR_GEMINI_API_KEY_HERE";

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent"
        .to_string()
}

fn default_prompt_text() -> String {
    "Extract all text from this image. Return only the text content, no additional formatting or explanations."
        .to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    3
}

/// How the credential is attached to each request
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `?key=<credential>` on the endpoint URL
    #[default]
    QueryKey,
    /// `Authorization: Bearer <credential>`
    Bearer,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ExtractionConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default = "default_prompt_text")]
    pub prompt_text: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    /// Report `Empty` instead of a failure once HTTP errors exhaust the attempts
    #[serde(default)]
    pub lenient_http_errors: bool,
    /// Treat a success response with an unexpected shape as retryable
    #[serde(default)]
    pub retry_malformed: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            credential: None,
            prompt_text: default_prompt_text(),
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            auth_scheme: AuthScheme::default(),
            lenient_http_errors: false,
            retry_malformed: false,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid endpoint URL '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

impl ExtractionConfig {
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed endpoint; contract violations surface before any network use
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        let url = Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(url)
    }

    /// Credential that passes the shape check, if any
    pub fn usable_credential(&self) -> Option<&str> {
        self.credential
            .as_deref()
            .map(str::trim)
            .filter(|key| credential_is_plausible(key))
    }
}

/// Shape check only; the key is never verified against the service here
pub fn credential_is_plausible(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_CREDENTIAL && key.len() > MIN_CREDENTIAL_LEN
}
