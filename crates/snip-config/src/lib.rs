use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use self::extraction::ExtractionConfig;
use self::selection::SelectionConfig;
use self::ui::UiConfig;

pub mod credentials;
pub mod extraction;
pub mod selection;
pub mod ui;

pub use credentials::{CredentialStore, EnvCredentialStore, FileCredentialStore};
pub use extraction::{
    AuthScheme, ConfigError, MIN_CREDENTIAL_LEN, PLACEHOLDER_CREDENTIAL, credential_is_plausible,
};

/// Env var holding the recognition service key
pub const CREDENTIAL_ENV: &str = "GEMINI_API_KEY";

#[derive(Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub selection: SelectionConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Defaults overridden by environment variables
    pub fn new() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `var` returns for each setting's env name
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();
        config.apply_vars(var);
        config
    }

    /// Load a JSON profile, then apply environment overrides on top
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading config profile from {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Failed to open config profile {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config profile {}", path.display()))?;
        config.apply_vars(|name| env::var(name).ok());
        Ok(config)
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = var("SNIP_ENDPOINT") {
            self.extraction.endpoint = endpoint;
        }

        if let Some(key) = var(CREDENTIAL_ENV)
            && !key.trim().is_empty()
        {
            self.extraction.credential = Some(key);
        }

        if let Some(prompt) = var("SNIP_PROMPT") {
            self.extraction.prompt_text = prompt;
        }

        if let Some(timeout_ms) = var("SNIP_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.extraction.timeout_ms = timeout_ms;
        }

        if let Some(max_attempts) = var("SNIP_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.extraction.max_attempts = max_attempts;
        }

        if let Some(min_dim) = var("SNIP_MIN_DIM").and_then(|v| v.parse().ok()) {
            self.selection.min_dim = min_dim;
        }
    }
}
