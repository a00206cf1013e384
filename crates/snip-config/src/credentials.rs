//! Storage for the recognition service key.
//!
//! The extraction client never reads a store directly; callers resolve the key
//! and place it in [`ExtractionConfig`](crate::extraction::ExtractionConfig).

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::CREDENTIAL_ENV;

pub trait CredentialStore {
    fn get(&self) -> Result<Option<String>>;

    fn set(&self, key: &str) -> Result<()>;
}

/// Read-only store backed by the process environment
pub struct EnvCredentialStore;

impl CredentialStore for EnvCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(env::var(CREDENTIAL_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty()))
    }

    fn set(&self, _key: &str) -> Result<()> {
        bail!("{CREDENTIAL_ENV} is read from the environment and cannot be written")
    }
}

#[derive(Serialize, Deserialize, Default)]
struct StoredKeys {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gemini_api_key: Option<String>,
}

/// JSON file holding `{"gemini_api_key": "..."}`
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<StoredKeys> {
        if !self.path.exists() {
            return Ok(StoredKeys::default());
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.read()?.gemini_api_key)
    }

    fn set(&self, key: &str) -> Result<()> {
        let mut keys = self.read()?;
        keys.gemini_api_key = Some(key.trim().to_string());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        fs::write(&self.path, serde_json::to_string_pretty(&keys)?)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::info!("Stored API key in {}", self.path.display());
        Ok(())
    }
}
