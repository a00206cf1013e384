use std::path::{Path, PathBuf};

use anyhow::Context;
use snip_config::Config;

const APP_DIR: &str = "sniptext";

/// Default credential file: `<platform config dir>/sniptext/keys.json`
pub fn store_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    let config_dir = dirs::config_dir().context("No config directory for this platform")?;
    Ok(config_dir.join(APP_DIR).join("keys.json"))
}

pub fn load_config(profile: Option<&Path>) -> anyhow::Result<Config> {
    match profile {
        Some(path) => Config::from_json_file(path),
        None => Ok(Config::new()),
    }
}

pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.trim().chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("AIzaSyExampleKey123"), "AIza...y123");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn test_explicit_store_path_wins() {
        let path = PathBuf::from("/tmp/keys.json");
        assert_eq!(store_path(Some(path.clone())).unwrap(), path);
    }

    #[test]
    fn test_default_store_under_platform_config_dir() {
        let Some(config_dir) = dirs::config_dir() else {
            return;
        };
        let path = store_path(None).unwrap();
        assert!(path.starts_with(&config_dir));
        assert!(path.ends_with(Path::new(APP_DIR).join("keys.json")));
    }
}
