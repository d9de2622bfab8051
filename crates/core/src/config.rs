use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

pub const TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";
pub const BASE_URL_ENV: &str = "CLOUDFLARE_API_BASE_URL";

/// On-disk configuration file structure
///
/// ```toml
/// [cloudflare]
/// api_token = "..."
/// base_url = "https://api.cloudflare.com/client/v4"  # optional
/// timeout_secs = 30                                  # optional
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub cloudflare: CloudflareConfig,
}

/// Credentials and transport settings for the Cloudflare API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudflareConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl CloudflareConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            ..Default::default()
        }
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

/// Path to the user-level config file: `~/.cloudflare-speed/config.toml`
pub fn config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| Error::ConfigParse("Could not determine home directory".to_string()))?;
    Ok(PathBuf::from(home)
        .join(".cloudflare-speed")
        .join("config.toml"))
}

/// Parse a config file from a string (useful for testing)
pub fn parse_config_str(content: &str) -> Result<GlobalConfig> {
    let config: GlobalConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load the config file at `path`, `None` if it does not exist
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Option<GlobalConfig>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    parse_config_str(&content).map(Some)
}

/// Write the config file, creating its parent directory
pub fn save_config<P: AsRef<Path>>(path: P, config: &GlobalConfig) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Overlay environment values on top of file values.
///
/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_env_overrides<F>(mut config: CloudflareConfig, lookup: F) -> CloudflareConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
        config.api_token = token;
    }
    if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
        config.base_url = Some(url);
    }
    config
}

/// Load `path` (if present), apply environment overrides and require a token
pub fn resolve_config<P: AsRef<Path>>(path: P) -> Result<CloudflareConfig> {
    let file = load_config(path)?.unwrap_or_default();
    let config = apply_env_overrides(file.cloudflare, |key| std::env::var(key).ok());
    if config.api_token.trim().is_empty() {
        return Err(Error::MissingToken);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[cloudflare]
api_token = "secret-token"
base_url = "http://localhost:9000/client/v4/"
timeout_secs = 15
"#;
        let config = parse_config_str(toml).unwrap();
        assert_eq!(config.cloudflare.api_token, "secret-token");
        assert_eq!(config.cloudflare.timeout_secs, Some(15));
        assert_eq!(config.cloudflare.base_url(), "http://localhost:9000/client/v4");
    }

    #[test]
    fn test_parse_minimal_config_uses_default_base_url() {
        let config = parse_config_str("[cloudflare]\napi_token = \"t\"\n").unwrap();
        assert_eq!(config.cloudflare.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.cloudflare.timeout_secs, None);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = parse_config_str("[cloudflare\napi_token = ");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            (TOKEN_ENV, "env-token"),
            (BASE_URL_ENV, "http://127.0.0.1:1234"),
        ]
        .into_iter()
        .collect();

        let config = apply_env_overrides(CloudflareConfig::new("file-token"), |k| {
            env.get(k).map(|v| v.to_string())
        });
        assert_eq!(config.api_token, "env-token");
        assert_eq!(config.base_url(), "http://127.0.0.1:1234");
    }

    #[test]
    fn test_blank_env_does_not_clear_token() {
        let config = apply_env_overrides(CloudflareConfig::new("file-token"), |k| {
            (k == TOKEN_ENV).then(|| "  ".to_string())
        });
        assert_eq!(config.api_token, "file-token");
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = GlobalConfig {
            cloudflare: CloudflareConfig {
                api_token: "abc".to_string(),
                base_url: None,
                timeout_secs: Some(5),
            },
        };
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap().unwrap();
        assert_eq!(loaded.cloudflare, config.cloudflare);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path().join("absent.toml")).unwrap().is_none());
    }
}
