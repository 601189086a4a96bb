use serde::Deserialize;
use std::path::PathBuf;

use crate::chrome::TitleLabels;
use crate::error::{PagerError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub token_env: String,
    pub token_command: Option<String>,
    /// API base for GitHub Enterprise, e.g. `https://ghe.example.com/api/v3`
    pub api_base: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token_env: "GITHUB_TOKEN".to_string(),
            token_command: Some("gh auth token".to_string()),
            api_base: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Keep fetched issues on disk between sessions.
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { persist: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub labels: TitleLabels,
    pub github: GitHubConfig,
    pub cache: CacheConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("grit-issues").join("config.toml"))
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        match toml::from_str::<Config>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }
        }
    }

    /// Token from the configured env var, falling back to the CLI command.
    pub fn token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(&self.github.token_env) {
            if !token.is_empty() {
                return Ok(token);
            }
        }

        if let Some(token) = self.github.token_command.as_deref().and_then(try_cli_token) {
            return Ok(token);
        }

        Err(PagerError::Auth(format!(
            "{} not set and no token command succeeded",
            self.github.token_env
        )))
    }
}

/// Try to run a CLI command and capture stdout as a token
fn try_cli_token(command: &str) -> Option<String> {
    let output = std::process::Command::new("sh")
        .args(["-c", command])
        .output()
        .ok()?;

    if output.status.success() {
        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !token.is_empty() {
            return Some(token);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[labels]
issue = "I-"
pull_request = "PR-"

[github]
token_env = "GHE_TOKEN"
api_base = "https://ghe.example.com/api/v3"

[cache]
persist = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.labels.title(3, true), "PR-3");
        assert_eq!(config.labels.title(3, false), "I-3");
        assert_eq!(config.github.token_env, "GHE_TOKEN");
        assert_eq!(
            config.github.api_base.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert!(!config.cache.persist);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[labels]\nissue = \"Bug #\"\n").unwrap();
        assert_eq!(config.labels.title(1, false), "Bug #1");
        assert_eq!(config.labels.title(1, true), "Pull Request #1");
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert!(config.cache.persist);
    }

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.labels, TitleLabels::default());
        assert_eq!(config.github.token_command.as_deref(), Some("gh auth token"));
    }

    #[test]
    fn cli_token_trims_output() {
        assert_eq!(try_cli_token("echo '  abc  '"), Some("abc".to_string()));
        assert_eq!(try_cli_token("exit 1"), None);
        assert_eq!(try_cli_token("true"), None);
    }
}
