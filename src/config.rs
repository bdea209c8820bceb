use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

use crate::error::{AuthError, NotionError};

pub const DEFAULT_BASE_URL: &str = "https://pwn.college";
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_DELAY_MS: u64 = 350;

/// Platform settings, read from `PWN_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSettings {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Notion settings, read from `NOTION_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionSettings {
    pub token: Option<String>,
    pub page_id: Option<String>,
    #[serde(default = "default_notion_api_url")]
    pub api_url: String,
    #[serde(default = "default_notion_delay_ms")]
    pub delay_ms: u64,
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Resolved Notion target: token plus parent page.
#[derive(Debug, Clone)]
pub struct NotionTarget {
    pub token: String,
    pub page_id: String,
    pub api_url: String,
    pub delay: Duration,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_notion_api_url() -> String {
    DEFAULT_NOTION_API_URL.to_string()
}

fn default_notion_delay_ms() -> u64 {
    DEFAULT_NOTION_DELAY_MS
}

impl PlatformSettings {
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix("PWN"))
    }

    fn load(env: Environment) -> Result<Self> {
        Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .context("Failed to read PWN_* settings")
    }

    /// Both values must be present and non-blank; checked before any network call.
    pub fn credentials(&self) -> Result<Credentials, AuthError> {
        let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        match (present(&self.username), present(&self.password)) {
            (Some(username), Some(password)) => Ok(Credentials { username, password }),
            _ => Err(AuthError::MissingCredentials),
        }
    }
}

impl NotionSettings {
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix("NOTION"))
    }

    fn load(env: Environment) -> Result<Self> {
        Config::builder()
            .add_source(env.try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .context("Failed to read NOTION_* settings")
    }

    pub fn target(&self) -> Result<NotionTarget, NotionError> {
        let token = self.token.clone().filter(|t| !t.trim().is_empty());
        let page_id = self.page_id.clone().filter(|p| !p.trim().is_empty());
        match (token, page_id) {
            (Some(token), Some(page_id)) => Ok(NotionTarget {
                token,
                page_id,
                api_url: self.api_url.trim_end_matches('/').to_string(),
                delay: Duration::from_millis(self.delay_ms),
            }),
            _ => Err(NotionError::MissingSettings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(prefix: &str, vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<config::Map<String, String>>();
        Environment::with_prefix(prefix).source(Some(map))
    }

    #[test]
    fn platform_defaults() {
        let s = PlatformSettings::load(env("PWN", &[])).unwrap();
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert!(s.username.is_none());
        assert!(matches!(s.credentials(), Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn platform_credentials() {
        let s = PlatformSettings::load(env(
            "PWN",
            &[("PWN_USERNAME", "hacker"), ("PWN_PASSWORD", "hunter2")],
        ))
        .unwrap();
        let creds = s.credentials().unwrap();
        assert_eq!(creds.username, "hacker");
        assert_eq!(creds.password, "hunter2");
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn blank_password_is_missing() {
        let s = PlatformSettings::load(env(
            "PWN",
            &[("PWN_USERNAME", "hacker"), ("PWN_PASSWORD", "  ")],
        ))
        .unwrap();
        assert!(matches!(s.credentials(), Err(AuthError::MissingCredentials)));
    }

    #[test]
    fn notion_target() {
        let s = NotionSettings::load(env(
            "NOTION",
            &[
                ("NOTION_TOKEN", "secret_abc"),
                ("NOTION_PAGE_ID", "1234"),
                ("NOTION_DELAY_MS", "100"),
            ],
        ))
        .unwrap();
        let t = s.target().unwrap();
        assert_eq!(t.page_id, "1234");
        assert_eq!(t.api_url, DEFAULT_NOTION_API_URL);
        assert_eq!(t.delay, Duration::from_millis(100));
    }

    #[test]
    fn notion_target_requires_token() {
        let s = NotionSettings::load(env("NOTION", &[("NOTION_PAGE_ID", "1234")])).unwrap();
        assert_eq!(s.delay_ms, DEFAULT_NOTION_DELAY_MS);
        assert!(matches!(s.target(), Err(NotionError::MissingSettings)));
    }
}
