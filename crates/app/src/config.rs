//! Runtime configuration read from the environment

use anyhow::{bail, Context, Result};
use ascend_core::UserId;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Backend connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub api_url: String,
    pub api_key: String,
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub user_id: UserId,
    pub data_dir: PathBuf,
    /// `None` in offline mode without backend credentials (no reward generation)
    pub remote: Option<RemoteConfig>,
    /// Keep account data in the local database instead of the backend
    pub offline: bool,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let offline = get("ASCEND_OFFLINE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let user_id = get("ASCEND_USER_ID")
            .map(UserId::new)
            .context("ASCEND_USER_ID is required")?;

        let remote = match (
            get("ASCEND_API_URL"),
            get("ASCEND_API_KEY"),
            get("ASCEND_ACCESS_TOKEN"),
        ) {
            (Some(api_url), Some(api_key), Some(access_token)) => Some(RemoteConfig {
                api_url,
                api_key,
                access_token,
            }),
            _ if offline => None,
            _ => bail!(
                "ASCEND_API_URL, ASCEND_API_KEY and ASCEND_ACCESS_TOKEN are required \
                 unless ASCEND_OFFLINE is set"
            ),
        };

        let http_timeout = match get("ASCEND_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("invalid ASCEND_HTTP_TIMEOUT_SECS '{}'", raw))?,
            ),
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let data_dir = get("ASCEND_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            user_id,
            data_dir,
            remote,
            offline,
            http_timeout,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("ascend.db")
    }
}

fn default_data_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|p| p.join("Ascend"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_remote_config_complete() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ASCEND_USER_ID", "user-1"),
            ("ASCEND_API_URL", "https://backend.example.co"),
            ("ASCEND_API_KEY", "anon"),
            ("ASCEND_ACCESS_TOKEN", "jwt"),
            ("ASCEND_DATA_DIR", "/tmp/ascend"),
        ]))
        .unwrap();

        assert!(!config.offline);
        assert_eq!(config.user_id, UserId::new("user-1"));
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/ascend/ascend.db"));
        assert_eq!(config.remote.unwrap().api_key, "anon");
    }

    #[test]
    fn test_missing_backend_requires_offline() {
        let err = AppConfig::from_lookup(lookup(&[("ASCEND_USER_ID", "user-1")])).unwrap_err();
        assert!(err.to_string().contains("ASCEND_OFFLINE"));

        let config = AppConfig::from_lookup(lookup(&[
            ("ASCEND_USER_ID", "user-1"),
            ("ASCEND_OFFLINE", "true"),
        ]))
        .unwrap();
        assert!(config.offline);
        assert!(config.remote.is_none());
    }

    #[test]
    fn test_user_id_required() {
        assert!(AppConfig::from_lookup(lookup(&[("ASCEND_OFFLINE", "1")])).is_err());
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            ("ASCEND_USER_ID", "user-1"),
            ("ASCEND_OFFLINE", "1"),
            ("ASCEND_HTTP_TIMEOUT_SECS", "soon"),
        ]));
        assert!(result.is_err());
    }
}
