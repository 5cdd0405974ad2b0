use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::KisetsuError;
use crate::models::UserSession;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub remote: RemoteConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub per_page: u32,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://graphql.anilist.co".into(),
            per_page: 20,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub table: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            api_key: None,
            table: "anime_list".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub user_id: Option<String>,
    pub access_token: Option<String>,
}

impl AppConfig {
    /// Load the user config file if it exists, else the built-in defaults.
    ///
    /// Missing keys in the user file take their default values.
    pub fn load() -> Result<Self, KisetsuError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Self::parse(DEFAULT_CONFIG)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, KisetsuError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| KisetsuError::Config(e.to_string()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, KisetsuError> {
        toml::from_str(content).map_err(|e| KisetsuError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), KisetsuError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), KisetsuError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| KisetsuError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The signed-in user, if a user id is configured.
    pub fn user_session(&self) -> Option<UserSession> {
        let user_id = self.session.user_id.as_deref()?.trim();
        if user_id.is_empty() {
            return None;
        }
        Some(UserSession {
            user_id: user_id.to_string(),
            access_token: self.session.access_token.clone(),
        })
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search.timeout_secs.max(1))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the database file.
    pub fn db_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("kisetsu.db"))
            .unwrap_or_else(|| PathBuf::from("kisetsu.db"))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, KisetsuError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "kisetsu")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_file_matches_defaults() {
        let config = AppConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.search.per_page, 20);
        assert!(!config.remote.enabled);
        assert!(config.user_session().is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = AppConfig::parse(
            r#"
            [session]
            user_id = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(config.remote.table, "anime_list");
        let user = config.user_session().unwrap();
        assert_eq!(user.user_id, "abc");
        assert!(user.access_token.is_none());
    }

    #[test]
    fn test_blank_user_id_is_signed_out() {
        let config = AppConfig::parse("[session]\nuser_id = \"  \"\n").unwrap();
        assert!(config.user_session().is_none());
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::parse("[search\nper_page = ").unwrap_err();
        assert!(matches!(err, KisetsuError::Config(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.remote.enabled = true;
        config.remote.url = Some("https://abc.supabase.co".into());
        config.search.timeout_secs = 0;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.search_timeout(), Duration::from_secs(1));
    }
}
