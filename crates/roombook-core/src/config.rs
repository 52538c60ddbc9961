//! TOML-based configuration with environment overrides.
//!
//! Stored at `~/.config/roombook/config.toml`. A missing file means defaults.
//! After the file is read, these variables override it:
//!
//! - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`, `GOOGLE_REDIRECT_URI`
//! - `ROOMBOOK_BACKEND_URL` + `ROOMBOOK_BACKEND_KEY` (switches to the REST backend)
//! - `ROOMBOOK_DB` (SQLite database path)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::{Backend, RestBackend, SqliteBackend};
use crate::error::{BackendError, ConfigError};
use crate::google::OAuthConfig;

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5173/auth/google/callback";
const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Returns `~/.config/roombook[-dev]/` based on ROOMBOOK_ENV.
///
/// Set ROOMBOOK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ROOMBOOK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("roombook-dev")
    } else {
        base_dir.join("roombook")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Google OAuth client registration and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: Url,
    #[serde(default = "default_token_url")]
    pub token_url: Url,
    #[serde(default = "default_api_base")]
    pub api_base: Url,
}

/// Which backend holds rooms, bookings and sync status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Embedded SQLite; `None` means `<data dir>/roombook.db`.
    Sqlite {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// PostgREST endpoint of a hosted database.
    Rest { url: String, api_key: String },
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}
fn default_auth_url() -> Url {
    Url::parse(DEFAULT_AUTH_URL).expect("valid default auth URL")
}
fn default_token_url() -> Url {
    Url::parse(DEFAULT_TOKEN_URL).expect("valid default token URL")
}
fn default_api_base() -> Url {
    Url::parse(DEFAULT_API_BASE).expect("valid default API base")
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: default_redirect_uri(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            api_base: default_api_base(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Sqlite { path: None }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google: GoogleConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl GoogleConfig {
    pub fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
        }
    }
}

impl BackendConfig {
    /// Construct the configured backend.
    ///
    /// # Errors
    /// Returns an error if the SQLite database cannot be opened.
    pub fn open(&self) -> Result<Arc<dyn Backend>, BackendError> {
        match self {
            BackendConfig::Sqlite { path } => {
                let path = match path {
                    Some(p) => p.clone(),
                    None => data_dir()
                        .map_err(|e| BackendError::Unavailable(e.to_string()))?
                        .join("roombook.db"),
                };
                tracing::debug!(path = %path.display(), "opening sqlite backend");
                Ok(Arc::new(SqliteBackend::open(path)?))
            }
            BackendConfig::Rest { url, api_key } => {
                tracing::debug!(%url, "using rest backend");
                Ok(Arc::new(RestBackend::new(url, api_key)))
            }
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, then apply environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load a config file without environment overrides; missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Apply environment overrides read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(id) = var("GOOGLE_CLIENT_ID") {
            self.google.client_id = id;
        }
        if let Some(secret) = var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = secret;
        }
        if let Some(uri) = var("GOOGLE_REDIRECT_URI").filter(|v| !v.is_empty()) {
            self.google.redirect_uri = uri;
        }
        if let Some(url) = var("ROOMBOOK_BACKEND_URL").filter(|v| !v.is_empty()) {
            self.backend = BackendConfig::Rest {
                url,
                api_key: var("ROOMBOOK_BACKEND_KEY").unwrap_or_default(),
            };
        } else if let Some(path) = var("ROOMBOOK_DB").filter(|v| !v.is_empty()) {
            self.backend = BackendConfig::Sqlite {
                path: Some(PathBuf::from(path)),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.google.redirect_uri, DEFAULT_REDIRECT_URI);
        assert!(config.google.client_id.is_empty());
        assert_eq!(config.backend, BackendConfig::Sqlite { path: None });
    }

    #[test]
    fn test_parse_partial_file() {
        let config = Config::parse(
            r#"
            [google]
            client_id = "abc"

            [backend]
            kind = "rest"
            url = "https://xyz.example.co"
            api_key = "anon"
            "#,
        )
        .unwrap();
        assert_eq!(config.google.client_id, "abc");
        assert_eq!(config.google.token_url.as_str(), DEFAULT_TOKEN_URL);
        assert!(matches!(config.backend, BackendConfig::Rest { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_url() {
        let result = Config::parse("[google]\napi_base = \"not a url\"\n");
        assert!(matches!(result, Err(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GOOGLE_CLIENT_ID", "id-from-env"),
            ("GOOGLE_REDIRECT_URI", ""),
            ("ROOMBOOK_DB", "/tmp/rooms.db"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.google.client_id, "id-from-env");
        assert_eq!(config.google.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(
            config.backend,
            BackendConfig::Sqlite {
                path: Some(PathBuf::from("/tmp/rooms.db"))
            }
        );
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Config::load_from(&path).unwrap().backend, BackendConfig::default());

        let mut config = Config::default();
        config.google.client_secret = "secret".into();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.google.client_secret, "secret");
    }
}
