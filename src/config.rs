use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_MAX_UPLOAD_MB, DEFAULT_PORT, DEFAULT_PUBLIC_URL_PREFIX, DEFAULT_SQLITE_PATH,
    DEFAULT_UPLOAD_DIR,
};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// Local SQLite file (default)
    #[default]
    Sqlite,
    /// PostgreSQL server, password read from the credentials file
    Postgres,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Server configuration file structure
///
/// ```toml
/// port = 3000
/// upload_dir = "public/uploads/audio"
/// public_url_prefix = "/uploads/audio"
/// max_upload_mb = 200
///
/// [database]
/// backend = "sqlite"
/// sqlite_path = "data/voice_audio.sqlite"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// API server port (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory receiving uploaded files (default: public/uploads/audio)
    pub upload_dir: Option<PathBuf>,
    /// URL prefix under which uploaded files are served (default: /uploads/audio)
    pub public_url_prefix: Option<String>,
    /// Maximum request body size in megabytes (default: 200)
    pub max_upload_mb: Option<u64>,
    /// Database connection settings (maps to [database] section in TOML)
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database configuration (maps to [database] section in TOML)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// sqlite or postgres (default: sqlite)
    #[serde(default)]
    pub backend: DatabaseBackend,
    /// SQLite database file (default: data/voice_audio.sqlite)
    pub sqlite_path: Option<PathBuf>,
    /// Base PostgreSQL URL without password or database (e.g., postgres://user@host:5432)
    pub postgres_url: Option<String>,
    /// PostgreSQL database name, created if missing
    pub database: Option<String>,
    /// Profile whose password is read from ~/.config/voice_audio_api/credentials.toml
    pub credential_profile: Option<String>,
}

impl ServerConfig {
    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
        Self::parse(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Validate cross-field requirements
    ///
    /// The postgres backend needs `postgres_url`, `database` and
    /// `credential_profile`; the public URL prefix must be an absolute path
    /// other than `/`; the body limit must be positive.
    pub fn validate(&self) -> Result<(), String> {
        if self.database.backend == DatabaseBackend::Postgres {
            if self.database.postgres_url.is_none() {
                return Err("database.backend is postgres but postgres_url is missing".to_string());
            }
            if self.database.database.is_none() {
                return Err("database.backend is postgres but database is missing".to_string());
            }
            if self.database.credential_profile.is_none() {
                return Err(
                    "database.backend is postgres but credential_profile is missing".to_string(),
                );
            }
        }

        let prefix = self.public_url_prefix();
        if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
            return Err(format!(
                "public_url_prefix must be an absolute path other than '/', got '{}'",
                prefix
            ));
        }

        if self.max_upload_mb == Some(0) {
            return Err("max_upload_mb must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    pub fn public_url_prefix(&self) -> String {
        self.public_url_prefix
            .clone()
            .unwrap_or_else(|| DEFAULT_PUBLIC_URL_PREFIX.to_string())
    }

    pub fn max_upload_bytes(&self) -> usize {
        let mb = self.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB);
        usize::try_from(mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

impl DatabaseConfig {
    pub fn sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServerConfig::parse("").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.upload_dir(), PathBuf::from("public/uploads/audio"));
        assert_eq!(config.public_url_prefix(), "/uploads/audio");
        assert_eq!(config.max_upload_bytes(), 200 * 1024 * 1024);
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(
            config.database.sqlite_path(),
            PathBuf::from("data/voice_audio.sqlite")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_section_parses() {
        let config = ServerConfig::parse(
            r#"
            port = 8080

            [database]
            backend = "postgres"
            postgres_url = "postgres://audio@localhost:5432"
            database = "voice_audio"
            credential_profile = "main"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
        assert_eq!(config.database.credential_profile.as_deref(), Some("main"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_without_credential_profile_is_rejected() {
        let config = ServerConfig::parse(
            r#"
            [database]
            backend = "postgres"
            postgres_url = "postgres://audio@localhost:5432"
            database = "voice_audio"
            "#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("credential_profile"), "{}", err);
    }

    #[test]
    fn test_root_prefix_is_rejected() {
        let config = ServerConfig::parse(r#"public_url_prefix = "/""#).unwrap();
        assert!(config.validate().is_err());

        let config = ServerConfig::parse(r#"public_url_prefix = "uploads""#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_upload_limit_is_rejected() {
        let config = ServerConfig::parse("max_upload_mb = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_backend_fails_to_parse() {
        let result = ServerConfig::parse(
            r#"
            [database]
            backend = "mongodb"
            "#,
        );
        assert!(result.is_err());
    }
}
