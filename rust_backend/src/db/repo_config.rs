//! Configuration file support.
//!
//! The report reads one TOML file describing the repository backend and the
//! conventions to report on:
//!
//! ```toml
//! [repository]
//! type = "postgres"
//!
//! [postgres]
//! database_url = "postgres://intercode@localhost/intercode_production"
//! max_connections = 10
//!
//! [report]
//! conventions = ["Intercon T", "Intercon U"]
//! extra_exempt_titles = ["Tea Dance"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::config::PostgresConfig;
use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::models::EventFilter;

/// Conventions reported when the configuration does not name any.
pub const DEFAULT_CONVENTIONS: &[&str] = &["Intercon T", "Intercon U"];

/// File name searched by [`RepositoryConfig::from_default_location`].
pub const DEFAULT_CONFIG_FILE: &str = "larp_stats.toml";

/// Report configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub local: LocalSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

/// Postgres connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresSettings {
    /// Empty means "take it from `DATABASE_URL`".
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

/// In-memory repository settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSettings {
    /// JSON snapshot loaded into the local repository.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

/// What to report on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_conventions")]
    pub conventions: Vec<String>,
    #[serde(default)]
    pub extra_exempt_titles: Vec<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            conventions: default_conventions(),
            extra_exempt_titles: Vec::new(),
        }
    }
}

fn default_repo_type() -> String {
    "local".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_conventions() -> Vec<String> {
    DEFAULT_CONVENTIONS.iter().map(|c| c.to_string()).collect()
}

impl RepositoryConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RepositoryError> {
        toml::from_str(content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `larp_stats.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(Some(config))` if a file was found and parsed
    /// * `Ok(None)` if no file exists in any location
    /// * `Err(RepositoryError)` on read or parse errors
    pub fn from_default_location() -> Result<Option<Self>, RepositoryError> {
        let search_paths = [
            PathBuf::from(DEFAULT_CONFIG_FILE),
            Path::new("rust_backend").join(DEFAULT_CONFIG_FILE),
            Path::new("..").join(DEFAULT_CONFIG_FILE),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }

        Ok(None)
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, RepositoryError> {
        RepositoryType::from_str(&self.repository.repo_type).map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })
    }

    /// Convert to PostgresConfig if this is a Postgres configuration.
    ///
    /// An empty `database_url` is filled from the environment.
    pub fn to_postgres_config(&self) -> Result<Option<PostgresConfig>, RepositoryError> {
        if self.repository_type()? != RepositoryType::Postgres {
            return Ok(None);
        }

        let database_url = if self.postgres.database_url.is_empty() {
            PostgresConfig::from_env()
                .map_err(|_| {
                    RepositoryError::configuration(
                        "Postgres repository requires 'postgres.database_url' or DATABASE_URL",
                    )
                })?
                .database_url
        } else {
            self.postgres.database_url.clone()
        };

        Ok(Some(PostgresConfig {
            database_url,
            max_pool_size: self.postgres.max_connections,
            min_pool_size: self.postgres.min_connections,
            connection_timeout_sec: self.postgres.connect_timeout,
        }))
    }

    /// Event filter with the configured extra exemptions applied.
    pub fn event_filter(&self) -> EventFilter {
        EventFilter::default().with_extra_exemptions(self.report.extra_exempt_titles.iter().cloned())
    }
}
