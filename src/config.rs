//! Configuration types for keysearch
//!
//! The search controller itself takes no configuration beyond each job's
//! [`JobConfig`](crate::types::JobConfig). These settings belong to the HTTP
//! adapter: where to listen, where uploads and artifacts live, and the bounds
//! applied to user-supplied search parameters before a job is started.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Main configuration for the keysearch service
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Upload and artifact directories
    #[serde(default)]
    pub storage: StorageConfig,

    /// Bounds applied to search requests
    #[serde(default)]
    pub limits: SearchLimits,
}

impl Config {
    /// Apply environment overrides on top of this configuration.
    ///
    /// `PORT` replaces the port of the bind address. Unparseable values are
    /// ignored with a warning.
    pub fn apply_env(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.api.bind_address.set_port(port),
                Err(e) => tracing::warn!(value = %port, error = %e, "ignoring invalid PORT"),
            }
        }
        self
    }

    /// Check the configuration for values that would make every request fail
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_password_length == 0 {
            return Err(Error::Config {
                message: "max_password_length must be at least 1".to_string(),
                key: Some("max_password_length".to_string()),
            });
        }
        let mut seen = std::collections::HashSet::new();
        let charset = &self.limits.default_charset;
        if charset.is_empty() || !charset.chars().all(|c| seen.insert(c)) {
            return Err(Error::Config {
                message: "default_charset must be a non-empty set of unique characters"
                    .to_string(),
                key: Some("default_charset".to_string()),
            });
        }
        Ok(())
    }

    /// Upload directory
    pub fn upload_dir(&self) -> &PathBuf {
        &self.storage.upload_dir
    }

    /// Artifact directory
    pub fn artifact_dir(&self) -> &PathBuf {
        &self.storage.artifact_dir
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5050)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// On-disk locations used by the API adapter
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Where uploaded archives are stored (default: "./uploads")
    #[serde(default = "default_upload_dir")]
    #[schema(value_type = String)]
    pub upload_dir: PathBuf,

    /// Where recovered artifacts are written (default: "./artifacts")
    #[serde(default = "default_artifact_dir")]
    #[schema(value_type = String)]
    pub artifact_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            artifact_dir: default_artifact_dir(),
        }
    }
}

/// Guardrails for user-supplied search parameters
///
/// These keep the demo responsive: with the default bounds the largest
/// search space is `|charset|^6`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchLimits {
    /// Longest candidate length accepted (default: 6)
    #[serde(default = "default_max_password_length")]
    pub max_password_length: usize,

    /// Largest per-attempt delay accepted (default: 1.0 seconds)
    #[serde(default = "default_max_delay", with = "duration_secs_f64")]
    #[schema(value_type = f64)]
    pub max_delay: Duration,

    /// Charset used when a request omits one (default: "0123456789")
    #[serde(default = "default_charset")]
    pub default_charset: String,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_password_length: default_max_password_length(),
            max_delay: default_max_delay(),
            default_charset: default_charset(),
        }
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5050))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("./artifacts")
}

fn default_max_password_length() -> usize {
    6
}

fn default_max_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_charset() -> String {
    "0123456789".to_string()
}

// Fractional-seconds Duration serialization helper
mod duration_secs_f64 {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
