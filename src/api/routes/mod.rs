//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`search`]: start, stop and status of the search job
//! - [`files`]: archive upload and artifact download
//! - [`system`]: health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod files;
mod search;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use files::*;
pub use search::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /api/start
///
/// Every field is optional; omitted fields take the defaults shown.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartRequest {
    /// Value to search for in plain and digest modes (default: "1234")
    #[serde(default = "default_target_password")]
    pub target_password: String,

    /// Verification method: plain, md5, sha256 or archive/zip (default: "plain")
    #[serde(default = "default_method")]
    pub method: String,

    /// Candidate length (default: 4)
    #[serde(default = "default_password_length")]
    pub password_length: usize,

    /// Pause after each attempt, in seconds (default: 0.01)
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: f64,

    /// Distinct symbols to draw candidates from (default: the configured charset)
    #[serde(default)]
    pub charset: Option<String>,

    /// Token returned by POST /api/upload (archive mode only)
    #[serde(default, alias = "zip_token")]
    pub archive_token: Option<String>,
}

impl Default for StartRequest {
    fn default() -> Self {
        Self {
            target_password: default_target_password(),
            method: default_method(),
            password_length: default_password_length(),
            delay_seconds: default_delay_seconds(),
            charset: None,
            archive_token: None,
        }
    }
}

fn default_target_password() -> String {
    "1234".to_string()
}

fn default_method() -> String {
    "plain".to_string()
}

fn default_password_length() -> usize {
    4
}

fn default_delay_seconds() -> f64 {
    0.01
}

/// Response body for operations that only acknowledge
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct OkResponse {
    /// Always true
    pub ok: bool,
}

impl OkResponse {
    /// Successful acknowledgement
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Response body for POST /api/upload
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// Always true
    pub ok: bool,
    /// Token to pass as `archive_token` when starting an archive search
    pub token: String,
}
