//! Error types for keysearch
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (archive access, recovery, configuration)
//! - HTTP status code mapping for the API adapter
//! - Structured error responses with machine-readable error codes
//!
//! Only `start` reports an error synchronously (`AlreadyRunning`). Everything
//! that goes wrong inside a running search is observed through `status()`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for keysearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for keysearch
#[derive(Debug, Error)]
pub enum Error {
    /// A search is already running; the start request was rejected
    #[error("a search is already running")]
    AlreadyRunning,

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_password_length")
        key: Option<String>,
    },

    /// A request parameter failed validation in the API adapter
    #[error("invalid request: {message}")]
    Validation {
        /// Human-readable error message
        message: String,
        /// The offending request field, if any
        field: Option<String>,
    },

    /// Archive access or recovery error
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No async runtime available to run the search worker
    #[error("runtime error: {0}")]
    Runtime(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Archive-related errors
///
/// A wrong password is never an error: readers report it as a plain
/// non-match. These variants cover the archive itself being unusable and the
/// post-match recovery step.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Archive mode was selected but no archive path was configured
    #[error("archive mode requires an archive path")]
    MissingArchivePath,

    /// The archive file could not be opened or read at all
    #[error("cannot read archive {archive}: {reason}")]
    Unreadable {
        /// The archive that could not be read
        archive: PathBuf,
        /// The underlying failure
        reason: String,
    },

    /// No configured reader recognizes the archive format
    #[error("unsupported archive format: {archive}")]
    UnsupportedFormat {
        /// The archive whose format was not recognized
        archive: PathBuf,
    },

    /// Extraction with the recovered password failed
    #[error("extraction failed for {archive}: {reason}")]
    ExtractionFailed {
        /// The archive that failed to extract
        archive: PathBuf,
        /// The reason extraction failed
        reason: String,
    },

    /// Writing the unprotected artifact failed
    #[error("failed to write artifact {artifact}: {reason}")]
    RepackFailed {
        /// The artifact path that could not be written
        artifact: PathBuf,
        /// The reason repackaging failed
        reason: String,
    },
}

/// API error response format
///
/// ```json
/// {
///   "error": {
///     "code": "already_running",
///     "message": "a search is already running"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation { .. } => 400,
            Error::Archive(ArchiveError::MissingArchivePath) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict
            Error::AlreadyRunning => 409,

            // 422 Unprocessable Entity - the archive itself is unusable
            Error::Archive(_) => 422,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::Runtime(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::AlreadyRunning => "already_running",
            Error::Config { .. } => "config_error",
            Error::Validation { .. } => "validation_error",
            Error::Archive(e) => match e {
                ArchiveError::MissingArchivePath => "missing_archive_path",
                ArchiveError::Unreadable { .. } => "archive_unreadable",
                ArchiveError::UnsupportedFormat { .. } => "unsupported_archive",
                ArchiveError::ExtractionFailed { .. } => "extraction_failed",
                ArchiveError::RepackFailed { .. } => "repack_failed",
            },
            Error::NotFound(_) => "not_found",
            Error::Io(_) => "io_error",
            Error::Runtime(_) => "runtime_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let mut api = ApiError::new(error.error_code(), error.to_string());
        api.error.details = match &error {
            Error::Validation {
                field: Some(field), ..
            } => Some(serde_json::json!({ "field": field })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::Archive(ArchiveError::Unreadable { archive, .. })
            | Error::Archive(ArchiveError::UnsupportedFormat { archive })
            | Error::Archive(ArchiveError::ExtractionFailed { archive, .. }) => {
                Some(serde_json::json!({ "archive": archive }))
            }
            Error::Archive(ArchiveError::RepackFailed { artifact, .. }) => {
                Some(serde_json::json!({ "artifact": artifact }))
            }
            _ => None,
        };
        api
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every
    /// reachable match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (Error::AlreadyRunning, 409, "already_running"),
            (
                Error::Config {
                    message: "bad value".into(),
                    key: Some("max_password_length".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::Validation {
                    message: "charset must not be empty".into(),
                    field: Some("charset".into()),
                },
                400,
                "validation_error",
            ),
            (
                Error::Archive(ArchiveError::MissingArchivePath),
                400,
                "missing_archive_path",
            ),
            (
                Error::Archive(ArchiveError::Unreadable {
                    archive: PathBuf::from("locked.zip"),
                    reason: "no such file".into(),
                }),
                422,
                "archive_unreadable",
            ),
            (
                Error::Archive(ArchiveError::UnsupportedFormat {
                    archive: PathBuf::from("notes.txt"),
                }),
                422,
                "unsupported_archive",
            ),
            (
                Error::Archive(ArchiveError::ExtractionFailed {
                    archive: PathBuf::from("locked.zip"),
                    reason: "crc error".into(),
                }),
                422,
                "extraction_failed",
            ),
            (
                Error::Archive(ArchiveError::RepackFailed {
                    artifact: PathBuf::from("out.zip"),
                    reason: "disk full".into(),
                }),
                422,
                "repack_failed",
            ),
            (Error::NotFound("artifact".into()), 404, "not_found"),
            (
                Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
                500,
                "io_error",
            ),
            (Error::Runtime("no reactor".into()), 500, "runtime_error"),
            (
                Error::ApiServerError("bind failed".into()),
                500,
                "api_server_error",
            ),
            (Error::Other("unknown".into()), 500, "internal_error"),
        ]
    }

    #[test]
    fn every_variant_maps_to_status_and_code() {
        for (error, status, code) in all_error_variants() {
            assert_eq!(error.status_code(), status, "status for {error:?}");
            assert_eq!(error.error_code(), code, "code for {error:?}");
        }
    }

    #[test]
    fn api_error_carries_field_details() {
        let api: ApiError = Error::Validation {
            message: "password_length must be between 1 and 6".into(),
            field: Some("password_length".into()),
        }
        .into();

        assert_eq!(api.error.code, "validation_error");
        assert!(api.error.message.contains("password_length"));
        assert_eq!(
            api.error.details,
            Some(serde_json::json!({ "field": "password_length" }))
        );
    }

    #[test]
    fn api_error_omits_details_when_absent() {
        let api: ApiError = Error::AlreadyRunning.into();
        let json = serde_json::to_value(&api).unwrap();
        assert_eq!(json["error"]["code"], "already_running");
        assert!(json["error"].get("details").is_none());
    }
}
