//! HTTP error response handling for the API
//!
//! Converts domain errors to HTTP responses with a status code and a JSON
//! [`ApiError`] body.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

/// Bare `ApiError`s carry no status of their own; they are answered with 500
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use std::path::PathBuf;

    async fn body_of(response: Response) -> ApiError {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_already_running_is_conflict() {
        let response = Error::AlreadyRunning.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "already_running");
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request_with_field() {
        let error = Error::Validation {
            message: "charset must be a set of unique characters".into(),
            field: Some("charset".into()),
        };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "validation_error");
        assert_eq!(api_error.error.details.unwrap()["field"], "charset");
    }

    #[tokio::test]
    async fn test_archive_error_is_unprocessable() {
        let error = Error::Archive(ArchiveError::UnsupportedFormat {
            archive: PathBuf::from("/uploads/notes.txt"),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "unsupported_archive");
        assert!(
            api_error.error.details.unwrap()["archive"]
                .as_str()
                .unwrap()
                .contains("notes.txt")
        );
    }

    #[tokio::test]
    async fn test_not_found_into_response() {
        let response = Error::NotFound("artifact".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let api_error = body_of(response).await;
        assert_eq!(api_error.error.code, "not_found");
        assert!(api_error.error.message.contains("artifact"));
    }

    #[tokio::test]
    async fn test_bare_api_error_is_internal() {
        let response = ApiError::new("boom", "something broke").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
