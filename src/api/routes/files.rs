//! File handlers: archive upload and artifact download.

use super::UploadResponse;
use crate::api::AppState;
use crate::error::Error;
use crate::utils::{random_token, sanitize_filename};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// POST /api/upload - Upload a protected archive
///
/// The archive is stored in the upload directory as `<random>_<name>`; the
/// stored name is the token to start an archive search with.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    request_body(content = String, description = "Archive file (multipart/form-data, field 'file')", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Archive stored", body = UploadResponse),
        (status = 400, description = "No usable file in the request", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn upload_archive(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Error::Validation {
                    message: format!("malformed multipart body: {}", e),
                    field: Some("file".to_string()),
                }
                .into_response();
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        match field.bytes().await {
            Ok(bytes) => upload = Some((filename, bytes.to_vec())),
            Err(e) => {
                return Error::Validation {
                    message: format!("failed to read file: {}", e),
                    field: Some("file".to_string()),
                }
                .into_response();
            }
        }
    }

    let Some((filename, content)) = upload else {
        return Error::Validation {
            message: "no file part".to_string(),
            field: Some("file".to_string()),
        }
        .into_response();
    };

    let Some(name) = sanitize_filename(&filename) else {
        return Error::Validation {
            message: "no selected file".to_string(),
            field: Some("file".to_string()),
        }
        .into_response();
    };

    let token = format!("{}_{}", random_token(), name);
    let upload_dir = state.config.upload_dir();
    let path = upload_dir.join(&token);

    if let Err(e) = tokio::fs::create_dir_all(upload_dir).await {
        return Error::Io(e).into_response();
    }
    if let Err(e) = tokio::fs::write(&path, &content).await {
        tracing::error!(path = ?path, error = %e, "failed to store upload");
        return Error::Io(e).into_response();
    }

    tracing::info!(token = %token, size = content.len(), "archive uploaded");

    (StatusCode::OK, Json(UploadResponse { ok: true, token })).into_response()
}

/// GET /api/download - Download the recovered artifact
#[utoipa::path(
    get,
    path = "/api/download",
    tag = "files",
    responses(
        (status = 200, description = "Unprotected archive", content_type = "application/octet-stream"),
        (status = 404, description = "No artifact available", body = crate::error::ApiError)
    )
)]
pub async fn download_artifact(State(state): State<AppState>) -> Response {
    let Some(artifact) = state.controller.status().artifact_path else {
        return Error::NotFound("no artifact available".to_string()).into_response();
    };

    let file = match tokio::fs::File::open(&artifact).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(artifact = ?artifact, error = %e, "artifact missing on disk");
            return Error::NotFound("no artifact available".to_string()).into_response();
        }
    };

    let filename = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());

    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response()
}
