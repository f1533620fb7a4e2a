//! Search handlers: start, stop, status.

use super::{OkResponse, StartRequest};
use crate::api::AppState;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{JobConfig, Method};
use crate::utils::{random_token, sanitize_filename};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::time::Duration;

fn invalid(field: &str, message: impl Into<String>) -> Error {
    Error::Validation {
        message: message.into(),
        field: Some(field.to_string()),
    }
}

impl StartRequest {
    /// Check the request against `config.limits` and build the job
    ///
    /// Archive mode resolves `archive_token` inside the upload directory and
    /// places the artifact stem in the artifact directory.
    pub fn into_job(self, config: &Config) -> Result<JobConfig> {
        let method: Method = self.method.parse()?;

        let max_length = config.limits.max_password_length;
        if !(1..=max_length).contains(&self.password_length) {
            return Err(invalid(
                "password_length",
                format!("password_length must be between 1 and {}", max_length),
            ));
        }

        let charset = self
            .charset
            .unwrap_or_else(|| config.limits.default_charset.clone());
        let mut seen = HashSet::new();
        if charset.is_empty() || !charset.chars().all(|c| seen.insert(c)) {
            return Err(invalid(
                "charset",
                "charset must be a set of unique characters",
            ));
        }

        let max_delay = config.limits.max_delay.as_secs_f64();
        if !self.delay_seconds.is_finite() || !(0.0..=max_delay).contains(&self.delay_seconds) {
            return Err(invalid(
                "delay_seconds",
                format!("delay_seconds must be between 0.0 and {}", max_delay),
            ));
        }
        let delay = Duration::try_from_secs_f64(self.delay_seconds)
            .map_err(|e| invalid("delay_seconds", e.to_string()))?;

        let job = match method {
            Method::Plain | Method::Md5 | Method::Sha256 => {
                JobConfig::digest(method, self.target_password, charset, self.password_length)
            }
            Method::Archive => {
                let token = self
                    .archive_token
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| {
                        invalid("archive_token", "archive_token required for archive mode")
                    })?;
                let archive = sanitize_filename(token)
                    .map(|name| config.upload_dir().join(name))
                    .filter(|path| path.is_file())
                    .ok_or_else(|| invalid("archive_token", "uploaded file not found"))?;
                let output_stem = config
                    .artifact_dir()
                    .join(format!("unlocked_{}", random_token()));

                JobConfig::archive(archive, Some(output_stem), charset, self.password_length)
            }
        };

        Ok(job.with_delay(delay))
    }
}

/// POST /api/start - Start a search
#[utoipa::path(
    post,
    path = "/api/start",
    tag = "search",
    request_body = StartRequest,
    responses(
        (status = 200, description = "Search started", body = OkResponse),
        (status = 400, description = "Invalid search parameters", body = crate::error::ApiError),
        (status = 409, description = "A search is already running", body = crate::error::ApiError)
    )
)]
pub async fn start_search(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Response {
    if state.controller.status().running {
        return Error::AlreadyRunning.into_response();
    }

    let job = match request.into_job(&state.config) {
        Ok(job) => job,
        Err(e) => {
            tracing::debug!(error = %e, "rejected start request");
            return e.into_response();
        }
    };

    match state.controller.start(job) {
        Ok(()) => (StatusCode::OK, Json(OkResponse::ok())).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/stop - Request cancellation of the running search
#[utoipa::path(
    post,
    path = "/api/stop",
    tag = "search",
    responses(
        (status = 200, description = "Stop requested (no-op when idle)", body = OkResponse)
    )
)]
pub async fn stop_search(State(state): State<AppState>) -> impl IntoResponse {
    state.controller.stop();
    Json(OkResponse::ok())
}

/// GET /api/status - Current search status
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "search",
    responses(
        (status = 200, description = "Status snapshot", body = crate::types::StatusSnapshot)
    )
)]
pub async fn search_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.controller.status())
}
