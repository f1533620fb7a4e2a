//! REST API server module
//!
//! A thin HTTP adapter over [`SearchController`]: it validates requests,
//! manages uploaded archives and recovered artifacts on disk, and reports
//! status. All search logic lives in the controller.

use crate::{Config, Result, SearchController};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Search
/// - `POST /api/start` - Validate parameters and start a search
/// - `POST /api/stop` - Request cancellation of the running search
/// - `GET /api/status` - Current status snapshot
///
/// ## Files
/// - `POST /api/upload` - Upload a protected archive (multipart field `file`)
/// - `GET /api/download` - Download the recovered artifact
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /api/events` - Server-sent events stream
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(controller: Arc<SearchController>, config: Arc<Config>) -> Router {
    let state = AppState::new(controller, config.clone());

    let router = Router::new()
        // Search
        .route("/api/start", post(routes::start_search))
        .route("/api/stop", post(routes::stop_search))
        .route("/api/status", get(routes::search_status))
        // Files
        .route("/api/upload", post(routes::upload_archive))
        .route("/api/upload-zip", post(routes::upload_archive))
        .route("/api/download", get(routes::download_artifact))
        // System
        .route("/api/health", get(routes::health_check))
        .route("/api/openapi.json", get(routes::openapi_spec))
        .route("/api/events", get(routes::event_stream));

    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list (or an empty list) allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Create the upload and artifact directories if they are missing
async fn prepare_storage(config: &Config) -> Result<()> {
    tokio::fs::create_dir_all(config.upload_dir()).await?;
    tokio::fs::create_dir_all(config.artifact_dir()).await?;
    Ok(())
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails. See [`serve_with_shutdown`] and
/// [`serve_until_signal`] for graceful variants.
///
/// # Example
///
/// ```no_run
/// use keysearch::{Config, SearchController};
/// use std::sync::Arc;
///
/// # async fn example() -> keysearch::Result<()> {
/// let config = Arc::new(Config::default());
/// let controller = Arc::new(SearchController::new());
///
/// keysearch::api::serve(controller, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(controller: Arc<SearchController>, config: Arc<Config>) -> Result<()> {
    serve_with_shutdown(controller, config, std::future::pending()).await
}

/// Start the API server and shut it down gracefully when `shutdown` resolves.
///
/// A search still running at shutdown is asked to stop.
pub async fn serve_with_shutdown<F>(
    controller: Arc<SearchController>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    prepare_storage(&config).await?;
    let app = create_router(controller.clone(), config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    controller.stop();
    tracing::info!("API server stopped");
    Ok(())
}

/// Start the API server and run until SIGINT or SIGTERM (Ctrl+C elsewhere).
pub async fn serve_until_signal(controller: Arc<SearchController>, config: Arc<Config>) -> Result<()> {
    serve_with_shutdown(controller, config, crate::wait_for_signal()).await
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
