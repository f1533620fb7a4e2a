use super::*;
use crate::test_helpers::wait_for_completion;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use std::time::Duration;
use tower::ServiceExt;


const TIMEOUT: Duration = Duration::from_secs(20);

/// Router over a fresh controller with storage inside a temp directory
fn create_test_app() -> (
    Router,
    Arc<SearchController>,
    Arc<Config>,
    tempfile::TempDir,
) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.storage.upload_dir = temp_dir.path().join("uploads");
    config.storage.artifact_dir = temp_dir.path().join("artifacts");
    let config = Arc::new(config);

    let controller = Arc::new(SearchController::new());
    let app = create_router(controller.clone(), config.clone());
    (app, controller, config, temp_dir)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Multipart request with a single `file` field
fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "----keysearchBoundary7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\
             \r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("Response should be valid JSON")
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _controller, _config, _temp_dir) = create_test_app();

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.api.cors_enabled = false;
    let app = create_router(Arc::new(SearchController::new()), Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let mut config = Config::default();
    config.api.cors_origins = vec!["http://allowed.example".to_string()];
    let app = create_router(Arc::new(SearchController::new()), Arc::new(config));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://allowed.example"
    );
}

#[tokio::test]
async fn test_swagger_ui_can_be_disabled() {
    let mut config = Config::default();
    config.api.swagger_ui = false;
    let app = create_router(Arc::new(SearchController::new()), Arc::new(config));

    let response = app.oneshot(get_request("/swagger-ui/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_server_shuts_down_and_stops_search() {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    config.storage.upload_dir = temp_dir.path().join("uploads");
    config.storage.artifact_dir = temp_dir.path().join("artifacts");
    let config = Arc::new(config);
    let controller = Arc::new(SearchController::new());

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_with_shutdown(
        controller.clone(),
        config.clone(),
        async move {
            shutdown_rx.await.ok();
        },
    ));

    controller
        .start(
            crate::JobConfig::plain("never", "0123456789", 6)
                .with_delay(Duration::from_millis(1)),
        )
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(TIMEOUT, server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let status = wait_for_completion(&controller, TIMEOUT).await;
    assert_eq!(status.state, crate::JobState::Cancelled);
    assert!(config.upload_dir().is_dir());
    assert!(config.artifact_dir().is_dir());
}
