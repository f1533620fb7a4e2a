//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the keysearch REST API using utoipa
//! for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the keysearch REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "keysearch REST API",
        version = "0.1.0",
        description = "Start, stop and monitor a single keyspace search; upload protected archives and download recovered copies",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5050", description = "Local development server")
    ),
    paths(
        // Search
        crate::api::routes::start_search,
        crate::api::routes::stop_search,
        crate::api::routes::search_status,

        // Files
        crate::api::routes::upload_archive,
        crate::api::routes::download_artifact,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::Method,
        crate::types::JobState,
        crate::types::ArchiveType,
        crate::types::StatusSnapshot,
        crate::types::Event,

        // Config types from config.rs
        crate::config::Config,
        crate::config::ApiConfig,
        crate::config::StorageConfig,
        crate::config::SearchLimits,

        // API request/response types
        crate::api::routes::StartRequest,
        crate::api::routes::OkResponse,
        crate::api::routes::UploadResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "search", description = "Search job - Start, stop and poll the single search job"),
        (name = "files", description = "Files - Upload protected archives and download recovered copies"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_has_paths() {
        let spec = ApiDoc::openapi();

        for path in [
            "/api/start",
            "/api/stop",
            "/api/status",
            "/api/upload",
            "/api/download",
            "/api/health",
            "/api/events",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn test_openapi_spec_has_schemas() {
        let spec = ApiDoc::openapi();
        let components = spec.components.unwrap();

        for schema in ["StatusSnapshot", "StartRequest", "ApiError", "Config"] {
            assert!(
                components.schemas.contains_key(schema),
                "missing schema {schema}"
            );
        }
    }

    #[test]
    fn test_openapi_spec_has_tags() {
        let spec = ApiDoc::openapi();
        let tags = spec.tags.unwrap();
        let tag_names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();

        assert!(tag_names.contains(&"search"), "Should have 'search' tag");
        assert!(tag_names.contains(&"files"), "Should have 'files' tag");
        assert!(tag_names.contains(&"system"), "Should have 'system' tag");
    }

    #[test]
    fn test_openapi_spec_info() {
        let spec = ApiDoc::openapi();

        assert_eq!(spec.info.title, "keysearch REST API");
        assert_eq!(spec.info.version, "0.1.0");
        assert!(spec.info.description.is_some());
    }

    #[test]
    fn test_openapi_spec_version() {
        let spec = ApiDoc::openapi();

        let json = serde_json::to_value(&spec).expect("Should serialize to JSON");
        let version = json.get("openapi").and_then(|v| v.as_str());
        assert!(
            version.unwrap().starts_with("3."),
            "Should use OpenAPI 3.x version"
        );
    }
}
