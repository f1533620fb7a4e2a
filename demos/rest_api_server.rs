//! REST API server demo
//!
//! Runs the keysearch HTTP adapter so a search can be driven over HTTP.
//!
//! After starting, you can:
//! - View Swagger UI at http://localhost:5050/swagger-ui
//! - Start a search via POST http://localhost:5050/api/start
//! - Poll progress via GET http://localhost:5050/api/status
//! - Stream events via GET http://localhost:5050/api/events
//!
//! Set `PORT` to listen on a different port. Ctrl+C stops the server and any
//! running search.

use keysearch::config::{Config, StorageConfig};
use keysearch::{SearchController, api};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let config = Config {
        storage: StorageConfig {
            upload_dir: "uploads".into(),
            artifact_dir: "artifacts".into(),
        },
        ..Default::default()
    }
    .apply_env();
    config.validate()?;

    let base = format!("http://{}", config.api.bind_address);
    let controller = Arc::new(SearchController::new());
    let config = Arc::new(config);

    println!("🚀 Starting keysearch REST API server");
    println!("📖 Swagger UI: {base}/swagger-ui");
    println!("🔄 Events stream: {base}/api/events");
    println!();
    println!("Example commands:");
    println!("  # Search for a SHA-256 target");
    println!("  curl -X POST {base}/api/start \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!(
        "    -d '{{\"target_password\": \"4321\", \"method\": \"sha256\", \"password_length\": 4, \"delay_seconds\": 0}}'"
    );
    println!();
    println!("  # Recover a protected archive");
    println!("  curl -F file=@locked.zip {base}/api/upload");
    println!("  curl -X POST {base}/api/start \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"method\": \"zip\", \"archive_token\": \"<token>\", \"password_length\": 3}}'");
    println!("  curl -OJ {base}/api/download");
    println!();
    println!("  # Poll status");
    println!("  curl {base}/api/status");

    api::serve_until_signal(controller, config).await?;

    Ok(())
}
