//! # keysearch
//!
//! Single-job keyspace search controller with pluggable verification.
//!
//! ## Design Philosophy
//!
//! keysearch is designed to be:
//! - **Deterministic** - Candidates are enumerated in a fixed odometer order
//! - **Responsive** - Status and stop never wait on a verification in flight
//! - **Library-first** - The HTTP adapter is optional; embed the controller directly
//! - **Event-driven** - Consumers may subscribe to lifecycle events instead of polling
//!
//! A [`SearchController`] runs at most one job at a time. Each candidate is
//! checked by plain comparison, an MD5/SHA-256 digest comparison, or as the
//! password of a protected ZIP or 7z archive. After an archive match an
//! unprotected copy of the archive is written.
//!
//! ## Quick Start
//!
//! ```no_run
//! use keysearch::{JobConfig, Method, SearchController};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = SearchController::new();
//!     let mut events = controller.subscribe();
//!
//!     controller.start(JobConfig::digest(Method::Sha256, "1234", "0123456789", 4))?;
//!
//!     while let Ok(event) = events.recv().await {
//!         println!("Event: {:?}", event);
//!         if matches!(event, keysearch::Event::SearchFinished { .. }) {
//!             break;
//!         }
//!     }
//!
//!     let status = controller.status();
//!     println!("found {:?} after {} attempts", status.found_password, status.attempts);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Protected archive readers and recovery
pub mod archive;
/// Configuration types
pub mod config;
/// Job controller and search worker
pub mod controller;
/// Error types
pub mod error;
/// Search space enumeration
pub mod keyspace;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;
/// Candidate verification strategies
pub mod verify;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod test_helpers;

// Re-export commonly used types
pub use archive::{ArchiveReader, SevenZipReader, ZipReader};
pub use config::Config;
pub use controller::SearchController;
pub use error::{ApiError, ArchiveError, Error, ErrorDetail, Result, ToHttpStatus};
pub use keyspace::Keyspace;
pub use types::{ArchiveType, Event, JobConfig, JobState, Method, StatusSnapshot};
pub use verify::{DigestAlgorithm, Verifier};

/// Run until a termination signal arrives, then stop the running search.
///
/// Listens for SIGTERM or SIGINT on Unix and for Ctrl+C elsewhere.
///
/// # Example
///
/// ```no_run
/// use keysearch::{JobConfig, SearchController, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let controller = SearchController::new();
///     controller.start(JobConfig::plain("zzzzzz", "abcdefghijklmnopqrstuvwxyz", 6))?;
///
///     // Ctrl+C cancels the search
///     let status = run_with_shutdown(&controller).await;
///     println!("{:?} after {} attempts", status.state, status.attempts);
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(controller: &SearchController) -> StatusSnapshot {
    wait_for_signal().await;
    controller.stop();
    controller.status()
}

#[cfg(unix)]
pub(crate) async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in sandboxes; listen on whatever is available
    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut term), Ok(mut int)) => {
            let name = tokio::select! {
                _ = term.recv() => "SIGTERM",
                _ = int.recv() => "SIGINT",
            };
            tracing::info!(signal = name, "shutdown signal received");
        }
        (Ok(mut only), Err(e)) | (Err(e), Ok(mut only)) => {
            tracing::warn!(error = %e, "one signal handler unavailable");
            only.recv().await;
            tracing::info!("shutdown signal received");
        }
        (Err(e), Err(_)) => {
            tracing::warn!(error = %e, "no signal handlers, falling back to ctrl_c");
            tokio::signal::ctrl_c().await.ok();
            tracing::info!(signal = "ctrl_c", "shutdown signal received");
        }
    }
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!(signal = "ctrl_c", "shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "cannot listen for ctrl_c"),
    }
}
