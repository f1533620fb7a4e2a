//! Job controller: owns the single search worker and its status record.
//!
//! One mutex guards the status, the cancellation flag and the running guard.
//! It is held only for individual reads and updates, never across a
//! verification call or the per-attempt delay.

mod worker;


use crate::archive::{ArchiveReader, default_readers};
use crate::error::{Error, Result};
use crate::keyspace::Keyspace;
use crate::types::{Event, JobConfig, JobState, StatusSnapshot};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::info;

/// Capacity of the lifecycle event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Mutable status of the most recent job
///
/// Only the controller holds this; callers receive [`StatusSnapshot`] copies.
#[derive(Clone, Debug, Default)]
pub(crate) struct JobStatus {
    state: JobState,
    attempts: u64,
    current_candidate: String,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    found_password: Option<String>,
    artifact_path: Option<PathBuf>,
    error: Option<String>,
}

impl JobStatus {
    fn running(now: DateTime<Utc>) -> Self {
        Self {
            state: JobState::Running,
            started_at: Some(now),
            ..Self::default()
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    fn snapshot(&self, now: DateTime<Utc>) -> StatusSnapshot {
        let elapsed_seconds = match self.started_at {
            Some(started) => {
                let end = self.finished_at.unwrap_or(now);
                ((end - started).num_microseconds().unwrap_or(i64::MAX) as f64 / 1e6).max(0.0)
            }
            None => 0.0,
        };
        let rate_per_second = if elapsed_seconds > 0.0 {
            self.attempts as f64 / elapsed_seconds
        } else {
            0.0
        };

        StatusSnapshot {
            state: self.state,
            running: self.is_running(),
            attempts: self.attempts,
            current_candidate: self.current_candidate.clone(),
            started_at: self.started_at,
            elapsed_seconds,
            rate_per_second,
            found_password: self.found_password.clone(),
            completed: self.state.is_terminal(),
            success: self.state == JobState::Found,
            artifact_path: self.artifact_path.clone(),
            error: self.error.clone(),
        }
    }
}

/// Everything behind the controller's lock
#[derive(Debug, Default)]
pub(crate) struct ControllerState {
    config: Option<Arc<JobConfig>>,
    status: JobStatus,
    cancel_requested: bool,
}

type SharedState = Arc<Mutex<ControllerState>>;

/// The lock is never held across code that can panic, so a poisoned guard
/// still protects consistent data.
fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs at most one search job at a time and reports on it
///
/// Construct one per application and share it (e.g. behind an `Arc`); there
/// is no global instance.
///
/// # Example
///
/// ```no_run
/// use keysearch::{JobConfig, SearchController};
///
/// # async fn example() -> keysearch::Result<()> {
/// let controller = SearchController::new();
/// controller.start(JobConfig::plain("1234", "0123456789", 4))?;
///
/// let status = controller.status();
/// println!("{} attempts, {:.1}/s", status.attempts, status.rate_per_second);
/// # Ok(())
/// # }
/// ```
pub struct SearchController {
    state: SharedState,
    readers: Arc<[Arc<dyn ArchiveReader>]>,
    event_tx: broadcast::Sender<Event>,
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchController {
    /// Controller using the built-in archive readers
    pub fn new() -> Self {
        Self::with_readers(default_readers())
    }

    /// Controller using `readers`, in provider order, for archive mode
    pub fn with_readers(readers: Vec<Arc<dyn ArchiveReader>>) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(ControllerState::default())),
            readers: readers.into(),
            event_tx,
        }
    }

    /// Start a new search
    ///
    /// Fails with [`Error::AlreadyRunning`] while the previous job's worker
    /// has not yet finalized its status. Otherwise installs `config`, resets
    /// the status to a fresh running record, clears any pending stop request
    /// and spawns the worker. Must be called from within a Tokio runtime.
    pub fn start(&self, config: JobConfig) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Runtime(format!("search worker needs a Tokio runtime: {}", e)))?;

        let job = Arc::new(config);
        let space_size = Keyspace::new(&job.charset, job.password_length).size();

        {
            let mut state = lock(&self.state);
            if state.status.is_running() {
                return Err(Error::AlreadyRunning);
            }

            state.config = Some(job.clone());
            state.status = JobStatus::running(Utc::now());
            state.cancel_requested = false;

            info!(
                method = %job.method,
                password_length = job.password_length,
                charset_len = job.charset.chars().count(),
                ?space_size,
                "search started"
            );
            // Announced before the worker exists so it always precedes SearchFinished
            self.event_tx
                .send(Event::SearchStarted {
                    method: job.method,
                    space_size,
                })
                .ok();

            runtime.spawn(worker::supervise(
                self.state.clone(),
                job,
                self.readers.clone(),
                self.event_tx.clone(),
            ));
        }

        Ok(())
    }

    /// Ask the running search to stop
    ///
    /// Returns immediately. The worker notices before its next candidate.
    /// Calling this with no job running, or repeatedly, has no effect.
    pub fn stop(&self) {
        let mut state = lock(&self.state);
        if state.status.is_running() {
            state.cancel_requested = true;
        }
    }

    /// Copy of the current status
    pub fn status(&self) -> StatusSnapshot {
        let state = lock(&self.state);
        state.status.snapshot(Utc::now())
    }

    /// Configuration of the most recent job, if any was started
    pub fn last_config(&self) -> Option<JobConfig> {
        let state = lock(&self.state);
        state.config.as_deref().cloned()
    }

    /// Subscribe to lifecycle events
    ///
    /// Subscribe before calling `start` to be sure of seeing its events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }
}
