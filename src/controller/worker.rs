//! The search worker: enumerate, verify, finalize.

use super::{SharedState, lock};
use crate::archive::{ArchiveReader, recover};
use crate::error::{Error, Result};
use crate::keyspace::Keyspace;
use crate::types::{Event, JobConfig, JobState};
use crate::verify::Verifier;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, trace, warn};

/// How a search ended
#[derive(Debug)]
pub(crate) enum Outcome {
    Found {
        password: String,
        artifact: Option<PathBuf>,
    },
    Exhausted,
    Cancelled,
    Failed {
        reason: String,
    },
}

impl Outcome {
    fn state(&self) -> JobState {
        match self {
            Outcome::Found { .. } => JobState::Found,
            Outcome::Exhausted => JobState::Exhausted,
            Outcome::Cancelled => JobState::Cancelled,
            Outcome::Failed { .. } => JobState::Failed,
        }
    }
}

/// Run one job to a terminal state
///
/// The search itself runs in its own task so that both an error result and a
/// panic inside it end up here and finalize the job as failed. The returned
/// future owns a [`FinalizeGuard`] from the start, so dropping it unfinished
/// (for example when the runtime shuts down) also finalizes the job.
pub(crate) fn supervise(
    state: SharedState,
    job: Arc<JobConfig>,
    readers: Arc<[Arc<dyn ArchiveReader>]>,
    event_tx: broadcast::Sender<Event>,
) -> impl Future<Output = ()> + Send + 'static {
    let guard = FinalizeGuard {
        state: state.clone(),
        event_tx,
        armed: true,
    };

    async move {
        let search = tokio::spawn(run_search(state, job, readers));

        let outcome = match search.await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => Outcome::Failed {
                reason: e.to_string(),
            },
            Err(e) => Outcome::Failed {
                reason: format!("search task aborted: {}", e),
            },
        };

        guard.finish(outcome);
    }
}

/// Finalizes the job exactly once, as failed if dropped before [`finish`](Self::finish)
struct FinalizeGuard {
    state: SharedState,
    event_tx: broadcast::Sender<Event>,
    armed: bool,
}

impl FinalizeGuard {
    fn finish(mut self, outcome: Outcome) {
        self.armed = false;
        finalize(&self.state, outcome, &self.event_tx);
    }
}

impl Drop for FinalizeGuard {
    fn drop(&mut self) {
        if self.armed {
            let outcome = Outcome::Failed {
                reason: "search worker was dropped before the job finished".to_string(),
            };
            finalize(&self.state, outcome, &self.event_tx);
        }
    }
}

/// Record the terminal state and announce it
fn finalize(state: &SharedState, outcome: Outcome, event_tx: &broadcast::Sender<Event>) {
    let terminal = outcome.state();

    let event = {
        let mut guard = lock(state);
        let status = &mut guard.status;
        status.state = terminal;
        status.finished_at = Some(Utc::now());
        match outcome {
            Outcome::Found { password, artifact } => {
                status.found_password = Some(password);
                status.artifact_path = artifact;
            }
            Outcome::Failed { reason } => {
                error!(attempts = status.attempts, error = %reason, "search failed");
                status.error = Some(reason);
            }
            Outcome::Exhausted | Outcome::Cancelled => {}
        }

        Event::SearchFinished {
            state: terminal,
            attempts: status.attempts,
            found_password: status.found_password.clone(),
            artifact_path: status.artifact_path.clone(),
        }
    };

    if let Event::SearchFinished {
        state,
        attempts,
        artifact_path,
        ..
    } = &event
        && *state != JobState::Failed
    {
        info!(?state, attempts, ?artifact_path, "search finished");
    }

    event_tx.send(event).ok();
}

/// Enumerate the keyspace until a match, exhaustion or a stop request
async fn run_search(
    state: SharedState,
    job: Arc<JobConfig>,
    readers: Arc<[Arc<dyn ArchiveReader>]>,
) -> Result<Outcome> {
    let verifier = Arc::new(Verifier::for_job(&job, &readers)?);
    let keyspace = Keyspace::new(&job.charset, job.password_length);

    for candidate in keyspace.candidates() {
        {
            let mut guard = lock(&state);
            if guard.cancel_requested {
                debug!(attempts = guard.status.attempts, "stop requested");
                return Ok(Outcome::Cancelled);
            }
            guard.status.attempts += 1;
            guard.status.current_candidate.clone_from(&candidate);
        }

        if check_candidate(&verifier, &candidate).await? {
            let artifact = match verifier.as_ref() {
                Verifier::Archive(_) => recover_artifact(verifier.clone(), &job, &candidate).await,
                _ => None,
            };
            return Ok(Outcome::Found {
                password: candidate,
                artifact,
            });
        }

        trace!(candidate = %candidate, "no match");

        if !job.delay.is_zero() {
            tokio::time::sleep(job.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    Ok(Outcome::Exhausted)
}

/// Verify one candidate, off the async workers when verification does file I/O
async fn check_candidate(verifier: &Arc<Verifier>, candidate: &str) -> Result<bool> {
    if !verifier.is_blocking() {
        return verifier.check(candidate);
    }

    let verifier = verifier.clone();
    let candidate = candidate.to_string();
    tokio::task::spawn_blocking(move || verifier.check(&candidate))
        .await
        .map_err(|e| Error::Runtime(format!("verification task failed: {}", e)))?
}

/// Write the unprotected copy after an archive match
///
/// Any failure is logged and yields `None`; the found password stands.
async fn recover_artifact(
    verifier: Arc<Verifier>,
    job: &JobConfig,
    password: &str,
) -> Option<PathBuf> {
    let output_stem = match &job.output_path {
        Some(stem) => stem.clone(),
        None => default_output_stem(job.archive_path.as_deref()?),
    };
    let password = password.to_string();

    let result = tokio::task::spawn_blocking(move || -> Result<PathBuf> {
        let Verifier::Archive(archive) = verifier.as_ref() else {
            return Err(Error::Other("verifier is not in archive mode".into()));
        };
        // Ask the chain again which provider accepts the password
        let reader = archive.matching_reader(&password)?.ok_or_else(|| {
            Error::Other("no provider accepts the password on recovery".into())
        })?;
        recover(reader.as_ref(), archive.archive(), &password, &output_stem)
    })
    .await;

    match result {
        Ok(Ok(artifact)) => Some(artifact),
        Ok(Err(e)) => {
            warn!(error = %e, "password found but artifact could not be written");
            None
        }
        Err(e) => {
            warn!(error = %e, "recovery task failed");
            None
        }
    }
}

/// `<dir>/<archive stem>_unlocked` next to the protected archive
fn default_output_stem(archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    archive.with_file_name(format!("{}_unlocked", stem))
}
