//! Core types: job configuration, job state, status snapshots and events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use utoipa::ToSchema;

/// How a candidate is checked against the target
///
/// Selected once per job; the worker never re-dispatches on it per candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Candidate equals the target verbatim
    #[default]
    Plain,
    /// MD5 digest of the candidate equals the MD5 digest of the target
    Md5,
    /// SHA-256 digest of the candidate equals the SHA-256 digest of the target
    Sha256,
    /// Candidate opens the configured protected archive
    #[serde(alias = "zip")]
    Archive,
}

impl Method {
    /// Lowercase name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Plain => "plain",
            Method::Md5 => "md5",
            Method::Sha256 => "sha256",
            Method::Archive => "archive",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = crate::error::Error;

    /// Case-insensitive; `zip` is accepted for `archive`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Method::Plain),
            "md5" => Ok(Method::Md5),
            "sha256" => Ok(Method::Sha256),
            "archive" | "zip" => Ok(Method::Archive),
            _ => Err(crate::error::Error::Validation {
                message: "method must be one of: plain, md5, sha256, archive".to_string(),
                field: Some("method".to_string()),
            }),
        }
    }
}

/// Archive container formats understood by the built-in readers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveType {
    /// ZIP archive (.zip), AES or legacy ZipCrypto protected
    Zip,
    /// 7-Zip archive (.7z), AES-256 protected
    SevenZip,
}

impl ArchiveType {
    /// File extension (without the dot) used for artifacts of this format
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveType::Zip => "zip",
            ArchiveType::SevenZip => "7z",
        }
    }
}

/// Parameters of one search job
///
/// Copied into the controller when the job starts and never mutated
/// afterwards. The caller is expected to have validated bounds; the
/// controller only checks that archive mode carries an archive path.
#[derive(Clone, Debug, PartialEq)]
pub struct JobConfig {
    /// Value the candidates are compared against (ignored in archive mode)
    pub target: String,
    /// Length of every candidate
    pub password_length: usize,
    /// Pause after each non-matching attempt
    pub delay: Duration,
    /// Verification method
    pub method: Method,
    /// Distinct symbols candidates are drawn from, in enumeration order
    pub charset: String,
    /// Protected archive to test candidates against (archive mode)
    pub archive_path: Option<PathBuf>,
    /// Stem of the unprotected artifact written after a match (archive mode).
    /// The format extension is appended.
    pub output_path: Option<PathBuf>,
}

impl JobConfig {
    /// Plain-equality job
    pub fn plain(target: impl Into<String>, charset: impl Into<String>, length: usize) -> Self {
        Self {
            target: target.into(),
            password_length: length,
            delay: Duration::ZERO,
            method: Method::Plain,
            charset: charset.into(),
            archive_path: None,
            output_path: None,
        }
    }

    /// Digest job (`Method::Md5` or `Method::Sha256`)
    pub fn digest(
        method: Method,
        target: impl Into<String>,
        charset: impl Into<String>,
        length: usize,
    ) -> Self {
        Self {
            method,
            ..Self::plain(target, charset, length)
        }
    }

    /// Archive-password job
    pub fn archive(
        archive_path: impl Into<PathBuf>,
        output_path: Option<PathBuf>,
        charset: impl Into<String>,
        length: usize,
    ) -> Self {
        Self {
            method: Method::Archive,
            archive_path: Some(archive_path.into()),
            output_path,
            ..Self::plain(String::new(), charset, length)
        }
    }

    /// Set the per-attempt delay
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Lifecycle state of the most recent job
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// No job has been started yet
    #[default]
    Idle,
    /// The worker is enumerating candidates
    Running,
    /// A candidate matched
    Found,
    /// Every candidate was tried without a match
    Exhausted,
    /// `stop()` was observed before a match
    Cancelled,
    /// The search loop hit an infrastructure error
    Failed,
}

impl JobState {
    /// Whether this is one of the four terminal states
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Found | JobState::Exhausted | JobState::Cancelled | JobState::Failed
        )
    }
}

/// Independent copy of the job status, safe to hold across polls
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusSnapshot {
    /// Lifecycle state
    pub state: JobState,
    /// Whether the worker is still running
    pub running: bool,
    /// Candidates tried so far
    pub attempts: u64,
    /// Most recent candidate handed to verification
    pub current_candidate: String,
    /// When the job started
    pub started_at: Option<DateTime<Utc>>,
    /// Seconds since start; frozen once the job is complete
    pub elapsed_seconds: f64,
    /// `attempts / elapsed_seconds`, 0 when nothing has elapsed
    pub rate_per_second: f64,
    /// Matching candidate, if found
    pub found_password: Option<String>,
    /// Whether the job reached a terminal state
    pub completed: bool,
    /// Whether the job ended with a match
    pub success: bool,
    /// Unprotected archive written after an archive-mode match
    #[schema(value_type = Option<String>)]
    pub artifact_path: Option<PathBuf>,
    /// Failure reason when `state` is `failed`
    pub error: Option<String>,
}

/// Event emitted during the job lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A job was accepted and its worker spawned
    SearchStarted {
        /// Verification method
        method: Method,
        /// Number of candidates in the search space (None if it overflows u64)
        space_size: Option<u64>,
    },

    /// The job reached a terminal state
    SearchFinished {
        /// Terminal state
        state: JobState,
        /// Candidates tried
        attempts: u64,
        /// Matching candidate, if found
        found_password: Option<String>,
        /// Recovered artifact, if any
        #[schema(value_type = Option<String>)]
        artifact_path: Option<PathBuf>,
    },
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_accepts_zip_alias() {
        let method: Method = serde_json::from_str("\"zip\"").unwrap();
        assert_eq!(method, Method::Archive);
        assert_eq!(serde_json::to_string(&method).unwrap(), "\"archive\"");
    }

    #[test]
    fn method_rejects_unknown_names() {
        assert!(serde_json::from_str::<Method>("\"sha1\"").is_err());
        assert!("sha1".parse::<Method>().is_err());
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("SHA256".parse::<Method>().unwrap(), Method::Sha256);
        assert_eq!(" Zip ".parse::<Method>().unwrap(), Method::Archive);
        assert_eq!("plain".parse::<Method>().unwrap(), Method::Plain);
    }

    #[test]
    fn terminal_states() {
        assert!(!JobState::Idle.is_terminal());
        assert!(!JobState::Running.is_terminal());
        for state in [
            JobState::Found,
            JobState::Exhausted,
            JobState::Cancelled,
            JobState::Failed,
        ] {
            assert!(state.is_terminal(), "{state:?}");
        }
    }

    #[test]
    fn archive_job_config() {
        let config = JobConfig::archive("locked.zip", Some("out/unlocked".into()), "0123", 2)
            .with_delay(Duration::from_millis(5));
        assert_eq!(config.method, Method::Archive);
        assert_eq!(config.archive_path, Some(PathBuf::from("locked.zip")));
        assert_eq!(config.delay, Duration::from_millis(5));
        assert!(config.target.is_empty());
    }

    #[test]
    fn event_is_tagged() {
        let event = Event::SearchStarted {
            method: Method::Sha256,
            space_size: Some(10_000),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "search_started");
        assert_eq!(json["method"], "sha256");
    }
}
