//! Per-talk outcomes and run totals.

use std::fmt;

use crate::schema::ResolveError;
use crate::selector::SelectError;

/// Why a talk failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The schedule has no such talk.
    NotFound,
    /// Malformed id or unexpected detail document.
    ParseError,
    /// Transport failure while resolving or streaming the video.
    NetworkError,
    /// No media variant in the requested format.
    NoMatchingAsset,
    /// Local filesystem error (creating directories, writing metadata).
    Filesystem,
}

impl FailureKind {
    /// Short label used in logs and summaries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::ParseError => "parse error",
            Self::NetworkError => "network error",
            Self::NoMatchingAsset => "no matching asset",
            Self::Filesystem => "filesystem error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ResolveError> for FailureKind {
    fn from(error: &ResolveError) -> Self {
        match error {
            ResolveError::NotFound { .. } => Self::NotFound,
            ResolveError::Parse { .. } => Self::ParseError,
            ResolveError::Network { .. } => Self::NetworkError,
        }
    }
}

impl From<&SelectError> for FailureKind {
    fn from(error: &SelectError) -> Self {
        match error {
            SelectError::NoMatchingAsset { .. } => Self::NoMatchingAsset,
        }
    }
}

/// Outcome of one talk. A reason exists exactly when the talk failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Video, attachments and metadata were written.
    Downloaded,
    /// Video and metadata were already on disk.
    Skipped,
    /// The talk could not be downloaded.
    Failed {
        /// Error category.
        kind: FailureKind,
        /// Human-readable reason, naming the talk id.
        reason: String,
    },
}

/// A non-fatal attachment failure inside an otherwise downloaded talk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFailure {
    /// Local filename the attachment would have had.
    pub filename: String,
    /// What went wrong.
    pub reason: String,
}

/// Result for one requested talk id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    /// The talk id as requested.
    pub talk_id: String,
    /// Final status.
    pub status: DownloadStatus,
    /// Attachment failures (only ever set for downloaded talks).
    pub attachment_failures: Vec<AttachmentFailure>,
}

impl DownloadResult {
    /// A downloaded talk with the given attachment failures.
    #[must_use]
    pub fn downloaded(talk_id: &str, attachment_failures: Vec<AttachmentFailure>) -> Self {
        Self {
            talk_id: talk_id.to_string(),
            status: DownloadStatus::Downloaded,
            attachment_failures,
        }
    }

    /// A talk that was already complete on disk.
    #[must_use]
    pub fn skipped(talk_id: &str) -> Self {
        Self {
            talk_id: talk_id.to_string(),
            status: DownloadStatus::Skipped,
            attachment_failures: Vec::new(),
        }
    }

    /// A failed talk.
    #[must_use]
    pub fn failed(talk_id: &str, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            talk_id: talk_id.to_string(),
            status: DownloadStatus::Failed {
                kind,
                reason: reason.into(),
            },
            attachment_failures: Vec::new(),
        }
    }

    /// True if the talk failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.status, DownloadStatus::Failed { .. })
    }

    /// Failure reason, present iff the talk failed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match &self.status {
            DownloadStatus::Failed { reason, .. } => Some(reason),
            DownloadStatus::Downloaded | DownloadStatus::Skipped => None,
        }
    }

    /// Failure kind, present iff the talk failed.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match &self.status {
            DownloadStatus::Failed { kind, .. } => Some(*kind),
            DownloadStatus::Downloaded | DownloadStatus::Skipped => None,
        }
    }
}

/// Counts over a run's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Talks downloaded this run.
    pub downloaded: usize,
    /// Talks already complete on disk.
    pub skipped: usize,
    /// Talks that failed.
    pub failed: usize,
    /// Attachment failures across downloaded talks.
    pub attachment_failures: usize,
}

impl RunSummary {
    /// Tallies `results`.
    #[must_use]
    pub fn from_results(results: &[DownloadResult]) -> Self {
        results.iter().fold(Self::default(), |mut summary, result| {
            match result.status {
                DownloadStatus::Downloaded => summary.downloaded += 1,
                DownloadStatus::Skipped => summary.skipped += 1,
                DownloadStatus::Failed { .. } => summary.failed += 1,
            }
            summary.attachment_failures += result.attachment_failures.len();
            summary
        })
    }

    /// Talks that ended Downloaded or Skipped.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.downloaded + self.skipped
    }

    /// All talks.
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded() + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} downloaded, {} skipped, {} failed",
            self.downloaded, self.skipped, self.failed
        )?;
        if self.attachment_failures > 0 {
            write!(f, " ({} attachment(s) failed)", self.attachment_failures)?;
        }
        Ok(())
    }
}
