use std::path::{Path, PathBuf};

/// Result of one download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The body was written completely to `path`
    Saved {
        /// Staging file holding the payload
        path: PathBuf,
        /// Number of body bytes written
        bytes: u64,
    },

    /// The download failed; nothing usable was staged
    Failed {
        /// Human-readable error description
        error: String,
    },
}

/// Immutable record of a fetch attempt for one admitted URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Admission index of the URL
    pub index: usize,

    /// The URL that was fetched
    pub source_url: String,

    /// What happened
    pub status: OutcomeStatus,
}

impl FetchOutcome {
    /// Creates a successful outcome
    pub fn saved(index: usize, source_url: impl Into<String>, path: PathBuf, bytes: u64) -> Self {
        Self {
            index,
            source_url: source_url.into(),
            status: OutcomeStatus::Saved { path, bytes },
        }
    }

    /// Creates a failed outcome
    pub fn failed(index: usize, source_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            index,
            source_url: source_url.into(),
            status: OutcomeStatus::Failed {
                error: error.into(),
            },
        }
    }

    /// Returns true if the payload was staged
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Saved { .. })
    }

    /// Error detail, present iff the fetch failed
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::Failed { error } => Some(error),
            OutcomeStatus::Saved { .. } => None,
        }
    }

    /// Staging location, present iff the fetch succeeded
    pub fn storage_path(&self) -> Option<&Path> {
        match &self.status {
            OutcomeStatus::Saved { path, .. } => Some(path),
            OutcomeStatus::Failed { .. } => None,
        }
    }
}
