//! Core domain types for a capture run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CaptureStatus
// ---------------------------------------------------------------------------

/// Outcome of capturing a single manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStatus {
    /// The file was read in full.
    Captured,
    /// The path does not exist or is not a regular file.
    NotFound,
    /// The path is a regular file but reading it failed.
    ReadError,
}

impl CaptureStatus {
    /// Whether this outcome counts towards the missing tally.
    pub fn is_miss(self) -> bool {
        !matches!(self, Self::Captured)
    }
}

impl std::fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Captured => "captured",
            Self::NotFound => "not_found",
            Self::ReadError => "read_error",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// CaptureRecord
// ---------------------------------------------------------------------------

/// What was read (or not) for one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordBody {
    /// Full text of the file, verbatim.
    Contents(String),
    /// Path missing or not a regular file.
    NotFound,
    /// Reading failed; carries the error message.
    ReadError(String),
}

/// Per-entry result, built during iteration and dropped once written.
#[derive(Debug, Clone)]
pub struct CaptureRecord {
    /// Path exactly as listed in the manifest.
    pub relative_path: String,
    /// `base_dir` joined with `relative_path`.
    pub absolute_path: PathBuf,
    /// Last path segment of `absolute_path`.
    pub file_name: String,
    pub body: RecordBody,
}

impl CaptureRecord {
    pub fn status(&self) -> CaptureStatus {
        match self.body {
            RecordBody::Contents(_) => CaptureStatus::Captured,
            RecordBody::NotFound => CaptureStatus::NotFound,
            RecordBody::ReadError(_) => CaptureStatus::ReadError,
        }
    }
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Content-free trace of one entry, kept for the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySummary {
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub status: CaptureStatus,
    /// Size of the captured text in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<usize>,
    /// SHA-256 of the captured text (lowercase hex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Error message for `read_error` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole capture run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Report title written in the header.
    pub title: String,
    /// Timestamp written in the `Generated:` line.
    pub generated_at: String,
    pub base_dir: PathBuf,
    pub output_path: PathBuf,
    /// Number of manifest entries.
    pub requested: usize,
    pub captured: usize,
    pub missing: usize,
    /// One entry per manifest entry, in manifest order.
    pub entries: Vec<EntrySummary>,
}

impl CaptureSummary {
    /// True when every manifest entry was captured.
    pub fn is_complete(&self) -> bool {
        self.missing == 0
    }
}
