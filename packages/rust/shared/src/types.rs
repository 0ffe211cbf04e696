//! Core domain types for the linkdex ingestion pipeline.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// BookmarkNode
// ---------------------------------------------------------------------------

/// A node in a parsed bookmark export: a folder of further nodes, or a
/// single bookmark carrying a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookmarkNode {
    /// A folder with an ordered sequence of children. May be empty.
    Folder {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default)]
        children: Vec<BookmarkNode>,
    },
    /// A leaf bookmark pointing at a web resource.
    Bookmark {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        url: String,
    },
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Per-URL result status for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Fail,
    Skipped,
}

impl OutcomeStatus {
    /// Status as it appears in the run report.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Success => "success",
            OutcomeStatus::Fail => "fail",
            OutcomeStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of processing one URL. Exactly one is produced per dispatched
/// URL per run, whatever happened to the fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The bookmark URL this outcome belongs to.
    pub url: String,
    /// success, fail, or skipped.
    pub status: OutcomeStatus,
    /// Failure reason, when status is fail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Outcome {
    /// The URL was fetched, transformed, and submitted to the sink.
    pub fn success(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: OutcomeStatus::Success,
            reason: None,
        }
    }

    /// The URL could not be processed; `reason` is operator-readable.
    pub fn fail(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: OutcomeStatus::Fail,
            reason: Some(reason.into()),
        }
    }

    /// The ledger already held this URL's hash; nothing was fetched.
    pub fn skipped(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: OutcomeStatus::Skipped,
            reason: None,
        }
    }
}

// ---------------------------------------------------------------------------
// IngestDocument
// ---------------------------------------------------------------------------

/// The document handed to the index sink for one successfully fetched URL.
/// Transient: ownership passes to the sink on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestDocument {
    /// Original bookmark URL.
    pub url: String,
    /// Normalized plain-text page content.
    pub content: String,
    /// Host component of the URL (scheme and path stripped).
    pub host: String,
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// SHA-256 hex digest of a URL string. The dedup key: same URL, same hash.
pub fn content_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Extract the host component of a URL, or an empty string if the URL has
/// no parseable host.
pub fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}
