use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Classified failure category for a single extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractErrorKind {
    /// File missing or unreadable at extraction time.
    NotFound,
    /// File opened but its content is malformed.
    Corrupted,
    /// Document requires a password to read.
    PasswordProtected,
    /// Format or encoding the backend cannot handle.
    Unsupported,
    /// Extraction exceeded the per-item deadline.
    Timeout,
    /// Batch was cancelled before this file was processed.
    Cancelled,
    /// Anything else, including extractor panics.
    Unknown,
}

impl fmt::Display for ExtractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::Corrupted => "corrupted",
            Self::PasswordProtected => "password protected",
            Self::Unsupported => "unsupported",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A classified, human-readable extraction failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}: {message}")]
pub struct ExtractError {
    pub kind: ExtractErrorKind,
    pub message: String,
}

impl ExtractError {
    pub fn new(kind: ExtractErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Document metadata reported alongside successfully extracted text.
///
/// Every field is best-effort; documents routinely carry none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub created: Option<String>,
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide the low-level text extraction step; scheduling,
/// timeouts, and failure isolation live in [`ExtractionPool`](crate::pool).
///
/// Every failure mode must be classified into an [`ExtractError`]; callers
/// rely on errors never escaping this boundary unclassified. Calls must be
/// independent — no shared mutable state between concurrent invocations —
/// since the pool invokes one instance from many workers at once.
pub trait TextExtractor: Send + Sync {
    /// Extract the full text content of one file.
    fn extract_text(&self, path: &Path) -> Result<String, ExtractError>;

    /// Read document metadata (title, author, creation date).
    ///
    /// Best-effort: a metadata read failure must not fail the file, so this
    /// returns whatever was readable. The default reports nothing, for
    /// backends without a metadata source.
    fn metadata(&self, _path: &Path) -> DocumentMetadata {
        DocumentMetadata::default()
    }
}
