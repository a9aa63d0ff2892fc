use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub mod batch;
pub mod discover;
pub mod extractor;
pub mod pool;
pub mod report;
pub mod text;

// Re-export for convenience
pub use batch::{BatchOptions, extract_directory};
pub use discover::{DiscoveryError, discover_pdfs};
pub use extractor::{DocumentMetadata, ExtractError, ExtractErrorKind, TextExtractor};
pub use pool::{ExtractJob, ExtractionPool, PoolOptions};
pub use report::{BatchAggregator, BatchReport, ConsistencyError};

/// One input document identified by discovery.
///
/// Existence and readability are not verified at enumeration time; a file
/// that vanishes before its worker picks it up surfaces as a `Failure`
/// outcome, not a pipeline error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// The per-file result of extraction.
///
/// Produced exactly once per [`SourceFile`], either by the extractor or by
/// the pool itself when the extractor cannot run (panic, timeout,
/// cancellation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Success {
        path: PathBuf,
        text: String,
        metadata: DocumentMetadata,
    },
    Failure {
        path: PathBuf,
        error: ExtractError,
    },
}

impl ExtractionOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Success { path, .. } | Self::Failure { path, .. } => path,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The error kind for failures, `None` for successes.
    pub fn error_kind(&self) -> Option<ExtractErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error.kind),
        }
    }
}

/// Progress events emitted as the pool works through a batch.
///
/// The pipeline has no global logger dependency; the surrounding CLI (or any
/// other caller) subscribes by passing a callback to
/// [`extract_directory`](batch::extract_directory).
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Extracting {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    Outcome {
        index: usize,
        total: usize,
        outcome: Box<ExtractionOutcome>,
    },
}

/// Progress callback shared across workers.
pub type ProgressFn = dyn Fn(ProgressEvent) + Send + Sync;

/// Run-fatal errors from the batch pipeline.
///
/// Per-file extraction failures are never fatal; they land in the
/// [`BatchReport`] as `Failure` outcomes.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}
