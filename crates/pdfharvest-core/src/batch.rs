//! Batch orchestration: discovery → pool fan-out → report fan-in.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::discover::discover_pdfs;
use crate::extractor::{ExtractError, ExtractErrorKind, TextExtractor};
use crate::pool::{ExtractJob, ExtractionPool, PoolOptions};
use crate::report::{BatchAggregator, BatchReport};
use crate::{BatchError, ExtractionOutcome, ProgressEvent};

/// Configuration consumed by [`extract_directory`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of concurrent extractions.
    pub max_workers: usize,
    /// Deadline for one file's extraction.
    pub per_item_timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            per_item_timeout: Duration::from_secs(30),
        }
    }
}

/// Extract text from every PDF under `dir`.
///
/// Creates an internal [`ExtractionPool`], submits every discovered file,
/// and collects outcomes into a [`BatchReport`]. Per-file failures never
/// abort the batch; only a discovery failure (bad input directory) or an
/// internal consistency violation is an error. Progress events stream to the
/// callback as workers complete. Cancellation is supported: remaining files
/// are reported as `Cancelled` failures, never dropped.
pub async fn extract_directory(
    dir: &Path,
    extractor: Arc<dyn TextExtractor>,
    options: BatchOptions,
    progress: impl Fn(ProgressEvent) + Send + Sync + 'static,
    cancel: CancellationToken,
) -> Result<BatchReport, BatchError> {
    let files = discover_pdfs(dir)?;
    let total = files.len();

    let mut aggregator = BatchAggregator::new(total);
    if total == 0 {
        return Ok(aggregator.finalize()?);
    }

    let progress = Arc::new(progress);
    let pool = ExtractionPool::new(
        extractor,
        PoolOptions {
            per_item_timeout: options.per_item_timeout,
        },
        cancel,
        options.max_workers.max(1),
    );

    // Submit all files and collect oneshot receivers
    let mut receivers = Vec::with_capacity(total);
    for (index, file) in files.into_iter().enumerate() {
        let (result_tx, result_rx) = tokio::sync::oneshot::channel();
        let path = file.path.clone();
        pool.submit(ExtractJob {
            file,
            result_tx,
            index,
            total,
            progress: progress.clone(),
        })
        .await;
        receivers.push((path, result_rx));
    }

    // Collect outcomes as workers complete
    for (path, rx) in receivers {
        let outcome = match rx.await {
            Ok(outcome) => outcome,
            // A dropped sender means the worker never produced an outcome;
            // the file is still accounted for.
            Err(_) => ExtractionOutcome::Failure {
                path,
                error: ExtractError::new(
                    ExtractErrorKind::Cancelled,
                    "worker abandoned before producing an outcome",
                ),
            },
        };
        aggregator.record(outcome)?;
    }

    pool.shutdown().await;

    Ok(aggregator.finalize()?)
}
