//! Bounded worker pool for per-file text extraction.
//!
//! Architecture: N worker tasks drawing from a shared job queue. The blocking
//! extractor call runs on the blocking thread pool under a per-item deadline,
//! so one slow or hung file never stalls the rest of the batch. Every
//! submitted job produces exactly one outcome on its oneshot channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::extractor::{ExtractError, ExtractErrorKind, TextExtractor};
use crate::text::clean_text;
use crate::{ExtractionOutcome, ProgressEvent, ProgressFn, SourceFile};

/// An extraction job submitted to the pool.
pub struct ExtractJob {
    pub file: SourceFile,
    pub result_tx: oneshot::Sender<ExtractionOutcome>,
    pub index: usize,
    pub total: usize,
    /// Progress callback for this job (emits Extracting and Outcome events).
    pub progress: Arc<ProgressFn>,
}

/// Per-item execution policy.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Deadline for one extraction. On expiry the outcome is a `Timeout`
    /// failure and the worker moves on to the next file.
    pub per_item_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            per_item_timeout: Duration::from_secs(30),
        }
    }
}

/// A pool of worker tasks that process extraction jobs.
///
/// Submit jobs via [`submit()`](ExtractionPool::submit), receive outcomes via
/// the oneshot receiver supplied with each job. At most `num_workers`
/// extractions are in flight at once.
pub struct ExtractionPool {
    job_tx: async_channel::Sender<ExtractJob>,
    pool_handle: JoinHandle<()>,
}

impl ExtractionPool {
    /// Create a new pool with `num_workers` worker tasks.
    ///
    /// Workers exit when the job channel closes; after cancellation they keep
    /// draining the queue, converting each remaining job into a `Cancelled`
    /// failure so no file is left unaccounted for.
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        options: PoolOptions,
        cancel: CancellationToken,
        num_workers: usize,
    ) -> Self {
        let (job_tx, job_rx) = async_channel::unbounded::<ExtractJob>();

        let pool_handle = tokio::spawn(async move {
            let mut worker_handles = Vec::with_capacity(num_workers.max(1));

            for _ in 0..num_workers.max(1) {
                worker_handles.push(tokio::spawn(worker_loop(
                    job_rx.clone(),
                    Arc::clone(&extractor),
                    options.per_item_timeout,
                    cancel.clone(),
                )));
            }

            // Drop our clone so workers are the last holders
            drop(job_rx);

            // Wait for workers to finish (they exit when job_tx closes)
            for h in worker_handles {
                let _ = h.await;
            }
        });

        Self {
            job_tx,
            pool_handle,
        }
    }

    /// Get a cloneable sender for submitting jobs from multiple tasks.
    pub fn sender(&self) -> async_channel::Sender<ExtractJob> {
        self.job_tx.clone()
    }

    /// Submit a job to the pool.
    pub async fn submit(&self, job: ExtractJob) {
        let _ = self.job_tx.send(job).await;
    }

    /// Close the pool and wait for all workers to finish.
    pub async fn shutdown(self) {
        self.job_tx.close();
        let _ = self.pool_handle.await;
    }
}

// ── Worker ──────────────────────────────────────────────────────────────

async fn worker_loop(
    job_rx: async_channel::Receiver<ExtractJob>,
    extractor: Arc<dyn TextExtractor>,
    per_item_timeout: Duration,
    cancel: CancellationToken,
) {
    while let Ok(job) = job_rx.recv().await {
        let ExtractJob {
            file,
            result_tx,
            index,
            total,
            progress,
        } = job;
        let path = file.path;

        // Cancelled jobs still surface as accounted-for failures
        if cancel.is_cancelled() {
            tracing::debug!(path = %path.display(), "skipping: cancelled");
            let outcome = ExtractionOutcome::Failure {
                path,
                error: ExtractError::new(
                    ExtractErrorKind::Cancelled,
                    "batch cancelled before extraction started",
                ),
            };
            deliver(outcome, result_tx, index, total, &progress);
            continue;
        }

        progress(ProgressEvent::Extracting {
            index,
            total,
            path: path.clone(),
        });

        let outcome = extract_one(Arc::clone(&extractor), path, per_item_timeout).await;
        deliver(outcome, result_tx, index, total, &progress);
    }
}

/// Run one extraction under the per-item deadline, converting every failure
/// mode (classified error, panic, timeout) into an outcome.
///
/// Successful text is normalized here, before the outcome is observable, so
/// progress subscribers and the final report see identical content.
async fn extract_one(
    extractor: Arc<dyn TextExtractor>,
    path: std::path::PathBuf,
    per_item_timeout: Duration,
) -> ExtractionOutcome {
    let task_path = path.clone();
    let handle = tokio::task::spawn_blocking(move || {
        extractor
            .extract_text(&task_path)
            .map(|text| (text, extractor.metadata(&task_path)))
    });

    match tokio::time::timeout(per_item_timeout, handle).await {
        Ok(Ok(Ok((text, metadata)))) => ExtractionOutcome::Success {
            path,
            text: clean_text(&text),
            metadata,
        },
        Ok(Ok(Err(error))) => ExtractionOutcome::Failure { path, error },
        Ok(Err(join_err)) => {
            // Extractor violated its no-panic contract; keep the batch alive.
            tracing::warn!(path = %path.display(), error = %join_err, "extractor task failed");
            let message = if join_err.is_panic() {
                format!("extractor panicked: {join_err}")
            } else {
                format!("extraction task aborted: {join_err}")
            };
            ExtractionOutcome::Failure {
                path,
                error: ExtractError::new(ExtractErrorKind::Unknown, message),
            }
        }
        Err(_) => {
            // The blocking call cannot be interrupted; dropping the handle
            // detaches it and frees this worker for the next file.
            tracing::warn!(
                path = %path.display(),
                timeout = ?per_item_timeout,
                "extraction timed out"
            );
            ExtractionOutcome::Failure {
                path,
                error: ExtractError::new(
                    ExtractErrorKind::Timeout,
                    format!("extraction exceeded {per_item_timeout:?}"),
                ),
            }
        }
    }
}

/// Emit the Outcome event and send the result on the oneshot channel.
fn deliver(
    outcome: ExtractionOutcome,
    result_tx: oneshot::Sender<ExtractionOutcome>,
    index: usize,
    total: usize,
    progress: &Arc<ProgressFn>,
) {
    match &outcome {
        ExtractionOutcome::Success { path, text, .. } => {
            tracing::info!(path = %path.display(), chars = text.len(), "extracted");
        }
        ExtractionOutcome::Failure { path, error } => {
            tracing::info!(path = %path.display(), kind = %error.kind, "extraction failed");
        }
    }

    progress(ProgressEvent::Outcome {
        index,
        total,
        outcome: Box::new(outcome.clone()),
    });

    let _ = result_tx.send(outcome);
}
