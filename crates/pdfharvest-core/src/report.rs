use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::ExtractionOutcome;

/// Internal invariant violation in the aggregation step.
///
/// This is a programming defect in the pipeline, not a recoverable runtime
/// condition; it propagates to the caller instead of being folded into the
/// report.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("duplicate outcome recorded for {0}")]
    DuplicateOutcome(PathBuf),
    #[error("outcome recorded after finalize for {0}")]
    RecordAfterFinalize(PathBuf),
    #[error("outcome count mismatch at finalize: expected {expected}, recorded {recorded}")]
    CountMismatch { expected: usize, recorded: usize },
}

/// Aggregate result of one batch run.
///
/// Keyed by path, so the report is deterministic regardless of the order in
/// which workers completed. Invariant: `succeeded + failed == total` and
/// every enumerated file appears exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub outcomes: BTreeMap<PathBuf, ExtractionOutcome>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn outcome(&self, path: impl AsRef<std::path::Path>) -> Option<&ExtractionOutcome> {
        self.outcomes.get(path.as_ref())
    }
}

/// Fan-in side of the pipeline: collects streamed outcomes into a
/// [`BatchReport`].
///
/// The aggregator is the single owner of the report under construction;
/// workers never touch it directly (they hand outcomes over oneshot
/// channels), so no synchronization is needed here.
pub struct BatchAggregator {
    expected: usize,
    outcomes: BTreeMap<PathBuf, ExtractionOutcome>,
    finalized: bool,
}

impl BatchAggregator {
    /// Create an aggregator expecting exactly `expected` outcomes.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            outcomes: BTreeMap::new(),
            finalized: false,
        }
    }

    /// Register one outcome, keyed by path.
    ///
    /// A second outcome for the same path, or a record after
    /// [`finalize`](Self::finalize), is a [`ConsistencyError`].
    pub fn record(&mut self, outcome: ExtractionOutcome) -> Result<(), ConsistencyError> {
        let path = outcome.path().to_path_buf();
        if self.finalized {
            return Err(ConsistencyError::RecordAfterFinalize(path));
        }
        match self.outcomes.entry(path) {
            Entry::Occupied(occupied) => {
                Err(ConsistencyError::DuplicateOutcome(occupied.key().clone()))
            }
            Entry::Vacant(vacant) => {
                vacant.insert(outcome);
                Ok(())
            }
        }
    }

    /// Compute summary counts and return the immutable report.
    ///
    /// Fails only on a consistency violation (recorded count differs from the
    /// expected count). Idempotent: a second call without intervening records
    /// returns an equal report.
    pub fn finalize(&mut self) -> Result<BatchReport, ConsistencyError> {
        if self.outcomes.len() != self.expected {
            return Err(ConsistencyError::CountMismatch {
                expected: self.expected,
                recorded: self.outcomes.len(),
            });
        }
        self.finalized = true;

        let succeeded = self.outcomes.values().filter(|o| o.is_success()).count();
        Ok(BatchReport {
            outcomes: self.outcomes.clone(),
            total: self.expected,
            succeeded,
            failed: self.expected - succeeded,
        })
    }
}
