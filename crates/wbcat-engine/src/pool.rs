//! Bounded pool of augmentation workers
//!
//! Provides concurrent facet lookups with ordered merge:
//! - At most `max_in_flight` worker tasks pull jobs from a shared queue
//! - Every report is stamped with the slot index it fills
//! - Only the caller's task owns the result table
//! - A cancellation future aborts the remaining work

use crate::augment::{Augmentation, FacetAugmenter};
use crate::error::EngineError;
use crate::traversal::AugmentJob;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use wbcat_source::{FacetFetcher, FetchError};

/// Job queued for a worker
#[derive(Debug, Clone)]
struct QueuedJob {
    slot: usize,
    job: AugmentJob,
}

/// Report sent back by a worker
#[derive(Debug)]
struct WorkerReport {
    slot: usize,
    leaf_id: i64,
    result: Result<Augmentation, FetchError>,
}

/// Pool statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Worker tasks spawned
    pub workers: usize,
    /// Jobs queued
    pub dispatched: usize,
    /// Jobs whose report reached the result table
    pub completed: usize,
    /// Highest number of lookups observed in flight at once
    pub peak_in_flight: usize,
}

/// Results of one pool run
#[derive(Debug, Default)]
pub struct PoolRun {
    /// Augmentations keyed by slot index
    pub results: BTreeMap<usize, Augmentation>,
    /// Statistics
    pub stats: PoolStats,
    /// Cancellation fired before every job reported
    pub cancelled: bool,
}

/// Bounded augmentation pool
#[derive(Debug, Clone)]
pub struct AugmentPool {
    max_in_flight: usize,
}

impl AugmentPool {
    /// Create pool allowing `max_in_flight` concurrent lookups
    ///
    /// # Errors
    /// Returns `EngineError::Config` if `max_in_flight` is zero.
    pub fn new(max_in_flight: usize) -> Result<Self, EngineError> {
        if max_in_flight == 0 {
            return Err(EngineError::Config(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_in_flight })
    }

    /// Run every job to completion, or until `cancel` resolves
    ///
    /// # Errors
    /// - `EngineError::Transport` on the first fatal fetch error; remaining
    ///   workers are aborted
    /// - `EngineError::Worker` if a worker stops without reporting
    pub async fn run<C>(
        &self,
        fetcher: Arc<dyn FacetFetcher>,
        augmenter: &FacetAugmenter,
        jobs: Vec<(usize, AugmentJob)>,
        cancel: C,
    ) -> Result<PoolRun, EngineError>
    where
        C: Future<Output = ()>,
    {
        let total = jobs.len();
        if total == 0 {
            return Ok(PoolRun::default());
        }

        let (job_tx, job_rx) = mpsc::channel(total);
        for (slot, job) in jobs {
            job_tx
                .send(QueuedJob { slot, job })
                .await
                .map_err(|_| EngineError::Worker("job queue closed".to_string()))?;
        }
        drop(job_tx);

        let queue = Arc::new(Mutex::new(job_rx));
        let (report_tx, mut report_rx) = mpsc::channel(total);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let workers = self.max_in_flight.min(total);
        let mut set = JoinSet::new();
        for worker in 0..workers {
            set.spawn(augment_task(
                worker,
                Arc::clone(&fetcher),
                augmenter.clone(),
                Arc::clone(&queue),
                report_tx.clone(),
                Arc::clone(&in_flight),
                Arc::clone(&peak),
            ));
        }
        drop(report_tx);
        tracing::debug!(workers, jobs = total, "augmentation pool started");

        let mut results = BTreeMap::new();
        let mut cancelled = false;
        let mut cancel = std::pin::pin!(cancel);

        while results.len() < total {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    tracing::warn!(
                        completed = results.len(),
                        pending = total - results.len(),
                        "run cancelled, aborting in-flight lookups"
                    );
                    cancelled = true;
                    break;
                }
                report = report_rx.recv() => match report {
                    Some(WorkerReport { slot, result: Ok(augmentation), .. }) => {
                        results.insert(slot, augmentation);
                    }
                    Some(WorkerReport { leaf_id, result: Err(source), .. }) => {
                        tracing::error!(leaf_id, error = %source, "fatal facet transport error");
                        set.shutdown().await;
                        return Err(EngineError::Transport { leaf_id, source });
                    }
                    None => return Err(worker_failure(&mut set).await),
                },
            }
        }

        set.shutdown().await;

        Ok(PoolRun {
            stats: PoolStats {
                workers,
                dispatched: total,
                completed: results.len(),
                peak_in_flight: peak.load(Ordering::Relaxed),
            },
            results,
            cancelled,
        })
    }
}

impl Default for AugmentPool {
    fn default() -> Self {
        Self { max_in_flight: 8 }
    }
}

/// Describe why the report channel closed early
async fn worker_failure(set: &mut JoinSet<()>) -> EngineError {
    while let Some(joined) = set.join_next().await {
        if let Err(err) = joined {
            if err.is_panic() {
                tracing::error!(error = %err, "augmentation worker panicked");
                return EngineError::Worker(format!("worker panicked: {err}"));
            }
        }
    }
    EngineError::Worker("workers exited with jobs outstanding".to_string())
}

/// Worker loop (runs in its own tokio task)
async fn augment_task(
    worker: usize,
    fetcher: Arc<dyn FacetFetcher>,
    augmenter: FacetAugmenter,
    queue: Arc<Mutex<mpsc::Receiver<QueuedJob>>>,
    reports: mpsc::Sender<WorkerReport>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(QueuedJob { slot, job }) = next else {
            break;
        };

        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        let result = augmenter.augment(fetcher.as_ref(), &job).await;
        in_flight.fetch_sub(1, Ordering::SeqCst);

        let report = WorkerReport {
            slot,
            leaf_id: job.leaf_id,
            result,
        };
        if reports.send(report).await.is_err() {
            break;
        }
    }
    tracing::trace!(worker, "augmentation worker done");
}
