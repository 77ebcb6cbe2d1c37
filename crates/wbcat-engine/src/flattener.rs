//! Catalogue flattener
//!
//! The engine entry point:
//! - Plans the pre-order walk of the tree
//! - Dispatches leaf augmentations to the bounded pool
//! - Merges results in slot order
//! - Reports diagnostics and run statistics

use crate::assemble::assemble;
use crate::augment::FacetAugmenter;
use crate::error::{Diagnostic, EngineError};
use crate::pool::{AugmentPool, PoolStats};
use crate::traversal::{plan, Slot};
use crate::types::{EngineConfig, RunStats};
use std::future::Future;
use std::sync::Arc;
use wbcat_model::{CategoryNode, FlatRecord};
use wbcat_source::{CacheStats, CachedFacetFetcher, FacetFetcher};

type Memo = CachedFacetFetcher<Arc<dyn FacetFetcher>>;

/// Outcome of one flattening run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    /// Records in pre-order
    pub records: Vec<FlatRecord>,
    /// Isolated skips in discovery order
    pub diagnostics: Vec<Diagnostic>,
    /// Counters
    pub stats: RunStats,
    /// Pool counters
    pub pool: PoolStats,
    /// The run was cancelled; `records` is a prefix of the full output
    pub cancelled: bool,
}

/// Flattens a category tree into depth-annotated records
pub struct CatalogueFlattener {
    config: EngineConfig,
    fetcher: Arc<dyn FacetFetcher>,
    memo: Option<Arc<Memo>>,
    augmenter: FacetAugmenter,
    pool: AugmentPool,
}

impl std::fmt::Debug for CatalogueFlattener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogueFlattener")
            .field("config", &self.config)
            .field("memo", &self.memo.as_ref().map(|memo| memo.stats()))
            .finish_non_exhaustive()
    }
}

impl CatalogueFlattener {
    /// Create flattener over a facet fetcher
    ///
    /// Lookups are memoised per `(shard, query)` unless
    /// `facet_cache_capacity` is zero.
    ///
    /// # Errors
    /// Returns `EngineError::Config` for an unusable configuration.
    pub fn new(config: EngineConfig, fetcher: Arc<dyn FacetFetcher>) -> Result<Self, EngineError> {
        let pool = AugmentPool::new(config.max_in_flight)?;
        let augmenter = FacetAugmenter::new(config.category_label.clone());

        let (fetcher, memo): (Arc<dyn FacetFetcher>, _) = if config.facet_cache_capacity > 0 {
            let memo = Arc::new(CachedFacetFetcher::new(fetcher, config.facet_cache_capacity));
            (Arc::clone(&memo) as Arc<dyn FacetFetcher>, Some(memo))
        } else {
            (fetcher, None)
        };

        Ok(Self {
            config,
            fetcher,
            memo,
            augmenter,
            pool,
        })
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Memo statistics, if memoisation is enabled
    #[must_use]
    pub fn memo_stats(&self) -> Option<CacheStats> {
        self.memo.as_ref().map(|memo| memo.stats())
    }

    /// Flatten the whole tree
    ///
    /// # Errors
    /// See [`flatten_until`](Self::flatten_until).
    pub async fn flatten(&self, tree: &[CategoryNode]) -> Result<Flattened, EngineError> {
        self.flatten_until(tree, std::future::pending()).await
    }

    /// Flatten the tree, stopping early when `cancel` resolves
    ///
    /// A cancelled run keeps the longest prefix whose augmentations all
    /// completed and sets [`Flattened::cancelled`].
    ///
    /// # Errors
    /// - `EngineError::Transport` if the facet transport fails fatally
    /// - `EngineError::Worker` if an augmentation worker dies
    pub async fn flatten_until<C>(
        &self,
        tree: &[CategoryNode],
        cancel: C,
    ) -> Result<Flattened, EngineError>
    where
        C: Future<Output = ()>,
    {
        let plan = plan(tree, &self.config.exclusions);
        let jobs: Vec<_> = plan
            .slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| match slot {
                Slot::Augment(job) => Some((idx, job.clone())),
                Slot::Record(_) => None,
            })
            .collect();
        let dispatched = jobs.len();

        tracing::info!(
            records = plan.slots.len() - dispatched,
            leaves = dispatched,
            excluded = plan.excluded,
            skipped = plan.diagnostics.len(),
            "catalogue walked"
        );

        let run = self
            .pool
            .run(Arc::clone(&self.fetcher), &self.augmenter, jobs, cancel)
            .await?;

        let mut diagnostics = plan.diagnostics;
        let assembled = assemble(plan.slots, run.results);
        diagnostics.extend(assembled.diagnostics);

        let facet_records = assembled.records.iter().filter(|r| r.is_augmented()).count();
        let mut stats = RunStats {
            category_records: assembled.records.len() - facet_records,
            facet_records,
            leaves_dispatched: dispatched,
            leaves_completed: assembled.leaves_completed,
            leaves_excluded: plan.excluded,
            ..RunStats::default()
        };
        stats.count_skips(&diagnostics);

        let cancelled = run.cancelled && assembled.truncated;
        if cancelled {
            tracing::warn!(records = assembled.records.len(), "returning partial output");
        } else {
            tracing::info!(
                records = stats.total_records(),
                facets = stats.facet_records,
                "catalogue flattened"
            );
        }

        Ok(Flattened {
            records: assembled.records,
            diagnostics,
            stats,
            pool: run.stats,
            cancelled,
        })
    }
}
