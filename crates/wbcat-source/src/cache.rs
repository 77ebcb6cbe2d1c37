//! Memoised facet lookups using moka
//!
//! Several tree positions can route to the same `(shard, query)` pair. The
//! cache keeps decoded responses so each pair costs at most one request per
//! run, and concurrent lookups of the same pair share one upstream call.

use crate::error::FetchError;
use crate::facet::{FacetFetcher, FacetLookup, FacetRequest};
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use wbcat_model::FacetResponse;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached responses
    pub entry_count: u64,
    /// Calls forwarded to the wrapped fetcher
    pub upstream_calls: u64,
}

/// Why a lookup was not cached
#[derive(Debug)]
enum Uncached {
    Lookup(FacetLookup),
    Fatal(FetchError),
}

/// Facet fetcher wrapper that memoises decoded responses
///
/// Only [`FacetLookup::Response`] outcomes are stored. Disconnects and
/// unexpected content are passed through and asked again next time.
#[derive(Debug)]
pub struct CachedFacetFetcher<F> {
    inner: F,
    cache: Cache<FacetRequest, Arc<FacetResponse>>,
    upstream_calls: AtomicU64,
}

impl<F: FacetFetcher> CachedFacetFetcher<F> {
    /// Wrap fetcher with max capacity
    #[inline]
    #[must_use]
    pub fn new(inner: F, max_capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(max_capacity),
            upstream_calls: AtomicU64::new(0),
        }
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.cache.entry_count(),
            upstream_calls: self.upstream_calls.load(Ordering::Relaxed),
        }
    }

    /// Wrapped fetcher
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: FacetFetcher> FacetFetcher for CachedFacetFetcher<F> {
    async fn fetch(&self, request: &FacetRequest) -> Result<FacetLookup, FetchError> {
        let loaded = self
            .cache
            .try_get_with(request.clone(), async {
                self.upstream_calls.fetch_add(1, Ordering::Relaxed);
                match self.inner.fetch(request).await {
                    Ok(FacetLookup::Response(response)) => Ok(Arc::new(response)),
                    Ok(other) => Err(Uncached::Lookup(other)),
                    Err(err) => Err(Uncached::Fatal(err)),
                }
            })
            .await;

        match loaded {
            Ok(response) => Ok(FacetLookup::Response(response.as_ref().clone())),
            Err(uncached) => match uncached.as_ref() {
                Uncached::Lookup(lookup) => Ok(lookup.clone()),
                Uncached::Fatal(err) => Err(err.clone()),
            },
        }
    }
}
