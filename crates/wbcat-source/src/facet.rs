//! Facet fetcher boundary

use crate::error::FetchError;
use async_trait::async_trait;
use wbcat_model::{FacetResponse, NodeFields, ShardKey};

/// Routing parameters of one facet lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FacetRequest {
    /// Shard routing key
    pub shard: ShardKey,
    /// Query fragment, passed through verbatim
    pub query: String,
}

impl FacetRequest {
    /// Create request
    #[inline]
    #[must_use]
    pub fn new(shard: impl Into<ShardKey>, query: impl Into<String>) -> Self {
        Self {
            shard: shard.into(),
            query: query.into(),
        }
    }

    /// Request for a well-formed node
    #[inline]
    #[must_use]
    pub fn for_node(fields: &NodeFields<'_>) -> Self {
        Self::new(fields.shard.clone(), fields.query)
    }
}

/// Outcome of one facet lookup that does not stop the run
#[derive(Debug, Clone, PartialEq)]
pub enum FacetLookup {
    /// Decoded response
    Response(FacetResponse),
    /// Server dropped or timed out the exchange
    Disconnected {
        /// Transport detail
        detail: String,
    },
    /// Body was not the expected JSON document
    UnexpectedContent {
        /// Status or decode detail
        detail: String,
    },
}

impl FacetLookup {
    /// Create disconnected outcome
    #[inline]
    pub fn disconnected(detail: impl Into<String>) -> Self {
        Self::Disconnected {
            detail: detail.into(),
        }
    }

    /// Create unexpected-content outcome
    #[inline]
    pub fn unexpected_content(detail: impl Into<String>) -> Self {
        Self::UnexpectedContent {
            detail: detail.into(),
        }
    }
}

/// Performs one facet lookup per call
///
/// Implementations must map every recoverable condition to a
/// [`FacetLookup`] and reserve `Err` for failures that should end the run.
#[async_trait]
pub trait FacetFetcher: Send + Sync {
    /// Fetch facets for one leaf
    async fn fetch(&self, request: &FacetRequest) -> Result<FacetLookup, FetchError>;
}

#[async_trait]
impl<F: FacetFetcher + ?Sized> FacetFetcher for std::sync::Arc<F> {
    async fn fetch(&self, request: &FacetRequest) -> Result<FacetLookup, FetchError> {
        (**self).fetch(request).await
    }
}
