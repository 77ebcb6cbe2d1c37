//! wbcat Source Layer
//!
//! The boundary between the remote storefront and the flattening engine.
//!
//! # Core Operations
//!
//! - **Catalogue**: obtain the raw category tree, cached on disk per day
//! - **Facets**: one lookup per leaf, reported as a tagged [`FacetLookup`]
//! - **Memo**: [`CachedFacetFetcher`] collapses repeated `(shard, query)` pairs
//!
//! # Architecture
//!
//! ```text
//! CatalogueDownloader → DailyCatalogueCache (disk) → Vec<CategoryNode>
//! FacetFetcher → CachedFacetFetcher (moka) → FacetLookup
//! ```
//!
//! Transport implementations live in `wbcat-http`; this crate only defines
//! the seams and the caching around them.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod cache;
pub mod catalogue;
pub mod error;
pub mod facet;

// Re-exports for convenience
pub use cache::{CacheStats, CachedFacetFetcher};
pub use catalogue::{
    is_stale, CacheStatus, CatalogueDownloader, CatalogueSource, DailyCatalogueCache,
};
pub use error::{FetchError, SourceError};
pub use facet::{FacetFetcher, FacetLookup, FacetRequest};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the source layer
    pub use crate::cache::CachedFacetFetcher;
    pub use crate::catalogue::{CatalogueDownloader, CatalogueSource, DailyCatalogueCache};
    pub use crate::error::{FetchError, SourceError};
    pub use crate::facet::{FacetFetcher, FacetLookup, FacetRequest};
}
