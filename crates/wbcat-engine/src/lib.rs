//! wbcat Engine - Catalogue flattening
//!
//! Turns the storefront category tree into an ordered list of
//! depth-annotated records:
//! - Walks the tree depth-first, pre-order, with depth passed explicitly
//! - Skips malformed nodes together with their subtrees
//! - Augments leaves with their category-type facet values
//! - Runs lookups in a bounded pool and merges them by slot index
//! - Isolates per-node and per-item failures as [`Diagnostic`]s
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wbcat_engine::{CatalogueFlattener, EngineConfig};
//!
//! # async fn example(fetcher: Arc<dyn wbcat_source::FacetFetcher>,
//! #                  tree: Vec<wbcat_model::CategoryNode>) -> Result<(), wbcat_engine::EngineError> {
//! let flattener = CatalogueFlattener::new(EngineConfig::new().with_max_in_flight(4), fetcher)?;
//! let out = flattener.flatten(&tree).await?;
//!
//! println!("{} records, {} skipped", out.records.len(), out.diagnostics.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod assemble;
pub mod augment;
pub mod error;
pub mod flattener;
pub mod pool;
pub mod traversal;
pub mod types;

// Re-exports for convenience
pub use augment::{AugmentOutcome, Augmentation, FacetAugmenter};
pub use error::{Diagnostic, EngineError, SkipKind};
pub use flattener::{CatalogueFlattener, Flattened};
pub use pool::{AugmentPool, PoolStats};
pub use traversal::{plan, AugmentJob, Slot, TraversalPlan};
pub use types::{EngineConfig, RunStats};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the engine
    pub use crate::{
        CatalogueFlattener, Diagnostic, EngineConfig, EngineError, FacetAugmenter, Flattened,
        RunStats, SkipKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
