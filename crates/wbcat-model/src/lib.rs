//! wbcat Data Model
//!
//! Typed views over the storefront catalogue and the flat records produced
//! from it.
//!
//! # Core Concepts
//!
//! - [`CategoryNode`]: A node of the raw category tree, read leniently
//! - [`NodeFields`]: The required fields of a node, or the first one missing
//! - [`FlatRecord`]: One depth-annotated output row
//! - [`FacetResponse`]: The decoded part of a per-leaf filters lookup
//! - [`ExclusionSet`]: Redirect ids that are recorded but never augmented
//!
//! # Example
//!
//! ```rust
//! use wbcat_model::{parse_catalogue, FlatRecord};
//!
//! let root = serde_json::json!([
//!     { "id": 1, "name": "A", "url": "/a", "shard": 1, "query": "q1" }
//! ]);
//! let nodes = parse_catalogue(&root).unwrap();
//! let record = FlatRecord::category(0, &nodes[0].fields().unwrap());
//! assert_eq!(record.name, "A");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod category;
mod error;
mod exclusion;
mod facet;
mod record;

// Re-exports
pub use category::{
    parse_catalogue, CategoryNode, Children, NodeFields, ShardKey, CHILDREN_ALIAS, CHILDREN_KEY,
    DEFAULT_SHARD,
};
pub use error::ModelError;
pub use exclusion::{ExclusionSet, DEFAULT_REDIRECT_IDS};
pub use facet::{FacetData, FacetGroup, FacetItem, FacetResponse, CATEGORY_FACET_LABEL};
pub use record::{FlatRecord, RecordOrigin};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_to_record_to_json() {
        let root = json!([{
            "id": 1, "name": "A", "url": "/a", "shard": 1, "query": "q1",
            "childs": [{ "id": 2, "name": "B", "url": "/b", "shard": 2, "query": "q2" }]
        }]);

        let nodes = parse_catalogue(&root).unwrap();
        let child = &nodes[0].children.nodes().unwrap()[0];
        let record = FlatRecord::category(1, &child.fields().unwrap());

        assert_eq!(record.id, 2);
        assert_eq!(record.level, 1);
        assert!(child.is_leaf());
        assert!(!ExclusionSet::default().contains(record.id));
    }
}
