//! Flat output records

use crate::category::{NodeFields, ShardKey};
use serde::{Deserialize, Serialize};

/// Where a record came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordOrigin {
    /// Derived directly from a category node
    Category {
        /// Storefront URL path
        url: String,
        /// Facet API routing key
        shard: ShardKey,
        /// Facet API query fragment
        query: String,
    },
    /// Synthesised from a leaf's category-type facet
    Facet {
        /// Name of the originating leaf
        parent_name: String,
    },
}

/// One row of the flattened catalogue
///
/// Serialises to the flat shape of the exported list: `level`, `id` and
/// `name`, plus either `url`/`shard`/`query` or `parent_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Tree depth, top-level categories are 0
    pub level: u32,
    /// Category or facet item id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Provenance fields
    #[serde(flatten)]
    pub origin: RecordOrigin,
}

impl FlatRecord {
    /// Record for a well-formed category node
    #[must_use]
    pub fn category(level: u32, fields: &NodeFields<'_>) -> Self {
        Self {
            level,
            id: fields.id,
            name: fields.name.to_string(),
            origin: RecordOrigin::Category {
                url: fields.url.to_string(),
                shard: fields.shard.clone(),
                query: fields.query.to_string(),
            },
        }
    }

    /// Record for a facet item found under a leaf
    #[must_use]
    pub fn facet(
        level: u32,
        id: i64,
        name: impl Into<String>,
        parent_name: impl Into<String>,
    ) -> Self {
        Self {
            level,
            id,
            name: name.into(),
            origin: RecordOrigin::Facet {
                parent_name: parent_name.into(),
            },
        }
    }

    /// True for records synthesised from facets
    #[inline]
    #[must_use]
    pub fn is_augmented(&self) -> bool {
        matches!(self.origin, RecordOrigin::Facet { .. })
    }

    /// Originating leaf name, for augmented records
    #[inline]
    #[must_use]
    pub fn parent_name(&self) -> Option<&str> {
        match &self.origin {
            RecordOrigin::Facet { parent_name } => Some(parent_name),
            RecordOrigin::Category { .. } => None,
        }
    }

    /// True for records that open a new top-level branch
    #[inline]
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.level == 0
    }
}
