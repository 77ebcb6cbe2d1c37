//! Redirect exclusions
//!
//! Some catalogue entries redirect to a category that is also reachable from
//! its own position in the tree. Augmenting both would duplicate the facet
//! rows, so such ids are recorded but never augmented.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Known redirect: `130090` points at `129073`
pub const DEFAULT_REDIRECT_IDS: &[i64] = &[130_090];

/// Set of category ids excluded from facet augmentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeSet<i64>);

impl ExclusionSet {
    /// Set with no exclusions
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Check if an id is excluded
    #[inline]
    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    /// Add an id
    #[inline]
    pub fn insert(&mut self, id: i64) -> bool {
        self.0.insert(id)
    }

    /// Number of excluded ids
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing is excluded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Excluded ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl Default for ExclusionSet {
    fn default() -> Self {
        DEFAULT_REDIRECT_IDS.iter().copied().collect()
    }
}

impl FromIterator<i64> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
