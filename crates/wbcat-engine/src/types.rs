//! Engine configuration and run statistics

use crate::error::{Diagnostic, SkipKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wbcat_model::{ExclusionSet, CATEGORY_FACET_LABEL};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum concurrent facet lookups
    pub max_in_flight: usize,
    /// Ids recorded but never augmented
    pub exclusions: ExclusionSet,
    /// Label of the category-type facet group
    pub category_label: String,
    /// Capacity of the per-run facet memo
    pub facet_cache_capacity: u64,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With max concurrent lookups
    #[inline]
    #[must_use]
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    /// With exclusion set
    #[inline]
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// With category facet label
    #[inline]
    #[must_use]
    pub fn with_category_label(mut self, label: impl Into<String>) -> Self {
        self.category_label = label.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            exclusions: ExclusionSet::default(),
            category_label: CATEGORY_FACET_LABEL.to_string(),
            facet_cache_capacity: 50_000,
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Records derived from category nodes
    pub category_records: usize,
    /// Records synthesised from facets
    pub facet_records: usize,
    /// Leaves sent for augmentation
    pub leaves_dispatched: usize,
    /// Leaves whose augmentation completed
    pub leaves_completed: usize,
    /// Leaves skipped because their id is excluded
    pub leaves_excluded: usize,
    /// Skips by kind
    pub skips: BTreeMap<SkipKind, usize>,
}

impl RunStats {
    /// Count diagnostics by kind
    pub fn count_skips<'a>(&mut self, diagnostics: impl IntoIterator<Item = &'a Diagnostic>) {
        for diag in diagnostics {
            *self.skips.entry(diag.kind).or_default() += 1;
        }
    }

    /// Skips of one kind
    #[inline]
    #[must_use]
    pub fn skipped(&self, kind: SkipKind) -> usize {
        self.skips.get(&kind).copied().unwrap_or(0)
    }

    /// Total records emitted
    #[inline]
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.category_records + self.facet_records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EngineConfig::new();
        assert_eq!(config.max_in_flight, 8);
        assert!(config.exclusions.contains(130_090));
        assert_eq!(config.category_label, "Категория");
    }

    #[test]
    fn config_from_partial_toml_shape() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"max_in_flight": 2, "exclusions": [1, 2]}"#).unwrap();
        assert_eq!(config.max_in_flight, 2);
        assert!(config.exclusions.contains(2));
        assert!(!config.exclusions.contains(130_090));
        assert_eq!(config.facet_cache_capacity, 50_000);
    }

    #[test]
    fn stats_count_skips() {
        let mut stats = RunStats::default();
        let diags = [
            Diagnostic::new(SkipKind::MalformedNode, "a"),
            Diagnostic::new(SkipKind::MalformedNode, "b"),
            Diagnostic::new(SkipKind::NoMatchingFacet, "c"),
        ];
        stats.count_skips(&diags);

        assert_eq!(stats.skipped(SkipKind::MalformedNode), 2);
        assert_eq!(stats.skipped(SkipKind::NoMatchingFacet), 1);
        assert_eq!(stats.skipped(SkipKind::MalformedFacetItem), 0);
    }
}
