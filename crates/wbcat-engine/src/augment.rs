//! Facet augmentation of leaf categories
//!
//! Turns one leaf's facet lookup into zero or more synthetic records one
//! level below the leaf. Every recoverable problem becomes a [`Diagnostic`]
//! and an empty (or shortened) record list; only fatal transport errors
//! leave this module as `Err`.

use crate::error::{Diagnostic, SkipKind};
use crate::traversal::AugmentJob;
use wbcat_model::{CategoryNode, FacetResponse, FlatRecord, CATEGORY_FACET_LABEL};
use wbcat_source::{FacetFetcher, FacetLookup, FetchError};

/// How a leaf's augmentation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugmentOutcome {
    /// Category-type group found; holds the number of records emitted
    Augmented(usize),
    /// No category-type group
    NoMatchingFacet,
    /// Lookup dropped by the network
    TransientNetworkFailure,
    /// Lookup returned something other than the expected document
    UnexpectedResponseShape,
    /// Leaf lacks a field needed to build the lookup; nothing was fetched
    MalformedLeaf,
}

/// Records and notes produced for one leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Augmentation {
    /// Facet records in item order
    pub records: Vec<FlatRecord>,
    /// Skips encountered
    pub diagnostics: Vec<Diagnostic>,
    /// Overall outcome
    pub outcome: AugmentOutcome,
}

impl Augmentation {
    fn skipped(job: &AugmentJob, kind: SkipKind, outcome: AugmentOutcome, detail: String) -> Self {
        let diag = Diagnostic::new(kind, detail).at_node(Some(job.leaf_id), Some(&job.leaf_name));
        diag.log();
        Self {
            records: Vec::new(),
            diagnostics: vec![diag],
            outcome,
        }
    }
}

/// Interprets facet lookups for leaves
#[derive(Debug, Clone)]
pub struct FacetAugmenter {
    category_label: String,
}

impl FacetAugmenter {
    /// Create augmenter matching groups labeled `category_label`
    #[inline]
    #[must_use]
    pub fn new(category_label: impl Into<String>) -> Self {
        Self {
            category_label: category_label.into(),
        }
    }

    /// Label this augmenter matches
    #[inline]
    #[must_use]
    pub fn category_label(&self) -> &str {
        &self.category_label
    }

    /// Fetch and interpret facets for one leaf
    ///
    /// # Errors
    /// Returns the fetcher's `FetchError` unchanged; such errors are fatal to
    /// the run.
    pub async fn augment<F>(&self, fetcher: &F, job: &AugmentJob) -> Result<Augmentation, FetchError>
    where
        F: FacetFetcher + ?Sized,
    {
        let lookup = fetcher.fetch(&job.request).await?;
        Ok(self.interpret(job, lookup))
    }

    /// Fetch and interpret facets for a leaf node sitting at `leaf_level`
    ///
    /// Malformed nodes yield an empty augmentation with a
    /// [`SkipKind::MalformedNode`] note and no lookup.
    ///
    /// # Errors
    /// Same as [`augment`](Self::augment).
    pub async fn augment_leaf<F>(
        &self,
        fetcher: &F,
        leaf: &CategoryNode,
        leaf_level: u32,
    ) -> Result<Augmentation, FetchError>
    where
        F: FacetFetcher + ?Sized,
    {
        match AugmentJob::for_leaf(leaf, leaf_level) {
            Some(job) => self.augment(fetcher, &job).await,
            None => {
                let detail = leaf
                    .fields()
                    .err()
                    .map_or_else(String::new, |err| err.to_string());
                let diag = Diagnostic::new(SkipKind::MalformedNode, detail)
                    .at_node(leaf.id, leaf.name.as_deref());
                diag.log();
                Ok(Augmentation {
                    records: Vec::new(),
                    diagnostics: vec![diag],
                    outcome: AugmentOutcome::MalformedLeaf,
                })
            }
        }
    }

    /// Interpret a completed lookup
    #[must_use]
    pub fn interpret(&self, job: &AugmentJob, lookup: FacetLookup) -> Augmentation {
        match lookup {
            FacetLookup::Response(response) => self.extract(job, &response),
            FacetLookup::Disconnected { detail } => Augmentation::skipped(
                job,
                SkipKind::TransientNetworkFailure,
                AugmentOutcome::TransientNetworkFailure,
                format!("no filters available, request dropped: {detail}"),
            ),
            FacetLookup::UnexpectedContent { detail } => Augmentation::skipped(
                job,
                SkipKind::UnexpectedResponseShape,
                AugmentOutcome::UnexpectedResponseShape,
                format!("no filters available, unexpected content: {detail}"),
            ),
        }
    }

    fn extract(&self, job: &AugmentJob, response: &FacetResponse) -> Augmentation {
        let group = match response.first_group() {
            Some(group) if group.is_labeled(&self.category_label) => group,
            Some(group) => {
                return Augmentation::skipped(
                    job,
                    SkipKind::NoMatchingFacet,
                    AugmentOutcome::NoMatchingFacet,
                    format!("first facet group is {:?}", group.name.as_deref().unwrap_or("")),
                );
            }
            None => {
                return Augmentation::skipped(
                    job,
                    SkipKind::NoMatchingFacet,
                    AugmentOutcome::NoMatchingFacet,
                    "no facet groups".to_string(),
                );
            }
        };

        let mut records = Vec::with_capacity(group.items.len());
        let mut diagnostics = Vec::new();

        for (position, item) in group.parsed_items().enumerate() {
            match item {
                Ok(item) => {
                    tracing::info!(
                        id = item.id,
                        level = job.level,
                        name = %item.name,
                        parent = %job.leaf_name,
                        "facet"
                    );
                    records.push(FlatRecord::facet(job.level, item.id, item.name, &job.leaf_name));
                }
                Err(err) => {
                    let diag = Diagnostic::new(
                        SkipKind::MalformedFacetItem,
                        format!("item {position}: {err}"),
                    )
                    .at_node(Some(job.leaf_id), Some(&job.leaf_name));
                    diag.log();
                    diagnostics.push(diag);
                }
            }
        }

        Augmentation {
            outcome: AugmentOutcome::Augmented(records.len()),
            records,
            diagnostics,
        }
    }
}

impl Default for FacetAugmenter {
    fn default() -> Self {
        Self::new(CATEGORY_FACET_LABEL)
    }
}
