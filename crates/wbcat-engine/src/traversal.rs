//! Structural walk of the category tree
//!
//! Depth-first, pre-order, pure. Each call returns its own owned slots and
//! the caller splices them in after the parent record, so the output order
//! depends on the input order alone. Leaves are not fetched here: they get
//! an [`AugmentJob`] slot at the exact position their facet records will
//! occupy once the lookup completes.

use crate::error::{Diagnostic, SkipKind};
use wbcat_model::{CategoryNode, ExclusionSet, FlatRecord};
use wbcat_source::FacetRequest;

/// A pending facet lookup for one leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentJob {
    /// Leaf category id
    pub leaf_id: i64,
    /// Leaf name, becomes `parent_name` of the facet records
    pub leaf_name: String,
    /// Lookup routing
    pub request: FacetRequest,
    /// Level of the facet records (leaf level + 1)
    pub level: u32,
}

impl AugmentJob {
    /// Job for a leaf sitting at `leaf_level`, or `None` if the node is malformed
    #[must_use]
    pub fn for_leaf(leaf: &CategoryNode, leaf_level: u32) -> Option<Self> {
        let fields = leaf.fields().ok()?;
        Some(Self {
            leaf_id: fields.id,
            leaf_name: fields.name.to_string(),
            request: FacetRequest::for_node(&fields),
            level: leaf_level + 1,
        })
    }
}

/// One position in the output sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Finished record
    Record(FlatRecord),
    /// Facet records still to be fetched
    Augment(AugmentJob),
}

/// Result of the structural walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalPlan {
    /// Output positions in pre-order
    pub slots: Vec<Slot>,
    /// Malformed nodes that were skipped
    pub diagnostics: Vec<Diagnostic>,
    /// Leaves not augmented because their id is excluded
    pub excluded: usize,
}

impl TraversalPlan {
    /// Jobs with their slot index
    pub fn jobs(&self) -> impl Iterator<Item = (usize, &AugmentJob)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| match slot {
            Slot::Augment(job) => Some((idx, job)),
            Slot::Record(_) => None,
        })
    }

    /// Number of pending jobs
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.jobs().count()
    }

    /// Records of the plan, ignoring pending augmentations
    pub fn records(&self) -> impl Iterator<Item = &FlatRecord> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Record(record) => Some(record),
            Slot::Augment(_) => None,
        })
    }

    fn append(&mut self, other: TraversalPlan) {
        self.slots.extend(other.slots);
        self.diagnostics.extend(other.diagnostics);
        self.excluded += other.excluded;
    }
}

/// Walk the top-level nodes; their records get level 0
#[must_use]
pub fn plan(tree: &[CategoryNode], exclusions: &ExclusionSet) -> TraversalPlan {
    walk(tree, 0, exclusions)
}

fn walk(nodes: &[CategoryNode], level: u32, exclusions: &ExclusionSet) -> TraversalPlan {
    let mut out = TraversalPlan::default();

    for node in nodes {
        let fields = match node.fields() {
            Ok(fields) => fields,
            Err(err) => {
                let diag = Diagnostic::new(SkipKind::MalformedNode, err.to_string())
                    .at_node(node.id, node.name.as_deref());
                diag.log();
                out.diagnostics.push(diag);
                continue;
            }
        };

        tracing::info!(id = fields.id, level, name = fields.name, url = fields.url, "category");
        out.slots.push(Slot::Record(FlatRecord::category(level, &fields)));

        if let Some(children) = node.children.nodes() {
            out.append(walk(children, level + 1, exclusions));
        } else if exclusions.contains(fields.id) {
            tracing::debug!(id = fields.id, name = fields.name, "redirect target, not augmented");
            out.excluded += 1;
        } else if let Some(job) = AugmentJob::for_leaf(node, level) {
            out.slots.push(Slot::Augment(job));
        }
    }

    out
}
