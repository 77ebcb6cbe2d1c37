//! Ordered merge of plan slots and augmentation results

use crate::augment::Augmentation;
use crate::error::Diagnostic;
use crate::traversal::Slot;
use std::collections::BTreeMap;
use wbcat_model::FlatRecord;

/// Merged output
#[derive(Debug, Default)]
pub(crate) struct Assembled {
    pub(crate) records: Vec<FlatRecord>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) leaves_completed: usize,
    /// An augmentation slot had no result, output stops before it
    pub(crate) truncated: bool,
}

/// Merge in slot order
///
/// Stops at the first augmentation slot without a result, so the output is
/// always a prefix of the complete sequence.
pub(crate) fn assemble(
    slots: Vec<Slot>,
    mut results: BTreeMap<usize, Augmentation>,
) -> Assembled {
    let mut out = Assembled {
        records: Vec::with_capacity(slots.len()),
        ..Assembled::default()
    };

    for (idx, slot) in slots.into_iter().enumerate() {
        match slot {
            Slot::Record(record) => out.records.push(record),
            Slot::Augment(_) => match results.remove(&idx) {
                Some(augmentation) => {
                    out.records.extend(augmentation.records);
                    out.diagnostics.extend(augmentation.diagnostics);
                    out.leaves_completed += 1;
                }
                None => {
                    out.truncated = true;
                    break;
                }
            },
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::AugmentOutcome;
    use crate::traversal::AugmentJob;
    use pretty_assertions::assert_eq;
    use wbcat_source::FacetRequest;

    fn record(id: i64) -> Slot {
        Slot::Record(FlatRecord::facet(0, id, format!("r{id}"), "root"))
    }

    fn pending(id: i64) -> Slot {
        Slot::Augment(AugmentJob {
            leaf_id: id,
            leaf_name: format!("r{id}"),
            request: FacetRequest::new(id, "q"),
            level: 1,
        })
    }

    fn augmented(ids: &[i64]) -> Augmentation {
        Augmentation {
            records: ids.iter().map(|&id| FlatRecord::facet(1, id, format!("f{id}"), "p")).collect(),
            diagnostics: Vec::new(),
            outcome: AugmentOutcome::Augmented(ids.len()),
        }
    }

    fn ids(assembled: &Assembled) -> Vec<i64> {
        assembled.records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn results_spliced_at_their_slot() {
        let slots = vec![record(1), pending(1), record(2), pending(2)];
        let results = BTreeMap::from([(3, augmented(&[20, 21])), (1, augmented(&[10]))]);

        let out = assemble(slots, results);
        assert_eq!(ids(&out), vec![1, 10, 2, 20, 21]);
        assert_eq!(out.leaves_completed, 2);
        assert!(!out.truncated);
    }

    #[test]
    fn missing_result_truncates() {
        let slots = vec![record(1), pending(1), record(2), pending(2), record(3)];
        let results = BTreeMap::from([(3, augmented(&[20]))]);

        let out = assemble(slots, results);
        assert_eq!(ids(&out), vec![1]);
        assert!(out.truncated);
        assert_eq!(out.leaves_completed, 0);
    }
}
