//! Structural properties of the flattened output over generated trees

use proptest::prelude::*;
use std::sync::Arc;
use wbcat_engine::{CatalogueFlattener, EngineConfig, Flattened};
use wbcat_model::CategoryNode;
use wbcat_test_utils::{branch, leaf, levels, query_for, ScriptedFacetFetcher};

#[derive(Debug, Clone)]
struct Shape {
    malformed: bool,
    children: Option<Vec<Shape>>,
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop::bool::weighted(0.15).prop_map(|malformed| Shape {
        malformed,
        children: None,
    });
    leaf.prop_recursive(4, 48, 4, |inner| {
        (prop::bool::weighted(0.15), prop::collection::vec(inner, 0..4)).prop_map(
            |(malformed, children)| Shape {
                malformed,
                children: Some(children),
            },
        )
    })
}

fn forest() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(shape(), 0..6)
}

fn build(shapes: &[Shape], next: &mut i64) -> Vec<CategoryNode> {
    shapes
        .iter()
        .map(|s| {
            *next += 1;
            let id = *next;
            let name = format!("n{id}");
            let mut node = match &s.children {
                Some(children) => branch(id, &name, build(children, next)),
                None => leaf(id, &name),
            };
            if s.malformed {
                node.url = None;
            }
            node
        })
        .collect()
}

fn leaf_ids(nodes: &[CategoryNode], out: &mut Vec<i64>) {
    for node in nodes {
        match node.children.nodes() {
            Some(children) => leaf_ids(children, out),
            None => out.extend(node.id),
        }
    }
}

/// Pre-order `(level, id)`, skipping malformed subtrees; augmented leaves
/// are followed by their facet id `leaf * 1000`
fn reference(nodes: &[CategoryNode], level: u32, augmented: bool, out: &mut Vec<(u32, i64)>) {
    for node in nodes {
        let (Some(id), true) = (node.id, node.url.is_some()) else {
            continue;
        };
        out.push((level, id));
        match node.children.nodes() {
            Some(children) => reference(children, level + 1, augmented, out),
            None if augmented => out.push((level + 1, id * 1000)),
            None => {}
        }
    }
}

fn run(tree: &[CategoryNode], fetcher: ScriptedFacetFetcher, max_in_flight: usize) -> Flattened {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let config = EngineConfig::new().with_max_in_flight(max_in_flight);
    let flattener = CatalogueFlattener::new(config, Arc::new(fetcher)).unwrap();
    runtime.block_on(flattener.flatten(tree)).unwrap()
}

fn answering_all(tree: &[CategoryNode]) -> ScriptedFacetFetcher {
    let mut ids = Vec::new();
    leaf_ids(tree, &mut ids);
    ids.into_iter().fold(ScriptedFacetFetcher::new(), |fetcher, id| {
        fetcher.with_items(query_for(id), &[(id * 1000, "facet")])
    })
}

proptest! {
    #[test]
    fn category_records_follow_preorder(shapes in forest()) {
        let tree = build(&shapes, &mut 0);
        let out = run(&tree, ScriptedFacetFetcher::new(), 4);

        let mut expected = Vec::new();
        reference(&tree, 0, false, &mut expected);
        prop_assert_eq!(levels(&out.records), expected);
        prop_assert!(out.records.iter().all(|r| !r.is_augmented()));
    }

    #[test]
    fn facet_records_sit_under_their_leaf(shapes in forest(), max_in_flight in 1usize..6) {
        let tree = build(&shapes, &mut 0);
        let out = run(&tree, answering_all(&tree), max_in_flight);

        let mut expected = Vec::new();
        reference(&tree, 0, true, &mut expected);
        prop_assert_eq!(levels(&out.records), expected);

        for pair in out.records.windows(2) {
            if pair[1].is_augmented() {
                prop_assert_eq!(pair[1].level, pair[0].level + 1);
                prop_assert_eq!(pair[1].parent_name(), Some(pair[0].name.as_str()));
            }
        }
    }

    #[test]
    fn repeated_runs_identical(shapes in forest()) {
        let tree = build(&shapes, &mut 0);
        let first = run(&tree, answering_all(&tree), 3);
        let second = run(&tree, answering_all(&tree), 3);
        prop_assert_eq!(first.records, second.records);
        prop_assert_eq!(first.diagnostics, second.diagnostics);
    }
}
