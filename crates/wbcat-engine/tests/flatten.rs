//! End-to-end flattening against scripted fetchers

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use wbcat_engine::{CatalogueFlattener, EngineConfig, EngineError, SkipKind};
use wbcat_model::{parse_catalogue, CategoryNode, ExclusionSet, FlatRecord};
use wbcat_source::{FacetLookup, FetchError};
use wbcat_test_utils::{branch, leaf, levels, names, query_for, ScriptedFacetFetcher};

fn flattener(fetcher: ScriptedFacetFetcher) -> (CatalogueFlattener, Arc<ScriptedFacetFetcher>) {
    flattener_with(EngineConfig::new(), fetcher)
}

fn flattener_with(
    config: EngineConfig,
    fetcher: ScriptedFacetFetcher,
) -> (CatalogueFlattener, Arc<ScriptedFacetFetcher>) {
    let fetcher = Arc::new(fetcher);
    let flattener = CatalogueFlattener::new(config, Arc::clone(&fetcher) as _).unwrap();
    (flattener, fetcher)
}

fn example_tree() -> Vec<CategoryNode> {
    parse_catalogue(&serde_json::json!([{
        "name": "A", "url": "/a", "shard": 1, "query": "q1", "id": 1,
        "childs": [{ "name": "B", "url": "/b", "shard": 2, "query": "q2", "id": 2 }]
    }]))
    .unwrap()
}

#[tokio::test]
async fn example_without_facet_match() {
    let (flattener, _) = flattener(ScriptedFacetFetcher::new());
    let out = flattener.flatten(&example_tree()).await.unwrap();

    assert_eq!(levels(&out.records), vec![(0, 1), (1, 2)]);
    assert_eq!(names(&out.records), vec!["A", "B"]);
    assert_eq!(out.stats.skipped(SkipKind::NoMatchingFacet), 1);
}

#[tokio::test]
async fn example_with_category_facet() {
    let (flattener, fetcher) = flattener(ScriptedFacetFetcher::new().with_items("q2", &[(9, "X")]));
    let out = flattener.flatten(&example_tree()).await.unwrap();

    assert_eq!(levels(&out.records), vec![(0, 1), (1, 2), (2, 9)]);
    assert_eq!(out.records[2], FlatRecord::facet(2, 9, "X", "B"));
    assert_eq!(fetcher.calls(), 1);
    assert!(out.diagnostics.is_empty());
}

#[tokio::test]
async fn reverse_completion_keeps_order() {
    let mut fetcher = ScriptedFacetFetcher::new();
    let mut tree = Vec::new();
    for id in 1..=5_i64 {
        let delay = Duration::from_millis(u64::try_from(60 - id * 10).unwrap());
        fetcher = fetcher
            .with_items(query_for(id), &[(id * 100, "first"), (id * 100 + 1, "second")])
            .with_delay(query_for(id), delay);
        tree.push(leaf(id, &format!("leaf-{id}")));
    }

    let (flattener, _) = flattener(fetcher);
    let out = flattener.flatten(&tree).await.unwrap();

    let expected: Vec<_> = (1..=5_i64)
        .flat_map(|id| [(0, id), (1, id * 100), (1, id * 100 + 1)])
        .collect();
    assert_eq!(levels(&out.records), expected);
}

#[tokio::test]
async fn transient_failure_isolated_to_one_leaf() {
    let fetcher = ScriptedFacetFetcher::new()
        .with_items(query_for(2), &[(20, "x")])
        .with_lookup(query_for(3), FacetLookup::disconnected("server disconnected"))
        .with_items(query_for(4), &[(40, "y")]);
    let tree = vec![branch(1, "root", vec![leaf(2, "b"), leaf(3, "c"), leaf(4, "d")])];

    let (flattener, _) = flattener(fetcher);
    let out = flattener.flatten(&tree).await.unwrap();

    assert_eq!(
        levels(&out.records),
        vec![(0, 1), (1, 2), (2, 20), (1, 3), (1, 4), (2, 40)]
    );
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind, SkipKind::TransientNetworkFailure);
    assert_eq!(out.diagnostics[0].node_id, Some(3));
}

#[tokio::test]
async fn unreachable_host_is_fatal() {
    let fetcher = ScriptedFacetFetcher::new()
        .with_error(query_for(2), FetchError::Unreachable("connection refused".to_string()));
    let tree = vec![leaf(1, "a"), leaf(2, "b")];

    let (flattener, _) = flattener(fetcher);
    let err = flattener.flatten(&tree).await.unwrap_err();

    assert!(err.is_transport());
    assert!(matches!(err, EngineError::Transport { leaf_id: 2, .. }));
}

#[tokio::test]
async fn cancellation_returns_completed_prefix() {
    let fetcher = ScriptedFacetFetcher::new()
        .with_items(query_for(1), &[(10, "a1")])
        .with_items(query_for(2), &[(20, "b1")])
        .with_delay(query_for(2), Duration::from_secs(30))
        .with_items(query_for(3), &[(30, "c1")]);
    let tree = vec![leaf(1, "a"), leaf(2, "b"), leaf(3, "c")];

    let (flattener, _) = flattener(fetcher);
    let out = flattener
        .flatten_until(&tree, tokio::time::sleep(Duration::from_millis(200)))
        .await
        .unwrap();

    assert!(out.cancelled);
    assert_eq!(levels(&out.records), vec![(0, 1), (1, 10), (0, 2)]);
}

#[tokio::test]
async fn lookups_stay_within_bound() {
    let mut fetcher = ScriptedFacetFetcher::new();
    let tree: Vec<_> = (1..=20_i64).map(|id| leaf(id, "l")).collect();
    for id in 1..=20_i64 {
        fetcher = fetcher.with_delay(query_for(id), Duration::from_millis(15));
    }

    let (flattener, fetcher) =
        flattener_with(EngineConfig::new().with_max_in_flight(3), fetcher);
    let out = flattener.flatten(&tree).await.unwrap();

    assert_eq!(out.records.len(), 20);
    assert_eq!(fetcher.calls(), 20);
    assert!(fetcher.peak_in_flight() <= 3);
    assert_eq!(out.pool.workers, 3);
}

#[tokio::test]
async fn repeated_route_fetched_once() {
    let tree = vec![
        CategoryNode::new(10, "a", "/a", 1_i64, "cat=7"),
        CategoryNode::new(11, "b", "/b", 1_i64, "cat=7"),
    ];
    let (flattener, fetcher) = flattener(ScriptedFacetFetcher::new().with_items("cat=7", &[(70, "x")]));
    let out = flattener.flatten(&tree).await.unwrap();

    assert_eq!(levels(&out.records), vec![(0, 10), (1, 70), (0, 11), (1, 70)]);
    assert_eq!(out.records[3].parent_name(), Some("b"));
    assert_eq!(fetcher.calls_for("cat=7"), 1);
}

#[tokio::test]
async fn excluded_leaf_never_fetched() {
    let tree = vec![leaf(130_090, "redirect"), leaf(5, "plain")];
    let (flattener, fetcher) = flattener(ScriptedFacetFetcher::new().with_items(query_for(5), &[(50, "x")]));
    let out = flattener.flatten(&tree).await.unwrap();

    assert_eq!(levels(&out.records), vec![(0, 130_090), (0, 5), (1, 50)]);
    assert_eq!(fetcher.calls_for(&query_for(130_090)), 0);
    assert_eq!(out.stats.leaves_excluded, 1);
}

#[tokio::test]
async fn configured_exclusions_replace_default() {
    let tree = vec![leaf(130_090, "redirect"), leaf(5, "plain")];
    let exclusions: ExclusionSet = [5].into_iter().collect();
    let (flattener, fetcher) = flattener_with(
        EngineConfig::new().with_exclusions(exclusions),
        ScriptedFacetFetcher::new(),
    );
    flattener.flatten(&tree).await.unwrap();

    assert_eq!(fetcher.calls_for(&query_for(130_090)), 1);
    assert_eq!(fetcher.calls_for(&query_for(5)), 0);
}

#[tokio::test]
async fn malformed_items_skipped_others_kept() {
    let lookup = FacetLookup::Response(wbcat_model::FacetResponse::with_groups(vec![
        wbcat_model::FacetGroup::new(
            "Категория",
            vec![
                serde_json::json!({ "id": 1, "name": "ok" }),
                serde_json::json!({ "name": "no id" }),
                serde_json::json!({ "id": 3, "name": "also ok" }),
            ],
        ),
    ]));
    let (flattener, _) = flattener(ScriptedFacetFetcher::new().with_lookup(query_for(1), lookup));
    let out = flattener.flatten(&[leaf(1, "a")]).await.unwrap();

    assert_eq!(names(&out.records), vec!["a", "ok", "also ok"]);
    assert_eq!(out.stats.skipped(SkipKind::MalformedFacetItem), 1);
}

#[test]
fn zero_in_flight_rejected() {
    let fetcher = Arc::new(ScriptedFacetFetcher::new());
    let err = CatalogueFlattener::new(EngineConfig::new().with_max_in_flight(0), fetcher)
        .unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
}
