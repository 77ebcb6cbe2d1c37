//! Testing utilities for wbcat workspace
//!
//! Shared stub fetchers, tree builders, and record helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wbcat_model::{CategoryNode, FacetGroup, FacetResponse, FlatRecord, CATEGORY_FACET_LABEL};
use wbcat_source::{CatalogueDownloader, FacetFetcher, FacetLookup, FacetRequest, FetchError, SourceError};

/// Leaf without children
pub fn leaf(id: i64, name: &str) -> CategoryNode {
    CategoryNode::new(id, name, format!("/{id}"), id, format!("q{id}"))
}

/// Node with children
pub fn branch(id: i64, name: &str, children: Vec<CategoryNode>) -> CategoryNode {
    leaf(id, name).with_children(children)
}

/// Node missing its `url`
pub fn malformed(id: i64, name: &str) -> CategoryNode {
    let mut node = leaf(id, name);
    node.url = None;
    node
}

/// Query a [`leaf`] with this id is routed with
pub fn query_for(id: i64) -> String {
    format!("q{id}")
}

/// Response whose first group is the category facet
pub fn category_response(items: &[(i64, &str)]) -> FacetResponse {
    let items = items
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    FacetResponse::with_groups(vec![FacetGroup::new(CATEGORY_FACET_LABEL, items)])
}

/// Response whose first group is some other facet
pub fn brand_response() -> FacetResponse {
    FacetResponse::with_groups(vec![FacetGroup::new(
        "Бренд",
        vec![json!({ "id": 1, "name": "brand" })],
    )])
}

/// Names of records, in order
pub fn names(records: &[FlatRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

/// `(level, id)` of records, in order
pub fn levels(records: &[FlatRecord]) -> Vec<(u32, i64)> {
    records.iter().map(|r| (r.level, r.id)).collect()
}

#[derive(Debug, Clone)]
struct Script {
    outcome: Result<FacetLookup, FetchError>,
    delay: Option<Duration>,
}

/// Facet fetcher answering from a per-query script
///
/// Unscripted queries get a response with no facet groups.
#[derive(Debug, Default)]
pub struct ScriptedFacetFetcher {
    scripts: HashMap<String, Script>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedFacetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with a category facet holding `items`
    #[must_use]
    pub fn with_items(self, query: impl Into<String>, items: &[(i64, &str)]) -> Self {
        self.with_lookup(query, FacetLookup::Response(category_response(items)))
    }

    /// Answer `query` with `lookup`
    #[must_use]
    pub fn with_lookup(mut self, query: impl Into<String>, lookup: FacetLookup) -> Self {
        self.script(query.into(), Ok(lookup));
        self
    }

    /// Fail `query` with a transport error
    #[must_use]
    pub fn with_error(mut self, query: impl Into<String>, error: FetchError) -> Self {
        self.script(query.into(), Err(error));
        self
    }

    /// Delay the answer for `query`
    #[must_use]
    pub fn with_delay(mut self, query: impl Into<String>, delay: Duration) -> Self {
        self.scripts
            .entry(query.into())
            .or_insert_with(|| Script {
                outcome: Ok(FacetLookup::Response(FacetResponse::default())),
                delay: None,
            })
            .delay = Some(delay);
        self
    }

    /// Total calls
    pub fn calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// Calls for one query
    pub fn calls_for(&self, query: &str) -> usize {
        self.calls.lock().get(query).copied().unwrap_or(0)
    }

    /// Highest number of concurrent calls seen
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn script(&mut self, query: String, outcome: Result<FacetLookup, FetchError>) {
        let delay = self.scripts.get(&query).and_then(|s| s.delay);
        self.scripts.insert(query, Script { outcome, delay });
    }
}

#[async_trait]
impl FacetFetcher for ScriptedFacetFetcher {
    async fn fetch(&self, request: &FacetRequest) -> Result<FacetLookup, FetchError> {
        *self.calls.lock().entry(request.query.clone()).or_default() += 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts.get(&request.query).cloned();
        let delay = script.as_ref().and_then(|s| s.delay);
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        script.map_or_else(
            || Ok(FacetLookup::Response(FacetResponse::default())),
            |script| script.outcome,
        )
    }
}

/// Catalogue downloader returning a fixed document and counting calls
#[derive(Debug)]
pub struct FixedDownloader {
    document: Value,
    calls: AtomicUsize,
}

impl FixedDownloader {
    pub fn new(document: Value) -> Self {
        Self {
            document,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogueDownloader for FixedDownloader {
    async fn download(&self) -> Result<Value, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.document.clone())
    }
}
