//! Pipeline stages
//!
//! catalogue cache → flattener → export, each stage usable on its own so
//! the `fetch` and `flatten` commands can stop early.

use crate::config::Settings;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fmt;
use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wbcat_engine::{CatalogueFlattener, Flattened, RunStats, SkipKind};
use wbcat_export::{ExportSummary, WorkbookExporter};
use wbcat_http::{HttpCatalogueDownloader, HttpFacetFetcher};
use wbcat_model::{CategoryNode, FlatRecord};
use wbcat_source::{CacheStatus, CatalogueDownloader, DailyCatalogueCache, FacetFetcher};

/// Catalogue as loaded from the cache
#[derive(Debug)]
pub struct LoadedCatalogue {
    /// Cache file
    pub path: PathBuf,
    /// Whether the file was downloaded in this run
    pub status: CacheStatus,
    /// Top-level nodes
    pub nodes: Vec<CategoryNode>,
}

/// Runs the pipeline stages with one set of settings
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: Settings,
}

impl Pipeline {
    /// Create pipeline
    #[inline]
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Get settings
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Storefront transport sharing one HTTP client
    ///
    /// # Errors
    /// Fails if the configured headers are invalid.
    pub fn http_transport(&self) -> Result<(HttpCatalogueDownloader, HttpFacetFetcher)> {
        let client = self
            .settings
            .http
            .build_client()
            .context("cannot build HTTP client")?;
        let downloader = HttpCatalogueDownloader::new(client.clone(), &self.settings.catalogue.url);
        let fetcher = HttpFacetFetcher::new(client, self.settings.facets.clone());
        Ok((downloader, fetcher))
    }

    /// Bring the cached catalogue up to date and parse it
    ///
    /// # Errors
    /// Fails if the document cannot be downloaded, stored, or parsed.
    pub async fn load_catalogue<D>(&self, downloader: D, refresh: bool) -> Result<LoadedCatalogue>
    where
        D: CatalogueDownloader,
    {
        let cache = DailyCatalogueCache::new(downloader, &self.settings.catalogue.cache_path)
            .with_force_refresh(refresh);
        let status = cache
            .ensure_current()
            .await
            .context("catalogue unavailable")?;
        let nodes = cache.read().await.context("cannot read cached catalogue")?;

        tracing::info!(
            path = %cache.path().display(),
            ?status,
            top_level = nodes.len(),
            "catalogue loaded"
        );
        Ok(LoadedCatalogue {
            path: cache.path().to_path_buf(),
            status,
            nodes,
        })
    }

    /// Flatten the tree until done or cancelled
    ///
    /// # Errors
    /// Fails on fatal engine errors.
    pub async fn flatten<C>(
        &self,
        fetcher: Arc<dyn FacetFetcher>,
        tree: &[CategoryNode],
        cancel: C,
    ) -> Result<Flattened>
    where
        C: Future<Output = ()>,
    {
        let flattener = CatalogueFlattener::new(self.settings.engine.clone(), fetcher)
            .context("invalid engine settings")?;
        let flattened = flattener
            .flatten_until(tree, cancel)
            .await
            .context("flattening failed")?;
        if let Some(memo) = flattener.memo_stats() {
            tracing::debug!(
                cached = memo.entry_count,
                upstream_calls = memo.upstream_calls,
                "facet memo"
            );
        }
        Ok(flattened)
    }

    /// Write the workbook dated `date`
    ///
    /// # Errors
    /// Fails on export I/O errors.
    pub fn export(&self, records: &[FlatRecord], indent: bool, date: NaiveDate) -> Result<ExportSummary> {
        let options = self.settings.export.clone().with_indent(indent);
        WorkbookExporter::new(options)
            .export_on(records, date)
            .context("export failed")
    }

    /// Export a flattening run; a cancelled run with no records writes nothing
    ///
    /// # Errors
    /// Same as [`export`](Self::export).
    pub fn export_run(
        &self,
        flattened: &Flattened,
        indent: bool,
        date: NaiveDate,
    ) -> Result<Option<ExportSummary>> {
        if flattened.cancelled && flattened.records.is_empty() {
            tracing::warn!("cancelled before any record was flattened, skipping export");
            return Ok(None);
        }
        self.export(&flattened.records, indent, date).map(Some)
    }
}

/// Write records as pretty JSON to `path`, or stdout if `None`
///
/// # Errors
/// Fails on serialisation or I/O errors.
pub fn write_json(path: Option<&Path>, records: &[FlatRecord]) -> Result<()> {
    let body = serde_json::to_string_pretty(records).context("cannot serialise records")?;
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create {}", parent.display()))?;
            }
            fs::write(path, body).with_context(|| format!("cannot write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{body}").context("cannot write to stdout")
        }
    }
}

/// Run summary printed on completion
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub catalogue: PathBuf,
    pub status: CacheStatus,
    pub stats: RunStats,
    pub export: Option<ExportSummary>,
    pub json: Option<PathBuf>,
    pub cancelled: bool,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            CacheStatus::Fresh => "cached today",
            CacheStatus::Downloaded => "downloaded",
        };
        writeln!(f, "Catalogue: {} ({status})", self.catalogue.display())?;
        writeln!(
            f,
            "Records: {} ({} categories, {} facet values)",
            self.stats.total_records(),
            self.stats.category_records,
            self.stats.facet_records
        )?;
        writeln!(
            f,
            "Leaves: {} looked up, {} completed, {} excluded",
            self.stats.leaves_dispatched, self.stats.leaves_completed, self.stats.leaves_excluded
        )?;

        let skips: Vec<_> = SkipKind::ALL
            .into_iter()
            .map(|kind| (kind, self.stats.skipped(kind)))
            .filter(|(_, n)| *n > 0)
            .map(|(kind, n)| format!("{kind}={n}"))
            .collect();
        if skips.is_empty() {
            writeln!(f, "Skipped: none")?;
        } else {
            writeln!(f, "Skipped: {}", skips.join(" "))?;
        }

        if let Some(export) = &self.export {
            writeln!(
                f,
                "Export: {} ({} sheets, {} rows)",
                export.path.display(),
                export.sheets.len(),
                export.rows
            )?;
        }
        if let Some(json) = &self.json {
            writeln!(f, "JSON: {}", json.display())?;
        }
        if self.cancelled {
            if self.export.is_none() && self.stats.total_records() == 0 {
                writeln!(f, "Cancelled: nothing was flattened, no export written")?;
            } else {
                writeln!(f, "Cancelled: output is partial")?;
            }
        }
        Ok(())
    }
}
