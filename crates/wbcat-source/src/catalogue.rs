//! Catalogue acquisition with a once-per-day disk cache
//!
//! The raw tree is a single large JSON document. A local copy is kept and
//! only replaced when it was last written before today (local calendar
//! date), when it is missing, or when a refresh is forced.

use crate::error::SourceError;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use wbcat_model::{parse_catalogue, CategoryNode};

/// Downloads the raw catalogue document
#[async_trait]
pub trait CatalogueDownloader: Send + Sync {
    /// Fetch the full tree document
    async fn download(&self) -> Result<Value, SourceError>;
}

#[async_trait]
impl<D: CatalogueDownloader + ?Sized> CatalogueDownloader for std::sync::Arc<D> {
    async fn download(&self) -> Result<Value, SourceError> {
        (**self).download().await
    }
}

/// Supplies the category tree
#[async_trait]
pub trait CatalogueSource: Send + Sync {
    /// Load top-level nodes
    async fn load(&self) -> Result<Vec<CategoryNode>, SourceError>;
}

/// How the cached document was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Existing file was current
    Fresh,
    /// File was missing, stale or refresh was forced
    Downloaded,
}

/// Disk-backed catalogue cache refreshed once per calendar day
#[derive(Debug, Clone)]
pub struct DailyCatalogueCache<D> {
    downloader: D,
    path: PathBuf,
    force_refresh: bool,
}

impl<D: CatalogueDownloader> DailyCatalogueCache<D> {
    /// Create cache storing the document at `path`
    #[inline]
    #[must_use]
    pub fn new(downloader: D, path: impl Into<PathBuf>) -> Self {
        Self {
            downloader,
            path: path.into(),
            force_refresh: false,
        }
    }

    /// Always download, ignoring the existing file
    #[inline]
    #[must_use]
    pub fn with_force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Location of the cached document
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the cached document is current, downloading if needed
    ///
    /// # Errors
    /// - `SourceError::Download` if a fresh copy was needed and failed
    /// - `SourceError::Malformed` if the downloaded root is not an array; the
    ///   cached file is left untouched
    /// - `SourceError::Io` if the file cannot be inspected or written
    pub async fn ensure_current(&self) -> Result<CacheStatus, SourceError> {
        self.ensure_current_on(Local::now().date_naive()).await
    }

    /// [`ensure_current`](Self::ensure_current) against an explicit "today"
    ///
    /// # Errors
    /// Same as [`ensure_current`](Self::ensure_current).
    pub async fn ensure_current_on(&self, today: NaiveDate) -> Result<CacheStatus, SourceError> {
        if !self.force_refresh {
            if let Some(modified) = self.modified().await? {
                if !is_stale(modified, today) {
                    tracing::debug!(path = %self.path.display(), "catalogue cache is current");
                    return Ok(CacheStatus::Fresh);
                }
            }
        }

        tracing::info!(path = %self.path.display(), "downloading catalogue");
        let document = self.downloader.download().await?;
        parse_catalogue(&document)?;
        self.write(&document).await?;
        Ok(CacheStatus::Downloaded)
    }

    /// Read and parse the cached document
    ///
    /// # Errors
    /// - `SourceError::Io` / `SourceError::InvalidJson` on a bad file
    /// - `SourceError::Malformed` if the root is not an array
    pub async fn read(&self) -> Result<Vec<CategoryNode>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::io_error(&self.path, e))?;
        let root: Value =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::invalid_json(&self.path, e))?;
        Ok(parse_catalogue(&root)?)
    }

    async fn modified(&self) -> Result<Option<SystemTime>, SourceError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta
                .modified()
                .map(Some)
                .map_err(|e| SourceError::io_error(&self.path, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SourceError::io_error(&self.path, e)),
        }
    }

    async fn write(&self, document: &Value) -> Result<(), SourceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SourceError::io_error(parent, e))?;
        }

        let pretty = serde_json::to_vec_pretty(document)
            .map_err(|e| SourceError::invalid_json(&self.path, e))?;
        tokio::fs::write(&self.path, pretty)
            .await
            .map_err(|e| SourceError::io_error(&self.path, e))
    }
}

#[async_trait]
impl<D: CatalogueDownloader> CatalogueSource for DailyCatalogueCache<D> {
    async fn load(&self) -> Result<Vec<CategoryNode>, SourceError> {
        self.ensure_current().await?;
        self.read().await
    }
}

/// True if a file written at `modified` predates `today`
#[must_use]
pub fn is_stale(modified: SystemTime, today: NaiveDate) -> bool {
    DateTime::<Local>::from(modified).date_naive() < today
}
