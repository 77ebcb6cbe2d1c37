//! Error types for the source boundary
//!
//! - [`SourceError`]: the catalogue document could not be obtained or read
//! - [`FetchError`]: a transport condition that must stop the whole run

use std::path::PathBuf;
use wbcat_model::ModelError;

/// Errors while obtaining the catalogue tree
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// IO error on the cached document
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cached document is not valid JSON
    #[error("invalid json in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Document is JSON but not a category tree
    #[error("malformed catalogue: {0}")]
    Malformed(#[from] ModelError),

    /// Download of a fresh copy failed
    #[error("catalogue download failed: {0}")]
    Download(String),
}

impl SourceError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create JSON error for path
    pub fn invalid_json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            path: path.into(),
            source,
        }
    }
}

/// Non-recoverable transport failures during facet lookups
///
/// Anything recoverable is reported as a [`FacetLookup`](crate::FacetLookup)
/// variant instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Host could not be reached at all
    #[error("facet host unreachable: {0}")]
    Unreachable(String),

    /// Client could not be built or request could not be formed
    #[error("facet transport error: {0}")]
    Transport(String),
}
