//! Error types for the flattening engine
//!
//! Two tiers:
//! - [`EngineError`]: conditions that end the run and reach the caller
//! - [`SkipKind`] / [`Diagnostic`]: isolated failures that skip one item,
//!   one leaf's augmentation, or one subtree, and are reported alongside the
//!   result

use serde::Serialize;
use std::fmt;
use wbcat_source::FetchError;

/// Fatal engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Transport reported a non-recoverable condition
    #[error("facet transport failed at leaf {leaf_id}: {source}")]
    Transport {
        /// Leaf whose lookup hit the failure
        leaf_id: i64,
        /// Underlying transport error
        #[source]
        source: FetchError,
    },

    /// An augmentation worker stopped without reporting
    #[error("augmentation worker failed: {0}")]
    Worker(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Check if the error came from the network transport
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Isolated failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SkipKind {
    /// Category node missing a required field; node and subtree skipped
    MalformedNode,
    /// Connection dropped during a facet lookup; leaf not augmented
    TransientNetworkFailure,
    /// Facet response not in the expected form; leaf not augmented
    UnexpectedResponseShape,
    /// No category-type facet group; leaf not augmented
    NoMatchingFacet,
    /// Facet item missing `id` or `name`; item skipped
    MalformedFacetItem,
}

impl SkipKind {
    /// All kinds, in report order
    pub const ALL: [SkipKind; 5] = [
        Self::MalformedNode,
        Self::TransientNetworkFailure,
        Self::UnexpectedResponseShape,
        Self::NoMatchingFacet,
        Self::MalformedFacetItem,
    ];

    /// Expected outcomes are not failures and log at debug level
    #[inline]
    #[must_use]
    pub fn is_expected(self) -> bool {
        matches!(self, Self::NoMatchingFacet)
    }

    /// Stable snake-case label for logs and summaries
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedNode => "malformed_node",
            Self::TransientNetworkFailure => "transient_network_failure",
            Self::UnexpectedResponseShape => "unexpected_response_shape",
            Self::NoMatchingFacet => "no_matching_facet",
            Self::MalformedFacetItem => "malformed_facet_item",
        }
    }
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Note describing one isolated skip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What was skipped
    pub kind: SkipKind,
    /// Node the skip belongs to, when known
    pub node_id: Option<i64>,
    /// Node name, when known
    pub node_name: Option<String>,
    /// Free-form detail
    pub detail: String,
}

impl Diagnostic {
    /// Create new diagnostic
    #[inline]
    #[must_use]
    pub fn new(kind: SkipKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            node_id: None,
            node_name: None,
            detail: detail.into(),
        }
    }

    /// Attach the node
    #[inline]
    #[must_use]
    pub fn at_node(mut self, id: Option<i64>, name: Option<&str>) -> Self {
        self.node_id = id;
        self.node_name = name.map(str::to_string);
        self
    }

    /// Emit through tracing at the level the kind warrants
    pub fn log(&self) {
        if self.kind.is_expected() {
            tracing::debug!(
                kind = %self.kind,
                id = ?self.node_id,
                name = ?self.node_name,
                "{}",
                self.detail
            );
        } else {
            tracing::warn!(
                kind = %self.kind,
                id = ?self.node_id,
                name = ?self.node_name,
                "{}",
                self.detail
            );
        }
    }
}
