//! Error types for the catalogue data model
//!
//! Covers the two ways a raw document can disappoint us:
//! - a node or facet item lacks a field we need
//! - the document root is not the shape we can walk

/// Model errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Required field absent (or present with the wrong JSON type)
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// `childs` present but not an array
    #[error("children field is not an array")]
    MalformedChildren,

    /// Catalogue root must be a JSON array of nodes
    #[error("catalogue root is not an array (found {found})")]
    NotAnArray {
        /// JSON type that was found instead
        found: &'static str,
    },
}

impl ModelError {
    /// Name of the offending field, if this is a field error
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field) => Some(field),
            Self::MalformedChildren => Some("childs"),
            Self::NotAnArray { .. } => None,
        }
    }
}

/// Human-readable JSON type name, used in diagnostics
pub(crate) fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
