//! Category tree nodes
//!
//! Nodes are read leniently from the raw catalogue document: every field is
//! optional on the wire, and a field carrying the wrong JSON type is treated
//! as absent. Whether a node is usable is decided later by
//! [`CategoryNode::fields`].

use crate::error::{json_type, ModelError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Routing key used when a node carries no `shard`
pub const DEFAULT_SHARD: i64 = 99_999;

/// Wire key for child nodes
pub const CHILDREN_KEY: &str = "childs";

/// Accepted alias for [`CHILDREN_KEY`]
pub const CHILDREN_ALIAS: &str = "children";

/// Shard routing key
///
/// The live catalogue sends string tokens (`"men_clothes"`), older dumps and
/// fixtures send integers. Both render verbatim into the facet URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShardKey {
    /// Numeric shard
    Number(i64),
    /// Named shard
    Name(String),
}

impl ShardKey {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::String(s) => Some(Self::Name(s.clone())),
            _ => None,
        }
    }
}

impl Default for ShardKey {
    fn default() -> Self {
        Self::Number(DEFAULT_SHARD)
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Name(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ShardKey {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ShardKey {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

/// Child list of a node
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Children {
    /// No children key: the node is a leaf
    #[default]
    Absent,
    /// Children key holding an array (possibly empty)
    Nodes(Vec<CategoryNode>),
    /// Children key holding something that is not an array
    Malformed,
}

impl Children {
    /// Child nodes, if the key held an array
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> Option<&[CategoryNode]> {
        match self {
            Self::Nodes(nodes) => Some(nodes),
            Self::Absent | Self::Malformed => None,
        }
    }

    /// True if no children key was present
    #[inline]
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// One node of the category tree, as read from the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryNode {
    /// Display name
    pub name: Option<String>,
    /// Storefront URL path
    pub url: Option<String>,
    /// Facet API routing key
    pub shard: Option<ShardKey>,
    /// Facet API query fragment, e.g. `cat=8126`
    pub query: Option<String>,
    /// Category id
    pub id: Option<i64>,
    /// Child categories
    pub children: Children,
}

/// Borrowed view over a node whose required fields are all present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFields<'a> {
    /// Display name
    pub name: &'a str,
    /// Storefront URL path
    pub url: &'a str,
    /// Routing key, [`DEFAULT_SHARD`] when absent
    pub shard: ShardKey,
    /// Query fragment
    pub query: &'a str,
    /// Category id
    pub id: i64,
}

impl CategoryNode {
    /// Create a node with every required field set and no children
    #[must_use]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        url: impl Into<String>,
        shard: impl Into<ShardKey>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            shard: Some(shard.into()),
            query: Some(query.into()),
            id: Some(id),
            children: Children::Absent,
        }
    }

    /// With child nodes
    #[inline]
    #[must_use]
    pub fn with_children(mut self, children: Vec<CategoryNode>) -> Self {
        self.children = Children::Nodes(children);
        self
    }

    /// Build a node from a JSON value without failing
    ///
    /// Non-object values yield a node with no fields, which
    /// [`fields`](Self::fields) then rejects.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            name: string_field(obj, "name"),
            url: string_field(obj, "url"),
            shard: obj.get("shard").and_then(ShardKey::from_value),
            query: string_field(obj, "query"),
            id: obj.get("id").and_then(Value::as_i64),
            children: children_field(obj),
        }
    }

    /// Required fields, or the first one missing
    ///
    /// # Errors
    /// - `ModelError::MissingField` if `name`, `url`, `query` or `id` is absent
    /// - `ModelError::MalformedChildren` if the children key is not an array
    pub fn fields(&self) -> Result<NodeFields<'_>, ModelError> {
        let name = self.name.as_deref().ok_or(ModelError::MissingField("name"))?;
        let url = self.url.as_deref().ok_or(ModelError::MissingField("url"))?;
        let query = self.query.as_deref().ok_or(ModelError::MissingField("query"))?;
        let id = self.id.ok_or(ModelError::MissingField("id"))?;

        if matches!(self.children, Children::Malformed) {
            return Err(ModelError::MalformedChildren);
        }

        Ok(NodeFields {
            name,
            url,
            shard: self.shard.clone().unwrap_or_default(),
            query,
            id,
        })
    }

    /// True if the node carries no children key at all
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_absent()
    }

    /// Number of nodes in this subtree, including malformed ones
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .nodes()
            .map_or(0, |nodes| nodes.iter().map(Self::subtree_len).sum())
    }
}

impl<'de> Deserialize<'de> for CategoryNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Parse the catalogue root into its top-level nodes
///
/// # Errors
/// Returns `ModelError::NotAnArray` if the root is not a JSON array.
pub fn parse_catalogue(root: &Value) -> Result<Vec<CategoryNode>, ModelError> {
    match root {
        Value::Array(items) => Ok(items.iter().map(CategoryNode::from_value).collect()),
        other => Err(ModelError::NotAnArray {
            found: json_type(other),
        }),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn children_field(obj: &Map<String, Value>) -> Children {
    let raw = obj.get(CHILDREN_KEY).or_else(|| obj.get(CHILDREN_ALIAS));
    match raw {
        None => Children::Absent,
        Some(Value::Array(items)) => {
            Children::Nodes(items.iter().map(CategoryNode::from_value).collect())
        }
        Some(_) => Children::Malformed,
    }
}
