//! Facet lookup responses
//!
//! Only the part of the filters payload the flattener reads is modelled:
//! `data.filters[*].name` and `data.filters[*].items`. Groups are read
//! leniently, like catalogue nodes: a field of the wrong JSON type is treated
//! as absent, so a broken group never spoils the decode of the others. Items
//! stay as raw JSON for the same reason.

use crate::error::ModelError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Label the storefront uses for its sub-category facet
pub const CATEGORY_FACET_LABEL: &str = "Категория";

/// Decoded body of a filters request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetResponse {
    /// Payload, absent on some error bodies
    #[serde(default)]
    pub data: Option<FacetData>,
}

/// Payload of a filters response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetData {
    /// Facet groups in API order; `None` unless the wire held an array
    #[serde(default, deserialize_with = "lenient_groups")]
    pub filters: Option<Vec<FacetGroup>>,
}

/// One facet group, e.g. brand, colour, sub-category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FacetGroup {
    /// Group label
    pub name: Option<String>,
    /// Raw group entries, empty unless the wire held an array
    pub items: Vec<Value>,
}

/// A facet entry with both fields present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetItem {
    /// Item id
    pub id: i64,
    /// Item name
    pub name: String,
}

impl FacetResponse {
    /// Response with the given groups
    #[must_use]
    pub fn with_groups(groups: Vec<FacetGroup>) -> Self {
        Self {
            data: Some(FacetData {
                filters: Some(groups),
            }),
        }
    }

    /// First facet group, if any
    #[inline]
    #[must_use]
    pub fn first_group(&self) -> Option<&FacetGroup> {
        self.data
            .as_ref()
            .and_then(|data| data.filters.as_deref())
            .and_then(<[FacetGroup]>::first)
    }
}

impl FacetGroup {
    /// Read a group from raw JSON; never fails
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: value.get("name").and_then(Value::as_str).map(str::to_string),
            items: value
                .get("items")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        }
    }

    /// Group with a label and raw items
    #[must_use]
    pub fn new(name: impl Into<String>, items: Vec<Value>) -> Self {
        Self {
            name: Some(name.into()),
            items,
        }
    }

    /// True if the group label equals `label`
    #[inline]
    #[must_use]
    pub fn is_labeled(&self, label: &str) -> bool {
        self.name.as_deref() == Some(label)
    }

    /// Items in order, each either parsed or rejected
    pub fn parsed_items(&self) -> impl Iterator<Item = Result<FacetItem, ModelError>> + '_ {
        self.items.iter().map(FacetItem::from_value)
    }
}

impl<'de> Deserialize<'de> for FacetGroup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

fn lenient_groups<'de, D>(deserializer: D) -> Result<Option<Vec<FacetGroup>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|groups| groups.iter().map(FacetGroup::from_value).collect()))
}

impl FacetItem {
    /// Parse one facet entry
    ///
    /// # Errors
    /// Returns `ModelError::MissingField` if `id` or `name` is absent or mistyped.
    pub fn from_value(value: &Value) -> Result<Self, ModelError> {
        let id = value
            .get("id")
            .and_then(Value::as_i64)
            .ok_or(ModelError::MissingField("id"))?;
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or(ModelError::MissingField("name"))?;

        Ok(Self {
            id,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_group_from_wire() {
        let response: FacetResponse = serde_json::from_value(json!({
            "data": { "filters": [
                { "name": "Категория", "key": "xsubject", "items": [{ "id": 9, "name": "X" }] },
                { "name": "Бренд", "items": [] }
            ]}
        }))
        .unwrap();

        let group = response.first_group().unwrap();
        assert!(group.is_labeled(CATEGORY_FACET_LABEL));
        let items: Vec<_> = group.parsed_items().collect();
        assert_eq!(items, vec![Ok(FacetItem { id: 9, name: "X".to_string() })]);
    }

    #[test]
    fn absent_groups() {
        let empty: FacetResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.first_group().is_none());

        let null_filters: FacetResponse =
            serde_json::from_value(json!({ "data": { "filters": null } })).unwrap();
        assert!(null_filters.first_group().is_none());

        assert!(FacetResponse::with_groups(vec![]).first_group().is_none());
    }

    #[test]
    fn broken_later_groups_keep_first() {
        let response: FacetResponse = serde_json::from_str(
            r#"{"data":{"filters":[
                {"name":"Категория","items":[{"id":9,"name":"X"}]},
                {"name":"Цена","items":null},
                {"name":5,"items":[]},
                "junk"
            ]}}"#,
        )
        .unwrap();

        let groups = response.data.as_ref().and_then(|d| d.filters.as_ref()).unwrap();
        assert_eq!(groups.len(), 4);
        assert!(groups[1].items.is_empty());
        assert_eq!(groups[2].name, None);
        assert_eq!(groups[3], FacetGroup::default());

        let first = response.first_group().unwrap();
        assert!(first.is_labeled(CATEGORY_FACET_LABEL));
        assert_eq!(first.parsed_items().count(), 1);
    }

    #[test]
    fn mistyped_filters_read_as_absent() {
        let response: FacetResponse =
            serde_json::from_value(json!({ "data": { "filters": "none" } })).unwrap();
        assert!(response.first_group().is_none());
    }

    #[test]
    fn bad_item_does_not_spoil_siblings() {
        let group = FacetGroup::new(
            CATEGORY_FACET_LABEL,
            vec![json!({ "id": 1 }), json!({ "id": 2, "name": "ok" }), json!("junk")],
        );

        let items: Vec<_> = group.parsed_items().collect();
        assert_eq!(items[0], Err(ModelError::MissingField("name")));
        assert_eq!(items[1], Ok(FacetItem { id: 2, name: "ok".to_string() }));
        assert_eq!(items[2], Err(ModelError::MissingField("id")));
    }
}
