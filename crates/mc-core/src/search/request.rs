//! Index search request and response bodies.

use super::query::Query;
use crate::model::Asset;
use serde::{Deserialize, Deserializer, Serialize};

/// Default page size for searches.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page the search endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortItem {
    pub field: String,
    pub order: SortOrder,
}

impl SortItem {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

impl Serialize for SortItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::json!({ &self.field: { "order": self.order } }).serialize(serializer)
    }
}

/// Query plus paging and sorting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dsl {
    pub from: u32,
    pub size: u32,
    pub query: Query,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortItem>,
    pub track_total_hits: bool,
}

/// Body of an index search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSearchRequest {
    pub dsl: Dsl,
    /// Attributes to include on each result.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    /// Attributes to include on each related asset in the results.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub relation_attributes: Vec<String>,
    /// Suppress relationship expansion unless attributes ask for it.
    pub suppress_logs: bool,
}

impl IndexSearchRequest {
    /// Request for a single page of results.
    pub fn new(query: Query, from: u32, size: u32) -> Self {
        Self {
            dsl: Dsl {
                from,
                size: size.min(MAX_PAGE_SIZE),
                query,
                sort: Vec::new(),
                track_total_hits: true,
            },
            attributes: Vec::new(),
            relation_attributes: Vec::new(),
            suppress_logs: true,
        }
    }
}

/// Body returned by an index search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSearchResponse {
    #[serde(default)]
    pub approximate_count: u64,
    #[serde(default, deserialize_with = "entities_or_empty")]
    pub entities: Vec<Asset>,
}

fn entities_or_empty<'de, D>(deserializer: D) -> Result<Vec<Asset>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Asset>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_json() {
        let mut request = IndexSearchRequest::new(Query::term("__guid", "g-1"), 0, 1000);
        request.dsl.sort.push(SortItem::asc("__guid"));
        request.attributes.push("description".to_string());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["dsl"]["size"], json!(MAX_PAGE_SIZE));
        assert_eq!(value["dsl"]["sort"], json!([{"__guid": {"order": "asc"}}]));
        assert_eq!(value["attributes"], json!(["description"]));
        assert!(value.get("relationAttributes").is_none());
    }

    #[test]
    fn test_response_with_null_entities() {
        let response: IndexSearchResponse =
            serde_json::from_value(json!({"approximateCount": 0, "entities": null})).unwrap();
        assert!(response.entities.is_empty());
    }
}
