//! Query DSL for the catalog's index search.
//!
//! Queries serialise to the Elasticsearch-style JSON the search endpoint accepts.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// A search query clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Exact match on a keyword field.
    Term { field: String, value: Value },
    /// Exact match against any of several values.
    Terms { field: String, values: Vec<Value> },
    /// Keyword field starts with a prefix.
    Prefix { field: String, value: String },
    /// Full-text match on an analysed field.
    Match { field: String, query: String },
    /// Field has a non-null value.
    Exists { field: String },
    /// Numeric or date range; unset bounds are open.
    Range {
        field: String,
        gt: Option<Value>,
        gte: Option<Value>,
        lt: Option<Value>,
        lte: Option<Value>,
    },
    /// Boolean combination of clauses.
    Bool(BoolQuery),
}

/// Boolean query clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub must_not: Vec<Query>,
    pub should: Vec<Query>,
    pub filter: Vec<Query>,
    pub minimum_should_match: Option<u32>,
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Query::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Prefix {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(field: impl Into<String>, query: impl Into<String>) -> Self {
        Query::Match {
            field: field.into(),
            query: query.into(),
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Query::Exists {
            field: field.into(),
        }
    }

    /// Range with inclusive lower bound and exclusive upper bound.
    pub fn between(field: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Query::Range {
            field: field.into(),
            gt: None,
            gte: Some(from.into()),
            lt: Some(to.into()),
            lte: None,
        }
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Range {
            field: field.into(),
            gt: Some(value.into()),
            gte: None,
            lt: None,
            lte: None,
        }
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Range {
            field: field.into(),
            gt: None,
            gte: None,
            lt: Some(value.into()),
            lte: None,
        }
    }

    /// All clauses must match (non-scoring).
    pub fn all(clauses: Vec<Query>) -> Self {
        Query::Bool(BoolQuery {
            filter: clauses,
            ..Default::default()
        })
    }

    /// At least one clause must match.
    pub fn any(clauses: Vec<Query>) -> Self {
        Query::Bool(BoolQuery {
            should: clauses,
            minimum_should_match: Some(1),
            ..Default::default()
        })
    }

    /// The clause must not match.
    pub fn not(clause: Query) -> Self {
        Query::Bool(BoolQuery {
            must_not: vec![clause],
            ..Default::default()
        })
    }

    /// Converts the query to its JSON representation.
    pub fn to_json(&self) -> Value {
        match self {
            Query::Term { field, value } => json!({"term": {field: {"value": value}}}),
            Query::Terms { field, values } => json!({"terms": {field: values}}),
            Query::Prefix { field, value } => json!({"prefix": {field: {"value": value}}}),
            Query::Match { field, query } => json!({"match": {field: {"query": query}}}),
            Query::Exists { field } => json!({"exists": {"field": field}}),
            Query::Range {
                field,
                gt,
                gte,
                lt,
                lte,
            } => {
                let mut bounds = Map::new();
                for (key, bound) in [("gt", gt), ("gte", gte), ("lt", lt), ("lte", lte)] {
                    if let Some(v) = bound {
                        bounds.insert(key.to_string(), v.clone());
                    }
                }
                json!({"range": {field: bounds}})
            }
            Query::Bool(b) => {
                let mut body = Map::new();
                for (key, clauses) in [
                    ("must", &b.must),
                    ("must_not", &b.must_not),
                    ("should", &b.should),
                    ("filter", &b.filter),
                ] {
                    if !clauses.is_empty() {
                        body.insert(
                            key.to_string(),
                            Value::Array(clauses.iter().map(Query::to_json).collect()),
                        );
                    }
                }
                if let Some(min) = b.minimum_should_match {
                    body.insert("minimum_should_match".to_string(), json!(min));
                }
                json!({ "bool": body })
            }
        }
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_json() {
        assert_eq!(
            Query::term("__typeName.keyword", "Table").to_json(),
            json!({"term": {"__typeName.keyword": {"value": "Table"}}})
        );
    }

    #[test]
    fn test_range_json_omits_open_bounds() {
        assert_eq!(
            Query::gt("__modificationTimestamp", 1700000000000i64).to_json(),
            json!({"range": {"__modificationTimestamp": {"gt": 1700000000000i64}}})
        );
    }

    #[test]
    fn test_bool_json() {
        let q = Query::Bool(BoolQuery {
            filter: vec![Query::term("__state", "ACTIVE")],
            must_not: vec![Query::exists("certificateStatus")],
            should: vec![
                Query::prefix("qualifiedName", "default/snowflake"),
                Query::terms("__traitNames", ["PII", "Confidential"]),
            ],
            minimum_should_match: Some(1),
            ..Default::default()
        });
        assert_eq!(
            q.to_json(),
            json!({"bool": {
                "must_not": [{"exists": {"field": "certificateStatus"}}],
                "should": [
                    {"prefix": {"qualifiedName": {"value": "default/snowflake"}}},
                    {"terms": {"__traitNames": ["PII", "Confidential"]}}
                ],
                "filter": [{"term": {"__state": {"value": "ACTIVE"}}}],
                "minimum_should_match": 1
            }})
        );
    }
}
