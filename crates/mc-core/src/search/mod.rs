//! Search DSL: queries, sorting, and request/response bodies.

pub mod fields;
pub mod query;
pub mod request;

pub use query::{BoolQuery, Query};
pub use request::{
    Dsl, IndexSearchRequest, IndexSearchResponse, SortItem, SortOrder, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
