//! Fluent builder over the index search.
//!
//! A search starts scoped to one asset type (or every type carrying a
//! capability) and, unless archived assets are requested, to active assets.
//! Criteria are then layered on before running it one page at a time or to
//! exhaustion.

use crate::traits::CatalogClient;
use mc_core::search::{fields, BoolQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use mc_core::{
    Asset, AssetType, CatalogResult, Capability, EntityStatus, IndexSearchRequest,
    IndexSearchResponse, Query, SortItem,
};
use tracing::debug;

/// Search under construction.
#[derive(Clone)]
pub struct FluentSearch<'a> {
    client: &'a dyn CatalogClient,
    scope: Query,
    include_archived: bool,
    wheres: Vec<Query>,
    where_nots: Vec<Query>,
    where_somes: Vec<Query>,
    min_somes: u32,
    page_size: u32,
    sorts: Vec<SortItem>,
    include_on_results: Vec<String>,
    include_on_relations: Vec<String>,
}

impl<'a> FluentSearch<'a> {
    fn scoped(client: &'a dyn CatalogClient, scope: Query, include_archived: bool) -> Self {
        Self {
            client,
            scope,
            include_archived,
            wheres: Vec::new(),
            where_nots: Vec::new(),
            where_somes: Vec::new(),
            min_somes: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sorts: Vec::new(),
            include_on_results: Vec::new(),
            include_on_relations: Vec::new(),
        }
    }

    /// Search over assets of one type.
    pub fn for_type(
        client: &'a dyn CatalogClient,
        asset_type: &AssetType,
        include_archived: bool,
    ) -> Self {
        Self::scoped(
            client,
            Query::term(fields::TYPE_NAME, asset_type.name),
            include_archived,
        )
    }

    /// Search over every type carrying `capability`.
    pub fn with_capability(
        client: &'a dyn CatalogClient,
        capability: Capability,
        include_archived: bool,
    ) -> Self {
        let names = mc_core::registry::types_with(capability)
            .into_iter()
            .map(|t| t.name);
        Self::scoped(
            client,
            Query::terms(fields::TYPE_NAME, names),
            include_archived,
        )
    }

    /// Adds a criterion every result must match.
    pub fn where_(mut self, query: Query) -> Self {
        self.wheres.push(query);
        self
    }

    /// Adds a criterion no result may match.
    pub fn where_not(mut self, query: Query) -> Self {
        self.where_nots.push(query);
        self
    }

    /// Adds an optional criterion; see [`FluentSearch::min_somes`].
    pub fn where_some(mut self, query: Query) -> Self {
        self.where_somes.push(query);
        self
    }

    /// How many `where_some` criteria a result must match (default 1).
    pub fn min_somes(mut self, min: u32) -> Self {
        self.min_somes = min;
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn sort(mut self, item: SortItem) -> Self {
        self.sorts.push(item);
        self
    }

    /// Attribute to include on each result.
    pub fn include_on_results(mut self, attribute: impl Into<String>) -> Self {
        self.include_on_results.push(attribute.into());
        self
    }

    /// Attribute to include on each related asset of each result.
    pub fn include_on_relations(mut self, attribute: impl Into<String>) -> Self {
        self.include_on_relations.push(attribute.into());
        self
    }

    /// Builds the request for the first page.
    pub fn to_request(&self) -> IndexSearchRequest {
        self.request_from(0)
    }

    fn request_from(&self, from: u32) -> IndexSearchRequest {
        let mut filter = vec![self.scope.clone()];
        if !self.include_archived {
            filter.push(Query::term(
                fields::STATE,
                EntityStatus::Active.to_string(),
            ));
        }
        filter.extend(self.wheres.iter().cloned());

        let query = Query::Bool(BoolQuery {
            filter,
            must_not: self.where_nots.clone(),
            should: self.where_somes.clone(),
            minimum_should_match: (!self.where_somes.is_empty()).then_some(self.min_somes.max(1)),
            ..Default::default()
        });

        let mut request = IndexSearchRequest::new(query, from, self.page_size);
        request.dsl.sort = self.sorts.clone();
        // Stable paging needs a total order
        if !request.dsl.sort.iter().any(|s| s.field == fields::GUID) {
            request.dsl.sort.push(SortItem::asc(fields::GUID));
        }
        request.attributes = self.include_on_results.clone();
        request.relation_attributes = self.include_on_relations.clone();
        request
    }

    /// Number of matching assets, as estimated by the index.
    pub async fn count(&self) -> CatalogResult<u64> {
        let mut request = self.request_from(0);
        request.dsl.size = 1;
        request.attributes.clear();
        request.relation_attributes.clear();
        Ok(self.client.search(request).await?.approximate_count)
    }

    /// One page of results starting at offset `from`.
    pub async fn page(&self, from: u32) -> CatalogResult<IndexSearchResponse> {
        self.client.search(self.request_from(from)).await
    }

    /// First page of results.
    pub async fn execute(&self) -> CatalogResult<Vec<Asset>> {
        Ok(self.page(0).await?.entities)
    }

    /// Pages through every result, stopping early once `limit` assets are collected.
    pub async fn fetch_all(&self, limit: Option<usize>) -> CatalogResult<Vec<Asset>> {
        let mut results = Vec::new();
        let mut from = 0u32;
        loop {
            let response = self.page(from).await?;
            let returned = response.entities.len();
            results.extend(response.entities);
            from += returned as u32;

            if let Some(limit) = limit {
                if results.len() >= limit {
                    results.truncate(limit);
                    break;
                }
            }
            if returned < self.page_size as usize || u64::from(from) >= response.approximate_count {
                break;
            }
        }
        debug!(count = results.len(), "Fetched all search results");
        Ok(results)
    }
}

/// Search over every asset type carrying `capability`.
pub fn select_with_capability(
    client: &dyn CatalogClient,
    capability: Capability,
    include_archived: bool,
) -> FluentSearch<'_> {
    FluentSearch::with_capability(client, capability, include_archived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCatalogClient;
    use mc_core::registry::{COLUMN, TABLE, TABLEAU_DASHBOARD, VIEW};
    use serde_json::json;

    async fn seeded() -> MockCatalogClient {
        let client = MockCatalogClient::new("mock");
        for i in 0..7 {
            client
                .insert(Asset::new(&TABLE, format!("db/sch/t{}", i), format!("t{}", i)))
                .await;
        }
        client.insert(Asset::new(&VIEW, "db/sch/v0", "v0")).await;
        client
            .insert(Asset::new(&TABLEAU_DASHBOARD, "tableau/d0", "d0"))
            .await;
        let mut archived = Asset::new(&TABLE, "db/sch/old", "old");
        archived.status = EntityStatus::Deleted;
        client.insert(archived).await;
        client
    }

    #[test]
    fn test_request_shape() {
        let client = MockCatalogClient::new("mock");
        let request = FluentSearch::for_type(&client, &COLUMN, false)
            .where_(Query::prefix(fields::QUALIFIED_NAME, "db/sch"))
            .where_not(Query::exists(fields::CERTIFICATE_STATUS))
            .where_some(Query::term(fields::ATLAN_TAGS, "PII"))
            .where_some(Query::term(fields::ATLAN_TAGS, "Finance"))
            .min_somes(2)
            .page_size(10)
            .include_on_results("dataType")
            .to_request();
        let body = serde_json::to_value(&request).unwrap();
        let bool_query = &body["dsl"]["query"]["bool"];

        assert_eq!(
            bool_query["filter"][0],
            json!({"term": {"__typeName.keyword": {"value": "Column"}}})
        );
        assert_eq!(
            bool_query["filter"][1],
            json!({"term": {"__state": {"value": "ACTIVE"}}})
        );
        assert_eq!(bool_query["minimum_should_match"], json!(2));
        assert_eq!(bool_query["must_not"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["dsl"]["size"], json!(10));
        assert_eq!(body["dsl"]["sort"], json!([{"__guid": {"order": "asc"}}]));
        assert_eq!(body["attributes"], json!(["dataType"]));
    }

    #[tokio::test]
    async fn test_archived_scope() {
        let client = seeded().await;
        let active = FluentSearch::for_type(&client, &TABLE, false).count().await.unwrap();
        let all = FluentSearch::for_type(&client, &TABLE, true).count().await.unwrap();
        assert_eq!(active, 7);
        assert_eq!(all, 8);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_until_exhausted() {
        let client = seeded().await;
        let search = FluentSearch::for_type(&client, &TABLE, false).page_size(3);

        let assets = search.fetch_all(None).await.unwrap();
        assert_eq!(assets.len(), 7);
        assert_eq!(client.calls().search, 3);

        let limited = search.fetch_all(Some(4)).await.unwrap();
        assert_eq!(limited.len(), 4);
        assert_eq!(search.execute().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_capability_scope() {
        let client = seeded().await;
        let sql = select_with_capability(&client, Capability::Sql, false)
            .fetch_all(None)
            .await
            .unwrap();
        assert_eq!(sql.len(), 8);
        assert!(sql.iter().all(|a| a.has_capability(Capability::Sql)));

        let bi = select_with_capability(&client, Capability::Bi, false)
            .execute()
            .await
            .unwrap();
        assert_eq!(bi.len(), 1);
        assert_eq!(bi[0].type_name, "TableauDashboard");
    }
}
