//! [`CatalogClient`] over the catalog's REST API.

use crate::http::HttpClient;
use crate::tag_cache::{AtlanTagCache, TagDirectory};
use crate::traits::{AssetFetchOptions, CatalogClient, ClientConfig, ClientHealth};
use async_trait::async_trait;
use mc_core::search::fields;
use mc_core::search::BoolQuery;
use mc_core::{
    Asset, AssetUpdate, CatalogError, CatalogResult, DeleteType, IndexSearchRequest,
    IndexSearchResponse, MutationResponse, Query, SaveOptions,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

const ENTITY_BY_GUID: &str = "api/meta/entity/guid";
const ENTITY_BY_UNIQUE_ATTRIBUTE: &str = "api/meta/entity/uniqueAttribute/type";
const ENTITY_BULK: &str = "api/meta/entity/bulk";
const INDEX_SEARCH: &str = "api/meta/search/indexsearch";

/// Default lifetime of the cached tag directory.
pub const DEFAULT_TAG_CACHE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Deserialize)]
struct EntityResponse {
    entity: Asset,
}

#[derive(Serialize)]
struct BulkRequest<'a> {
    entities: &'a [AssetUpdate],
}

/// REST client for a catalog tenant.
pub struct RestCatalogClient {
    http: HttpClient,
    tags: AtlanTagCache,
}

impl RestCatalogClient {
    pub fn new(config: ClientConfig) -> CatalogResult<Self> {
        info!(base_url = %config.base_url, client = %config.name, "Creating catalog client");
        Ok(Self {
            http: HttpClient::new(config)?,
            tags: AtlanTagCache::new(DEFAULT_TAG_CACHE_TTL),
        })
    }

    pub fn tag_cache(&self) -> &AtlanTagCache {
        &self.tags
    }

    async fn tag_directory(&self) -> CatalogResult<std::sync::Arc<TagDirectory>> {
        self.tags.directory(&self.http).await
    }

    /// Replaces internal tag IDs with display names on a returned asset.
    fn tags_to_names(asset: &mut Asset, directory: &TagDirectory) {
        for tag in &mut asset.atlan_tags {
            if let Some(name) = directory.name_for(&tag.type_name) {
                tag.type_name = name.to_string();
            }
        }
    }

    async fn tags_to_ids(&self, updates: &mut [AssetUpdate]) -> CatalogResult<()> {
        for update in updates.iter_mut() {
            if let Some(tags) = update.atlan_tags.as_mut() {
                for tag in tags.iter_mut() {
                    tag.type_name = self.tags.id_for(&self.http, &tag.type_name).await?;
                }
            }
        }
        Ok(())
    }

    async fn names_in_response(&self, mut response: MutationResponse) -> CatalogResult<MutationResponse> {
        let directory = self.tag_directory().await?;
        let entities = &mut response.mutated_entities;
        for asset in entities
            .created
            .iter_mut()
            .chain(entities.updated.iter_mut())
            .chain(entities.partially_updated.iter_mut())
            .chain(entities.deleted.iter_mut())
        {
            Self::tags_to_names(asset, &directory);
        }
        Ok(response)
    }

    async fn fetch_entity(&self, path: &str, query: &[(&'static str, String)]) -> CatalogResult<Asset> {
        let response: EntityResponse = self.http.get_json(path, query).await?;
        let mut asset = response.entity;
        Self::tags_to_names(&mut asset, &*self.tag_directory().await?);
        Ok(asset)
    }
}

fn fetch_params(options: AssetFetchOptions) -> Vec<(&'static str, String)> {
    vec![
        ("minExtInfo", options.min_ext_info.to_string()),
        ("ignoreRelationships", options.ignore_relationships.to_string()),
    ]
}

/// Rewrites tag display names in a query to internal IDs.
fn translate_query(query: Query, directory: &TagDirectory) -> Query {
    let is_tag_field =
        |field: &str| field == fields::ATLAN_TAGS || field == fields::PROPAGATED_ATLAN_TAGS;
    let to_id = |value: Value| match value.as_str().and_then(|name| directory.id_for(name)) {
        Some(id) => Value::String(id.to_string()),
        None => value,
    };
    match query {
        Query::Term { field, value } if is_tag_field(&field) => Query::Term {
            value: to_id(value),
            field,
        },
        Query::Terms { field, values } if is_tag_field(&field) => Query::Terms {
            values: values.into_iter().map(to_id).collect(),
            field,
        },
        Query::Bool(b) => {
            let translate_all = |clauses: Vec<Query>| -> Vec<Query> {
                clauses
                    .into_iter()
                    .map(|q| translate_query(q, directory))
                    .collect()
            };
            Query::Bool(BoolQuery {
                must: translate_all(b.must),
                must_not: translate_all(b.must_not),
                should: translate_all(b.should),
                filter: translate_all(b.filter),
                minimum_should_match: b.minimum_should_match,
            })
        }
        other => other,
    }
}

#[async_trait]
impl CatalogClient for RestCatalogClient {
    fn name(&self) -> &str {
        &self.http.config().name
    }

    async fn health_check(&self) -> CatalogResult<ClientHealth> {
        match self.tags.refresh(&self.http).await {
            Ok(_) => Ok(ClientHealth::Healthy),
            Err(CatalogError::AuthenticationFailed(e)) | Err(CatalogError::AuthorizationDenied(e)) => {
                Ok(ClientHealth::Unhealthy(format!("Credentials rejected: {}", e)))
            }
            Err(CatalogError::RateLimited(secs)) => Ok(ClientHealth::Degraded(format!(
                "Rate limited for {} seconds",
                secs
            ))),
            Err(e) => Ok(ClientHealth::Unhealthy(e.to_string())),
        }
    }

    #[instrument(skip(self), fields(client = %self.name()))]
    async fn get_asset_by_guid(
        &self,
        guid: &str,
        options: AssetFetchOptions,
    ) -> CatalogResult<Asset> {
        let path = format!("{}/{}", ENTITY_BY_GUID, guid);
        self.fetch_entity(&path, &fetch_params(options))
            .await
            .map_err(|e| match e {
                CatalogError::NotFound(_) => CatalogError::NotFoundByGuid(guid.to_string()),
                other => other,
            })
    }

    #[instrument(skip(self), fields(client = %self.name()))]
    async fn get_asset_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        options: AssetFetchOptions,
    ) -> CatalogResult<Asset> {
        let path = format!("{}/{}", ENTITY_BY_UNIQUE_ATTRIBUTE, type_name);
        let mut params = fetch_params(options);
        params.push(("attr:qualifiedName", qualified_name.to_string()));
        self.fetch_entity(&path, &params)
            .await
            .map_err(|e| match e {
                CatalogError::NotFound(_) => CatalogError::NotFoundByQualifiedName {
                    type_name: type_name.to_string(),
                    qualified_name: qualified_name.to_string(),
                },
                other => other,
            })
    }

    #[instrument(skip(self, request), fields(client = %self.name(), from = request.dsl.from, size = request.dsl.size))]
    async fn search(&self, mut request: IndexSearchRequest) -> CatalogResult<IndexSearchResponse> {
        let directory = self.tag_directory().await?;
        request.dsl.query = translate_query(request.dsl.query, &directory);
        let mut response: IndexSearchResponse =
            self.http.post_json(INDEX_SEARCH, &[], &request).await?;
        for asset in &mut response.entities {
            Self::tags_to_names(asset, &directory);
        }
        debug!(
            returned = response.entities.len(),
            approximate_count = response.approximate_count,
            "Index search complete"
        );
        Ok(response)
    }

    #[instrument(skip(self, updates), fields(client = %self.name(), count = updates.len()))]
    async fn save(
        &self,
        mut updates: Vec<AssetUpdate>,
        options: SaveOptions,
    ) -> CatalogResult<MutationResponse> {
        self.tags_to_ids(&mut updates).await?;
        let params = [
            ("replaceClassifications", options.replace_atlan_tags.to_string()),
            ("appendTags", options.append_atlan_tags.to_string()),
        ];
        let response: MutationResponse = self
            .http
            .post_json(ENTITY_BULK, &params, &BulkRequest { entities: &updates })
            .await?;
        self.names_in_response(response).await
    }

    #[instrument(skip(self), fields(client = %self.name()))]
    async fn delete(
        &self,
        guids: Vec<String>,
        delete_type: DeleteType,
    ) -> CatalogResult<MutationResponse> {
        if guids.is_empty() {
            return Ok(MutationResponse::default());
        }
        let mut params: Vec<(&'static str, String)> =
            guids.into_iter().map(|guid| ("guid", guid)).collect();
        params.push(("deleteType", delete_type.to_string()));
        let response: MutationResponse = self.http.delete_json(ENTITY_BULK, &params).await?;
        self.names_in_response(response).await
    }

    #[instrument(skip(self), fields(client = %self.name()))]
    async fn remove_atlan_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> CatalogResult<()> {
        let tag_id = self.tags.id_for(&self.http, tag_name).await?;
        let path = format!(
            "{}/{}/classification/{}",
            ENTITY_BY_UNIQUE_ATTRIBUTE, type_name, tag_id
        );
        self.http
            .delete(&path, &[("attr:qualifiedName", qualified_name.to_string())])
            .await
            .map_err(|e| match e {
                CatalogError::NotFound(_) => CatalogError::NotFoundByQualifiedName {
                    type_name: type_name.to_string(),
                    qualified_name: qualified_name.to_string(),
                },
                other => other,
            })
    }
}
