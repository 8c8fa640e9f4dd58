//! In-memory catalog for tests and offline use.
//!
//! Assets live in a map keyed by GUID. Searches evaluate the query DSL against
//! stored assets; saves apply update stubs with their relationship save
//! semantics and tag options, the way the catalog would.

use crate::traits::{AssetFetchOptions, CatalogClient, ClientHealth};
use async_trait::async_trait;
use chrono::Utc;
use mc_core::model::{is_placeholder_guid, TermAssignment};
use mc_core::search::{fields, SortOrder};
use mc_core::{
    Asset, AssetRef, AssetUpdate, CatalogError, CatalogResult, DeleteType, EntityStatus,
    IndexSearchRequest, IndexSearchResponse, MutationResponse, Query, Relationship, SaveOptions,
    SaveSemantic, SortItem,
};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

const MOCK_USER: &str = "mock-user";

/// Number of calls made to each client operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_by_guid: u64,
    pub get_by_qualified_name: u64,
    pub search: u64,
    pub save: u64,
    pub delete: u64,
    pub remove_atlan_tag: u64,
}

impl CallCounts {
    /// Total round trips.
    pub fn total(&self) -> u64 {
        self.get_by_guid
            + self.get_by_qualified_name
            + self.search
            + self.save
            + self.delete
            + self.remove_atlan_tag
    }
}

#[derive(Default)]
struct CallCounters {
    get_by_guid: AtomicU64,
    get_by_qualified_name: AtomicU64,
    search: AtomicU64,
    save: AtomicU64,
    delete: AtomicU64,
    remove_atlan_tag: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, AtomicOrdering::SeqCst);
}

/// Mock catalog client.
pub struct MockCatalogClient {
    name: String,
    assets: Arc<RwLock<HashMap<String, Asset>>>,
    calls: CallCounters,
}

impl MockCatalogClient {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            assets: Arc::new(RwLock::new(HashMap::new())),
            calls: CallCounters::default(),
        }
    }

    /// Stores an asset as-is, assigning a GUID when it has none (or a placeholder).
    ///
    /// Returns the stored GUID. Does not count as a call.
    pub async fn insert(&self, mut asset: Asset) -> String {
        let guid = match asset.guid.as_deref() {
            Some(g) if !g.is_empty() && !is_placeholder_guid(g) => g.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        asset.guid = Some(guid.clone());
        asset.create_time.get_or_insert_with(now_millis);
        for tag in &mut asset.atlan_tags {
            tag.entity_guid.get_or_insert_with(|| guid.clone());
        }
        self.assets.write().await.insert(guid.clone(), asset);
        guid
    }

    /// Snapshot of a stored asset, whatever its status.
    pub async fn stored(&self, guid: &str) -> Option<Asset> {
        self.assets.read().await.get(guid).cloned()
    }

    /// Snapshot of a stored asset by type and qualified name, whatever its status.
    pub async fn stored_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
    ) -> Option<Asset> {
        let assets = self.assets.read().await;
        find_by_qualified_name(&assets, type_name, qualified_name).cloned()
    }

    pub async fn len(&self) -> usize {
        self.assets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.assets.read().await.is_empty()
    }

    pub fn calls(&self) -> CallCounts {
        let load = |c: &AtomicU64| c.load(AtomicOrdering::SeqCst);
        CallCounts {
            get_by_guid: load(&self.calls.get_by_guid),
            get_by_qualified_name: load(&self.calls.get_by_qualified_name),
            search: load(&self.calls.search),
            save: load(&self.calls.save),
            delete: load(&self.calls.delete),
            remove_atlan_tag: load(&self.calls.remove_atlan_tag),
        }
    }

    pub fn reset_calls(&self) {
        for counter in [
            &self.calls.get_by_guid,
            &self.calls.get_by_qualified_name,
            &self.calls.search,
            &self.calls.save,
            &self.calls.delete,
            &self.calls.remove_atlan_tag,
        ] {
            counter.store(0, AtomicOrdering::SeqCst);
        }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn find_by_qualified_name<'a>(
    assets: &'a HashMap<String, Asset>,
    type_name: &str,
    qualified_name: &str,
) -> Option<&'a Asset> {
    assets
        .values()
        .find(|a| a.type_name == type_name && a.qualified_name() == Some(qualified_name))
}

/// Resolves relationship references sent by qualified name to stored GUIDs.
///
/// A name that matches no stored asset of that type fails the save.
fn resolve_refs(
    assets: &HashMap<String, Asset>,
    update: &AssetUpdate,
) -> CatalogResult<AssetUpdate> {
    let mut resolved = update.clone();
    for refs in resolved.relationships.values_mut() {
        for r in refs.iter_mut().filter(|r| r.guid.is_none()) {
            let Some(qualified_name) = r.qualified_name() else {
                continue;
            };
            let target = find_by_qualified_name(assets, &r.type_name, qualified_name).ok_or_else(
                || CatalogError::NotFoundByQualifiedName {
                    type_name: r.type_name.clone(),
                    qualified_name: qualified_name.to_string(),
                },
            )?;
            r.guid = target.guid.clone();
            if r.display_text.is_none() {
                r.display_text = target.name().map(str::to_string);
            }
        }
    }
    Ok(resolved)
}

fn shape_for_fetch(mut asset: Asset, options: AssetFetchOptions) -> Asset {
    if options.ignore_relationships {
        asset.relationship_attributes.clear();
    }
    asset
}

/// Indexed values of a field on an asset; empty when the field is unset.
fn field_values(asset: &Asset, field: &str) -> Vec<Value> {
    let strings = |items: Vec<&str>| items.into_iter().map(Value::from).collect();
    match field {
        fields::TYPE_NAME => vec![Value::from(asset.type_name.as_str())],
        fields::GUID => asset.guid.iter().map(|g| Value::from(g.as_str())).collect(),
        fields::STATE => vec![Value::from(asset.status.to_string())],
        fields::ATLAN_TAGS => strings(asset.atlan_tag_names()),
        fields::PROPAGATED_ATLAN_TAGS => strings(
            asset
                .atlan_tags
                .iter()
                .filter(|t| t.is_propagated_to(asset.guid.as_deref()))
                .map(|t| t.type_name.as_str())
                .collect(),
        ),
        fields::ASSIGNED_TERMS => asset
            .assigned_terms()
            .into_iter()
            .filter_map(|t| t.guid)
            .map(Value::from)
            .collect(),
        fields::CREATE_TIME => asset.create_time.map(Value::from).into_iter().collect(),
        fields::UPDATE_TIME => asset.update_time.map(Value::from).into_iter().collect(),
        other => {
            let key = other.strip_suffix(".keyword").unwrap_or(other);
            let attributes = match serde_json::to_value(&asset.attributes) {
                Ok(Value::Object(map)) => map,
                _ => return Vec::new(),
            };
            match attributes.get(key) {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items.clone(),
                Some(v) => vec![v.clone()],
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Evaluates a query against one asset.
fn matches(query: &Query, asset: &Asset) -> bool {
    match query {
        Query::Term { field, value } => field_values(asset, field).contains(value),
        Query::Terms { field, values } => field_values(asset, field)
            .iter()
            .any(|v| values.contains(v)),
        Query::Prefix { field, value } => field_values(asset, field)
            .iter()
            .filter_map(Value::as_str)
            .any(|v| v.starts_with(value.as_str())),
        Query::Match { field, query } => {
            let wanted = tokens(query);
            field_values(asset, field)
                .iter()
                .filter_map(Value::as_str)
                .any(|v| tokens(v).iter().any(|t| wanted.contains(t)))
        }
        Query::Exists { field } => !field_values(asset, field).is_empty(),
        Query::Range {
            field,
            gt,
            gte,
            lt,
            lte,
        } => field_values(asset, field).iter().any(|v| {
            let check = |bound: &Option<Value>, ok: fn(Ordering) -> bool| {
                bound
                    .as_ref()
                    .map(|b| compare_values(v, b).map(ok).unwrap_or(false))
                    .unwrap_or(true)
            };
            check(gt, Ordering::is_gt)
                && check(gte, Ordering::is_ge)
                && check(lt, Ordering::is_lt)
                && check(lte, Ordering::is_le)
        }),
        Query::Bool(b) => {
            if !b.must.iter().chain(b.filter.iter()).all(|q| matches(q, asset)) {
                return false;
            }
            if b.must_not.iter().any(|q| matches(q, asset)) {
                return false;
            }
            let required = match b.minimum_should_match {
                Some(n) => n as usize,
                None if b.must.is_empty() && b.filter.is_empty() && !b.should.is_empty() => 1,
                None => 0,
            };
            required == 0 || b.should.iter().filter(|q| matches(q, asset)).count() >= required
        }
    }
}

fn compare_by(sort: &[SortItem], a: &Asset, b: &Asset) -> Ordering {
    for item in sort {
        let av = field_values(a, &item.field).into_iter().next();
        let bv = field_values(b, &item.field).into_iter().next();
        // Assets missing the field sort last in either direction
        let ordering = match (&av, &bv) {
            (Some(x), Some(y)) => {
                let o = compare_values(x, y).unwrap_or(Ordering::Equal);
                match item.order {
                    SortOrder::Asc => o,
                    SortOrder::Desc => o.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.guid.cmp(&b.guid)
}

fn set_refs(asset: &mut Asset, name: &str, refs: Vec<AssetRef>) {
    let many = asset
        .asset_type()
        .and_then(|t| t.relationship(name))
        .map(|def| def.many)
        .unwrap_or(true);
    if refs.is_empty() {
        asset.relationship_attributes.remove(name);
    } else if many {
        asset
            .relationship_attributes
            .insert(name.to_string(), Relationship::Many(refs.into_iter().collect()));
    } else if let Some(last) = refs.into_iter().last() {
        asset
            .relationship_attributes
            .insert(name.to_string(), Relationship::One(last));
    }
    if name == "meanings" {
        asset.term_assignments = asset
            .relationship(name)
            .into_iter()
            .filter_map(|r| {
                r.guid.clone().map(|term_guid| TermAssignment {
                    term_guid,
                    display_text: r.display_text.clone(),
                })
            })
            .collect();
    }
}

/// Applies an update stub to a stored asset.
fn apply_update(asset: &mut Asset, update: &AssetUpdate, options: SaveOptions) -> CatalogResult<()> {
    let mut attributes = match serde_json::to_value(&asset.attributes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return Err(CatalogError::Internal(e.to_string())),
    };
    attributes.insert(
        "qualifiedName".to_string(),
        Value::from(update.qualified_name.as_str()),
    );
    attributes.insert("name".to_string(), Value::from(update.name.as_str()));
    for (key, value) in &update.attributes {
        if value.is_null() {
            attributes.remove(key);
        } else {
            attributes.insert(key.clone(), value.clone());
        }
    }
    asset.attributes = serde_json::from_value(Value::Object(attributes))
        .map_err(|e| CatalogError::InvalidRequest(e.to_string()))?;

    for (name, refs) in &update.relationships {
        let with = |semantic: SaveSemantic| -> Vec<AssetRef> {
            refs.iter()
                .filter(|r| r.semantic == semantic)
                .map(|r| r.clone().with_semantic(SaveSemantic::Replace))
                .collect()
        };
        let replacing = refs.is_empty() || refs.iter().any(|r| r.semantic == SaveSemantic::Replace);
        let mut current: Vec<AssetRef> = if replacing {
            with(SaveSemantic::Replace)
        } else {
            asset.relationship(name).into_iter().cloned().collect()
        };
        for appended in with(SaveSemantic::Append) {
            if !current.iter().any(|c| c.same_target(&appended)) {
                current.push(appended);
            }
        }
        let removed = with(SaveSemantic::Remove);
        current.retain(|c| !removed.iter().any(|r| r.same_target(c)));
        set_refs(asset, name, current);
    }

    if let Some(tags) = &update.atlan_tags {
        let guid = asset.guid.clone();
        let attach = |t: &mc_core::AtlanTag| mc_core::AtlanTag {
            entity_guid: guid.clone(),
            ..t.clone()
        };
        if options.replace_atlan_tags {
            asset
                .atlan_tags
                .retain(|t| t.is_propagated_to(guid.as_deref()));
            asset.atlan_tags.extend(tags.iter().map(attach));
        } else if options.append_atlan_tags {
            for tag in tags {
                let present = asset.atlan_tag_names().contains(&tag.type_name.as_str());
                if !present {
                    asset.atlan_tags.push(attach(tag));
                }
            }
        }
    }

    if let Some(status) = update.status {
        asset.status = status;
    }
    asset.update_time = Some(now_millis());
    asset.updated_by = Some(MOCK_USER.to_string());
    Ok(())
}

#[async_trait]
impl CatalogClient for MockCatalogClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> CatalogResult<ClientHealth> {
        Ok(ClientHealth::Healthy)
    }

    async fn get_asset_by_guid(
        &self,
        guid: &str,
        options: AssetFetchOptions,
    ) -> CatalogResult<Asset> {
        bump(&self.calls.get_by_guid);
        let assets = self.assets.read().await;
        assets
            .get(guid)
            .cloned()
            .map(|a| shape_for_fetch(a, options))
            .ok_or_else(|| CatalogError::NotFoundByGuid(guid.to_string()))
    }

    async fn get_asset_by_qualified_name(
        &self,
        type_name: &str,
        qualified_name: &str,
        options: AssetFetchOptions,
    ) -> CatalogResult<Asset> {
        bump(&self.calls.get_by_qualified_name);
        let assets = self.assets.read().await;
        find_by_qualified_name(&assets, type_name, qualified_name)
            .filter(|a| a.is_active())
            .cloned()
            .map(|a| shape_for_fetch(a, options))
            .ok_or_else(|| CatalogError::NotFoundByQualifiedName {
                type_name: type_name.to_string(),
                qualified_name: qualified_name.to_string(),
            })
    }

    async fn search(&self, request: IndexSearchRequest) -> CatalogResult<IndexSearchResponse> {
        bump(&self.calls.search);
        let assets = self.assets.read().await;
        let mut hits: Vec<&Asset> = assets
            .values()
            .filter(|a| matches(&request.dsl.query, a))
            .collect();
        hits.sort_by(|a, b| compare_by(&request.dsl.sort, a, b));

        let approximate_count = hits.len() as u64;
        let entities = hits
            .into_iter()
            .skip(request.dsl.from as usize)
            .take(request.dsl.size as usize)
            .cloned()
            .collect();
        Ok(IndexSearchResponse {
            approximate_count,
            entities,
        })
    }

    async fn save(
        &self,
        updates: Vec<AssetUpdate>,
        options: SaveOptions,
    ) -> CatalogResult<MutationResponse> {
        bump(&self.calls.save);
        let mut assets = self.assets.write().await;
        let mut response = MutationResponse::default();

        for update in &updates {
            let update = &resolve_refs(&assets, update)?;
            let existing_guid = if is_placeholder_guid(&update.guid) {
                find_by_qualified_name(&assets, &update.type_name, &update.qualified_name)
                    .and_then(|a| a.guid.clone())
            } else if assets.contains_key(&update.guid) {
                Some(update.guid.clone())
            } else {
                return Err(CatalogError::NotFoundByGuid(update.guid.clone()));
            };

            match existing_guid.and_then(|g| assets.get_mut(&g)) {
                Some(asset) => {
                    apply_update(asset, update, options)?;
                    response.mutated_entities.updated.push(asset.clone());
                }
                None => {
                    let asset_type = mc_core::registry::find(&update.type_name)
                        .ok_or_else(|| CatalogError::UnknownType(update.type_name.clone()))?;
                    let guid = uuid::Uuid::new_v4().to_string();
                    let mut asset = Asset::new(asset_type, &update.qualified_name, &update.name);
                    asset.guid = Some(guid.clone());
                    asset.create_time = Some(now_millis());
                    asset.created_by = Some(MOCK_USER.to_string());
                    apply_update(&mut asset, update, options)?;
                    debug!(guid = %guid, type_name = %update.type_name, "Mock created asset");
                    response
                        .guid_assignments
                        .insert(update.guid.clone(), guid.clone());
                    response.mutated_entities.created.push(asset.clone());
                    assets.insert(guid, asset);
                }
            }
        }
        Ok(response)
    }

    async fn delete(
        &self,
        guids: Vec<String>,
        delete_type: DeleteType,
    ) -> CatalogResult<MutationResponse> {
        bump(&self.calls.delete);
        let mut assets = self.assets.write().await;
        if let Some(missing) = guids.iter().find(|g| !assets.contains_key(g.as_str())) {
            return Err(CatalogError::NotFoundByGuid(missing.clone()));
        }

        let mut response = MutationResponse::default();
        for guid in &guids {
            let deleted = match delete_type {
                DeleteType::Soft => assets.get_mut(guid).map(|asset| {
                    asset.status = EntityStatus::Deleted;
                    asset.update_time = Some(now_millis());
                    asset.clone()
                }),
                DeleteType::Hard | DeleteType::Purge => assets.remove(guid).map(|mut asset| {
                    asset.status = EntityStatus::Purged;
                    asset
                }),
            };
            response.mutated_entities.deleted.extend(deleted);
        }
        Ok(response)
    }

    async fn remove_atlan_tag(
        &self,
        type_name: &str,
        qualified_name: &str,
        tag_name: &str,
    ) -> CatalogResult<()> {
        bump(&self.calls.remove_atlan_tag);
        let mut assets = self.assets.write().await;
        let asset = assets
            .values_mut()
            .find(|a| {
                a.is_active()
                    && a.type_name == type_name
                    && a.qualified_name() == Some(qualified_name)
            })
            .ok_or_else(|| CatalogError::NotFoundByQualifiedName {
                type_name: type_name.to_string(),
                qualified_name: qualified_name.to_string(),
            })?;

        let guid = asset.guid.clone();
        let before = asset.atlan_tags.len();
        asset
            .atlan_tags
            .retain(|t| t.type_name != tag_name || t.is_propagated_to(guid.as_deref()));
        if asset.atlan_tags.len() == before {
            return Err(CatalogError::InvalidRequest(format!(
                "Atlan tag {} is not directly assigned to {}",
                tag_name, qualified_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::registry::{GLOSSARY_TERM, TABLE};
    use mc_core::search::fields;
    use mc_core::{AtlanTag, TagPropagation};
    use serde_json::json;

    fn table(qn: &str, name: &str) -> Asset {
        Asset::new(&TABLE, qn, name)
    }

    #[tokio::test]
    async fn test_insert_assigns_real_guid() {
        let client = MockCatalogClient::new("mock");
        let guid = client.insert(table("db/sch/orders", "orders")).await;

        assert!(!is_placeholder_guid(&guid));
        assert!(uuid::Uuid::parse_str(&guid).is_ok());
        assert_eq!(client.len().await, 1);
        assert_eq!(client.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_lookup_not_found_errors() {
        let client = MockCatalogClient::new("mock");
        let by_guid = client
            .get_asset_by_guid("missing", AssetFetchOptions::default())
            .await;
        assert_eq!(by_guid, Err(CatalogError::NotFoundByGuid("missing".into())));

        let by_qn = client
            .get_asset_by_qualified_name("Table", "nope", AssetFetchOptions::default())
            .await;
        assert!(matches!(
            by_qn,
            Err(CatalogError::NotFoundByQualifiedName { .. })
        ));
        assert_eq!(client.calls().get_by_guid, 1);
        assert_eq!(client.calls().get_by_qualified_name, 1);
    }

    #[test]
    fn test_query_evaluation() {
        let mut asset = table("default/snowflake/1/db/sch/orders", "orders");
        asset.guid = Some("g-1".into());
        asset.attributes.description = Some("Customer orders, daily".into());
        asset.set_attribute("rowCount", json!(1200)).unwrap();
        asset.atlan_tags.push(AtlanTag {
            entity_guid: Some("g-1".into()),
            ..AtlanTag::new("PII", TagPropagation::default())
        });
        asset.atlan_tags.push(AtlanTag {
            entity_guid: Some("g-0".into()),
            ..AtlanTag::new("Finance", TagPropagation::default())
        });

        assert!(super::matches(&Query::term(fields::TYPE_NAME, "Table"), &asset));
        assert!(super::matches(&Query::term(fields::NAME, "orders"), &asset));
        assert!(super::matches(
            &Query::prefix(fields::QUALIFIED_NAME, "default/snowflake/1"),
            &asset
        ));
        assert!(super::matches(&Query::matches(fields::DESCRIPTION, "DAILY totals"), &asset));
        assert!(super::matches(&Query::between("rowCount", 1000, 2000), &asset));
        assert!(!super::matches(&Query::gt("rowCount", 1200), &asset));
        assert!(super::matches(&Query::term(fields::ATLAN_TAGS, "PII"), &asset));
        assert!(!super::matches(&Query::term(fields::ATLAN_TAGS, "Finance"), &asset));
        assert!(super::matches(
            &Query::term(fields::PROPAGATED_ATLAN_TAGS, "Finance"),
            &asset
        ));
        assert!(!super::matches(&Query::exists(fields::CERTIFICATE_STATUS), &asset));
        assert!(super::matches(
            &Query::any(vec![
                Query::term(fields::STATE, "DELETED"),
                Query::term(fields::STATE, "ACTIVE"),
            ]),
            &asset
        ));
        assert!(!super::matches(
            &Query::all(vec![
                Query::term(fields::TYPE_NAME, "Table"),
                Query::not(Query::exists(fields::DESCRIPTION)),
            ]),
            &asset
        ));
    }

    #[tokio::test]
    async fn test_search_sorts_and_pages() {
        let client = MockCatalogClient::new("mock");
        for name in ["c", "a", "b"] {
            client.insert(table(&format!("qn/{}", name), name)).await;
        }
        let mut request = IndexSearchRequest::new(Query::term(fields::TYPE_NAME, "Table"), 1, 1);
        request.dsl.sort.push(SortItem::asc(fields::NAME));

        let response = client.search(request).await.unwrap();
        assert_eq!(response.approximate_count, 3);
        assert_eq!(response.entities.len(), 1);
        assert_eq!(response.entities[0].name(), Some("b"));
    }

    #[tokio::test]
    async fn test_save_creates_then_updates_by_qualified_name() {
        let client = MockCatalogClient::new("mock");
        let create = TABLE.updater("qn/orders", "orders").description("v1");
        let placeholder = create.guid.clone();

        let created = client
            .save(vec![create], SaveOptions::default())
            .await
            .unwrap();
        let guid = created.assigned_guid(&placeholder).unwrap().to_string();
        assert_eq!(created.created_assets().len(), 1);

        let updated = client
            .save(
                vec![TABLE.updater("qn/orders", "orders").clear_description()],
                SaveOptions::default(),
            )
            .await
            .unwrap();
        let asset = updated.updated_asset_of("Table").unwrap();
        assert_eq!(asset.guid.as_deref(), Some(guid.as_str()));
        assert_eq!(asset.attributes.description, None);
        assert_eq!(client.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_applies_relationship_semantics() {
        let client = MockCatalogClient::new("mock");
        let guid = client.insert(table("qn/orders", "orders")).await;
        let term = |g: &str| GLOSSARY_TERM.ref_by_guid(g, SaveSemantic::Replace);

        let replace = TABLE
            .updater("qn/orders", "orders")
            .terms(vec![term("t1"), term("t2")])
            .unwrap();
        client.save(vec![replace], SaveOptions::default()).await.unwrap();

        let patch = TABLE
            .updater("qn/orders", "orders")
            .append_terms(vec![term("t3")])
            .unwrap()
            .remove_terms(vec![term("t1")])
            .unwrap();
        client.save(vec![patch], SaveOptions::default()).await.unwrap();

        let stored = client.stored(&guid).await.unwrap();
        let terms: Vec<String> = stored
            .assigned_terms()
            .into_iter()
            .filter_map(|t| t.guid)
            .collect();
        assert_eq!(terms, vec!["t2".to_string(), "t3".to_string()]);
        assert_eq!(stored.term_assignments.len(), 2);
    }

    #[tokio::test]
    async fn test_save_resolves_terms_by_qualified_name() {
        let client = MockCatalogClient::new("mock");
        let guid = client.insert(table("qn/orders", "orders")).await;
        let mut term = Asset::new(&GLOSSARY_TERM, "revenue@glossary", "revenue");
        term.guid = Some("t1".to_string());
        client.insert(term).await;

        let by_name = TABLE
            .updater("qn/orders", "orders")
            .terms(vec![GLOSSARY_TERM.ref_by_qualified_name("revenue@glossary", SaveSemantic::Replace)])
            .unwrap();
        client.save(vec![by_name], SaveOptions::default()).await.unwrap();

        let stored = client.stored(&guid).await.unwrap();
        assert_eq!(stored.term_assignments.len(), 1);
        assert_eq!(stored.term_assignments[0].term_guid, "t1");
        assert_eq!(stored.term_assignments[0].display_text.as_deref(), Some("revenue"));

        let missing = TABLE
            .updater("qn/orders", "orders")
            .append_terms(vec![GLOSSARY_TERM.ref_by_qualified_name("cost@glossary", SaveSemantic::Append)])
            .unwrap();
        let err = client
            .save(vec![missing], SaveOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ASSET_NOT_FOUND_BY_QN");
        assert_eq!(client.stored(&guid).await.unwrap().term_assignments.len(), 1);
    }

    #[tokio::test]
    async fn test_save_tag_options() {
        let client = MockCatalogClient::new("mock");
        let guid = client.insert(table("qn/orders", "orders")).await;
        let tagged = |names: &[&str]| {
            TABLE.updater("qn/orders", "orders").atlan_tags(
                names
                    .iter()
                    .map(|n| AtlanTag::new(*n, TagPropagation::default()))
                    .collect(),
            )
        };

        client
            .save(vec![tagged(&["PII"])], SaveOptions::default())
            .await
            .unwrap();
        assert!(client.stored(&guid).await.unwrap().atlan_tags.is_empty());

        client
            .save(vec![tagged(&["PII"])], SaveOptions::appending_tags())
            .await
            .unwrap();
        client
            .save(vec![tagged(&["PII", "Finance"])], SaveOptions::appending_tags())
            .await
            .unwrap();
        assert_eq!(
            client.stored(&guid).await.unwrap().atlan_tag_names(),
            vec!["PII", "Finance"]
        );

        client
            .save(vec![tagged(&["Finance"])], SaveOptions::replacing_tags())
            .await
            .unwrap();
        assert_eq!(
            client.stored(&guid).await.unwrap().atlan_tag_names(),
            vec!["Finance"]
        );
    }

    #[tokio::test]
    async fn test_soft_and_hard_delete() {
        let client = MockCatalogClient::new("mock");
        let soft = client.insert(table("qn/a", "a")).await;
        let hard = client.insert(table("qn/b", "b")).await;

        client.delete(vec![soft.clone()], DeleteType::Soft).await.unwrap();
        let archived = client.stored(&soft).await.unwrap();
        assert_eq!(archived.status, EntityStatus::Deleted);
        assert!(client
            .get_asset_by_qualified_name("Table", "qn/a", AssetFetchOptions::default())
            .await
            .is_err());

        let response = client.delete(vec![hard.clone()], DeleteType::Hard).await.unwrap();
        assert_eq!(response.deleted_assets().len(), 1);
        assert!(client.stored(&hard).await.is_none());

        assert!(matches!(
            client.delete(vec![hard], DeleteType::Soft).await,
            Err(CatalogError::NotFoundByGuid(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_atlan_tag_keeps_propagated() {
        let client = MockCatalogClient::new("mock");
        let mut asset = table("qn/orders", "orders");
        asset.atlan_tags.push(AtlanTag::new("PII", TagPropagation::default()));
        asset.atlan_tags.push(AtlanTag {
            entity_guid: Some("upstream".into()),
            ..AtlanTag::new("Finance", TagPropagation::default())
        });
        let guid = client.insert(asset).await;

        client.remove_atlan_tag("Table", "qn/orders", "PII").await.unwrap();
        assert!(client.remove_atlan_tag("Table", "qn/orders", "Finance").await.is_err());

        let stored = client.stored(&guid).await.unwrap();
        assert!(stored.atlan_tag_names().is_empty());
        assert_eq!(stored.atlan_tags.len(), 1);
        assert_eq!(client.calls().remove_atlan_tag, 2);
    }
}
