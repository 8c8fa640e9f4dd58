//! Per-type asset operations.
//!
//! [`AssetTypeExt`] gives every registered [`AssetType`] the same surface:
//! search, lookup, restore, save/delete, and metadata mutation helpers. Each
//! helper builds an update stub for this type and hands it to shared logic
//! parameterised only by the type.
//!
//! Tag and term append/remove are read-then-write: the current asset is read
//! in one call and the change is written in a second. They are not atomic
//! against concurrent writers.

use crate::fluent::FluentSearch;
use crate::traits::{AssetFetchOptions, CatalogClient};
use async_trait::async_trait;
use mc_core::search::fields;
use mc_core::{
    AnnouncementType, Asset, AssetRef, AssetType, AssetUpdate, AtlanTag, CatalogError,
    CatalogResult, CertificateStatus, DeleteType, EntityStatus, IndexSearchRequest,
    MutationResponse, Query, SaveOptions, TagPropagation,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Returns true when `id` should be resolved as a GUID rather than a qualified name.
pub fn is_guid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

#[async_trait]
pub trait AssetTypeExt {
    /// Fluent search over assets of this type.
    fn select<'a>(&self, client: &'a dyn CatalogClient, include_archived: bool)
        -> FluentSearch<'a>;

    /// Fetches an asset of this type by GUID or qualified name.
    ///
    /// `id` is treated as a GUID when it parses as a UUID. Fails with
    /// `AssetNotTypeRequested` when the asset exists but is another type.
    async fn get(
        &self,
        client: &dyn CatalogClient,
        id: &str,
        include_all_relationships: bool,
    ) -> CatalogResult<Asset>;

    /// Fetches an asset through the search index, including only the listed
    /// attributes on it and on its related assets.
    async fn get_with_attributes(
        &self,
        client: &dyn CatalogClient,
        id: &str,
        attributes: &[&str],
        attributes_on_related: &[&str],
    ) -> CatalogResult<Asset>;

    /// Reactivates a soft-deleted asset. Returns true if it is active afterwards.
    async fn restore(&self, client: &dyn CatalogClient, qualified_name: &str)
        -> CatalogResult<bool>;

    /// Saves an update stub built for this type.
    async fn save(
        &self,
        client: &dyn CatalogClient,
        update: AssetUpdate,
    ) -> CatalogResult<MutationResponse>;

    /// Archives an asset; it can be restored later.
    async fn delete(&self, client: &dyn CatalogClient, guid: &str)
        -> CatalogResult<MutationResponse>;

    /// Permanently removes an asset.
    async fn purge(&self, client: &dyn CatalogClient, guid: &str)
        -> CatalogResult<MutationResponse>;

    async fn remove_description(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>>;

    async fn remove_user_description(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>>;

    /// Clears owner users and owner groups.
    async fn remove_owners(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>>;

    /// Sets the certificate. Reads the asset first for its name.
    async fn update_certificate(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        status: CertificateStatus,
        message: Option<&str>,
    ) -> CatalogResult<Option<Asset>>;

    async fn remove_certificate(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>>;

    /// Sets the announcement banner. Reads the asset first for its name.
    async fn update_announcement(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        announcement_type: AnnouncementType,
        title: &str,
        message: Option<&str>,
    ) -> CatalogResult<Option<Asset>>;

    async fn remove_announcement(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>>;

    /// Replaces all assigned terms; an empty list removes them all.
    async fn replace_terms(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
        terms: Vec<AssetRef>,
    ) -> CatalogResult<Option<Asset>>;

    /// Adds terms to those already assigned. Two round trips; not atomic.
    ///
    /// Terms given only by qualified name cost one extra lookup each.
    async fn append_terms(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        terms: Vec<AssetRef>,
    ) -> CatalogResult<Option<Asset>>;

    /// Removes terms from those assigned. Two round trips; not atomic.
    ///
    /// Terms given only by qualified name cost one extra lookup each.
    async fn remove_terms(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        terms: Vec<AssetRef>,
    ) -> CatalogResult<Option<Asset>>;

    /// Attaches tags, leaving existing tags in place. Two round trips; not atomic.
    async fn append_atlan_tags(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        tag_names: &[&str],
        propagation: TagPropagation,
    ) -> CatalogResult<Option<Asset>>;

    /// Detaches one tag. Two round trips; not atomic.
    async fn remove_atlan_tag(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        tag_name: &str,
    ) -> CatalogResult<()>;
}

fn require_type(asset_type: &AssetType, id: &str, asset: Asset) -> CatalogResult<Asset> {
    if asset.type_name == asset_type.name {
        Ok(asset)
    } else {
        Err(CatalogError::AssetNotTypeRequested {
            id: id.to_string(),
            type_name: asset_type.name.to_string(),
        })
    }
}

/// Reads the current state of an asset with minimal detail.
async fn read_current(
    client: &dyn CatalogClient,
    asset_type: &AssetType,
    qualified_name: &str,
) -> CatalogResult<Asset> {
    client
        .get_asset_by_qualified_name(
            asset_type.name,
            qualified_name,
            AssetFetchOptions::with_relationships(false),
        )
        .await
}

/// Looks up the GUID of every term referenced only by qualified name.
///
/// Assigned terms come back as GUID headers, so a name-only reference would
/// never match one.
async fn resolve_term_guids(
    client: &dyn CatalogClient,
    terms: Vec<AssetRef>,
) -> CatalogResult<Vec<AssetRef>> {
    let mut resolved = Vec::with_capacity(terms.len());
    for mut term in terms {
        if term.guid.is_none() {
            if let Some(term_qn) = term.qualified_name() {
                let stored = client
                    .get_asset_by_qualified_name(
                        &term.type_name,
                        term_qn,
                        AssetFetchOptions::with_relationships(false),
                    )
                    .await?;
                debug!(qualified_name = term_qn, guid = ?stored.guid, "Resolved term reference");
                term.guid = stored.guid;
            }
        }
        resolved.push(term);
    }
    Ok(resolved)
}

/// Saves one update stub and returns the asset as the catalog reports it.
async fn save_update(
    client: &dyn CatalogClient,
    update: AssetUpdate,
    options: SaveOptions,
) -> CatalogResult<Option<Asset>> {
    let type_name = update.type_name.clone();
    let response = client.save(vec![update], options).await?;
    Ok(response.saved_asset_of(&type_name).cloned())
}

fn name_of(asset: &Asset, qualified_name: &str) -> String {
    asset.name().unwrap_or(qualified_name).to_string()
}

#[async_trait]
impl AssetTypeExt for AssetType {
    fn select<'a>(
        &self,
        client: &'a dyn CatalogClient,
        include_archived: bool,
    ) -> FluentSearch<'a> {
        FluentSearch::for_type(client, self, include_archived)
    }

    #[instrument(skip(self, client), fields(type_name = self.name))]
    async fn get(
        &self,
        client: &dyn CatalogClient,
        id: &str,
        include_all_relationships: bool,
    ) -> CatalogResult<Asset> {
        let options = AssetFetchOptions::with_relationships(include_all_relationships);
        let asset = if is_guid(id) {
            client.get_asset_by_guid(id, options).await?
        } else {
            client
                .get_asset_by_qualified_name(self.name, id, options)
                .await?
        };
        require_type(self, id, asset)
    }

    #[instrument(skip(self, client), fields(type_name = self.name))]
    async fn get_with_attributes(
        &self,
        client: &dyn CatalogClient,
        id: &str,
        attributes: &[&str],
        attributes_on_related: &[&str],
    ) -> CatalogResult<Asset> {
        let by_guid = is_guid(id);
        let query = if by_guid {
            Query::term(fields::GUID, id)
        } else {
            Query::all(vec![
                Query::term(fields::TYPE_NAME, self.name),
                Query::term(fields::QUALIFIED_NAME, id),
            ])
        };
        let mut request = IndexSearchRequest::new(query, 0, 1);
        request.attributes = attributes.iter().map(|a| a.to_string()).collect();
        request.relation_attributes = attributes_on_related.iter().map(|a| a.to_string()).collect();

        let found = client.search(request).await?.entities.into_iter().next();
        match found {
            Some(asset) => require_type(self, id, asset),
            None if by_guid => Err(CatalogError::NotFoundByGuid(id.to_string())),
            None => Err(CatalogError::NotFoundByQualifiedName {
                type_name: self.name.to_string(),
                qualified_name: id.to_string(),
            }),
        }
    }

    #[instrument(skip(self, client), fields(type_name = self.name))]
    async fn restore(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
    ) -> CatalogResult<bool> {
        let existing = self
            .select(client, true)
            .where_(Query::term(fields::QUALIFIED_NAME, qualified_name))
            .page_size(1)
            .execute()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFoundByQualifiedName {
                type_name: self.name.to_string(),
                qualified_name: qualified_name.to_string(),
            })?;

        if existing.is_active() {
            debug!(qualified_name, "Asset already active, nothing to restore");
            return Ok(true);
        }

        let update = self
            .updater(qualified_name, name_of(&existing, qualified_name))
            .status(EntityStatus::Active);
        let restored = save_update(client, update, SaveOptions::default()).await?;
        let active = restored.map(|a| a.is_active()).unwrap_or(false);
        info!(qualified_name, active, "Restored asset");
        Ok(active)
    }

    async fn save(
        &self,
        client: &dyn CatalogClient,
        update: AssetUpdate,
    ) -> CatalogResult<MutationResponse> {
        if update.type_name != self.name {
            return Err(CatalogError::InvalidRequest(format!(
                "Update for {} cannot be saved as {}",
                update.type_name, self.name
            )));
        }
        client.save(vec![update], SaveOptions::default()).await
    }

    async fn delete(
        &self,
        client: &dyn CatalogClient,
        guid: &str,
    ) -> CatalogResult<MutationResponse> {
        client.delete(vec![guid.to_string()], DeleteType::Soft).await
    }

    async fn purge(
        &self,
        client: &dyn CatalogClient,
        guid: &str,
    ) -> CatalogResult<MutationResponse> {
        client.delete(vec![guid.to_string()], DeleteType::Hard).await
    }

    async fn remove_description(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>> {
        let update = self.updater(qualified_name, name).clear_description();
        save_update(client, update, SaveOptions::default()).await
    }

    async fn remove_user_description(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>> {
        let update = self.updater(qualified_name, name).clear_user_description();
        save_update(client, update, SaveOptions::default()).await
    }

    async fn remove_owners(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>> {
        let update = self.updater(qualified_name, name).clear_owners();
        save_update(client, update, SaveOptions::default()).await
    }

    #[instrument(skip(self, client), fields(type_name = self.name))]
    async fn update_certificate(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        status: CertificateStatus,
        message: Option<&str>,
    ) -> CatalogResult<Option<Asset>> {
        let existing = read_current(client, self, qualified_name).await?;
        let update = self
            .updater(qualified_name, name_of(&existing, qualified_name))
            .certificate(status, message);
        save_update(client, update, SaveOptions::default()).await
    }

    async fn remove_certificate(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>> {
        let update = self.updater(qualified_name, name).clear_certificate();
        save_update(client, update, SaveOptions::default()).await
    }

    #[instrument(skip(self, client), fields(type_name = self.name))]
    async fn update_announcement(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        announcement_type: AnnouncementType,
        title: &str,
        message: Option<&str>,
    ) -> CatalogResult<Option<Asset>> {
        let existing = read_current(client, self, qualified_name).await?;
        let update = self
            .updater(qualified_name, name_of(&existing, qualified_name))
            .announcement(announcement_type, title, message);
        save_update(client, update, SaveOptions::default()).await
    }

    async fn remove_announcement(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
    ) -> CatalogResult<Option<Asset>> {
        let update = self.updater(qualified_name, name).clear_announcement();
        save_update(client, update, SaveOptions::default()).await
    }

    async fn replace_terms(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        name: &str,
        terms: Vec<AssetRef>,
    ) -> CatalogResult<Option<Asset>> {
        let update = self.updater(qualified_name, name).terms(terms)?;
        save_update(client, update, SaveOptions::default()).await
    }

    #[instrument(skip(self, client, terms), fields(type_name = self.name, count = terms.len()))]
    async fn append_terms(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        terms: Vec<AssetRef>,
    ) -> CatalogResult<Option<Asset>> {
        let existing = read_current(client, self, qualified_name).await?;
        let terms = resolve_term_guids(client, terms).await?;
        let mut merged = existing.assigned_terms();
        for term in terms {
            if !merged.iter().any(|t| t.same_target(&term)) {
                merged.push(term);
            }
        }
        let update = self
            .updater(qualified_name, name_of(&existing, qualified_name))
            .terms(merged)?;
        save_update(client, update, SaveOptions::default()).await
    }

    #[instrument(skip(self, client, terms), fields(type_name = self.name, count = terms.len()))]
    async fn remove_terms(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        terms: Vec<AssetRef>,
    ) -> CatalogResult<Option<Asset>> {
        let existing = read_current(client, self, qualified_name).await?;
        let terms = resolve_term_guids(client, terms).await?;
        let remaining: Vec<AssetRef> = existing
            .assigned_terms()
            .into_iter()
            .filter(|t| !terms.iter().any(|r| r.same_target(t)))
            .collect();
        let update = self
            .updater(qualified_name, name_of(&existing, qualified_name))
            .terms(remaining)?;
        save_update(client, update, SaveOptions::default()).await
    }

    #[instrument(skip(self, client, propagation), fields(type_name = self.name))]
    async fn append_atlan_tags(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        tag_names: &[&str],
        propagation: TagPropagation,
    ) -> CatalogResult<Option<Asset>> {
        let existing = read_current(client, self, qualified_name).await?;
        let tags = tag_names
            .iter()
            .map(|name| AtlanTag::new(*name, propagation))
            .collect();
        let update = self
            .updater(qualified_name, name_of(&existing, qualified_name))
            .atlan_tags(tags);
        save_update(client, update, SaveOptions::appending_tags()).await
    }

    #[instrument(skip(self, client), fields(type_name = self.name))]
    async fn remove_atlan_tag(
        &self,
        client: &dyn CatalogClient,
        qualified_name: &str,
        tag_name: &str,
    ) -> CatalogResult<()> {
        read_current(client, self, qualified_name).await?;
        client
            .remove_atlan_tag(self.name, qualified_name, tag_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_guid() {
        assert!(is_guid("11111111-1111-1111-1111-111111111111"));
        assert!(is_guid("6d2a9b5e11114c2e9a8b0e8e6b2f0a11"));
        assert!(!is_guid("default/snowflake/1700000000/db/sch/orders"));
        assert!(!is_guid("-1234"));
        assert!(!is_guid(""));
    }
}
