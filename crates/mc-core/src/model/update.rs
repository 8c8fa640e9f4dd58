//! Partial-update (patch) type and placeholder GUIDs.

use super::asset::{AnnouncementType, AtlanTag, CertificateStatus, EntityStatus};
use super::reference::{AssetRef, SaveSemantic};
use super::types::AssetType;
use crate::error::{CatalogError, CatalogResult};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

static PLACEHOLDER_BASE: OnceLock<u64> = OnceLock::new();
static PLACEHOLDER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generates a synthetic negative GUID for an asset that does not exist yet.
///
/// Values start at a random base per process and increase monotonically, so
/// two calls never return the same placeholder.
pub fn placeholder_guid() -> String {
    let base = *PLACEHOLDER_BASE.get_or_init(|| (uuid::Uuid::new_v4().as_u128() >> 88) as u64);
    let seq = PLACEHOLDER_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("-{}", base + seq + 1)
}

/// Returns true if `guid` is a client-side placeholder.
pub fn is_placeholder_guid(guid: &str) -> bool {
    guid.strip_prefix('-')
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// A minimal, mutable stub describing a partial update to one asset.
///
/// Built by [`AssetType::updater`]. Attribute entries holding `null` clear the
/// attribute server-side; absent entries are left untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUpdate {
    pub type_name: String,
    pub guid: String,
    pub qualified_name: String,
    pub name: String,
    pub attributes: BTreeMap<String, Value>,
    pub relationships: BTreeMap<String, Vec<AssetRef>>,
    /// `None` leaves tags as they are; `Some` sends this list.
    pub atlan_tags: Option<Vec<AtlanTag>>,
    pub status: Option<EntityStatus>,
}

impl AssetType {
    /// Builds an update stub for the asset with this qualified name.
    pub fn updater(&self, qualified_name: impl Into<String>, name: impl Into<String>) -> AssetUpdate {
        AssetUpdate {
            type_name: self.name.to_string(),
            guid: placeholder_guid(),
            qualified_name: qualified_name.into(),
            name: name.into(),
            attributes: BTreeMap::new(),
            relationships: BTreeMap::new(),
            atlan_tags: None,
            status: None,
        }
    }
}

impl AssetUpdate {
    fn asset_type(&self) -> CatalogResult<&'static AssetType> {
        super::types::find(&self.type_name)
            .ok_or_else(|| CatalogError::UnknownType(self.type_name.clone()))
    }

    /// Sets an attribute after validating it against the type definition.
    pub fn set(mut self, name: &str, value: Value) -> CatalogResult<Self> {
        let asset_type = self.asset_type()?;
        let def = asset_type.attribute(name).ok_or_else(|| {
            CatalogError::InvalidAttribute(format!(
                "{} is not an attribute of {}",
                name, asset_type.name
            ))
        })?;
        if matches!(name, "qualifiedName" | "name") {
            return Err(CatalogError::InvalidAttribute(format!(
                "{} is fixed when the updater is built",
                name
            )));
        }
        if !def.kind.accepts(&value) {
            return Err(CatalogError::InvalidAttribute(format!(
                "{}.{} expects {:?}, got {}",
                asset_type.name, name, def.kind, value
            )));
        }
        self.attributes.insert(name.to_string(), value);
        Ok(self)
    }

    /// Clears an attribute server-side.
    pub fn clear(self, name: &str) -> CatalogResult<Self> {
        self.set(name, Value::Null)
    }

    fn put(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.put("description", Value::String(description.into()))
    }

    pub fn clear_description(self) -> Self {
        self.put("description", Value::Null)
    }

    pub fn user_description(self, description: impl Into<String>) -> Self {
        self.put("userDescription", Value::String(description.into()))
    }

    pub fn clear_user_description(self) -> Self {
        self.put("userDescription", Value::Null)
    }

    pub fn owner_users<I, S>(self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let users = users.into_iter().map(|u| Value::String(u.into())).collect();
        self.put("ownerUsers", Value::Array(users))
    }

    /// Clears both owner users and owner groups.
    pub fn clear_owners(self) -> Self {
        self.put("ownerUsers", Value::Null)
            .put("ownerGroups", Value::Null)
    }

    pub fn certificate(self, status: CertificateStatus, message: Option<&str>) -> Self {
        let updated = self.put("certificateStatus", Value::String(status.as_str().to_string()));
        match message {
            Some(m) => updated.put("certificateStatusMessage", Value::String(m.to_string())),
            None => updated,
        }
    }

    pub fn clear_certificate(self) -> Self {
        self.put("certificateStatus", Value::Null)
            .put("certificateStatusMessage", Value::Null)
    }

    pub fn announcement(
        self,
        announcement_type: AnnouncementType,
        title: impl Into<String>,
        message: Option<&str>,
    ) -> Self {
        let updated = self
            .put(
                "announcementType",
                Value::String(announcement_type.as_str().to_string()),
            )
            .put("announcementTitle", Value::String(title.into()));
        match message {
            Some(m) => updated.put("announcementMessage", Value::String(m.to_string())),
            None => updated,
        }
    }

    pub fn clear_announcement(self) -> Self {
        self.put("announcementType", Value::Null)
            .put("announcementTitle", Value::Null)
            .put("announcementMessage", Value::Null)
    }

    /// Replaces the relationship with exactly these references.
    ///
    /// An empty list removes every existing reference.
    pub fn relationship(mut self, name: &str, refs: Vec<AssetRef>) -> CatalogResult<Self> {
        self.check_relationship(name, &refs)?;
        let refs = refs
            .into_iter()
            .map(|r| r.with_semantic(SaveSemantic::Replace))
            .collect();
        self.relationships.insert(name.to_string(), refs);
        Ok(self)
    }

    /// Adds one reference, keeping its own save semantic.
    pub fn add_relationship(mut self, name: &str, reference: AssetRef) -> CatalogResult<Self> {
        self.check_relationship(name, std::slice::from_ref(&reference))?;
        self.relationships
            .entry(name.to_string())
            .or_default()
            .push(reference);
        Ok(self)
    }

    fn check_relationship(&self, name: &str, refs: &[AssetRef]) -> CatalogResult<()> {
        let asset_type = self.asset_type()?;
        let def = asset_type.relationship(name).ok_or_else(|| {
            CatalogError::InvalidRelationship(format!(
                "{} is not a relationship of {}",
                name, asset_type.name
            ))
        })?;
        if let Some(bad) = refs.iter().find(|r| !def.accepts(&r.type_name)) {
            return Err(CatalogError::InvalidRelationship(format!(
                "{}.{} cannot reference a {}",
                asset_type.name, name, bad.type_name
            )));
        }
        Ok(())
    }

    /// Replaces assigned glossary terms; an empty list removes them all.
    pub fn terms(self, terms: Vec<AssetRef>) -> CatalogResult<Self> {
        self.relationship("meanings", terms)
    }

    /// Appends glossary terms, leaving existing assignments in place.
    pub fn append_terms(self, terms: Vec<AssetRef>) -> CatalogResult<Self> {
        terms.into_iter().try_fold(self, |update, term| {
            update.add_relationship("meanings", term.with_semantic(SaveSemantic::Append))
        })
    }

    /// Removes specific glossary terms.
    pub fn remove_terms(self, terms: Vec<AssetRef>) -> CatalogResult<Self> {
        terms.into_iter().try_fold(self, |update, term| {
            update.add_relationship("meanings", term.with_semantic(SaveSemantic::Remove))
        })
    }

    pub fn atlan_tags(mut self, tags: Vec<AtlanTag>) -> Self {
        self.atlan_tags = Some(tags);
        self
    }

    pub fn status(mut self, status: EntityStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// References in `name` carrying the given semantic.
    pub fn refs_with(&self, name: &str, semantic: SaveSemantic) -> Vec<&AssetRef> {
        self.relationships
            .get(name)
            .map(|refs| refs.iter().filter(|r| r.semantic == semantic).collect())
            .unwrap_or_default()
    }

    /// Relationship names carrying a full replacement (including empty replacements).
    fn replaced_relationships(&self) -> impl Iterator<Item = (&String, Vec<&AssetRef>)> {
        self.relationships.iter().filter_map(|(name, refs)| {
            let replace: Vec<_> = refs
                .iter()
                .filter(|r| r.semantic == SaveSemantic::Replace)
                .collect();
            if replace.is_empty() && !refs.is_empty() {
                None
            } else {
                Some((name, replace))
            }
        })
    }

    fn relationships_with(&self, semantic: SaveSemantic) -> Map<String, Value> {
        let mut out = Map::new();
        for name in self.relationships.keys() {
            let refs = self.refs_with(name, semantic);
            if !refs.is_empty() {
                out.insert(name.clone(), refs_to_value(&refs));
            }
        }
        out
    }
}

fn refs_to_value(refs: &[&AssetRef]) -> Value {
    Value::Array(
        refs.iter()
            .filter_map(|r| serde_json::to_value(r).ok())
            .collect(),
    )
}

impl Serialize for AssetUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut attributes = Map::new();
        attributes.insert(
            "qualifiedName".to_string(),
            Value::String(self.qualified_name.clone()),
        );
        attributes.insert("name".to_string(), Value::String(self.name.clone()));
        for (k, v) in &self.attributes {
            attributes.insert(k.clone(), v.clone());
        }

        let mut entity = Map::new();
        entity.insert("typeName".to_string(), Value::String(self.type_name.clone()));
        entity.insert("guid".to_string(), Value::String(self.guid.clone()));
        if let Some(status) = self.status {
            entity.insert("status".to_string(), Value::String(status.to_string()));
        }
        entity.insert("attributes".to_string(), Value::Object(attributes));

        let replaced: Map<String, Value> = self
            .replaced_relationships()
            .map(|(name, refs)| (name.clone(), refs_to_value(&refs)))
            .collect();
        if !replaced.is_empty() {
            entity.insert("relationshipAttributes".to_string(), Value::Object(replaced));
        }
        let appended = self.relationships_with(SaveSemantic::Append);
        if !appended.is_empty() {
            entity.insert(
                "appendRelationshipAttributes".to_string(),
                Value::Object(appended),
            );
        }
        let removed = self.relationships_with(SaveSemantic::Remove);
        if !removed.is_empty() {
            entity.insert(
                "removeRelationshipAttributes".to_string(),
                Value::Object(removed),
            );
        }
        if let Some(tags) = &self.atlan_tags {
            entity.insert(
                "classifications".to_string(),
                serde_json::to_value(tags).map_err(<S::Error as serde::ser::Error>::custom)?,
            );
        }

        Value::Object(entity).serialize(serializer)
    }
}
