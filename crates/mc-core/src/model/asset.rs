//! The asset record shared by every catalogued type.
//!
//! An [`Asset`] mirrors the catalog's entity wire format: identity and status at
//! the top level, descriptive facets and type-specific attributes under
//! `attributes`, relationships under `relationshipAttributes`, and
//! classification tags under `classifications`.

use super::reference::{AssetRef, RelationshipSet};
use super::types::{self, AssetType, Capability};
use super::update::{placeholder_guid, AssetUpdate};
use crate::error::{CatalogError, CatalogResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Lifecycle status of an asset on the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    #[default]
    Active,
    /// Soft-deleted (archived); can be restored.
    Deleted,
    Purged,
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityStatus::Active => write!(f, "ACTIVE"),
            EntityStatus::Deleted => write!(f, "DELETED"),
            EntityStatus::Purged => write!(f, "PURGED"),
        }
    }
}

/// Certificate status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateStatus {
    Verified,
    Draft,
    Deprecated,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Verified => "VERIFIED",
            CertificateStatus::Draft => "DRAFT",
            CertificateStatus::Deprecated => "DEPRECATED",
        }
    }
}

impl std::str::FromStr for CertificateStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VERIFIED" => Ok(CertificateStatus::Verified),
            "DRAFT" => Ok(CertificateStatus::Draft),
            "DEPRECATED" => Ok(CertificateStatus::Deprecated),
            _ => Err(format!("Invalid certificate status: {}", s)),
        }
    }
}

/// Type of an announcement banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementType {
    Information,
    Warning,
    Issue,
}

impl AnnouncementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementType::Information => "information",
            AnnouncementType::Warning => "warning",
            AnnouncementType::Issue => "issue",
        }
    }
}

/// Certificate facet: status plus optional message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub status: CertificateStatus,
    pub message: Option<String>,
}

/// Announcement banner facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub announcement_type: AnnouncementType,
    pub title: String,
    pub message: Option<String>,
}

/// A classification tag attached to an asset, with its propagation flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlanTag {
    /// Human-readable tag name.
    pub type_name: String,
    /// GUID of the asset the tag was attached to (differs when propagated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_guid: Option<String>,
    #[serde(default)]
    pub propagate: bool,
    #[serde(default)]
    pub remove_propagations_on_entity_delete: bool,
    #[serde(default)]
    pub restrict_propagation_through_lineage: bool,
    #[serde(default)]
    pub restrict_propagation_through_hierarchy: bool,
}

impl AtlanTag {
    /// Builds a tag with the given propagation settings.
    pub fn new(name: impl Into<String>, propagation: TagPropagation) -> Self {
        Self {
            type_name: name.into(),
            entity_guid: None,
            propagate: propagation.propagate,
            remove_propagations_on_entity_delete: propagation.remove_propagations_on_delete,
            restrict_propagation_through_lineage: propagation.restrict_lineage_propagation,
            restrict_propagation_through_hierarchy: propagation
                .restrict_propagation_through_hierarchy,
        }
    }

    /// Returns true if the tag was propagated from another asset.
    pub fn is_propagated_to(&self, asset_guid: Option<&str>) -> bool {
        match (self.entity_guid.as_deref(), asset_guid) {
            (Some(source), Some(guid)) => source != guid,
            _ => false,
        }
    }
}

/// Propagation flags applied when attaching tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagPropagation {
    pub propagate: bool,
    pub remove_propagations_on_delete: bool,
    pub restrict_lineage_propagation: bool,
    pub restrict_propagation_through_hierarchy: bool,
}

impl Default for TagPropagation {
    fn default() -> Self {
        Self {
            propagate: true,
            remove_propagations_on_delete: true,
            restrict_lineage_propagation: false,
            restrict_propagation_through_hierarchy: false,
        }
    }
}

impl TagPropagation {
    /// Attach without propagating anywhere.
    pub fn none() -> Self {
        Self {
            propagate: false,
            remove_propagations_on_delete: false,
            restrict_lineage_propagation: false,
            restrict_propagation_through_hierarchy: false,
        }
    }
}

/// Term assignment header returned when relationships are not expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermAssignment {
    pub term_guid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

/// Descriptive facets shared by every type plus type-specific attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_description: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub owner_users: BTreeSet<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeSet::is_empty"
    )]
    pub owner_groups: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_status: Option<CertificateStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_type: Option<AnnouncementType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_qualified_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_name: Option<String>,
    /// Type-specific attributes, keyed by wire name.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A relationship value: a single reference or a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Relationship {
    One(AssetRef),
    Many(RelationshipSet),
}

impl Relationship {
    /// Iterates the references held, whatever the cardinality.
    pub fn refs(&self) -> Box<dyn Iterator<Item = &AssetRef> + '_> {
        match self {
            Relationship::One(r) => Box::new(std::iter::once(r)),
            Relationship::Many(set) => Box::new(set.iter()),
        }
    }
}

/// A catalogued metadata entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
    #[serde(default)]
    pub attributes: AssetAttributes,
    #[serde(
        default,
        deserialize_with = "relationships_skipping_nulls",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub relationship_attributes: BTreeMap<String, Relationship>,
    #[serde(
        default,
        rename = "classifications",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub atlan_tags: Vec<AtlanTag>,
    #[serde(
        default,
        rename = "meanings",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub term_assignments: Vec<TermAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,
    /// Epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn relationships_skipping_nulls<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Relationship>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<Relationship>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect())
}

impl Asset {
    /// Builds a new, not-yet-saved asset with a placeholder GUID.
    pub fn new(
        asset_type: &AssetType,
        qualified_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            type_name: asset_type.name.to_string(),
            guid: Some(placeholder_guid()),
            status: EntityStatus::Active,
            attributes: AssetAttributes {
                qualified_name: Some(qualified_name.into()),
                name: Some(name.into()),
                ..Default::default()
            },
            relationship_attributes: BTreeMap::new(),
            atlan_tags: Vec::new(),
            term_assignments: Vec::new(),
            created_by: None,
            updated_by: None,
            create_time: None,
            update_time: None,
        }
    }

    /// Registered definition of this asset's type, if known.
    pub fn asset_type(&self) -> Option<&'static AssetType> {
        types::find(&self.type_name)
    }

    /// Returns true if this asset's type carries the capability.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.asset_type()
            .map(|t| t.has(capability))
            .unwrap_or(false)
    }

    pub fn qualified_name(&self) -> Option<&str> {
        self.attributes.qualified_name.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.name.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.status == EntityStatus::Active
    }

    /// Certificate facet, when a status is set.
    pub fn certificate(&self) -> Option<Certificate> {
        self.attributes.certificate_status.map(|status| Certificate {
            status,
            message: self.attributes.certificate_status_message.clone(),
        })
    }

    /// Announcement facet, when a type is set.
    pub fn announcement(&self) -> Option<Announcement> {
        self.attributes
            .announcement_type
            .map(|announcement_type| Announcement {
                announcement_type,
                title: self
                    .attributes
                    .announcement_title
                    .clone()
                    .unwrap_or_default(),
                message: self.attributes.announcement_message.clone(),
            })
    }

    /// Names of tags directly attached to (not propagated onto) this asset.
    pub fn atlan_tag_names(&self) -> Vec<&str> {
        self.atlan_tags
            .iter()
            .filter(|t| !t.is_propagated_to(self.guid.as_deref()))
            .map(|t| t.type_name.as_str())
            .collect()
    }

    /// Glossary terms assigned to this asset.
    ///
    /// Reads the expanded `meanings` relationship when present, otherwise the
    /// assignment headers returned with relationships suppressed.
    pub fn assigned_terms(&self) -> Vec<AssetRef> {
        if let Some(rel) = self.relationship_attributes.get("meanings") {
            return rel.refs().cloned().collect();
        }
        self.term_assignments
            .iter()
            .map(|t| {
                let mut r = types::GLOSSARY_TERM
                    .ref_by_guid(t.term_guid.clone(), Default::default());
                r.display_text = t.display_text.clone();
                r
            })
            .collect()
    }

    /// Raw type-specific attribute value.
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.extra.get(name).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get_attribute(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get_attribute(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_attribute(name).and_then(Value::as_bool)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get_attribute(name).and_then(Value::as_f64)
    }

    /// Date attribute, stored as epoch milliseconds.
    pub fn get_date(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get_i64(name)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    pub fn get_strings(&self, name: &str) -> Vec<&str> {
        self.get_attribute(name)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Sets a type-specific attribute after validating it against the type definition.
    pub fn set_attribute(&mut self, name: &str, value: Value) -> CatalogResult<()> {
        let asset_type = self.require_type()?;
        let def = asset_type.own_attribute(name).ok_or_else(|| {
            if asset_type.attribute(name).is_some() {
                CatalogError::InvalidAttribute(format!(
                    "{} is a common attribute; set it through its typed field",
                    name
                ))
            } else {
                CatalogError::InvalidAttribute(format!(
                    "{} is not an attribute of {}",
                    name, asset_type.name
                ))
            }
        })?;
        if !def.kind.accepts(&value) {
            return Err(CatalogError::InvalidAttribute(format!(
                "{}.{} expects {:?}, got {}",
                asset_type.name, name, def.kind, value
            )));
        }
        self.attributes.extra.insert(name.to_string(), value);
        Ok(())
    }

    /// References held under a relationship name.
    pub fn relationship(&self, name: &str) -> Vec<&AssetRef> {
        self.relationship_attributes
            .get(name)
            .map(|r| r.refs().collect())
            .unwrap_or_default()
    }

    /// Adds a reference to a relationship, validating name and target type.
    ///
    /// Single-valued relationships are overwritten; set-valued ones accumulate.
    pub fn add_relationship(&mut self, name: &str, reference: AssetRef) -> CatalogResult<()> {
        let asset_type = self.require_type()?;
        let def = asset_type.relationship(name).ok_or_else(|| {
            CatalogError::InvalidRelationship(format!(
                "{} is not a relationship of {}",
                name, asset_type.name
            ))
        })?;
        if !def.accepts(&reference.type_name) {
            return Err(CatalogError::InvalidRelationship(format!(
                "{}.{} cannot reference a {}",
                asset_type.name, name, reference.type_name
            )));
        }
        if def.many {
            let entry = self
                .relationship_attributes
                .entry(name.to_string())
                .or_insert_with(|| Relationship::Many(RelationshipSet::new()));
            if let Relationship::One(existing) = entry {
                let existing = existing.clone();
                *entry = Relationship::Many(RelationshipSet::from([existing]));
            }
            if let Relationship::Many(set) = entry {
                set.insert(reference);
            }
        } else {
            self.relationship_attributes
                .insert(name.to_string(), Relationship::One(reference));
        }
        Ok(())
    }

    /// Returns a minimal stub carrying identity only.
    ///
    /// Prefers the GUID; falls back to the qualified name. Fails when neither
    /// is set since the stub could not identify anything.
    pub fn trim_to_reference(&self) -> CatalogResult<AssetRef> {
        if let Some(guid) = self.guid.as_deref().filter(|g| !g.is_empty()) {
            return Ok(AssetRef::by_guid(self.type_name.clone(), guid));
        }
        if let Some(qn) = self.qualified_name().filter(|q| !q.is_empty()) {
            return Ok(AssetRef::by_qualified_name(self.type_name.clone(), qn));
        }
        Err(CatalogError::MissingRequiredRelationshipParam {
            type_name: self.type_name.clone(),
            param: "guid, qualifiedName".to_string(),
        })
    }

    /// Returns an update stub carrying only the fields required for a save.
    pub fn trim_to_required(&self) -> CatalogResult<AssetUpdate> {
        let qn = self.qualified_name().filter(|s| !s.is_empty());
        let name = self.name().filter(|s| !s.is_empty());
        match (qn, name) {
            (Some(qn), Some(name)) => {
                let asset_type = self.require_type()?;
                Ok(asset_type.updater(qn, name))
            }
            (qn, name) => {
                let mut params = Vec::new();
                if qn.is_none() {
                    params.push("qualifiedName".to_string());
                }
                if name.is_none() {
                    params.push("name".to_string());
                }
                Err(CatalogError::MissingRequiredUpdateParam {
                    type_name: self.type_name.clone(),
                    params,
                })
            }
        }
    }

    fn require_type(&self) -> CatalogResult<&'static AssetType> {
        self.asset_type()
            .ok_or_else(|| CatalogError::UnknownType(self.type_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reference::SaveSemantic;
    use crate::model::types::{COLUMN, PROCESS, SCHEMA, TABLE};
    use crate::model::update::is_placeholder_guid;
    use serde_json::json;

    fn bare(type_name: &str) -> Asset {
        Asset {
            type_name: type_name.to_string(),
            guid: None,
            status: EntityStatus::Active,
            attributes: AssetAttributes::default(),
            relationship_attributes: BTreeMap::new(),
            atlan_tags: Vec::new(),
            term_assignments: Vec::new(),
            created_by: None,
            updated_by: None,
            create_time: None,
            update_time: None,
        }
    }

    #[test]
    fn test_trim_to_reference_without_identity_fails() {
        let asset = bare("Table");
        let err = asset.trim_to_reference().unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingRequiredRelationshipParam { .. }
        ));
        assert_eq!(err.code(), "MISSING_REQUIRED_RELATIONSHIP_PARAM");
    }

    #[test]
    fn test_trim_to_reference_prefers_guid() {
        let mut asset = bare("Table");
        asset.guid = Some("6d2a9b5e-1111-4c2e-9a8b-0e8e6b2f0a11".to_string());
        asset.attributes.qualified_name = Some("default/snowflake/1/db/sch/tbl".to_string());
        asset.attributes.description = Some("orders".to_string());

        let r = asset.trim_to_reference().unwrap();
        assert_eq!(r.guid, asset.guid);
        assert_eq!(r.type_name, "Table");
        assert!(r.unique_attributes.is_none());
        assert!(r.display_text.is_none());
        assert_eq!(r.semantic, SaveSemantic::Replace);
    }

    #[test]
    fn test_trim_to_reference_falls_back_to_qualified_name() {
        let mut asset = bare("Column");
        asset.attributes.qualified_name = Some("default/snowflake/1/db/sch/tbl/id".to_string());
        let r = asset.trim_to_reference().unwrap();
        assert!(r.guid.is_none());
        assert_eq!(r.qualified_name(), Some("default/snowflake/1/db/sch/tbl/id"));
    }

    #[test]
    fn test_trim_to_required() {
        let mut asset = bare("Table");
        asset.attributes.name = Some("orders".to_string());
        match asset.trim_to_required().unwrap_err() {
            CatalogError::MissingRequiredUpdateParam { params, .. } => {
                assert_eq!(params, vec!["qualifiedName".to_string()])
            }
            e => panic!("Expected MissingRequiredUpdateParam, got {:?}", e),
        }

        asset.attributes.qualified_name = Some("default/snowflake/1/db/sch/orders".to_string());
        let update = asset.trim_to_required().unwrap();
        assert_eq!(update.qualified_name, "default/snowflake/1/db/sch/orders");
        assert_eq!(update.name, "orders");
        assert!(is_placeholder_guid(&update.guid));
    }

    #[test]
    fn test_set_attribute_validates_kind() {
        let mut table = Asset::new(&TABLE, "default/snowflake/1/db/sch/orders", "orders");
        table.set_attribute("rowCount", json!(1200)).unwrap();
        assert_eq!(table.get_i64("rowCount"), Some(1200));

        assert!(matches!(
            table.set_attribute("rowCount", json!("many")),
            Err(CatalogError::InvalidAttribute(_))
        ));
        assert!(matches!(
            table.set_attribute("dataType", json!("VARCHAR")),
            Err(CatalogError::InvalidAttribute(_))
        ));
        assert!(table.set_attribute("description", json!("x")).is_err());
    }

    #[test]
    fn test_add_relationship_validates_target() {
        let mut table = Asset::new(&TABLE, "qn/orders", "orders");
        table
            .add_relationship("atlanSchema", SCHEMA.ref_by_qualified_name("qn", SaveSemantic::Replace))
            .unwrap();
        table
            .add_relationship("columns", COLUMN.ref_by_guid("c2", SaveSemantic::Replace))
            .unwrap();
        table
            .add_relationship("columns", COLUMN.ref_by_guid("c1", SaveSemantic::Replace))
            .unwrap();

        assert_eq!(table.relationship("atlanSchema").len(), 1);
        let columns: Vec<_> = table
            .relationship("columns")
            .iter()
            .filter_map(|r| r.guid.as_deref())
            .collect();
        assert_eq!(columns, vec!["c1", "c2"]);

        assert!(matches!(
            table.add_relationship("columns", TABLE.ref_by_guid("t", SaveSemantic::Replace)),
            Err(CatalogError::InvalidRelationship(_))
        ));
        assert!(table
            .add_relationship("inputs", TABLE.ref_by_guid("t", SaveSemantic::Replace))
            .is_err());

        let mut process = Asset::new(&PROCESS, "qn/p", "p");
        process
            .add_relationship("inputs", TABLE.ref_by_guid("t", SaveSemantic::Replace))
            .unwrap();
    }

    #[test]
    fn test_deserialize_server_entity() {
        let asset: Asset = serde_json::from_value(json!({
            "typeName": "Table",
            "guid": "6d2a9b5e-1111-4c2e-9a8b-0e8e6b2f0a11",
            "status": "ACTIVE",
            "attributes": {
                "qualifiedName": "default/snowflake/1/db/sch/orders",
                "name": "orders",
                "ownerUsers": null,
                "certificateStatus": "VERIFIED",
                "certificateStatusMessage": "Reviewed",
                "rowCount": 42,
                "isPartitioned": false
            },
            "relationshipAttributes": {
                "atlanSchema": {"typeName": "Schema", "guid": "s-1"},
                "columns": [
                    {"typeName": "Column", "guid": "c-2"},
                    {"typeName": "Column", "guid": "c-1"}
                ],
                "meanings": [],
                "readme": null
            },
            "classifications": [
                {"typeName": "PII", "entityGuid": "6d2a9b5e-1111-4c2e-9a8b-0e8e6b2f0a11", "propagate": true},
                {"typeName": "Confidential", "entityGuid": "upstream", "propagate": true}
            ],
            "meanings": null
        }))
        .unwrap();

        assert_eq!(asset.qualified_name(), Some("default/snowflake/1/db/sch/orders"));
        assert!(asset.attributes.owner_users.is_empty());
        assert_eq!(
            asset.certificate(),
            Some(Certificate {
                status: CertificateStatus::Verified,
                message: Some("Reviewed".to_string()),
            })
        );
        assert_eq!(asset.get_i64("rowCount"), Some(42));
        assert_eq!(asset.get_bool("isPartitioned"), Some(false));
        assert_eq!(asset.relationship("columns").len(), 2);
        assert!(!asset.relationship_attributes.contains_key("readme"));
        assert_eq!(asset.atlan_tag_names(), vec!["PII"]);
        assert!(asset.has_capability(Capability::Sql));
        assert!(!asset.has_capability(Capability::Bi));
    }

    #[test]
    fn test_assigned_terms_from_headers() {
        let mut asset = bare("Table");
        asset.term_assignments = vec![TermAssignment {
            term_guid: "t-1".to_string(),
            display_text: Some("Revenue".to_string()),
        }];
        let terms = asset.assigned_terms();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].type_name, "AtlasGlossaryTerm");
        assert_eq!(terms[0].guid.as_deref(), Some("t-1"));
    }

    #[test]
    fn test_date_attribute() {
        let mut asset: Asset = serde_json::from_value(json!({
            "typeName": "MCMonitor",
            "attributes": {"mcMonitorRuleNextExecutionTime": 1700000000000i64}
        }))
        .unwrap();
        let when = asset.get_date("mcMonitorRuleNextExecutionTime").unwrap();
        assert_eq!(when.timestamp(), 1_700_000_000);
        asset
            .set_attribute("mcMonitorBreachRate", json!(0.25))
            .unwrap();
        assert_eq!(asset.get_f64("mcMonitorBreachRate"), Some(0.25));
    }
}
