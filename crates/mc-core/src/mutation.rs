//! Results and options for save and delete calls.

use crate::model::Asset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How an asset is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeleteType {
    /// Archive; the asset can be restored.
    #[default]
    Soft,
    /// Remove permanently.
    Hard,
    /// Remove permanently along with audit history.
    Purge,
}

impl fmt::Display for DeleteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteType::Soft => write!(f, "SOFT"),
            DeleteType::Hard => write!(f, "HARD"),
            DeleteType::Purge => write!(f, "PURGE"),
        }
    }
}

/// How tags sent in a save are merged with stored tags.
///
/// With both flags off, tags in the payload are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Sent tags replace stored tags.
    pub replace_atlan_tags: bool,
    /// Sent tags are added to stored tags.
    pub append_atlan_tags: bool,
}

impl SaveOptions {
    pub fn replacing_tags() -> Self {
        Self {
            replace_atlan_tags: true,
            append_atlan_tags: false,
        }
    }

    pub fn appending_tags() -> Self {
        Self {
            replace_atlan_tags: false,
            append_atlan_tags: true,
        }
    }
}

/// Assets touched by a mutation, grouped by outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutatedEntities {
    #[serde(rename = "CREATE", default)]
    pub created: Vec<Asset>,
    #[serde(rename = "UPDATE", default)]
    pub updated: Vec<Asset>,
    #[serde(rename = "PARTIAL_UPDATE", default)]
    pub partially_updated: Vec<Asset>,
    #[serde(rename = "DELETE", default)]
    pub deleted: Vec<Asset>,
}

/// Response to a save or delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub mutated_entities: MutatedEntities,
    /// Placeholder GUID -> assigned GUID for created assets.
    #[serde(default)]
    pub guid_assignments: BTreeMap<String, String>,
}

impl MutationResponse {
    pub fn created_assets(&self) -> &[Asset] {
        &self.mutated_entities.created
    }

    /// Fully and partially updated assets.
    pub fn updated_assets(&self) -> impl Iterator<Item = &Asset> {
        self.mutated_entities
            .updated
            .iter()
            .chain(self.mutated_entities.partially_updated.iter())
    }

    pub fn deleted_assets(&self) -> &[Asset] {
        &self.mutated_entities.deleted
    }

    /// Returns true when nothing was created, updated, or deleted.
    pub fn is_empty(&self) -> bool {
        self.mutated_entities.created.is_empty()
            && self.mutated_entities.updated.is_empty()
            && self.mutated_entities.partially_updated.is_empty()
            && self.mutated_entities.deleted.is_empty()
    }

    /// Updated asset of the given type, if the save touched one.
    pub fn updated_asset_of(&self, type_name: &str) -> Option<&Asset> {
        self.updated_assets().find(|a| a.type_name == type_name)
    }

    /// Created or updated asset of the given type.
    pub fn saved_asset_of(&self, type_name: &str) -> Option<&Asset> {
        self.mutated_entities
            .created
            .iter()
            .find(|a| a.type_name == type_name)
            .or_else(|| self.updated_asset_of(type_name))
    }

    /// Real GUID assigned to a placeholder.
    pub fn assigned_guid(&self, placeholder: &str) -> Option<&str> {
        self.guid_assignments.get(placeholder).map(String::as_str)
    }
}
