//! Relationship references and save semantics.

use super::types::AssetType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a relationship reference is merged into the existing set server-side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaveSemantic {
    /// The sent set replaces whatever is stored.
    #[default]
    Replace,
    /// The reference is added to the stored set.
    Append,
    /// The reference is removed from the stored set.
    Remove,
}

/// Unique attributes identifying an asset by name rather than GUID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UniqueAttributes {
    #[serde(rename = "qualifiedName")]
    pub qualified_name: String,
}

/// A minimal asset representation carrying only identity.
///
/// Used as a relationship endpoint so relationships can be expressed without
/// re-sending full payloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_attributes: Option<UniqueAttributes>,
    /// Not sent inline; decides which relationship block the reference lands in.
    #[serde(skip)]
    pub semantic: SaveSemantic,
    /// Returned by the server for display; never sent.
    #[serde(default, skip_serializing)]
    pub display_text: Option<String>,
}

impl AssetRef {
    /// Reference by GUID.
    pub fn by_guid(type_name: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            guid: Some(guid.into()),
            unique_attributes: None,
            semantic: SaveSemantic::Replace,
            display_text: None,
        }
    }

    /// Reference by qualified name.
    pub fn by_qualified_name(type_name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            guid: None,
            unique_attributes: Some(UniqueAttributes {
                qualified_name: qualified_name.into(),
            }),
            semantic: SaveSemantic::Replace,
            display_text: None,
        }
    }

    /// Returns the same reference with the given save semantic.
    pub fn with_semantic(mut self, semantic: SaveSemantic) -> Self {
        self.semantic = semantic;
        self
    }

    /// Qualified name, when the reference is by name.
    pub fn qualified_name(&self) -> Option<&str> {
        self.unique_attributes
            .as_ref()
            .map(|u| u.qualified_name.as_str())
    }

    /// Returns true if this reference points at the same asset as `other`.
    ///
    /// Matches on GUID when both sides carry one, otherwise on qualified name.
    pub fn same_target(&self, other: &AssetRef) -> bool {
        if self.type_name != other.type_name {
            return false;
        }
        match (&self.guid, &other.guid) {
            (Some(a), Some(b)) => a == b,
            _ => match (self.qualified_name(), other.qualified_name()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

/// A sorted, de-duplicated set of references.
pub type RelationshipSet = BTreeSet<AssetRef>;

impl AssetType {
    /// Builds a reference to an asset of this type by GUID.
    pub fn ref_by_guid(&self, guid: impl Into<String>, semantic: SaveSemantic) -> AssetRef {
        AssetRef::by_guid(self.name, guid).with_semantic(semantic)
    }

    /// Builds a reference to an asset of this type by qualified name.
    pub fn ref_by_qualified_name(
        &self,
        qualified_name: impl Into<String>,
        semantic: SaveSemantic,
    ) -> AssetRef {
        AssetRef::by_qualified_name(self.name, qualified_name).with_semantic(semantic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{COLUMN, GLOSSARY_TERM};
    use serde_json::json;

    #[test]
    fn test_ref_serialization_omits_semantic() {
        let r = COLUMN.ref_by_guid("abc", SaveSemantic::Append);
        assert_eq!(r.semantic, SaveSemantic::Append);
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"typeName": "Column", "guid": "abc"})
        );

        let r = COLUMN.ref_by_qualified_name("default/snowflake/db/sch/tbl/col", SaveSemantic::Replace);
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({
                "typeName": "Column",
                "uniqueAttributes": {"qualifiedName": "default/snowflake/db/sch/tbl/col"}
            })
        );
    }

    #[test]
    fn test_ref_deserializes_server_stub() {
        let r: AssetRef = serde_json::from_value(json!({
            "typeName": "AtlasGlossaryTerm",
            "guid": "t-1",
            "displayText": "Revenue",
            "relationshipGuid": "rel-9",
            "entityStatus": "ACTIVE"
        }))
        .unwrap();
        assert_eq!(r.guid.as_deref(), Some("t-1"));
        assert_eq!(r.display_text.as_deref(), Some("Revenue"));
        assert_eq!(r.semantic, SaveSemantic::Replace);
    }

    #[test]
    fn test_relationship_set_is_sorted_and_deduplicated() {
        let mut set = RelationshipSet::new();
        set.insert(GLOSSARY_TERM.ref_by_guid("b", SaveSemantic::Replace));
        set.insert(GLOSSARY_TERM.ref_by_guid("a", SaveSemantic::Replace));
        set.insert(GLOSSARY_TERM.ref_by_guid("b", SaveSemantic::Replace));
        let guids: Vec<_> = set.iter().filter_map(|r| r.guid.as_deref()).collect();
        assert_eq!(guids, vec!["a", "b"]);
    }

    #[test]
    fn test_same_target() {
        let a = GLOSSARY_TERM.ref_by_guid("g1", SaveSemantic::Append);
        let b = GLOSSARY_TERM.ref_by_guid("g1", SaveSemantic::Remove);
        assert!(a.same_target(&b));

        let c = GLOSSARY_TERM.ref_by_qualified_name("qn", SaveSemantic::Replace);
        assert!(!a.same_target(&c));
        assert!(c.same_target(&GLOSSARY_TERM.ref_by_qualified_name("qn", SaveSemantic::Append)));
    }
}
