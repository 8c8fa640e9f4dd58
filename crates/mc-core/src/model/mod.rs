//! Asset data model.

pub mod asset;
pub mod reference;
pub mod types;
pub mod update;

pub use asset::{
    Announcement, AnnouncementType, Asset, AssetAttributes, AtlanTag, Certificate,
    CertificateStatus, EntityStatus, Relationship, TagPropagation, TermAssignment,
};
pub use reference::{AssetRef, RelationshipSet, SaveSemantic, UniqueAttributes};
pub use types::{
    AssetType, AttributeDef, AttributeKind, Capability, RelationshipDef, RelationshipTarget,
};
pub use update::{is_placeholder_guid, placeholder_guid, AssetUpdate};
