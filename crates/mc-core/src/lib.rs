//! # mc-core
//!
//! Data model for the metadata catalog SDK.
//!
//! Every catalogued asset (table, column, dashboard, pipeline task, monitor,
//! glossary term, ...) is represented by one [`Asset`] record. The type it
//! belongs to is described as data by an [`AssetType`] from the static
//! [`registry`], which lists its attributes, relationships, and capabilities.
//!
//! This crate also carries the partial-update type sent on saves
//! ([`AssetUpdate`]), the search DSL, and the error type shared by all layers.

pub mod error;
pub mod model;
pub mod mutation;
pub mod search;

/// Registered asset types.
pub mod registry {
    pub use crate::model::types::{
        find, types_with, AIRFLOW_DAG, AIRFLOW_TASK, ALL_TYPES, COLUMN, CONNECTION, DATABASE,
        GLOSSARY, GLOSSARY_TERM, MC_MONITOR, PROCESS, S3_BUCKET, S3_OBJECT, SCHEMA,
        TABLEAU_DASHBOARD, TABLE, VIEW,
    };
}

pub use error::{CatalogError, CatalogResult};
pub use model::{
    Announcement, AnnouncementType, Asset, AssetAttributes, AssetRef, AssetType, AssetUpdate,
    AtlanTag, AttributeKind, Capability, Certificate, CertificateStatus, EntityStatus,
    Relationship, RelationshipSet, SaveSemantic, TagPropagation,
};
pub use mutation::{DeleteType, MutationResponse, SaveOptions};
pub use search::{IndexSearchRequest, IndexSearchResponse, Query, SortItem};
