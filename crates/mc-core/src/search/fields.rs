//! Searchable field names in the catalog's index.

pub const TYPE_NAME: &str = "__typeName.keyword";
pub const GUID: &str = "__guid";
pub const STATE: &str = "__state";
pub const QUALIFIED_NAME: &str = "qualifiedName";
pub const NAME: &str = "name.keyword";
pub const DESCRIPTION: &str = "description";
pub const ATLAN_TAGS: &str = "__traitNames";
pub const PROPAGATED_ATLAN_TAGS: &str = "__propagatedTraitNames";
pub const ASSIGNED_TERMS: &str = "__meanings";
pub const CERTIFICATE_STATUS: &str = "certificateStatus";
pub const OWNER_USERS: &str = "ownerUsers";
pub const OWNER_GROUPS: &str = "ownerGroups";
pub const CONNECTION_QUALIFIED_NAME: &str = "connectionQualifiedName";
pub const CONNECTOR_NAME: &str = "connectorName";
pub const CREATE_TIME: &str = "__timestamp";
pub const UPDATE_TIME: &str = "__modificationTimestamp";
