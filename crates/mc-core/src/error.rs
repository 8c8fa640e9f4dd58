//! Error types for catalog operations.
//!
//! A single error enum covers model validation, lookup failures, and transport
//! failures so that callers can match on one type regardless of which layer
//! raised the condition.

use thiserror::Error;

/// Errors that can occur when building, fetching, or mutating assets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Asset with GUID {0} does not exist")]
    NotFoundByGuid(String),

    #[error("Asset of type {type_name} with qualifiedName {qualified_name} does not exist")]
    NotFoundByQualifiedName {
        type_name: String,
        qualified_name: String,
    },

    #[error("Asset {id} is not of the requested type: {type_name}")]
    AssetNotTypeRequested { id: String, type_name: String },

    #[error("Missing required relationship parameter for {type_name}: {param}")]
    MissingRequiredRelationshipParam { type_name: String, param: String },

    #[error("Missing required update parameter(s) for {type_name}: {}", params.join(", "))]
    MissingRequiredUpdateParam {
        type_name: String,
        params: Vec<String>,
    },

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("Unknown asset type: {0}")]
    UnknownType(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFoundByGuid(_) => "ASSET_NOT_FOUND_BY_GUID",
            Self::NotFoundByQualifiedName { .. } => "ASSET_NOT_FOUND_BY_QN",
            Self::AssetNotTypeRequested { .. } => "ASSET_NOT_TYPE_REQUESTED",
            Self::MissingRequiredRelationshipParam { .. } => "MISSING_REQUIRED_RELATIONSHIP_PARAM",
            Self::MissingRequiredUpdateParam { .. } => "MISSING_REQUIRED_UPDATE_PARAM",
            Self::InvalidAttribute(_) => "INVALID_ATTRIBUTE",
            Self::InvalidRelationship(_) => "INVALID_RELATIONSHIP",
            Self::UnknownType(_) => "UNKNOWN_TYPE",
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::AuthorizationDenied(_) => "AUTHORIZATION_DENIED",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::RequestFailed(_) => "REQUEST_FAILED",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Returns true for any of the "asset does not exist" conditions.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFoundByGuid(_) | Self::NotFoundByQualifiedName { .. } | Self::NotFound(_)
        )
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
