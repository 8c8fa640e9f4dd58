//! # mc-client
//!
//! Client side of the metadata catalog SDK.
//!
//! [`CatalogClient`] is the seam between per-type asset operations and a
//! transport. [`RestCatalogClient`] talks to a tenant over HTTP;
//! [`MockCatalogClient`] keeps assets in memory for tests and offline use.
//! [`AssetTypeExt`] adds search, lookup, and mutation helpers to every
//! registered [`mc_core::AssetType`].

pub mod assets;
pub mod fluent;
pub mod http;
pub mod mock;
pub mod rest;
pub mod secure_string;
pub mod tag_cache;
pub mod testing;
pub mod traits;

pub use assets::{is_guid, AssetTypeExt};
pub use fluent::{select_with_capability, FluentSearch};
pub use http::HttpClient;
pub use mock::{CallCounts, MockCatalogClient};
pub use rest::RestCatalogClient;
pub use secure_string::SecureString;
pub use tag_cache::{AtlanTagCache, TagDirectory};
pub use traits::{
    AssetFetchOptions, AuthConfig, CatalogClient, ClientConfig, ClientHealth, RateLimitConfig,
};
