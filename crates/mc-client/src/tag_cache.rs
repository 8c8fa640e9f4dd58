//! Translation between human-readable tag names and internal tag IDs.
//!
//! The catalog stores classification tags under hashed internal names. Users
//! see display names. The directory of both is loaded from the typedefs
//! endpoint and cached with a TTL; a lookup miss forces one reload so newly
//! created tags resolve without waiting for expiry.

use crate::http::{HttpClient, ResponseCache};
use mc_core::{CatalogError, CatalogResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const TYPEDEFS_PATH: &str = "api/meta/types/typedefs";
const DIRECTORY_KEY: &str = "classifications";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeDefsResponse {
    #[serde(default)]
    classification_defs: Vec<ClassificationDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationDef {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Bidirectional map of tag IDs and display names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDirectory {
    id_by_name: HashMap<String, String>,
    name_by_id: HashMap<String, String>,
}

impl TagDirectory {
    /// Builds a directory from `(internal id, display name)` pairs.
    pub fn from_pairs<I, A, B>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        let mut directory = Self::default();
        for (id, name) in pairs {
            let (id, name) = (id.into(), name.into());
            directory.id_by_name.insert(name.clone(), id.clone());
            directory.name_by_id.insert(id, name);
        }
        directory
    }

    fn from_typedefs(response: TypeDefsResponse) -> Self {
        Self::from_pairs(response.classification_defs.into_iter().map(|def| {
            let display = def.display_name.unwrap_or_else(|| def.name.clone());
            (def.name, display)
        }))
    }

    pub fn id_for(&self, name: &str) -> Option<&str> {
        self.id_by_name.get(name).map(String::as_str)
    }

    pub fn name_for(&self, id: &str) -> Option<&str> {
        self.name_by_id.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.name_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_by_id.is_empty()
    }
}

/// TTL cache over the tag directory.
pub struct AtlanTagCache {
    cache: ResponseCache<Arc<TagDirectory>>,
}

impl AtlanTagCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: ResponseCache::new(ttl, 1),
        }
    }

    /// Seeds the cache, skipping the typedefs call until the TTL expires.
    pub async fn prime(&self, directory: TagDirectory) {
        self.cache
            .insert(DIRECTORY_KEY.to_string(), Arc::new(directory))
            .await;
    }

    /// Returns the cached directory, loading it when absent.
    pub async fn directory(&self, http: &HttpClient) -> CatalogResult<Arc<TagDirectory>> {
        self.cache
            .get_or_try_insert_with(DIRECTORY_KEY.to_string(), || load(http))
            .await
    }

    /// Drops the cached directory and loads a fresh one.
    pub async fn refresh(&self, http: &HttpClient) -> CatalogResult<Arc<TagDirectory>> {
        self.cache.invalidate(DIRECTORY_KEY).await;
        self.directory(http).await
    }

    /// Internal ID for a display name; reloads once on a miss.
    pub async fn id_for(&self, http: &HttpClient, name: &str) -> CatalogResult<String> {
        if let Some(id) = self.directory(http).await?.id_for(name) {
            return Ok(id.to_string());
        }
        debug!(tag = name, "Tag not in cached directory, refreshing");
        self.refresh(http)
            .await?
            .id_for(name)
            .map(str::to_string)
            .ok_or_else(|| CatalogError::InvalidRequest(format!("Unknown Atlan tag: {}", name)))
    }
}

async fn load(http: &HttpClient) -> CatalogResult<Arc<TagDirectory>> {
    let response: TypeDefsResponse = http
        .get_json(TYPEDEFS_PATH, &[("type", "classification".to_string())])
        .await?;
    let directory = TagDirectory::from_typedefs(response);
    debug!(count = directory.len(), "Loaded tag directory");
    Ok(Arc::new(directory))
}
