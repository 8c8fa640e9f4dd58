//! Fixtures and assertions for tests written against a catalog client.

use crate::mock::MockCatalogClient;
use crate::traits::{AuthConfig, ClientConfig, ClientHealth};
use mc_core::registry::{COLUMN, DATABASE, GLOSSARY_TERM, SCHEMA, TABLE};
use mc_core::{Asset, CatalogError, CatalogResult, SaveSemantic};
use std::collections::HashMap;

/// Client config with no auth and no retries.
pub fn test_client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        name: "test".to_string(),
        base_url: base_url.to_string(),
        auth: AuthConfig::None,
        timeout_secs: 30,
        max_retries: 0,
        verify_tls: true,
        headers: HashMap::new(),
        rate_limit: None,
    }
}

/// Client config with bearer-token auth.
pub fn test_client_config_with_token(base_url: &str, token: &str) -> ClientConfig {
    ClientConfig {
        auth: AuthConfig::BearerToken {
            token: crate::SecureString::from(token),
        },
        ..test_client_config(base_url)
    }
}

/// A table under `default/snowflake/1700000000/analytics/public`.
pub fn sample_table(name: &str) -> Asset {
    let mut table = Asset::new(
        &TABLE,
        format!("default/snowflake/1700000000/analytics/public/{}", name),
        name,
    );
    table.attributes.connector_name = Some("snowflake".to_string());
    table.attributes.connection_qualified_name =
        Some("default/snowflake/1700000000".to_string());
    table
}

/// A column belonging to `table`.
pub fn sample_column(table: &Asset, name: &str, order: i64) -> CatalogResult<Asset> {
    let table_qn = table.qualified_name().unwrap_or_default();
    let mut column = Asset::new(&COLUMN, format!("{}/{}", table_qn, name), name);
    column.set_attribute("order", serde_json::json!(order))?;
    column.set_attribute("tableQualifiedName", serde_json::json!(table_qn))?;
    column.add_relationship("table", table.trim_to_reference()?)?;
    Ok(column)
}

/// A glossary term with the given GUID.
pub fn sample_term(guid: &str, name: &str) -> Asset {
    let mut term = Asset::new(&GLOSSARY_TERM, format!("{}@glossary", name), name);
    term.guid = Some(guid.to_string());
    term
}

/// Seeds a mock with a database, schema, and the named tables.
///
/// Returns the GUIDs of the tables in order.
pub async fn seed_warehouse(client: &MockCatalogClient, tables: &[&str]) -> Vec<String> {
    let root = "default/snowflake/1700000000/analytics";
    client.insert(Asset::new(&DATABASE, root, "analytics")).await;
    client
        .insert(Asset::new(&SCHEMA, format!("{}/public", root), "public"))
        .await;
    let mut guids = Vec::with_capacity(tables.len());
    for name in tables {
        guids.push(client.insert(sample_table(name)).await);
    }
    guids
}

/// Reference to a glossary term by GUID, for term assignment.
pub fn term_ref(guid: &str) -> mc_core::AssetRef {
    GLOSSARY_TERM.ref_by_guid(guid, SaveSemantic::Replace)
}

/// Asserts that a health check returned healthy.
pub fn assert_healthy(result: &CatalogResult<ClientHealth>) {
    match result {
        Ok(ClientHealth::Healthy) => {}
        other => panic!("Expected Healthy, got {:?}", other),
    }
}

/// Asserts that a result failed with the given error code.
pub fn assert_error_code<T: std::fmt::Debug>(result: &CatalogResult<T>, code: &str) {
    match result {
        Err(e) if e.code() == code => {}
        Err(e) => panic!("Expected {}, got {} ({})", code, e.code(), e),
        Ok(v) => panic!("Expected {}, got Ok({:?})", code, v),
    }
}

/// Asserts that a result is one of the not-found errors.
pub fn assert_not_found<T: std::fmt::Debug>(result: &CatalogResult<T>) {
    match result {
        Err(e) if e.is_not_found() => {}
        other => panic!("Expected a not-found error, got {:?}", other),
    }
}

/// Unwraps an error, panicking on success.
pub fn expect_err<T: std::fmt::Debug>(result: CatalogResult<T>) -> CatalogError {
    match result {
        Err(e) => e,
        Ok(v) => panic!("Expected an error, got Ok({:?})", v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::CatalogClient;

    #[test]
    fn test_config_fixtures() {
        let config = test_client_config("https://tenant.example.com");
        assert_eq!(config.max_retries, 0);
        assert!(matches!(config.auth, AuthConfig::None));

        let with_token = test_client_config_with_token("https://tenant.example.com", "t0k3n");
        assert!(matches!(with_token.auth, AuthConfig::BearerToken { .. }));
    }

    #[test]
    fn test_sample_column_links_table() {
        let table = sample_table("orders");
        let column = sample_column(&table, "id", 1).unwrap();
        assert_eq!(
            column.qualified_name(),
            Some("default/snowflake/1700000000/analytics/public/orders/id")
        );
        assert_eq!(column.get_i64("order"), Some(1));
        assert_eq!(column.relationship("table").len(), 1);
    }

    #[tokio::test]
    async fn test_seed_warehouse() {
        let client = MockCatalogClient::new("mock");
        let guids = seed_warehouse(&client, &["orders", "customers"]).await;
        assert_eq!(guids.len(), 2);
        assert_eq!(client.len().await, 4);
        assert_healthy(&client.health_check().await);
    }

    #[test]
    fn test_assert_error_code() {
        let result: CatalogResult<()> = Err(CatalogError::NotFoundByGuid("g".into()));
        assert_error_code(&result, "ASSET_NOT_FOUND_BY_GUID");
        assert_not_found(&result);
        assert_eq!(expect_err(result).code(), "ASSET_NOT_FOUND_BY_GUID");
    }
}
