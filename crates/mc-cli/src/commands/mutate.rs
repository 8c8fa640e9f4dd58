use anyhow::{bail, Result};
use colored::Colorize;
use mc_client::{AssetTypeExt, CatalogClient};
use mc_core::{Asset, AssetType, CertificateStatus, TagPropagation};
use serde_json::json;
use tracing::info;

use super::{detail_text, to_json, OutputFormat};

fn render_saved(
    saved: Option<Asset>,
    verb: &str,
    qualified_name: &str,
    format: OutputFormat,
) -> Result<String> {
    match (format, saved) {
        (OutputFormat::Json, saved) => to_json(&json!({
            "qualifiedName": qualified_name,
            "asset": saved,
        })),
        (OutputFormat::Text, Some(asset)) => Ok(format!(
            "{} {}\n{}",
            verb.green(),
            qualified_name,
            detail_text(&asset)
        )),
        (OutputFormat::Text, None) => Ok(format!(
            "{} {} (no changes reported)",
            verb.green(),
            qualified_name
        )),
    }
}

/// Reactivates an archived asset.
pub async fn run_restore(
    client: &dyn CatalogClient,
    asset_type: &AssetType,
    qualified_name: &str,
    format: OutputFormat,
) -> Result<String> {
    let active = asset_type.restore(client, qualified_name).await?;
    if !active {
        bail!("{} is still archived after restore", qualified_name);
    }
    match format {
        OutputFormat::Json => to_json(&json!({
            "qualifiedName": qualified_name,
            "active": active,
        })),
        OutputFormat::Text => Ok(format!("{} {}", "Active".green(), qualified_name)),
    }
}

/// Sets the certificate on an asset.
pub async fn run_certify(
    client: &dyn CatalogClient,
    asset_type: &AssetType,
    qualified_name: &str,
    status: CertificateStatus,
    message: Option<&str>,
    format: OutputFormat,
) -> Result<String> {
    let saved = asset_type
        .update_certificate(client, qualified_name, status, message)
        .await?;
    info!(qualified_name, status = status.as_str(), "Certificate updated");
    render_saved(saved, "Certified", qualified_name, format)
}

/// Attaches tags, keeping those already present.
pub async fn run_tag_add(
    client: &dyn CatalogClient,
    asset_type: &AssetType,
    qualified_name: &str,
    tags: &[String],
    propagate: bool,
    format: OutputFormat,
) -> Result<String> {
    if tags.is_empty() {
        bail!("No tags given");
    }
    let propagation = if propagate {
        TagPropagation::default()
    } else {
        TagPropagation::none()
    };
    let names: Vec<&str> = tags.iter().map(String::as_str).collect();
    let saved = asset_type
        .append_atlan_tags(client, qualified_name, &names, propagation)
        .await?;
    render_saved(saved, "Tagged", qualified_name, format)
}

/// Detaches tags one at a time; stops at the first failure.
pub async fn run_tag_remove(
    client: &dyn CatalogClient,
    asset_type: &AssetType,
    qualified_name: &str,
    tags: &[String],
    format: OutputFormat,
) -> Result<String> {
    if tags.is_empty() {
        bail!("No tags given");
    }
    for tag in tags {
        asset_type
            .remove_atlan_tag(client, qualified_name, tag)
            .await?;
    }
    match format {
        OutputFormat::Json => to_json(&json!({
            "qualifiedName": qualified_name,
            "removed": tags,
        })),
        OutputFormat::Text => Ok(format!(
            "{} {} from {}",
            "Removed".green(),
            tags.join(", "),
            qualified_name
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_client::testing::seed_warehouse;
    use mc_client::MockCatalogClient;
    use mc_core::registry::TABLE;
    use mc_core::EntityStatus;

    const QN: &str = "default/snowflake/1700000000/analytics/public/orders";

    #[tokio::test]
    async fn test_restore_archived_table() {
        let client = MockCatalogClient::new("mock");
        let guids = seed_warehouse(&client, &["orders"]).await;
        TABLE.delete(&client, &guids[0]).await.unwrap();

        let out = run_restore(&client, &TABLE, QN, OutputFormat::Json)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["active"], true);
        assert_eq!(
            client.stored(&guids[0]).await.map(|a| a.status),
            Some(EntityStatus::Active)
        );
    }

    #[tokio::test]
    async fn test_certify() {
        let client = MockCatalogClient::new("mock");
        let guids = seed_warehouse(&client, &["orders"]).await;

        let out = run_certify(
            &client,
            &TABLE,
            QN,
            CertificateStatus::Deprecated,
            Some("Use orders_v2"),
            OutputFormat::Text,
        )
        .await
        .unwrap();
        assert!(out.contains("DEPRECATED"));

        let certificate = client.stored(&guids[0]).await.unwrap().certificate().unwrap();
        assert_eq!(certificate.status, CertificateStatus::Deprecated);
        assert_eq!(certificate.message.as_deref(), Some("Use orders_v2"));
    }

    #[tokio::test]
    async fn test_tag_add_then_remove() {
        let client = MockCatalogClient::new("mock");
        let guids = seed_warehouse(&client, &["orders"]).await;
        let tags = vec!["PII".to_string(), "Finance".to_string()];

        run_tag_add(&client, &TABLE, QN, &tags, false, OutputFormat::Text)
            .await
            .unwrap();
        assert_eq!(
            client.stored(&guids[0]).await.unwrap().atlan_tag_names(),
            vec!["PII", "Finance"]
        );

        let out = run_tag_remove(&client, &TABLE, QN, &tags[..1], OutputFormat::Json)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["removed"], serde_json::json!(["PII"]));
        assert_eq!(
            client.stored(&guids[0]).await.unwrap().atlan_tag_names(),
            vec!["Finance"]
        );
    }

    #[tokio::test]
    async fn test_tag_commands_require_tags() {
        let client = MockCatalogClient::new("mock");
        assert!(run_tag_add(&client, &TABLE, QN, &[], true, OutputFormat::Text)
            .await
            .is_err());
        assert!(run_tag_remove(&client, &TABLE, QN, &[], OutputFormat::Text)
            .await
            .is_err());
        assert_eq!(client.calls().total(), 0);
    }
}
