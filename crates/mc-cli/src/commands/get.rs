use anyhow::Result;
use mc_client::{AssetTypeExt, CatalogClient};
use mc_core::AssetType;

use super::{detail_text, to_json, OutputFormat};

/// Fetches one asset by GUID or qualified name.
///
/// With `attributes`, the lookup goes through the search index and returns
/// only those attributes.
pub async fn run_get(
    client: &dyn CatalogClient,
    asset_type: &AssetType,
    id: &str,
    relationships: bool,
    attributes: &[String],
    format: OutputFormat,
) -> Result<String> {
    let asset = if attributes.is_empty() {
        asset_type.get(client, id, relationships).await?
    } else {
        let attributes: Vec<&str> = attributes.iter().map(String::as_str).collect();
        asset_type
            .get_with_attributes(client, id, &attributes, &[])
            .await?
    };

    match format {
        OutputFormat::Json => to_json(&asset),
        OutputFormat::Text => Ok(detail_text(&asset)),
    }
}
