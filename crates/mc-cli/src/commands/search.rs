use anyhow::Result;
use colored::Colorize;
use mc_client::{AssetTypeExt, CatalogClient};
use mc_core::search::fields;
use mc_core::{AssetType, CertificateStatus, Query, SortItem};
use serde_json::json;

use super::{summary_line, to_json, OutputFormat};

/// Filters for `mc search`.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    /// Qualified-name prefix.
    pub prefix: Option<String>,
    /// Direct Atlan tag the results must carry.
    pub tag: Option<String>,
    pub certificate: Option<CertificateStatus>,
    pub limit: usize,
    pub archived: bool,
    pub page_size: u32,
}

/// Searches one asset type, sorted by name.
pub async fn run_search(
    client: &dyn CatalogClient,
    asset_type: &AssetType,
    args: &SearchArgs,
    format: OutputFormat,
) -> Result<String> {
    let mut search = asset_type
        .select(client, args.archived)
        .page_size(args.page_size)
        .sort(SortItem::asc(fields::NAME));
    if let Some(prefix) = &args.prefix {
        search = search.where_(Query::prefix(fields::QUALIFIED_NAME, prefix.as_str()));
    }
    if let Some(tag) = &args.tag {
        search = search.where_(Query::term(fields::ATLAN_TAGS, tag.as_str()));
    }
    if let Some(status) = args.certificate {
        search = search.where_(Query::term(fields::CERTIFICATE_STATUS, status.as_str()));
    }

    let total = search.count().await?;
    let assets = search.fetch_all(Some(args.limit)).await?;

    match format {
        OutputFormat::Json => to_json(&json!({
            "approximateCount": total,
            "entities": assets,
        })),
        OutputFormat::Text => {
            let mut out = vec![
                format!("{} ({})", asset_type.name.bold(), total),
                "─────────".to_string(),
            ];
            if assets.is_empty() {
                out.push("No assets found".to_string());
            } else {
                out.extend(assets.iter().map(summary_line));
                if (assets.len() as u64) < total {
                    out.push(String::new());
                    out.push(format!(
                        "Showing {} of {} (use --limit to see more)",
                        assets.len(),
                        total
                    ));
                }
            }
            Ok(out.join("\n"))
        }
    }
}
