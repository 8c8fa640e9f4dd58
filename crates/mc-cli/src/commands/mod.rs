//! Subcommand implementations.
//!
//! Each command runs against a [`CatalogClient`](mc_client::CatalogClient)
//! and returns its rendered output; `main` decides where it is printed.

mod get;
mod mutate;
mod search;
mod types;

pub use get::run_get;
pub use mutate::{run_certify, run_restore, run_tag_add, run_tag_remove};
pub use search::{run_search, SearchArgs};
pub use types::run_types;

use anyhow::{anyhow, Result};
use colored::Colorize;
use mc_core::registry::ALL_TYPES;
use mc_core::{Asset, AssetType};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

/// Resolves a type name as typed on the command line.
///
/// Matching ignores case, so `table` and `Table` both resolve.
pub fn resolve_type(name: &str) -> Result<&'static AssetType> {
    ALL_TYPES
        .iter()
        .copied()
        .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| anyhow!("Unknown asset type: {} (see `mc types`)", name))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One-line summary of an asset for listings.
pub(crate) fn summary_line(asset: &Asset) -> String {
    let status = if asset.is_active() {
        String::new()
    } else {
        format!(" [{}]", asset.status.to_string().red())
    };
    let certificate = asset
        .certificate()
        .map(|c| format!(" {}", certificate_label(c.status)))
        .unwrap_or_default();
    format!(
        "  {} {}{}{}",
        asset.name().unwrap_or("-").cyan(),
        asset.qualified_name().unwrap_or("-"),
        certificate,
        status
    )
}

pub(crate) fn certificate_label(status: mc_core::CertificateStatus) -> colored::ColoredString {
    use mc_core::CertificateStatus;
    match status {
        CertificateStatus::Verified => status.as_str().green(),
        CertificateStatus::Draft => status.as_str().yellow(),
        CertificateStatus::Deprecated => status.as_str().red(),
    }
}

/// Full text rendering of one asset.
pub(crate) fn detail_text(asset: &Asset) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "{} {}",
        format!("{}:", asset.type_name).bold(),
        asset.name().unwrap_or("-")
    ));
    out.push("─────────────────────────────────────────".to_string());
    out.push(format!(
        "  {} {}",
        "GUID:".cyan(),
        asset.guid.as_deref().unwrap_or("-")
    ));
    out.push(format!(
        "  {} {}",
        "Qualified name:".cyan(),
        asset.qualified_name().unwrap_or("-")
    ));
    out.push(format!("  {} {}", "Status:".cyan(), asset.status));
    if let Some(description) = asset
        .attributes
        .user_description
        .as_deref()
        .or(asset.attributes.description.as_deref())
    {
        out.push(format!("  {} {}", "Description:".cyan(), description));
    }
    if let Some(certificate) = asset.certificate() {
        let message = certificate
            .message
            .map(|m| format!(" ({})", m))
            .unwrap_or_default();
        out.push(format!(
            "  {} {}{}",
            "Certificate:".cyan(),
            certificate_label(certificate.status),
            message
        ));
    }
    if let Some(announcement) = asset.announcement() {
        out.push(format!(
            "  {} [{}] {}",
            "Announcement:".cyan(),
            announcement.announcement_type.as_str(),
            announcement.title
        ));
    }
    let owners: Vec<&str> = asset
        .attributes
        .owner_users
        .iter()
        .chain(asset.attributes.owner_groups.iter())
        .map(String::as_str)
        .collect();
    if !owners.is_empty() {
        out.push(format!("  {} {}", "Owners:".cyan(), owners.join(", ")));
    }
    let tags = asset.atlan_tag_names();
    if !tags.is_empty() {
        out.push(format!("  {} {}", "Tags:".cyan(), tags.join(", ")));
    }
    let terms = asset.assigned_terms();
    if !terms.is_empty() {
        let labels: Vec<String> = terms
            .iter()
            .map(|t| {
                t.display_text
                    .clone()
                    .or_else(|| t.guid.clone())
                    .unwrap_or_else(|| "-".to_string())
            })
            .collect();
        out.push(format!("  {} {}", "Terms:".cyan(), labels.join(", ")));
    }
    out.join("\n")
}
