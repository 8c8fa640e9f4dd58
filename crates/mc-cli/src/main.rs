//! Metadata catalog CLI
//!
//! Command-line access to a catalog tenant: look up, search, certify, tag and
//! restore assets.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mc_client::{CatalogClient, ClientHealth, RestCatalogClient};
use mc_core::{Capability, CertificateStatus};
use mc_observability::{asset_span, search_span, LoggingConfig};
use std::path::PathBuf;
use tracing::Instrument;

mod commands;
mod config;

use commands::{resolve_type, OutputFormat, SearchArgs};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "mc")]
#[command(version)]
#[command(about = "Query and curate assets in a metadata catalog", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", env = "MC_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format (text, json)
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    /// Tenant URL, overriding the config file and MC_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch one asset by GUID or qualified name
    Get {
        /// Asset type, e.g. Table
        asset_type: String,

        /// GUID or qualified name
        id: String,

        /// Include all relationships
        #[arg(long)]
        relationships: bool,

        /// Only return these attributes (looked up through search)
        #[arg(short, long = "attribute")]
        attributes: Vec<String>,
    },

    /// Search assets of one type
    Search {
        /// Asset type, e.g. Column
        asset_type: String,

        /// Qualified-name prefix
        #[arg(short, long)]
        prefix: Option<String>,

        /// Only assets carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Only assets with this certificate (verified, draft, deprecated)
        #[arg(long)]
        certificate: Option<CertificateStatus>,

        /// Maximum number of assets to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Include archived assets
        #[arg(long)]
        archived: bool,
    },

    /// Restore an archived asset
    Restore {
        asset_type: String,
        qualified_name: String,
    },

    /// Set the certificate on an asset
    Certify {
        asset_type: String,
        qualified_name: String,

        /// verified, draft or deprecated
        status: CertificateStatus,

        #[arg(short, long)]
        message: Option<String>,
    },

    /// Manage Atlan tags on an asset
    Tag {
        #[command(subcommand)]
        action: TagCommands,
    },

    /// List registered asset types
    Types {
        /// Only types with this capability (sql, bi, glossary, ...)
        #[arg(long)]
        capability: Option<Capability>,
    },

    /// Check connectivity to the tenant
    Health,

    /// Show current configuration
    Config {
        /// Show secrets (redacted by default)
        #[arg(long)]
        show_secrets: bool,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// Attach tags, keeping existing ones
    Add {
        asset_type: String,
        qualified_name: String,

        #[arg(required = true)]
        tags: Vec<String>,

        /// Do not propagate the tags to downstream assets
        #[arg(long)]
        no_propagate: bool,
    },

    /// Detach tags
    Remove {
        asset_type: String,
        qualified_name: String,

        #[arg(required = true)]
        tags: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = AppConfig::load(&config_path).unwrap_or_else(|_| {
        if cli.verbose > 0 {
            eprintln!("Using default configuration (no config file found)");
        }
        AppConfig::default()
    });
    config.apply_env();
    if let Some(url) = &cli.base_url {
        config.tenant.base_url = url.clone();
    }

    let logging = LoggingConfig::for_verbosity(cli.verbose).with_json(config.logging.json_format);
    if let Err(e) = mc_observability::init_logging_with_config(logging) {
        eprintln!("Logging disabled: {}", e);
    }

    let output = match cli.command {
        Commands::Types { capability } => commands::run_types(capability, cli.format)?,
        Commands::Config { show_secrets } => cmd_config(&config, show_secrets, cli.format)?,
        command => {
            let client = RestCatalogClient::new(config.client_config()?)
                .context("Failed to create catalog client")?;
            run_remote(command, &client, &config, cli.format).await?
        }
    };
    println!("{}", output);
    Ok(())
}

async fn run_remote(
    command: Commands,
    client: &dyn CatalogClient,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<String> {
    let output = match command {
        Commands::Get {
            asset_type,
            id,
            relationships,
            attributes,
        } => {
            let asset_type = resolve_type(&asset_type)?;
            commands::run_get(client, asset_type, &id, relationships, &attributes, format)
                .instrument(asset_span!(asset_type.name, id))
                .await?
        }
        Commands::Search {
            asset_type,
            prefix,
            tag,
            certificate,
            limit,
            archived,
        } => {
            let asset_type = resolve_type(&asset_type)?;
            let args = SearchArgs {
                prefix,
                tag,
                certificate,
                limit: limit.unwrap_or(config.search.default_limit),
                archived,
                page_size: config.search.page_size,
            };
            commands::run_search(client, asset_type, &args, format)
                .instrument(search_span!(asset_type.name))
                .await?
        }
        Commands::Restore {
            asset_type,
            qualified_name,
        } => {
            let asset_type = resolve_type(&asset_type)?;
            commands::run_restore(client, asset_type, &qualified_name, format)
                .instrument(asset_span!(asset_type.name, qualified_name, op = "restore"))
                .await?
        }
        Commands::Certify {
            asset_type,
            qualified_name,
            status,
            message,
        } => {
            let asset_type = resolve_type(&asset_type)?;
            commands::run_certify(
                client,
                asset_type,
                &qualified_name,
                status,
                message.as_deref(),
                format,
            )
            .instrument(asset_span!(asset_type.name, qualified_name, op = "certify"))
            .await?
        }
        Commands::Tag { action } => match action {
            TagCommands::Add {
                asset_type,
                qualified_name,
                tags,
                no_propagate,
            } => {
                let asset_type = resolve_type(&asset_type)?;
                commands::run_tag_add(
                    client,
                    asset_type,
                    &qualified_name,
                    &tags,
                    !no_propagate,
                    format,
                )
                .instrument(asset_span!(asset_type.name, qualified_name, op = "tag_add"))
                .await?
            }
            TagCommands::Remove {
                asset_type,
                qualified_name,
                tags,
            } => {
                let asset_type = resolve_type(&asset_type)?;
                commands::run_tag_remove(client, asset_type, &qualified_name, &tags, format)
                    .instrument(asset_span!(asset_type.name, qualified_name, op = "tag_remove"))
                    .await?
            }
        },
        Commands::Health => cmd_health(client, format).await?,
        Commands::Types { .. } | Commands::Config { .. } => {
            bail!("Command runs without a tenant connection")
        }
    };
    Ok(output)
}

fn default_config_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config/mc/config.yaml"))
        .unwrap_or_else(|| PathBuf::from("mc.yaml"))
}

async fn cmd_health(client: &dyn CatalogClient, format: OutputFormat) -> Result<String> {
    let health = client.health_check().await?;
    render_health(client.name(), &health, format)
}

fn render_health(name: &str, health: &ClientHealth, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(
            &serde_json::json!({ "client": name, "health": health }),
        )?);
    }
    let label = match health {
        ClientHealth::Healthy => "healthy".green(),
        ClientHealth::Degraded(reason) => format!("degraded ({})", reason).yellow(),
        ClientHealth::Unhealthy(reason) => format!("unhealthy ({})", reason).red(),
        ClientHealth::Unknown => "unknown".white(),
    };
    Ok(format!("{}: {}", name, label))
}

fn cmd_config(config: &AppConfig, show_secrets: bool, format: OutputFormat) -> Result<String> {
    let display_config = if show_secrets {
        config.clone()
    } else {
        config.redact_secrets()
    };

    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&display_config)?);
    }

    let tenant = &display_config.tenant;
    let or_unset = |value: &str| {
        if value.is_empty() {
            "(not set)".yellow()
        } else {
            value.normal()
        }
    };
    Ok([
        "Current Configuration".bold().to_string(),
        "─────────────────────────".to_string(),
        format!("Tenant: {}", or_unset(tenant.base_url.as_str())),
        format!("API token: {}", or_unset(tenant.api_token.as_str())),
        format!(
            "Timeout: {}s, retries: {}",
            tenant.timeout_secs, tenant.max_retries
        ),
        format!(
            "Search: page size {}, default limit {}",
            display_config.search.page_size, display_config.search.default_limit
        ),
    ]
    .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_client::MockCatalogClient;

    #[tokio::test]
    async fn test_health_against_mock() {
        let client = MockCatalogClient::new("mock");

        let text = cmd_health(&client, OutputFormat::Text).await.unwrap();
        assert!(text.starts_with("mock: "));
        assert!(text.contains("healthy"));

        let json = cmd_health(&client, OutputFormat::Json).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["client"], "mock");
        assert_eq!(value["health"], "healthy");
    }

    #[test]
    fn test_health_shows_reason() {
        let degraded = ClientHealth::Degraded("rate limited".to_string());
        let text = render_health("rest", &degraded, OutputFormat::Text).unwrap();
        assert!(text.contains("degraded (rate limited)"));

        let unhealthy = ClientHealth::Unhealthy("HTTP 503".to_string());
        let text = render_health("rest", &unhealthy, OutputFormat::Text).unwrap();
        assert!(text.contains("unhealthy (HTTP 503)"));

        let json = render_health("rest", &unhealthy, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["health"]["unhealthy"], "HTTP 503");
    }
}
