use anyhow::Result;
use colored::Colorize;
use mc_core::registry::{types_with, ALL_TYPES};
use mc_core::{AssetType, Capability};
use serde_json::json;

use super::{to_json, OutputFormat};

/// Lists registered asset types, optionally only those carrying a capability.
pub fn run_types(capability: Option<Capability>, format: OutputFormat) -> Result<String> {
    let types: Vec<&AssetType> = match capability {
        Some(capability) => types_with(capability),
        None => ALL_TYPES.to_vec(),
    };

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = types
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "capabilities": t.capabilities,
                        "attributes": t.attributes.iter().map(|a| a.name).collect::<Vec<_>>(),
                        "relationships": t.relationships.iter().map(|r| r.name).collect::<Vec<_>>(),
                    })
                })
                .collect();
            to_json(&entries)
        }
        OutputFormat::Text => {
            let mut out = vec![
                "Asset Types".bold().to_string(),
                "───────────".to_string(),
            ];
            for t in &types {
                let capabilities: Vec<&str> = t.capabilities.iter().map(|c| c.as_str()).collect();
                out.push(format!("  {} [{}]", t.name.cyan(), capabilities.join(", ")));
                if !t.relationships.is_empty() {
                    let relationships: Vec<&str> = t.relationships.iter().map(|r| r.name).collect();
                    out.push(format!("      relationships: {}", relationships.join(", ")));
                }
            }
            Ok(out.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_filtered_by_capability() {
        let out = run_types(Some(Capability::Bi), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let names: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(names, vec!["TableauDashboard"]);
        assert_eq!(value[0]["capabilities"], json!(["catalog", "bi"]));
    }

    #[test]
    fn test_types_lists_all() {
        let out = run_types(None, OutputFormat::Text).unwrap();
        for t in ALL_TYPES {
            assert!(out.contains(t.name));
        }
    }
}
