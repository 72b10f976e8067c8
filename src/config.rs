use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Node configuration supplied at construction time. `settings` is an
/// opaque bag the concrete node interprets; the base framework only
/// cares about where the metadata document lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub settings: HashMap<String, Value>,
    #[serde(default)]
    pub metadata_path: Option<PathBuf>,
}

pub fn load_config_from_yaml(file_path: &str) -> Result<NodeConfig> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read config file from {}", file_path))?;

    let config: NodeConfig = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize config from {}", file_path))?;

    Ok(config)
}
