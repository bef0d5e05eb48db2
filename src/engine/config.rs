//! Engine configuration types and YAML loading

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::constants::{DEFAULT_FETCH_SIZE, DEFAULT_WRITER_MEMORY};

/// Index order in which cursor pages are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// What BGP evaluation does with a pattern that cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and produce no rows
    #[default]
    FailOpen,
    /// Return the failure to the caller
    FailClosed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub memory_budget: usize,
    pub threads: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            memory_budget: DEFAULT_WRITER_MEMORY,
            threads: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Page length for cursor paging
    pub fetch_size: usize,
    pub sort: SortOrder,
    pub failure_policy: FailurePolicy,
    pub writer: WriterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_size: DEFAULT_FETCH_SIZE,
            sort: SortOrder::default(),
            failure_policy: FailurePolicy::default(),
            writer: WriterConfig::default(),
        }
    }
}

/// Load engine configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<EngineConfig> {
    let path = config_path.as_ref();

    if !path.exists() {
        return Err(anyhow!("Config file not found: {}", path.display()));
    }

    let yaml_str = fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;

    let config: EngineConfig = serde_yaml::from_str(&yaml_str)
        .map_err(|e| anyhow!("Invalid YAML config in {}: {}", path.display(), e))?;

    if config.fetch_size == 0 {
        log::warn!("fetch_size is 0: every cursor stops after its first search");
    }
    log::debug!("Loaded engine config from {}: {:?}", path.display(), config);

    Ok(config)
}
