//! Lookup tables consumed by the qualification report.
//!
//! The tables live as JSON files in one directory. They are loaded together,
//! right before the report is generated, and every file is required.
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

type Mapping = Map<String, Value>;

/// Report key and file name of every mapping table, in load order.
pub const MAPPING_FILES: [(&str, &str); 21] = [
    ("topology_installation", "topology_installation_mapping.json"),
    ("anti_patterns", "anti_patterns.json"),
    ("api_limits", "api_limits.json"),
    ("api_with_multiple_basepath", "api_with_multiple_basepath.json"),
    ("apps_without_api_products", "apps_without_api_products.json"),
    ("cache_without_expiry", "cache_without_expiry.json"),
    ("cname_anomaly", "cname_anomaly.json"),
    ("company_and_developers", "company_and_developers.json"),
    ("env_limits", "env_limits.json"),
    ("json_path_enabled", "json_path_enabled.json"),
    ("northbound_mtls", "northbound_mtls.json"),
    ("org_limits", "org_limits.json"),
    ("proxies_per_env", "proxies_per_env.json"),
    ("unsupported_policies", "unsupported_policies.json"),
    ("sharding_output", "target_environments.json"),
    ("aliases_with_private_keys", "aliases_with_private_keys.json"),
    ("sharded_proxies", "sharded_proxies.json"),
    ("org_resourcefiles", "org_resourcefiles.json"),
    ("api_traffic", "api_traffic.json"),
    ("validation_report", "validation_report.json"),
    ("basepath_report", "basepath_report.json"),
];

/// Every mapping table the qualification report reads, keyed by report key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportMappings {
    tables: BTreeMap<&'static str, Mapping>,
}

impl ReportMappings {
    /// Load every mapping file from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for (key, file) in MAPPING_FILES {
            tables.insert(key, load_mapping(dir, file)?);
        }
        tracing::debug!(dir = %dir.display(), files = tables.len(), "report mappings loaded");
        Ok(Self { tables })
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Mapping> {
        self.tables.get(key)
    }
}

fn load_mapping(dir: &Path, name: &str) -> Result<Mapping> {
    let path = dir.join(name);
    let bytes = fs::read(&path).with_context(|| format!("read mapping {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse mapping {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!("mapping {} must be a JSON object", path.display())),
    }
}
