//! Persisted pipeline checkpoints: the export-data cache and the report cache.
//!
//! Both files are JSON objects. Completion is tracked only through the marker
//! fields on these types; artifact payloads are carried through untouched.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Contents of `{TARGET_DIR}/{EXPORT_DIR}/{EXPORT_FILE}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredExportData")]
pub struct ExportData {
    /// Export phase finished.
    pub export: bool,
    /// Validation phase finished.
    pub validation_complete: bool,
    /// Last validation report.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_report: Option<Map<String, Value>>,
    /// Artifacts written by the export collaborator.
    #[serde(flatten)]
    pub artifacts: Map<String, Value>,
}

impl ExportData {
    /// Wrap a fresh export result, lifting any marker fields it carries.
    pub fn from_export(mut artifacts: Map<String, Value>) -> Self {
        artifacts.remove("export");
        artifacts.remove("validation_complete");
        artifacts.remove("validation_report");
        Self {
            export: false,
            validation_complete: false,
            validation_report: None,
            artifacts,
        }
    }

    pub fn validation_done(&self) -> bool {
        self.validation_complete
    }
}

/// On-disk shape of the export cache, including checkpoints written before
/// `validation_complete` existed. Those kept only `validation_report`, whose
/// truthiness marked validation as done.
#[derive(Deserialize)]
struct StoredExportData {
    #[serde(default)]
    export: bool,
    #[serde(default)]
    validation_complete: Option<bool>,
    #[serde(default)]
    validation_report: Option<Value>,
    #[serde(flatten)]
    artifacts: Map<String, Value>,
}

impl From<StoredExportData> for ExportData {
    fn from(stored: StoredExportData) -> Self {
        let legacy_done = match &stored.validation_report {
            Some(Value::Bool(done)) => *done,
            Some(Value::Object(map)) => !map.is_empty(),
            _ => false,
        };
        let validation_report = match stored.validation_report {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };
        Self {
            export: stored.export,
            validation_complete: stored.validation_complete.unwrap_or(legacy_done),
            validation_report,
            artifacts: stored.artifacts,
        }
    }
}

/// Contents of `{TARGET_DIR}/{EXPORT_DIR}/report.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Validation report generated.
    #[serde(default)]
    pub report: bool,
    /// Validation findings, keyed however the validator chose.
    #[serde(flatten)]
    pub findings: Map<String, Value>,
}

impl Report {
    pub fn from_validation(mut findings: Map<String, Value>) -> Self {
        findings.remove("report");
        Self {
            report: false,
            findings,
        }
    }

    /// The report as a single JSON object, marker included.
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self).context("serialize report")? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

/// Load a JSON checkpoint, returning the default value when the file is absent.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "checkpoint missing; starting empty");
            return Ok(T::default());
        }
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    serde_json::from_slice(&bytes).with_context(|| format!("parse JSON {}", path.display()))
}

/// Persist a JSON checkpoint through a synced temporary sibling and rename, so
/// readers see either the old file or the complete new one.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(value)
        .with_context(|| format!("serialize {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("state");
    let tmp_path = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!(".{file_name}.tmp"));
    let mut file =
        File::create(&tmp_path).with_context(|| format!("create {}", tmp_path.display()))?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("write {}", tmp_path.display()))?;
    drop(file);
    fs::rename(&tmp_path, path).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
