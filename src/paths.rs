//! Typed paths into the assessment output layout.
//!
//! Centralizing path construction keeps the export cache, report cache and
//! lock file next to each other under `{TARGET_DIR}/{EXPORT_DIR}`.
use crate::config::{BackendConfig, InputConfig};
use std::path::PathBuf;

/// File name of the report cache, stored beside the export cache.
pub const REPORT_FILE: &str = "report.json";
/// File name of the advisory lock guarding both caches.
pub const LOCK_FILE: &str = ".assess.lock";

/// Convenience wrapper for locating the persisted pipeline state.
#[derive(Debug, Clone)]
pub struct StatePaths {
    export_root: PathBuf,
    export_file: String,
}

impl StatePaths {
    pub fn new(input: &InputConfig, backend: &BackendConfig) -> Self {
        Self {
            export_root: input.target_dir.join(&backend.export_dir),
            export_file: backend.export_file.clone(),
        }
    }

    /// Return the `{TARGET_DIR}/{EXPORT_DIR}/{EXPORT_FILE}` path.
    pub fn export_data_path(&self) -> PathBuf {
        self.export_root.join(&self.export_file)
    }

    /// Return the `{TARGET_DIR}/{EXPORT_DIR}/report.json` path.
    pub fn report_path(&self) -> PathBuf {
        self.export_root.join(REPORT_FILE)
    }

    /// Return the `{TARGET_DIR}/{EXPORT_DIR}/.assess.lock` path.
    pub fn lock_path(&self) -> PathBuf {
        self.export_root.join(LOCK_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_cache_paths_from_config() {
        let input = InputConfig {
            target_dir: PathBuf::from("target"),
            source_apigee_version: "SAAS".to_string(),
            analytics_start_date: None,
            analytics_end_date: None,
        };
        let backend = BackendConfig {
            export_dir: "export".to_string(),
            export_file: "export_data.json".to_string(),
            mapping_dir: PathBuf::from("mappings"),
        };
        let paths = StatePaths::new(&input, &backend);
        assert_eq!(
            paths.export_data_path(),
            PathBuf::from("target/export/export_data.json")
        );
        assert_eq!(paths.report_path(), PathBuf::from("target/export/report.json"));
        assert_eq!(paths.lock_path(), PathBuf::from("target/export/.assess.lock"));
    }
}
