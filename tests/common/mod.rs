//! Shared test infrastructure for CLI integration tests.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Mapping files the qualification report loads.
const MAPPING_FILES: [&str; 21] = [
    "topology_installation_mapping.json",
    "anti_patterns.json",
    "api_limits.json",
    "api_with_multiple_basepath.json",
    "apps_without_api_products.json",
    "cache_without_expiry.json",
    "cname_anomaly.json",
    "company_and_developers.json",
    "env_limits.json",
    "json_path_enabled.json",
    "northbound_mtls.json",
    "org_limits.json",
    "proxies_per_env.json",
    "unsupported_policies.json",
    "target_environments.json",
    "aliases_with_private_keys.json",
    "sharded_proxies.json",
    "org_resourcefiles.json",
    "api_traffic.json",
    "validation_report.json",
    "basepath_report.json",
];

/// Every hook records its phase and request, then answers with canned JSON.
const HOOK_SCRIPT: &str = r#"#!/bin/sh
work=$(dirname "$0")
cat > "$work/request_$ASSESS_PHASE.json"
echo "$ASSESS_PHASE" >> "$work/calls.log"
case "$ASSESS_PHASE" in
  pre_validation) printf '{"passed": true}' ;;
  export) printf '{"apis": {"petstore": {"revisions": ["1"]}}}' ;;
  validate) printf '{"unsupported_policies": {"petstore": ["StatisticsCollector"]}}' ;;
  topology) printf '{"dc-1": ["ms", "rmp"]}' ;;
esac
"#;

pub fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// A working directory laid out the way the tool expects to be run.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create the workspace, or `None` when `sh` is unavailable.
    pub fn new(source_version: &str, extra_inputs: &str) -> Option<Self> {
        find_in_path("sh")?;
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path();

        let hook = root.join("hook.sh");
        fs::write(&hook, HOOK_SCRIPT).expect("write hook");
        let hook_cmd = format!("sh '{}'", hook.display());

        fs::write(
            root.join("input.properties"),
            format!(
                "[inputs]\nTARGET_DIR = target\nSOURCE_APIGEE_VERSION = {source_version}\n{extra_inputs}"
            ),
        )
        .expect("write input.properties");
        fs::write(
            root.join("backend.properties"),
            format!(
                "[export]\nEXPORT_DIR = export\nEXPORT_FILE = export_data.json\n\n[hooks]\n\
                 PRE_VALIDATION = {hook_cmd}\nEXPORT = {hook_cmd}\nVALIDATE = {hook_cmd}\n\
                 VISUALIZE = {hook_cmd}\nTOPOLOGY = {hook_cmd}\nQUALIFICATION_REPORT = {hook_cmd}\n"
            ),
        )
        .expect("write backend.properties");

        let mapping_dir = root.join("qualification_report_mapping_json");
        fs::create_dir_all(&mapping_dir).expect("create mapping dir");
        for name in MAPPING_FILES {
            fs::write(mapping_dir.join(name), format!("{{\"file\": \"{name}\"}}"))
                .expect("write mapping");
        }
        Some(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn export_data_path(&self) -> PathBuf {
        self.root().join("target/export/export_data.json")
    }

    pub fn report_path(&self) -> PathBuf {
        self.root().join("target/export/report.json")
    }

    /// Run the binary with `--resources` and optional environment overrides.
    pub fn run(&self, resources: Option<&str>, env: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_apigee-assess"));
        cmd.current_dir(self.root())
            .env_remove("IGNORE_VIZ")
            .env_remove("IGNORE_OPDK_TOPOLOGY");
        if let Some(resources) = resources {
            cmd.arg("--resources").arg(resources);
        }
        for (key, value) in env {
            cmd.env(key, value);
        }
        cmd.output().expect("run apigee-assess")
    }

    /// Phases invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.root().join("calls.log"))
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn clear_calls(&self) {
        let _ = fs::remove_file(self.root().join("calls.log"));
    }

    /// The last request a phase hook received.
    pub fn request(&self, phase: &str) -> Value {
        let path = self.root().join(format!("request_{phase}.json"));
        let text = fs::read_to_string(&path).expect("read hook request");
        serde_json::from_str(&text).expect("parse hook request")
    }

    pub fn read_json(&self, path: &Path) -> Value {
        let text = fs::read_to_string(path).expect("read json");
        serde_json::from_str(&text).expect("parse json")
    }

    pub fn write_json(&self, path: &Path, value: &Value) {
        fs::create_dir_all(path.parent().expect("checkpoint parent")).expect("create dir");
        fs::write(path, value.to_string()).expect("write json");
    }

    /// Replace one phase's hook with an inline `sh -c` script.
    pub fn use_hook(&self, key: &str, script: &str) {
        let path = self.root().join("backend.properties");
        let text = fs::read_to_string(&path).expect("read backend.properties");
        let replaced: Vec<String> = text
            .lines()
            .map(|line| {
                if line.starts_with(&format!("{key} =")) {
                    format!("{key} = sh -c '{script}'")
                } else {
                    line.to_string()
                }
            })
            .collect();
        fs::write(&path, replaced.join("\n")).expect("write backend.properties");
    }

    pub fn remove_mappings(&self) {
        fs::remove_dir_all(self.root().join("qualification_report_mapping_json"))
            .expect("remove mapping dir");
    }
}
