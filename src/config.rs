//! Typed views over `input.properties` and `backend.properties`.
//!
//! Collaborators receive the raw [`Properties`] so they can read sections the
//! orchestrator does not know about; the views here cover only the keys the
//! pipeline itself depends on.
use crate::properties::Properties;
use anyhow::Result;
use std::path::PathBuf;

pub const INPUTS_SECTION: &str = "inputs";
pub const EXPORT_SECTION: &str = "export";
pub const HOOKS_SECTION: &str = "hooks";
pub const REPORT_SECTION: &str = "report";

/// `SOURCE_APIGEE_VERSION` value that enables topology discovery.
pub const OPDK: &str = "OPDK";

/// Default directory holding qualification-report mapping files.
pub const DEFAULT_MAPPING_DIR: &str = "qualification_report_mapping_json";

/// Keys of the `inputs` section the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputConfig {
    pub target_dir: PathBuf,
    pub source_apigee_version: String,
    pub analytics_start_date: Option<String>,
    pub analytics_end_date: Option<String>,
}

impl InputConfig {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        Ok(Self {
            target_dir: PathBuf::from(props.get(INPUTS_SECTION, "TARGET_DIR")?),
            source_apigee_version: props
                .get(INPUTS_SECTION, "SOURCE_APIGEE_VERSION")?
                .to_string(),
            analytics_start_date: props
                .get_nonempty(INPUTS_SECTION, "ANALYTICS_START_DATE")
                .map(str::to_string),
            analytics_end_date: props
                .get_nonempty(INPUTS_SECTION, "ANALYTICS_END_DATE")
                .map(str::to_string),
        })
    }

    pub fn is_opdk(&self) -> bool {
        self.source_apigee_version == OPDK
    }

    /// Both analytics dates are set and non-blank.
    pub fn has_analytics_range(&self) -> bool {
        self.analytics_start_date.is_some() && self.analytics_end_date.is_some()
    }
}

/// One pipeline phase that can be delegated to an external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    PreValidation,
    Export,
    Validate,
    Visualize,
    Topology,
    QualificationReport,
}

impl HookPhase {
    pub const ALL: [HookPhase; 6] = [
        HookPhase::PreValidation,
        HookPhase::Export,
        HookPhase::Validate,
        HookPhase::Visualize,
        HookPhase::Topology,
        HookPhase::QualificationReport,
    ];

    /// Key in the `[hooks]` section.
    pub fn config_key(self) -> &'static str {
        match self {
            HookPhase::PreValidation => "PRE_VALIDATION",
            HookPhase::Export => "EXPORT",
            HookPhase::Validate => "VALIDATE",
            HookPhase::Visualize => "VISUALIZE",
            HookPhase::Topology => "TOPOLOGY",
            HookPhase::QualificationReport => "QUALIFICATION_REPORT",
        }
    }

    /// Phase name sent to hooks and used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            HookPhase::PreValidation => "pre_validation",
            HookPhase::Export => "export",
            HookPhase::Validate => "validate",
            HookPhase::Visualize => "visualize",
            HookPhase::Topology => "topology",
            HookPhase::QualificationReport => "qualification_report",
        }
    }
}

/// Keys of `backend.properties` the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub export_dir: String,
    pub export_file: String,
    pub mapping_dir: PathBuf,
}

impl BackendConfig {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        Ok(Self {
            export_dir: props.get(EXPORT_SECTION, "EXPORT_DIR")?.to_string(),
            export_file: props.get(EXPORT_SECTION, "EXPORT_FILE")?.to_string(),
            mapping_dir: PathBuf::from(
                props
                    .get_nonempty(REPORT_SECTION, "MAPPING_DIR")
                    .unwrap_or(DEFAULT_MAPPING_DIR),
            ),
        })
    }
}

/// Command line configured for a phase, if any.
pub fn hook_command(backend: &Properties, phase: HookPhase) -> Option<&str> {
    backend.get_nonempty(HOOKS_SECTION, phase.config_key())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_props(extra: &str) -> Properties {
        Properties::parse(&format!(
            "[inputs]\nTARGET_DIR = out\nSOURCE_APIGEE_VERSION = SAAS\n{extra}"
        ))
        .unwrap()
    }

    #[test]
    fn input_config_reads_required_keys() {
        let config = InputConfig::from_properties(&input_props("")).unwrap();
        assert_eq!(config.target_dir, PathBuf::from("out"));
        assert_eq!(config.source_apigee_version, "SAAS");
        assert!(!config.is_opdk());
        assert!(!config.has_analytics_range());
    }

    #[test]
    fn blank_analytics_dates_count_as_missing() {
        let config = InputConfig::from_properties(&input_props(
            "ANALYTICS_START_DATE = 01/01/2025\nANALYTICS_END_DATE =\n",
        ))
        .unwrap();
        assert_eq!(config.analytics_start_date.as_deref(), Some("01/01/2025"));
        assert!(!config.has_analytics_range());
    }

    #[test]
    fn input_config_requires_target_dir() {
        let props = Properties::parse("[inputs]\nSOURCE_APIGEE_VERSION = OPDK\n").unwrap();
        assert!(InputConfig::from_properties(&props).is_err());
    }

    #[test]
    fn backend_config_defaults_mapping_dir() {
        let props =
            Properties::parse("[export]\nEXPORT_DIR = export\nEXPORT_FILE = export_data.json\n")
                .unwrap();
        let backend = BackendConfig::from_properties(&props).unwrap();
        assert_eq!(backend.export_dir, "export");
        assert_eq!(backend.export_file, "export_data.json");
        assert_eq!(backend.mapping_dir, PathBuf::from(DEFAULT_MAPPING_DIR));
    }

    #[test]
    fn hook_commands_ignore_blank_values() {
        let props = Properties::parse("[hooks]\nEXPORT = ./export.sh\nVISUALIZE =\n").unwrap();
        assert_eq!(hook_command(&props, HookPhase::Export), Some("./export.sh"));
        assert_eq!(hook_command(&props, HookPhase::Visualize), None);
        assert_eq!(hook_command(&props, HookPhase::Topology), None);
    }
}
