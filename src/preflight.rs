//! Built-in pre-validation checks run before anything is read or written.
use crate::config::{hook_command, HookPhase, EXPORT_SECTION, INPUTS_SECTION};
use crate::hooks::{resolve_program, split_command};
use crate::properties::Properties;
use chrono::NaiveDate;
use std::path::Path;

/// Date format of `ANALYTICS_START_DATE` / `ANALYTICS_END_DATE`.
pub const ANALYTICS_DATE_FORMAT: &str = "%m/%d/%Y";

/// Check the configuration and return one message per problem found.
pub fn check_inputs(input: &Properties, backend: &Properties) -> Vec<String> {
    let mut findings = Vec::new();

    match input.get_nonempty(INPUTS_SECTION, "TARGET_DIR") {
        None => findings.push("inputs.TARGET_DIR must be set".to_string()),
        Some(dir) => {
            let path = Path::new(dir);
            if path.exists() && !path.is_dir() {
                findings.push(format!("inputs.TARGET_DIR {dir} exists but is not a directory"));
            }
        }
    }

    // Any non-OPDK source only skips topology discovery.
    if input
        .get_nonempty(INPUTS_SECTION, "SOURCE_APIGEE_VERSION")
        .is_none()
    {
        findings.push("inputs.SOURCE_APIGEE_VERSION must be set".to_string());
    }

    let start = check_date(input, "ANALYTICS_START_DATE", &mut findings);
    let end = check_date(input, "ANALYTICS_END_DATE", &mut findings);
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            findings.push(format!(
                "inputs.ANALYTICS_START_DATE ({start}) is after ANALYTICS_END_DATE ({end})"
            ));
        }
    }

    if backend.get_nonempty(EXPORT_SECTION, "EXPORT_DIR").is_none() {
        findings.push("export.EXPORT_DIR must be set in backend.properties".to_string());
    }
    match backend.get_nonempty(EXPORT_SECTION, "EXPORT_FILE") {
        None => findings.push("export.EXPORT_FILE must be set in backend.properties".to_string()),
        Some(file) if file.contains('/') || file.contains('\\') => findings.push(format!(
            "export.EXPORT_FILE must be a file name, not a path (got {file:?})"
        )),
        Some(_) => {}
    }

    for phase in HookPhase::ALL {
        let Some(command) = hook_command(backend, phase) else {
            continue;
        };
        let program = split_command(command).and_then(|args| resolve_program(&args[0]));
        if let Err(err) = program {
            findings.push(format!("hooks.{}: {err:#}", phase.config_key()));
        }
    }

    findings
}

fn check_date(input: &Properties, key: &str, findings: &mut Vec<String>) -> Option<NaiveDate> {
    let raw = input.get_nonempty(INPUTS_SECTION, key)?;
    match NaiveDate::parse_from_str(raw, ANALYTICS_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            findings.push(format!("inputs.{key} must use MM/DD/YYYY (got {raw:?})"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> Properties {
        Properties::parse("[export]\nEXPORT_DIR = export\nEXPORT_FILE = export_data.json\n")
            .unwrap()
    }

    fn input(extra: &str) -> Properties {
        Properties::parse(&format!(
            "[inputs]\nTARGET_DIR = target\nSOURCE_APIGEE_VERSION = OPDK\n{extra}"
        ))
        .unwrap()
    }

    #[test]
    fn valid_configuration_has_no_findings() {
        let findings = check_inputs(
            &input("ANALYTICS_START_DATE = 01/01/2025\nANALYTICS_END_DATE = 01/31/2025\n"),
            &backend(),
        );
        assert!(findings.is_empty(), "{findings:?}");
    }

    #[test]
    fn any_named_source_version_is_accepted() {
        for version in ["X", "SAAS", "HYBRID"] {
            let props = Properties::parse(&format!(
                "[inputs]\nTARGET_DIR = t\nSOURCE_APIGEE_VERSION = {version}\n"
            ))
            .unwrap();
            let findings = check_inputs(&props, &backend());
            assert!(findings.is_empty(), "{version}: {findings:?}");
        }
    }

    #[test]
    fn blank_source_version_is_reported() {
        let props =
            Properties::parse("[inputs]\nTARGET_DIR = t\nSOURCE_APIGEE_VERSION =\n").unwrap();
        let findings = check_inputs(&props, &backend());
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("SOURCE_APIGEE_VERSION"));
    }

    #[test]
    fn malformed_and_inverted_dates_are_reported() {
        let findings = check_inputs(&input("ANALYTICS_START_DATE = 2025-01-01\n"), &backend());
        assert!(findings.iter().any(|f| f.contains("MM/DD/YYYY")));

        let findings = check_inputs(
            &input("ANALYTICS_START_DATE = 02/01/2025\nANALYTICS_END_DATE = 01/01/2025\n"),
            &backend(),
        );
        assert!(findings.iter().any(|f| f.contains("is after")));
    }

    #[test]
    fn missing_export_keys_are_reported() {
        let findings = check_inputs(&input(""), &Properties::default());
        assert_eq!(findings.len(), 2);
        let backend =
            Properties::parse("[export]\nEXPORT_DIR = e\nEXPORT_FILE = nested/data.json\n")
                .unwrap();
        let findings = check_inputs(&input(""), &backend);
        assert!(findings[0].contains("file name"));
    }

    #[test]
    fn unresolvable_hook_program_is_reported() {
        let mut backend = backend();
        backend.set("hooks", "EXPORT", "no-such-assess-hook-binary --all");
        let findings = check_inputs(&input(""), &backend);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].starts_with("hooks.EXPORT"));
    }

    #[test]
    fn target_dir_pointing_at_a_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();
        let props = Properties::parse(&format!(
            "[inputs]\nTARGET_DIR = {}\nSOURCE_APIGEE_VERSION = SAAS\n",
            file.display()
        ))
        .unwrap();
        let findings = check_inputs(&props, &backend());
        assert_eq!(findings.len(), 1);
        assert!(findings[0].contains("not a directory"));
    }
}
