//! The assessment pipeline.
//!
//! Phases run in a fixed order: pre-validation, export, validation,
//! visualization, topology, qualification report. Export and validation are
//! checkpointed in the export and report caches so an interrupted run resumes
//! where it stopped.
use crate::collaborators::Collaborators;
use crate::config::{BackendConfig, InputConfig};
use crate::lock::StateLock;
use crate::paths::StatePaths;
use crate::properties::Properties;
use crate::resources::{ResourceKind, ResourceSelection};
use crate::state::{read_json_or_default, write_json, ExportData, Report};
use anyhow::Result;
use serde_json::Map;
use std::fmt;

/// Environment switches that skip optional phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub ignore_viz: bool,
    pub ignore_opdk_topology: bool,
}

impl Overrides {
    /// Read `IGNORE_VIZ` and `IGNORE_OPDK_TOPOLOGY`; only the exact value `true` counts.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_true = |key: &str| lookup(key).as_deref() == Some("true");
        Self {
            ignore_viz: is_true("IGNORE_VIZ"),
            ignore_opdk_topology: is_true("IGNORE_OPDK_TOPOLOGY"),
        }
    }
}

/// Everything a run needs, already loaded.
pub struct AssessmentRun<'a> {
    pub input: &'a Properties,
    pub backend: &'a Properties,
    pub selection: &'a ResourceSelection,
    pub overrides: Overrides,
}

/// Why a run stopped before doing any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateFailure {
    PreValidation,
    MissingAnalyticsDates,
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateFailure::PreValidation => f.write_str("pre-validation checks failed"),
            GateFailure::MissingAnalyticsDates => {
                f.write_str("api_traffic requested without an analytics date range")
            }
        }
    }
}

/// Which phases ran during a completed pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseSummary {
    pub resources: Vec<ResourceKind>,
    pub exported: bool,
    pub validated: bool,
    pub visualized: bool,
    pub topology: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(PhaseSummary),
    GateFailed(GateFailure),
}

/// Drive the pipeline to completion or to the first failed gate.
pub fn run_assessment<C: Collaborators>(
    run: &AssessmentRun<'_>,
    collaborators: &mut C,
) -> Result<RunOutcome> {
    if !collaborators.pre_validation_checks(run.input)? {
        tracing::error!("Pre validation checks failed. Please check input.properties and backend.properties");
        return Ok(RunOutcome::GateFailed(GateFailure::PreValidation));
    }

    let input = InputConfig::from_properties(run.input)?;
    let backend = BackendConfig::from_properties(run.backend)?;
    let paths = StatePaths::new(&input, &backend);
    let export_data_path = paths.export_data_path();
    let report_path = paths.report_path();

    let mut export_data: ExportData = read_json_or_default(&export_data_path)?;
    let mut report: Report = read_json_or_default(&report_path)?;

    if run.selection.includes(ResourceKind::ApiTraffic) && !input.has_analytics_range() {
        tracing::error!(
            "To request API traffic, ANALYTICS_START_DATE and ANALYTICS_END_DATE must be set in input.properties in MM/DD/YYYY format"
        );
        return Ok(RunOutcome::GateFailed(GateFailure::MissingAnalyticsDates));
    }

    let resources = run.selection.expanded();
    if run.selection.is_empty() {
        tracing::warn!("no resources selected; export and validation will cover nothing");
    }
    let mut summary = PhaseSummary {
        resources: resources.clone(),
        ..PhaseSummary::default()
    };

    let _lock = StateLock::acquire(&paths.lock_path())?;

    if export_data.export {
        tracing::info!(path = %export_data_path.display(), "export already complete; skipping");
    } else {
        tracing::info!(resources = resources.len(), "exporting artifacts");
        let artifacts = collaborators.export_artifacts(run.input, &resources)?;
        export_data = ExportData::from_export(artifacts);
        export_data.export = true;
        write_json(&export_data_path, &export_data)?;
        summary.exported = true;
    }

    if !report.report || !export_data.validation_done() {
        tracing::info!(resources = resources.len(), "validating artifacts");
        let findings = collaborators.validate_artifacts(run.input, &resources, &export_data)?;
        report = Report::from_validation(findings);
        report.report = true;
        export_data.validation_complete = true;
        export_data.validation_report = Some(report.to_map()?);
        write_json(&export_data_path, &export_data)?;
        write_json(&report_path, &report)?;
        summary.validated = true;
    } else {
        tracing::info!(path = %report_path.display(), "validation already complete; skipping");
    }

    if run.overrides.ignore_viz {
        tracing::info!("IGNORE_VIZ=true; skipping visualization");
    } else {
        collaborators.visualize_artifacts(run.input, &export_data, &report)?;
        summary.visualized = true;
    }

    let mut topology = Map::new();
    if run.overrides.ignore_opdk_topology {
        tracing::info!("IGNORE_OPDK_TOPOLOGY=true; skipping topology discovery");
    } else if input.is_opdk() {
        tracing::info!("discovering OPDK topology");
        topology = collaborators.get_topology(run.input)?;
        summary.topology = true;
    }

    collaborators.qualification_report(run.input, run.backend, &export_data, &topology)?;
    tracing::info!(
        resources = summary.resources.len(),
        exported = summary.exported,
        validated = summary.validated,
        visualized = summary.visualized,
        topology = summary.topology,
        "assessment complete"
    );
    Ok(RunOutcome::Completed(summary))
}
