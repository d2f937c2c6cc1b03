//! The phase operations the orchestrator delegates.
//!
//! [`Collaborators`] is the seam between the pipeline and the work each phase
//! does. [`CommandHooks`] implements it by running the external commands
//! configured in the `[hooks]` section of `backend.properties`.
use crate::config::{hook_command, BackendConfig, HookPhase};
use crate::hooks::{run_hook, run_hook_for_object};
use crate::mappings::ReportMappings;
use crate::preflight::check_inputs;
use crate::properties::Properties;
use crate::resources::ResourceKind;
use crate::state::{ExportData, Report};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Work performed by each pipeline phase.
pub trait Collaborators {
    /// Gate the run on configuration sanity. `false` stops the pipeline.
    fn pre_validation_checks(&mut self, config: &Properties) -> Result<bool>;

    /// Export artifacts for the selected resources from the source installation.
    fn export_artifacts(
        &mut self,
        config: &Properties,
        resources: &[ResourceKind],
    ) -> Result<Map<String, Value>>;

    /// Validate exported artifacts against Apigee X constraints.
    fn validate_artifacts(
        &mut self,
        config: &Properties,
        resources: &[ResourceKind],
        export_data: &ExportData,
    ) -> Result<Map<String, Value>>;

    fn visualize_artifacts(
        &mut self,
        config: &Properties,
        export_data: &ExportData,
        report: &Report,
    ) -> Result<()>;

    /// Discover the on-prem installation layout (OPDK sources only).
    fn get_topology(&mut self, config: &Properties) -> Result<Map<String, Value>>;

    fn qualification_report(
        &mut self,
        config: &Properties,
        backend_config: &Properties,
        export_data: &ExportData,
        topology: &Map<String, Value>,
    ) -> Result<()>;
}

#[derive(Serialize)]
struct HookRequest<'a> {
    phase: &'static str,
    inputs: &'a Properties,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend: Option<&'a Properties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resources: Option<&'a [ResourceKind]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export_data: Option<&'a ExportData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topology: Option<&'a Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mappings: Option<&'a ReportMappings>,
}

impl<'a> HookRequest<'a> {
    fn new(phase: HookPhase, inputs: &'a Properties) -> Self {
        Self {
            phase: phase.as_str(),
            inputs,
            backend: None,
            resources: None,
            export_data: None,
            report: None,
            topology: None,
            mappings: None,
        }
    }
}

/// Collaborators backed by external commands.
#[derive(Debug, Clone)]
pub struct CommandHooks {
    backend: Properties,
}

impl CommandHooks {
    pub fn new(backend: Properties) -> Self {
        Self { backend }
    }

    fn command(&self, phase: HookPhase) -> Option<&str> {
        hook_command(&self.backend, phase)
    }

    fn required_command(&self, phase: HookPhase) -> Result<&str> {
        self.command(phase).ok_or_else(|| {
            anyhow!(
                "no {} hook configured (set {} in the [hooks] section of backend.properties)",
                phase.as_str(),
                phase.config_key()
            )
        })
    }
}

#[derive(Deserialize)]
struct PreValidationResponse {
    passed: bool,
    #[serde(default)]
    messages: Vec<String>,
}

impl Collaborators for CommandHooks {
    fn pre_validation_checks(&mut self, config: &Properties) -> Result<bool> {
        let findings = check_inputs(config, &self.backend);
        for finding in &findings {
            tracing::error!("{finding}");
        }
        if !findings.is_empty() {
            return Ok(false);
        }

        let Some(command) = self.command(HookPhase::PreValidation) else {
            return Ok(true);
        };
        let mut request = HookRequest::new(HookPhase::PreValidation, config);
        request.backend = Some(&self.backend);
        let response = run_hook_for_object(HookPhase::PreValidation, command, &request)?;
        let response: PreValidationResponse = serde_json::from_value(Value::Object(response))
            .map_err(|err| anyhow!("pre_validation hook response: {err}"))?;
        for message in &response.messages {
            if response.passed {
                tracing::info!("{message}");
            } else {
                tracing::error!("{message}");
            }
        }
        Ok(response.passed)
    }

    fn export_artifacts(
        &mut self,
        config: &Properties,
        resources: &[ResourceKind],
    ) -> Result<Map<String, Value>> {
        let command = self.required_command(HookPhase::Export)?;
        let mut request = HookRequest::new(HookPhase::Export, config);
        request.resources = Some(resources);
        run_hook_for_object(HookPhase::Export, command, &request)
    }

    fn validate_artifacts(
        &mut self,
        config: &Properties,
        resources: &[ResourceKind],
        export_data: &ExportData,
    ) -> Result<Map<String, Value>> {
        let command = self.required_command(HookPhase::Validate)?;
        let mut request = HookRequest::new(HookPhase::Validate, config);
        request.resources = Some(resources);
        request.export_data = Some(export_data);
        run_hook_for_object(HookPhase::Validate, command, &request)
    }

    fn visualize_artifacts(
        &mut self,
        config: &Properties,
        export_data: &ExportData,
        report: &Report,
    ) -> Result<()> {
        let Some(command) = self.command(HookPhase::Visualize) else {
            tracing::warn!("no visualize hook configured; skipping visualization");
            return Ok(());
        };
        let mut request = HookRequest::new(HookPhase::Visualize, config);
        request.export_data = Some(export_data);
        request.report = Some(report);
        run_hook(HookPhase::Visualize, command, &request)?;
        Ok(())
    }

    fn get_topology(&mut self, config: &Properties) -> Result<Map<String, Value>> {
        let command = self.required_command(HookPhase::Topology)?;
        let request = HookRequest::new(HookPhase::Topology, config);
        run_hook_for_object(HookPhase::Topology, command, &request)
    }

    fn qualification_report(
        &mut self,
        config: &Properties,
        backend_config: &Properties,
        export_data: &ExportData,
        topology: &Map<String, Value>,
    ) -> Result<()> {
        let command = self.required_command(HookPhase::QualificationReport)?;
        let backend = BackendConfig::from_properties(backend_config)?;
        let mappings = ReportMappings::load(&backend.mapping_dir)?;
        let mut request = HookRequest::new(HookPhase::QualificationReport, config);
        request.backend = Some(backend_config);
        request.export_data = Some(export_data);
        request.topology = Some(topology);
        request.mappings = Some(&mappings);
        run_hook(HookPhase::QualificationReport, command, &request)?;
        Ok(())
    }
}
