use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod collaborators;
mod config;
mod hooks;
mod lock;
mod mappings;
mod paths;
mod preflight;
mod properties;
mod resources;
mod state;
mod workflow;

use cli::{RootArgs, BACKEND_PROPERTIES, INPUT_PROPERTIES};
use collaborators::CommandHooks;
use properties::Properties;
use resources::ResourceSelection;
use workflow::{run_assessment, AssessmentRun, Overrides, RunOutcome};

/// Exit status for a run stopped by a pre-run check.
const GATE_FAILURE_EXIT: u8 = 2;

fn main() -> Result<ExitCode> {
    init_tracing();
    let args = RootArgs::parse();

    let selection = ResourceSelection::parse(args.resources.as_deref())?;
    let input = Properties::load(Path::new(INPUT_PROPERTIES))
        .with_context(|| format!("load {INPUT_PROPERTIES}"))?;
    let backend = Properties::load(Path::new(BACKEND_PROPERTIES))
        .with_context(|| format!("load {BACKEND_PROPERTIES}"))?;

    let run = AssessmentRun {
        input: &input,
        backend: &backend,
        selection: &selection,
        overrides: Overrides::from_env(),
    };
    let mut hooks = CommandHooks::new(backend.clone());
    match run_assessment(&run, &mut hooks)? {
        RunOutcome::Completed(_) => Ok(ExitCode::SUCCESS),
        RunOutcome::GateFailed(reason) => {
            tracing::debug!(%reason, "run stopped");
            Ok(ExitCode::from(GATE_FAILURE_EXIT))
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ASSESS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
