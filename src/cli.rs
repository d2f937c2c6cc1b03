//! CLI argument parsing for the assessment pipeline.
//!
//! The CLI is intentionally thin: configuration lives in `input.properties`
//! and `backend.properties`, so the only per-run choice is which resources
//! to assess.
use clap::Parser;

/// Well-known path of the user-facing input configuration.
pub const INPUT_PROPERTIES: &str = "input.properties";
/// Well-known path of the backend configuration.
pub const BACKEND_PROPERTIES: &str = "backend.properties";

const RESOURCES_HELP: &str = "\
Resources can be one of, or a comma separated list of:

  * targetservers
  * keyvaluemaps
  * references
  * resourcefiles
  * keystores
  * flowhooks
  * org_keyvaluemaps
  * developers
  * apiproducts
  * apis
  * apps
  * sharedflows
  * api_traffic
  * all

For Apigee environment level objects choose
  -> targetservers,keyvaluemaps,references,resourcefiles,keystores,flowhooks

For Apigee organization level objects choose
  -> org_keyvaluemaps,developers,apiproducts,apis,apps,sharedflows

For Apigee analytics choose -> api_traffic
  (requires ANALYTICS_START_DATE and ANALYTICS_END_DATE in input.properties)

Example1: --resources targetservers,keyvaluemaps
Example2: --resources keystores,apps";

/// Root CLI entrypoint for the assessment run.
#[derive(Parser, Debug)]
#[command(
    name = "apigee-assess",
    version,
    about = "Assess an Apigee Edge/OPDK installation for migration to Apigee X",
    after_help = "Environment:\n  IGNORE_VIZ=true             Skip the visualization phase\n  IGNORE_OPDK_TOPOLOGY=true   Skip OPDK topology discovery\n  ASSESS_LOG=<filter>         Log filter (default: info)\n\nExit status:\n  0  assessment completed\n  1  fatal error\n  2  a pre-run check failed (see log)"
)]
pub struct RootArgs {
    /// Comma separated resources to assess (see --help)
    #[arg(long, value_name = "LIST", long_help = RESOURCES_HELP)]
    pub resources: Option<String>,
}
