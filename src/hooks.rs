//! External command runner for phase hooks.
//!
//! A hook is a shell-words command line from `backend.properties`. The request
//! is written to the child's stdin as one JSON object and the response, when
//! the phase has one, is read back from stdout as a JSON object.
use crate::config::HookPhase;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{ChildStdin, Command, Stdio};
use std::thread;
use std::time::Instant;

/// Split a hook command line into program and arguments.
pub fn split_command(command: &str) -> Result<Vec<String>> {
    let args =
        shell_words::split(command).with_context(|| format!("parse hook command: {command}"))?;
    if args.is_empty() {
        return Err(anyhow!("hook command is empty"));
    }
    Ok(args)
}

/// Locate the hook's program the same way the OS would when spawning it.
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        let path = PathBuf::from(program);
        if path.is_file() {
            return Ok(path);
        }
        return Err(anyhow!("hook program {program} does not exist"));
    }
    which::which(program).with_context(|| format!("hook program {program} not found on PATH"))
}

/// Run a hook and return its raw stdout.
pub fn run_hook<T: Serialize>(phase: HookPhase, command: &str, request: &T) -> Result<String> {
    let args = split_command(command)?;
    let payload = serde_json::to_vec(request)
        .with_context(|| format!("serialize {} hook request", phase.as_str()))?;

    let start = Instant::now();
    let mut child = Command::new(&args[0])
        .args(&args[1..])
        .env("ASSESS_PHASE", phase.as_str())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn {} hook: {}", phase.as_str(), args[0]))?;

    // Feed stdin on its own thread so a hook that writes before it reads
    // cannot stall on a full stdout or stderr pipe.
    let stdin = child.stdin.take();
    let (written, output) = thread::scope(|scope| {
        let writer = scope.spawn(|| write_request(stdin, &payload));
        let output = child.wait_with_output();
        (writer.join(), output)
    });
    let output = output.with_context(|| format!("wait for {} hook", phase.as_str()))?;
    written
        .map_err(|_| anyhow!("{} hook request writer panicked", phase.as_str()))?
        .with_context(|| format!("write {} hook request", phase.as_str()))?;
    let elapsed_ms = start.elapsed().as_millis();

    tracing::info!(
        phase = phase.as_str(),
        elapsed_ms,
        request_bytes = payload.len(),
        response_bytes = output.stdout.len(),
        "hook complete"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{} hook failed with status {}: {}",
            phase.as_str(),
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8(output.stdout)
        .with_context(|| format!("decode {} hook stdout as UTF-8", phase.as_str()))
}

fn write_request(stdin: Option<ChildStdin>, payload: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    // A hook may exit without draining stdin; its exit status decides.
    match stdin.write_all(payload) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Run a hook whose stdout must be a JSON object.
pub fn run_hook_for_object<T: Serialize>(
    phase: HookPhase,
    command: &str,
    request: &T,
) -> Result<Map<String, Value>> {
    let stdout = run_hook(phase, command, request)?;
    parse_object(phase, &stdout)
}

fn parse_object(phase: HookPhase, stdout: &str) -> Result<Map<String, Value>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{} hook produced no output", phase.as_str()));
    }
    let value: Value = serde_json::from_str(trimmed)
        .with_context(|| format!("parse {} hook output as JSON", phase.as_str()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!(
            "{} hook output must be a JSON object (got {})",
            phase.as_str(),
            json_kind(&other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
