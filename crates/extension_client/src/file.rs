//! Extensions backed by a local executable.

use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ExecutionError, ExtensionError, TransportError};

fn ansi_escape_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[@-Z\\-_]")
            .expect("ansi regex must compile")
    })
}

/// Environment every extension process receives on top of the inherited one.
pub const CHILD_ENV: [(&str, &str); 2] = [("SUNBEAM", "0"), ("NO_COLOR", "1")];

/// Command running `entrypoint [args]` from the entrypoint's directory.
pub fn command(entrypoint: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(entrypoint);
    command.args(args);
    if let Some(dir) = entrypoint.parent() {
        command.current_dir(dir);
    }
    for (key, value) in CHILD_ENV {
        command.env(key, value);
    }
    command
}

/// Runs the entrypoint with no arguments and returns its stdout.
pub(crate) fn load_manifest(entrypoint: &Path) -> Result<Vec<u8>, ExtensionError> {
    run(entrypoint, &[], None)
}

/// Runs `entrypoint <name>` with `payload` on stdin.
pub(crate) fn run_command(
    entrypoint: &Path,
    name: &str,
    payload: &[u8],
) -> Result<Vec<u8>, ExtensionError> {
    run(entrypoint, &[name], Some(payload))
}

fn run(entrypoint: &Path, args: &[&str], input: Option<&[u8]>) -> Result<Vec<u8>, ExtensionError> {
    let mut child = command(entrypoint, args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| TransportError::Spawn {
            program: entrypoint.to_path_buf(),
            source,
        })?;

    if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
        match stdin.write_all(input) {
            Ok(()) => {}
            // The child is free to ignore its input.
            Err(error) if error.kind() == ErrorKind::BrokenPipe => {}
            Err(error) => return Err(TransportError::io("writing the payload", error).into()),
        }
    }

    let output = child
        .wait_with_output()
        .map_err(|error| TransportError::io("waiting for the extension", error))?;
    if !output.status.success() {
        let stderr = strip_ansi(&String::from_utf8_lossy(&output.stderr));
        tracing::debug!(
            entrypoint = %entrypoint.display(),
            status = ?output.status.code(),
            "extension command failed"
        );
        return Err(ExecutionError::CommandFailed {
            stderr: stderr.trim().to_string(),
            code: output.status.code(),
        }
        .into());
    }
    Ok(output.stdout)
}

pub(crate) fn strip_ansi(text: &str) -> String {
    ansi_escape_regex().replace_all(text, "").into_owned()
}
