//! Clipboard, browser and child processes that take over the terminal.

use std::process::{Command, Stdio};
use std::sync::{Mutex, MutexGuard};

use arboard::Clipboard;
use sunbeam_protocol::App;

use crate::page::HandOff;

const DEFAULT_EDITOR: &str = "vi";

/// Kept for the whole session: on X11 the copied text lives only as long as
/// its owning clipboard.
static CLIPBOARD: Mutex<Option<Clipboard>> = Mutex::new(None);

fn clipboard_slot() -> MutexGuard<'static, Option<Clipboard>> {
    match CLIPBOARD.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    let mut slot = clipboard_slot();
    if slot.is_none() {
        let clipboard =
            Clipboard::new().map_err(|error| format!("clipboard unavailable: {error}"))?;
        *slot = Some(clipboard);
    }
    let Some(clipboard) = slot.as_mut() else {
        return Err("clipboard unavailable".to_string());
    };
    clipboard
        .set_text(text.to_string())
        .map_err(|error| format!("failed to copy to the clipboard: {error}"))
}

/// Command that opens `target`, honoring the per-platform app override.
pub fn open_command(target: &str, app: Option<&App>) -> Result<Command, String> {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        if let Some(name) = app.and_then(|app| app.macos.as_deref()) {
            command.args(["-a", name]);
        }
        command.arg(target);
        return Ok(command);
    }
    match app.and_then(|app| app.linux.as_deref()) {
        Some(launcher) => {
            let words = shell_words::split(launcher)
                .map_err(|error| format!("invalid app command `{launcher}`: {error}"))?;
            let Some((program, args)) = words.split_first() else {
                return Err("empty app command".to_string());
            };
            let mut command = Command::new(program);
            command.args(args).arg(target);
            Ok(command)
        }
        None => {
            let mut command = Command::new("xdg-open");
            command.arg(target);
            Ok(command)
        }
    }
}

pub fn open_target(target: &str, app: Option<&App>) -> Result<(), String> {
    let mut command = open_command(target, app)?;
    let status = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|error| format!("failed to open {target}: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("opening {target} exited with {status}"))
    }
}

/// `$VISUAL`, then `$EDITOR`, then vi, split like a shell would.
pub fn editor_command(
    path: &str,
    visual: Option<String>,
    editor: Option<String>,
) -> Result<Command, String> {
    let editor = visual
        .filter(|value| !value.trim().is_empty())
        .or(editor.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
    let words = shell_words::split(&editor)
        .map_err(|error| format!("invalid editor `{editor}`: {error}"))?;
    let Some((program, args)) = words.split_first() else {
        return Err("empty editor command".to_string());
    };
    let mut command = Command::new(program);
    command.args(args).arg(path);
    Ok(command)
}

pub fn shell_command(script: &str, dir: Option<&str>) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    command
}

/// Builds the child process for a hand-off.
pub fn hand_off_command(request: &HandOff) -> Result<Command, String> {
    match request {
        HandOff::Extension {
            extension,
            command,
            params,
        } => extension
            .tty_command(command, params)
            .map_err(|error| error.to_string()),
        HandOff::Shell { command, dir } => Ok(shell_command(command, dir.as_deref())),
        HandOff::Editor { path } => editor_command(
            path,
            std::env::var("VISUAL").ok(),
            std::env::var("EDITOR").ok(),
        ),
    }
}

/// Runs a hand-off with inherited stdio and waits for it.
pub fn run_hand_off(request: &HandOff) -> Result<(), String> {
    let mut command = hand_off_command(request)?;
    let status = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|error| format!("failed to start child process: {error}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("child process exited with {status}"))
    }
}
