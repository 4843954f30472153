//! Blocking error dialogs, rendered by the host OS.
//!
//! The launcher has no window of its own. Each platform's stock dialog tool
//! is invoked as a child process and waited on, which makes the dialog
//! modal for the launcher. Title and body travel as arguments or environment
//! variables, never spliced into script source.

use std::process::{Command, ExitStatus};

/// Shows a blocking error dialog and returns once the user dismissed it.
pub trait DialogPresenter {
    fn show_error(&self, title: &str, body: &str);
}

/// Presenter backed by osascript, zenity/kdialog or PowerShell.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDialog;

impl DialogPresenter for SystemDialog {
    fn show_error(&self, title: &str, body: &str) {
        tracing::error!(title, body, "error dialog");
        let tools = if has_display(|name| std::env::var_os(name)) {
            native_commands(title, body)
        } else {
            tracing::debug!("no graphical session, skipping dialog tools");
            Vec::new()
        };
        for mut cmd in tools {
            let program = cmd.get_program().to_string_lossy().into_owned();
            match cmd.status() {
                Ok(status) if was_shown(&program, status) => return,
                Ok(status) => {
                    tracing::debug!(%program, ?status, "dialog tool failed, trying next");
                }
                Err(e) => {
                    tracing::debug!(%program, error = %e, "dialog tool unavailable");
                }
            }
        }
        // Nothing could render it; stderr is the last resort
        eprintln!("{title}\n{body}");
    }
}

/// Zero is OK. zenity and kdialog also exit 1 when the dialog was closed
/// without pressing OK; for osascript and PowerShell 1 is a failure.
fn was_shown(program: &str, status: ExitStatus) -> bool {
    match status.code() {
        Some(0) => true,
        Some(1) => matches!(program, "zenity" | "kdialog"),
        _ => false,
    }
}

/// X11/Wayland tools need a display; macOS and Windows always have one.
#[cfg(not(any(target_os = "macos", windows)))]
fn has_display(var: impl Fn(&str) -> Option<std::ffi::OsString>) -> bool {
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .into_iter()
        .any(|name| var(name).is_some_and(|v| !v.is_empty()))
}

#[cfg(any(target_os = "macos", windows))]
fn has_display(_var: impl Fn(&str) -> Option<std::ffi::OsString>) -> bool {
    true
}

#[cfg(target_os = "macos")]
fn native_commands(title: &str, body: &str) -> Vec<Command> {
    let mut cmd = Command::new("osascript");
    cmd.args([
        "-e",
        "on run argv",
        "-e",
        "display dialog (item 2 of argv) with title (item 1 of argv) \
         buttons {\"OK\"} default button 1 with icon stop",
        "-e",
        "end run",
        title,
        body,
    ]);
    vec![cmd]
}

#[cfg(windows)]
fn native_commands(title: &str, body: &str) -> Vec<Command> {
    let mut cmd = Command::new("powershell");
    cmd.args([
        "-NoProfile",
        "-NonInteractive",
        "-Command",
        "Add-Type -AssemblyName System.Windows.Forms; \
         [void][System.Windows.Forms.MessageBox]::Show(\
         $env:LAUNCHER_DIALOG_BODY, $env:LAUNCHER_DIALOG_TITLE, 'OK', 'Error')",
    ])
    .env("LAUNCHER_DIALOG_TITLE", title)
    .env("LAUNCHER_DIALOG_BODY", body);
    vec![cmd]
}

#[cfg(not(any(target_os = "macos", windows)))]
fn native_commands(title: &str, body: &str) -> Vec<Command> {
    let mut zenity = Command::new("zenity");
    zenity.args(["--error", "--no-markup", "--title", title, "--text", body]);

    let mut kdialog = Command::new("kdialog");
    kdialog.args(["--title", title, "--error", body]);

    vec![zenity, kdialog]
}
