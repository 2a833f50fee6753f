// bases/clipfetch/src/clipboard.rs
//! Clipboard access through the platform's command line tools.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// A program and its arguments
type Tool = (&'static str, &'static [&'static str]);

const NO_ARGS: &[&str] = &[];
const WL_PASTE_ARGS: &[&str] = &["--no-newline"];
const XCLIP_PASTE_ARGS: &[&str] = &["-selection", "clipboard", "-o"];

fn paste_tools() -> &'static [Tool] {
    if cfg!(target_os = "macos") {
        &[("pbpaste", NO_ARGS)]
    } else {
        &[("wl-paste", WL_PASTE_ARGS), ("xclip", XCLIP_PASTE_ARGS)]
    }
}

/// Current clipboard text, if any tool could read it
pub async fn read_text() -> Option<String> {
    for (program, args) in paste_tools() {
        match Command::new(program).args(*args).output().await {
            Ok(output) if output.status.success() => {
                return Some(String::from_utf8_lossy(&output.stdout).trim().to_string());
            }
            Ok(_) => tracing::debug!("{} could not read the clipboard", program),
            Err(e) => tracing::debug!("{} unavailable: {}", program, e),
        }
    }
    None
}

/// Put a file on the clipboard so it can be pasted into other apps
pub async fn copy_file(path: &Path) -> Result<()> {
    let path = path
        .canonicalize()
        .wrap_err_with(|| format!("Cannot copy missing file {}", path.display()))?;

    if cfg!(target_os = "macos") {
        let script = format!(
            "set the clipboard to (POSIX file \"{}\")",
            path.display().to_string().replace('"', "\\\"")
        );
        return run("osascript", &["-e", script.as_str()], None).await;
    }

    let uri = format!("file://{}\n", path.display());
    if run("wl-copy", &["--type", "text/uri-list"], Some(uri.as_str())).await.is_ok() {
        return Ok(());
    }
    run(
        "xclip",
        &["-selection", "clipboard", "-t", "text/uri-list"],
        Some(uri.as_str()),
    )
    .await
}

async fn run(program: &str, args: &[&str], input: Option<&str>) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .wrap_err_with(|| format!("Failed to start {}", program))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Some(input) = input {
            stdin.write_all(input.as_bytes()).await?;
        }
    }

    let status = child.wait().await?;
    if !status.success() {
        return Err(eyre!("{} exited with status: {}", program, status));
    }
    Ok(())
}
