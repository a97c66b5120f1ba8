// SYNOID Reels Process Tools - External Tool Invocation
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Thin wrappers around spawning ffmpeg / ffprobe / yt-dlp and friends.
// Child stdout is discarded so concurrent jobs never interleave on the
// console; stderr is captured and surfaced when the tool fails.

use anyhow::{bail, Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// How many trailing stderr lines are kept in an error message.
const STDERR_TAIL_LINES: usize = 25;

/// Prefix relative paths that start with '-' so tools never read them as flags.
pub fn safe_arg_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let starts_with_dash = path
        .to_str()
        .map(|s| s.starts_with('-'))
        .unwrap_or(false);
    if starts_with_dash {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

/// Keep only the last lines of a tool's diagnostic output.
pub fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Run a tool to completion. Stdout is dropped, stderr captured.
pub async fn run_tool<I, S>(program: &str, args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<std::ffi::OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
    debug!("[PROC] {} {:?}", program, args);

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to execute '{}'", program))?;

    if !output.status.success() {
        bail!(
            "{} exited with {}:\n{}",
            program,
            output.status,
            stderr_tail(&output.stderr)
        );
    }
    Ok(())
}

/// Run a tool and return its stdout. Stderr is captured for the error path.
pub async fn capture_tool<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to execute '{}'", program))?;

    if !output.status.success() {
        bail!(
            "{} exited with {}:\n{}",
            program,
            output.status,
            stderr_tail(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Check whether a binary answers to `-version` / `--version`.
pub async fn tool_available(program: &str, version_flag: &str) -> bool {
    Command::new(program)
        .arg(version_flag)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
