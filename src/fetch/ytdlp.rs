// SYNOID Reels yt-dlp Source
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Collection downloads through yt-dlp, either a standalone binary or the
// python module. Argument lists are built by pure functions; the URL always
// follows `--` so it can never be read as a flag.

use super::archive::{DownloadArchive, FetchItem};
use crate::process::{run_tool, safe_arg_path, stderr_tail};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// yt-dlp exit status when `--max-downloads` stopped it.
pub const EXIT_MAX_DOWNLOADS: i32 = 101;

/// How yt-dlp gets launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YtDlpCommand {
    Standalone(String),
    /// `<python> -m yt_dlp`
    PythonModule(String),
}

impl YtDlpCommand {
    pub fn program(&self) -> &str {
        match self {
            YtDlpCommand::Standalone(bin) => bin,
            YtDlpCommand::PythonModule(python) => python,
        }
    }

    fn prefix_args(&self) -> Vec<String> {
        match self {
            YtDlpCommand::Standalone(_) => Vec::new(),
            YtDlpCommand::PythonModule(_) => vec!["-m".to_string(), "yt_dlp".to_string()],
        }
    }
}

async fn answers(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Find a working yt-dlp: the configured binary, then `yt-dlp` on PATH,
/// then a python interpreter with the module installed.
pub async fn resolve_command(configured: &str, python: &str) -> YtDlpCommand {
    for bin in [configured, "yt-dlp"] {
        if answers(bin, &["--version"]).await {
            info!("[FETCH] ✅ Using yt-dlp binary '{}'", bin);
            return YtDlpCommand::Standalone(bin.to_string());
        }
    }
    for py in [python, "python3", "python"] {
        if answers(py, &["-m", "yt_dlp", "--version"]).await {
            info!("[FETCH] ✅ Using python module via '{}'", py);
            return YtDlpCommand::PythonModule(py.to_string());
        }
    }
    warn!("[FETCH] ⚠️ No working yt-dlp found, downloads will fail");
    YtDlpCommand::Standalone(configured.to_string())
}

/// Download policy for one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub max_downloads: Option<u32>,
    pub match_filter: Option<String>,
    /// yt-dlp output template, relative to the save directory
    pub output_template: String,
    pub format: String,
    pub merge_output_format: String,
    pub cookies_from_browser: Option<String>,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    pub no_check_certificate: bool,
    pub ignore_errors: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_downloads: Some(3),
            match_filter: Some("duration > 15 & like_count >= 150000".to_string()),
            output_template: "%(upload_date)s_%(id)s_%(title).90s.%(ext)s".to_string(),
            format: "bestvideo+bestaudio/best".to_string(),
            merge_output_format: "mp4".to_string(),
            cookies_from_browser: Some("chrome".to_string()),
            user_agent: Some(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            proxy: None,
            no_check_certificate: true,
            ignore_errors: true,
        }
    }
}

/// Arguments for downloading `url` into `save_dir`, recording into `archive`.
pub fn build_download_args(
    command: &YtDlpCommand,
    url: &str,
    save_dir: &Path,
    archive: &Path,
    opts: &FetchOptions,
) -> Result<Vec<String>> {
    let mut args = command.prefix_args();

    args.push("--download-archive".to_string());
    args.push(safe_arg_path(archive).to_string_lossy().to_string());

    if let Some(max) = opts.max_downloads {
        args.push("--max-downloads".to_string());
        args.push(max.to_string());
    }
    if let Some(filter) = &opts.match_filter {
        args.push("--match-filter".to_string());
        args.push(filter.clone());
    }

    let template = safe_arg_path(&save_dir.join(&opts.output_template));
    args.extend([
        "-o".to_string(),
        template.to_string_lossy().to_string(),
        "--format".to_string(),
        opts.format.clone(),
        "--merge-output-format".to_string(),
        opts.merge_output_format.clone(),
    ]);

    if opts.no_check_certificate {
        args.push("--no-check-certificate".to_string());
    }
    if opts.ignore_errors {
        args.push("--ignore-errors".to_string());
    }

    if let Some(browser) = &opts.cookies_from_browser {
        if browser.starts_with('-') {
            bail!("Browser name cannot start with '-'");
        }
        args.push("--cookies-from-browser".to_string());
        args.push(browser.clone());
    }
    if let Some(agent) = &opts.user_agent {
        args.push("--user-agent".to_string());
        args.push(agent.clone());
    }
    if let Some(proxy) = &opts.proxy {
        if proxy.starts_with('-') {
            bail!("Proxy cannot start with '-'");
        }
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    args.push("--".to_string());
    args.push(url.to_string());
    Ok(args)
}

/// How a download run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed,
    /// `--max-downloads` reached; a normal stop.
    LimitReached,
}

/// Map an exit code to an outcome. `None` means killed by a signal.
pub fn interpret_exit(code: Option<i32>, stderr: &[u8]) -> Result<DownloadOutcome> {
    match code {
        Some(0) => Ok(DownloadOutcome::Completed),
        Some(EXIT_MAX_DOWNLOADS) => Ok(DownloadOutcome::LimitReached),
        Some(other) => bail!("yt-dlp exited with code {}:\n{}", other, stderr_tail(stderr)),
        None => bail!("yt-dlp was terminated by a signal"),
    }
}

/// Download a whole collection (profile, playlist) into `save_dir`.
/// yt-dlp consults the archive itself.
pub async fn download_collection(
    command: &YtDlpCommand,
    url: &str,
    save_dir: &Path,
    opts: &FetchOptions,
) -> Result<DownloadOutcome> {
    tokio::fs::create_dir_all(save_dir)
        .await
        .with_context(|| format!("Failed to create {:?}", save_dir))?;
    let archive = DownloadArchive::in_dir(save_dir)?;
    let args = build_download_args(command, url, save_dir, archive.path(), opts)?;

    info!(
        "[FETCH] 🚀 {} -> {:?} (max {:?}, archive has {})",
        url,
        save_dir,
        opts.max_downloads,
        archive.len()
    );
    debug!("[FETCH] {} {:?}", command.program(), args);

    let output = Command::new(command.program())
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to execute '{}'", command.program()))?;

    let outcome = interpret_exit(output.status.code(), &output.stderr)?;
    match outcome {
        DownloadOutcome::Completed => info!("[FETCH] ✅ Collection done"),
        DownloadOutcome::LimitReached => info!("[FETCH] ✅ Download limit reached"),
    }
    Ok(outcome)
}

/// Fetch one video as a single mp4 at `dest`, outside any archive.
pub async fn download_file(command: &YtDlpCommand, url: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let mut args = command.prefix_args();
    args.extend([
        "-f".to_string(),
        "mp4".to_string(),
        "--output".to_string(),
        safe_arg_path(dest).to_string_lossy().to_string(),
        "--".to_string(),
        url.to_string(),
    ]);
    info!("[FETCH] 🌐 {} -> {:?}", url, dest);
    run_tool(command.program(), args)
        .await
        .with_context(|| format!("Download of {} failed", url))
}

/// Download explicit items, skipping everything the archive already holds.
/// One result per attempted item; recorded identifiers are never attempted.
pub async fn fetch_items(
    command: &YtDlpCommand,
    items: &[FetchItem],
    save_dir: &Path,
    opts: &FetchOptions,
) -> Result<Vec<(FetchItem, Result<DownloadOutcome>)>> {
    tokio::fs::create_dir_all(save_dir)
        .await
        .with_context(|| format!("Failed to create {:?}", save_dir))?;
    let mut archive = DownloadArchive::in_dir(save_dir)?;
    let pending: Vec<FetchItem> = archive.pending(items).into_iter().cloned().collect();
    info!(
        "[FETCH] {} items, {} already archived",
        items.len(),
        items.len() - pending.len()
    );

    let single = FetchOptions {
        max_downloads: None,
        ..opts.clone()
    };
    let mut results = Vec::with_capacity(pending.len());
    for item in pending {
        let outcome = download_collection(command, &item.url, save_dir, &single).await;
        if outcome.is_ok() {
            archive.reload()?;
            archive.record(&item)?;
        } else {
            warn!("[FETCH] ❌ {} failed", item.key());
        }
        results.push((item, outcome));
    }
    Ok(results)
}
