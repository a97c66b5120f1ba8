// SYNOID Reels Task Pipeline
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// A task is one account feed: clean its working directory, pull the newest
// clips into it, then run the dedup batch over whatever landed there.

use crate::config::ReelsConfig;
use crate::dedup::{BatchDirs, BatchExecutor, BatchResult};
use crate::fetch::archive::ARCHIVE_FILE_NAME;
use crate::fetch::{download_collection, YtDlpCommand};
use crate::media::assets::VIDEO_EXTENSIONS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One configured feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub name: String,
    /// Profile or playlist handed to yt-dlp
    pub url: String,
    /// Download target; renders go to `<main_dir>/target`
    pub main_dir: PathBuf,
    /// Overlay clips; falls back to the global secondary directory
    #[serde(default)]
    pub secondary_dir: Option<PathBuf>,
}

/// What a cleanup pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub videos: usize,
    pub target_removed: bool,
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Remove last run's clips and the `target` folder. The download archive
/// and any non-video file stay. A missing directory is not an error.
pub fn clean_directory(dir: &Path) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    if !dir.is_dir() {
        return Ok(report);
    }
    info!("[TASK] 🧹 Cleaning {:?}", dir);
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_file() {
            if entry.file_name() == ARCHIVE_FILE_NAME || !is_video(&path) {
                continue;
            }
            std::fs::remove_file(&path).with_context(|| format!("Failed to remove {:?}", path))?;
            report.videos += 1;
        } else if file_type.is_dir() && entry.file_name() == "target" {
            std::fs::remove_dir_all(&path).with_context(|| format!("Failed to remove {:?}", path))?;
            report.target_removed = true;
        }
    }
    Ok(report)
}

/// Batch directories for `task` under the global fallbacks of `config`.
pub fn batch_dirs(task: &TaskRecord, config: &ReelsConfig) -> BatchDirs {
    BatchDirs {
        secondary: task.secondary_dir.clone().or_else(|| config.secondary_dir.clone()),
        background: config.bgm_dir.clone(),
        ..BatchDirs::new(&task.main_dir)
    }
}

/// Clean, fetch, dedup. A failed download is logged and the batch still
/// runs over anything already on disk.
pub async fn run_task(
    task: &TaskRecord,
    config: &ReelsConfig,
    ytdlp: &YtDlpCommand,
    executor: &BatchExecutor,
) -> Result<Vec<BatchResult>> {
    info!("[TASK] 🚀 === {} ===", task.name);

    let cleaned = clean_directory(&task.main_dir)?;
    info!(
        "[TASK] Removed {} old videos{}",
        cleaned.videos,
        if cleaned.target_removed { " and the target folder" } else { "" }
    );

    info!("[TASK] Step 1: fetching {}", task.url);
    if let Err(e) = download_collection(ytdlp, &task.url, &task.main_dir, &config.fetch).await {
        warn!("[TASK] ⚠️ Download failed, processing what is on disk: {:#}", e);
    }

    info!("[TASK] Step 2: dedup batch");
    let results = executor.process_dir(&batch_dirs(task, config), &config.jitter).await;
    info!("[TASK] ✅ {} finished", task.name);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_keeps_archive_and_non_video() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join(ARCHIVE_FILE_NAME), "tiktok 1\n").unwrap();
        std::fs::write(root.join("a.mp4"), b"x").unwrap();
        std::fs::write(root.join("b.MOV"), b"x").unwrap();
        std::fs::write(root.join("notes.txt"), b"x").unwrap();
        std::fs::create_dir_all(root.join("target").join("nested")).unwrap();
        std::fs::write(root.join("target").join("old.mp4"), b"x").unwrap();
        std::fs::create_dir_all(root.join("keepme")).unwrap();

        let report = clean_directory(root).unwrap();
        assert_eq!(report, CleanReport { videos: 2, target_removed: true });
        assert!(root.join(ARCHIVE_FILE_NAME).exists());
        assert!(root.join("notes.txt").exists());
        assert!(root.join("keepme").is_dir());
        assert!(!root.join("a.mp4").exists());
        assert!(!root.join("target").exists());
    }

    #[test]
    fn test_clean_missing_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let report = clean_directory(&dir.path().join("absent")).unwrap();
        assert_eq!(report, CleanReport::default());
    }

    #[test]
    fn test_batch_dirs_fallbacks() {
        let config = ReelsConfig {
            secondary_dir: Some(PathBuf::from("/global/sub")),
            bgm_dir: Some(PathBuf::from("/global/bgm")),
            ..ReelsConfig::default()
        };
        let mut task = TaskRecord {
            name: "A1".into(),
            url: "https://www.tiktok.com/@someone".into(),
            main_dir: PathBuf::from("/data/A1"),
            secondary_dir: None,
        };
        let dirs = batch_dirs(&task, &config);
        assert_eq!(dirs.secondary, Some(PathBuf::from("/global/sub")));
        assert_eq!(dirs.background, Some(PathBuf::from("/global/bgm")));
        assert_eq!(dirs.output, PathBuf::from("/data/A1/target"));

        task.secondary_dir = Some(PathBuf::from("/own/sub"));
        assert_eq!(batch_dirs(&task, &config).secondary, Some(PathBuf::from("/own/sub")));
    }
}
