// SYNOID Reels HTTP Assets
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Direct downloads for sound effects and stock gameplay loops. Existing
// files are kept; failures are logged and skipped.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A named file and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub file_name: String,
    pub url: String,
}

impl RemoteAsset {
    pub fn new(file_name: &str, url: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            url: url.to_string(),
        }
    }
}

/// The two effects the generators expect under `assets/sfx`.
pub fn default_sfx() -> Vec<RemoteAsset> {
    vec![
        RemoteAsset::new("tick.mp3", "https://cdn.pixabay.com/audio/2022/03/10/audio_c8c8a73467.mp3"),
        RemoteAsset::new("boom.mp3", "https://www.myinstants.com/media/sounds/vine-boom.mp3"),
    ]
}

/// Vertical gameplay loops for the speedrun gameplay mix under `assets/gameplay`.
pub fn default_gameplay() -> Vec<RemoteAsset> {
    vec![
        RemoteAsset::new(
            "gameplay_minecraft.mp4",
            "https://github.com/AnasImloul/Youtube-Shorts-Generator/raw/main/assets/backgrounds/gameplay.mp4",
        ),
        RemoteAsset::new(
            "gameplay_neon.mp4",
            "https://videos.pexels.com/video-files/3052066/3052066-hd_1080_1920_30fps.mp4",
        ),
        RemoteAsset::new(
            "gameplay_fluid.mp4",
            "https://videos.pexels.com/video-files/5049386/5049386-hd_1080_1920_30fps.mp4",
        ),
    ]
}

/// Anything smaller is a broken transfer, not a video.
pub const GAMEPLAY_MIN_BYTES: u64 = 1024 * 1024;

/// What happened to one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    AlreadyPresent,
    Downloaded { bytes: u64 },
    Failed(String),
}

/// A file counts as present when it is at least `min_bytes` long.
pub fn is_present(path: &Path, min_bytes: u64) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() >= min_bytes.max(1))
        .unwrap_or(false)
}

pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(60))
        .build()
        .context("Failed to build HTTP client")
}

async fn download_one(client: &reqwest::Client, url: &str, target: &Path) -> Result<u64> {
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;
    if !response.status().is_success() {
        bail!("HTTP {} for {}", response.status(), url);
    }

    // Stream into a sibling part file so a broken transfer never looks present.
    let part = target.with_extension("part");
    let mut file = tokio::fs::File::create(&part)
        .await
        .with_context(|| format!("Failed to create {:?}", part))?;
    let mut written = 0u64;
    let streamed: Result<()> = async {
        while let Some(chunk) = response.chunk().await.context("Transfer interrupted")? {
            file.write_all(&chunk).await.context("Write failed")?;
            written += chunk.len() as u64;
        }
        file.flush().await.context("Flush failed")?;
        Ok(())
    }
    .await;

    if let Err(e) = streamed {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e);
    }
    tokio::fs::rename(&part, target)
        .await
        .with_context(|| format!("Failed to move download into {:?}", target))?;
    Ok(written)
}

/// Fetch every asset into `dir`. One status per asset, in order.
pub async fn download_assets(
    client: &reqwest::Client,
    assets: &[RemoteAsset],
    dir: &Path,
    min_bytes: u64,
) -> Result<Vec<(PathBuf, AssetStatus)>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {:?}", dir))?;

    let mut statuses = Vec::with_capacity(assets.len());
    for asset in assets {
        let target = dir.join(&asset.file_name);
        if is_present(&target, min_bytes) {
            info!("[FETCH] ✅ Already present: {}", asset.file_name);
            statuses.push((target, AssetStatus::AlreadyPresent));
            continue;
        }
        info!("[FETCH] ⬇️ Downloading {} ...", asset.file_name);
        let status = match download_one(client, &asset.url, &target).await {
            Ok(bytes) => {
                info!("[FETCH] ✅ Saved {:?} ({} bytes)", target, bytes);
                AssetStatus::Downloaded { bytes }
            }
            Err(e) => {
                warn!("[FETCH] ❌ {}: {:#}", asset.file_name, e);
                AssetStatus::Failed(format!("{:#}", e))
            }
        };
        statuses.push((target, status));
    }
    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("tick.mp3");
        std::fs::write(&small, vec![0u8; 10]).unwrap();
        assert!(is_present(&small, 1));
        assert!(!is_present(&small, 1024));
        assert!(!is_present(&dir.path().join("boom.mp3"), 1));
    }

    #[tokio::test]
    async fn test_truncated_gameplay_is_fetched_again() {
        let dir = tempfile::tempdir().unwrap();
        let stub = dir.path().join("gameplay_neon.mp4");
        std::fs::write(&stub, vec![0u8; 4096]).unwrap();
        assert!(!is_present(&stub, GAMEPLAY_MIN_BYTES));
        let assets = vec![RemoteAsset::new("gameplay_neon.mp4", "http://127.0.0.1:9/neon.mp4")];
        let statuses = download_assets(&client().unwrap(), &assets, dir.path(), GAMEPLAY_MIN_BYTES)
            .await
            .unwrap();
        assert!(matches!(statuses[0].1, AssetStatus::Failed(_)));
        assert_eq!(default_gameplay().len(), 3);
        assert!(default_gameplay().iter().all(|a| a.file_name.ends_with(".mp4")));
    }

    #[tokio::test]
    async fn test_existing_files_are_not_requested() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tick.mp3"), b"data").unwrap();
        let assets = vec![RemoteAsset::new("tick.mp3", "http://127.0.0.1:9/never")];
        let statuses = download_assets(&client().unwrap(), &assets, dir.path(), 1)
            .await
            .unwrap();
        assert_eq!(statuses[0].1, AssetStatus::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![RemoteAsset::new("boom.mp3", "http://127.0.0.1:9/boom.mp3")];
        let statuses = download_assets(&client().unwrap(), &assets, dir.path(), 1)
            .await
            .unwrap();
        assert!(matches!(statuses[0].1, AssetStatus::Failed(_)));
        assert!(!dir.path().join("boom.mp3").exists());
        assert!(!dir.path().join("boom.part").exists());
    }
}
