// SYNOID Reels Asset Selector
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Directory scanning and uniform random picks. Absence of assets is a
// value (`NoAssets`), never an error: callers skip the batch or stage.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "aac"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Why a directory produced no candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoAssets {
    MissingDirectory(PathBuf),
    Empty(PathBuf),
}

impl fmt::Display for NoAssets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoAssets::MissingDirectory(p) => write!(f, "directory does not exist: {:?}", p),
            NoAssets::Empty(p) => write!(f, "no eligible files in {:?}", p),
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_lowercase();
            extensions.iter().any(|x| *x == lower)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(true)
}

/// List the files in `dir` (non-recursive) whose extension is accepted.
/// The result is sorted so repeated scans of an unchanged directory agree.
pub fn discover(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, NoAssets> {
    if !dir.is_dir() {
        warn!("[SELECT] Directory missing: {:?}", dir);
        return Err(NoAssets::MissingDirectory(dir.to_path_buf()));
    }

    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| !is_hidden(p) && has_extension(p, extensions))
        .collect();
    found.sort();

    if found.is_empty() {
        warn!("[SELECT] No eligible assets in {:?}", dir);
        return Err(NoAssets::Empty(dir.to_path_buf()));
    }
    debug!("[SELECT] {} candidates in {:?}", found.len(), dir);
    Ok(found)
}

/// Uniform pick from a candidate set.
pub fn pick<'a, R: Rng + ?Sized>(candidates: &'a [PathBuf], rng: &mut R) -> Option<&'a PathBuf> {
    candidates.choose(rng)
}

/// Scan then pick in one step; `None` when nothing is available.
pub fn pick_from_dir<R: Rng + ?Sized>(
    dir: &Path,
    extensions: &[&str],
    rng: &mut R,
) -> Option<PathBuf> {
    discover(dir, extensions)
        .ok()
        .and_then(|c| pick(&c, rng).cloned())
}
