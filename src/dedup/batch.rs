// SYNOID Reels Batch Executor
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// One RenderJob per primary clip, run on a fixed-size worker pool. A job
// that fails (or whose task panics) still yields its BatchResult; siblings
// carry on.

use super::filter::{output_path_for, ChainSettings};
use super::job::{tally, BatchResult, RenderJob};
use super::params::JitterProfile;
use super::runner::JobRunner;
use crate::media::assets::{discover, pick, NoAssets, AUDIO_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::media::{probe, EncoderProfile};
use rand::Rng;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Worker pool bounds; sized for hardware transcode units, not CPU count.
pub const MIN_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 4;
pub const DEFAULT_WORKERS: usize = 3;

pub fn clamp_workers(requested: usize) -> usize {
    requested.clamp(MIN_WORKERS, MAX_WORKERS)
}

/// Where a batch reads from and writes to.
#[derive(Debug, Clone)]
pub struct BatchDirs {
    pub primary: PathBuf,
    pub secondary: Option<PathBuf>,
    pub background: Option<PathBuf>,
    pub output: PathBuf,
}

impl BatchDirs {
    /// Output defaults to `<primary>/target`.
    pub fn new(primary: impl Into<PathBuf>) -> Self {
        let primary = primary.into();
        let output = primary.join("target");
        Self {
            primary,
            secondary: None,
            background: None,
            output,
        }
    }
}

/// Pair every primary with independently drawn companions and parameters.
/// Fails only when there are no primaries at all.
pub fn plan_jobs<R: Rng + ?Sized>(
    dirs: &BatchDirs,
    profile: &JitterProfile,
    rng: &mut R,
) -> Result<Vec<RenderJob>, NoAssets> {
    let primaries = discover(&dirs.primary, VIDEO_EXTENSIONS)?;
    let secondaries = dirs
        .secondary
        .as_deref()
        .and_then(|d| discover(d, VIDEO_EXTENSIONS).ok())
        .unwrap_or_default();
    let beds = dirs
        .background
        .as_deref()
        .and_then(|d| discover(d, AUDIO_EXTENSIONS).ok())
        .unwrap_or_default();

    if secondaries.is_empty() {
        info!("[BATCH] No secondary clips; rendering single-layer");
    }
    if beds.is_empty() {
        info!("[BATCH] No background audio; bed stage skipped");
    }

    Ok(primaries
        .iter()
        .map(|primary| {
            RenderJob::new(
                primary.clone(),
                output_path_for(primary, &dirs.output),
                profile.draw(&mut *rng),
            )
            .with_secondary(pick(&secondaries, &mut *rng).cloned())
            .with_background(pick(&beds, &mut *rng).cloned())
        })
        .collect())
}

/// Fill in durations and audio presence. Probe failures leave `None`.
pub async fn probe_jobs(ffprobe: &str, jobs: &mut [RenderJob]) {
    for job in jobs.iter_mut() {
        match probe(ffprobe, &job.primary).await {
            Ok(asset) => {
                job.primary_duration = Some(asset.duration).filter(|d| *d > 0.0);
                job.primary_has_audio = Some(asset.has_audio);
            }
            Err(e) => warn!("[BATCH] Probe failed for {:?}, trim limited to cap: {:#}", job.primary, e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchExecutor {
    runner: JobRunner,
    ffprobe: String,
    settings: Arc<ChainSettings>,
    encoder: Arc<EncoderProfile>,
    workers: usize,
}

impl BatchExecutor {
    pub fn new(
        runner: JobRunner,
        ffprobe: impl Into<String>,
        settings: ChainSettings,
        encoder: EncoderProfile,
        workers: usize,
    ) -> Self {
        Self {
            runner,
            ffprobe: ffprobe.into(),
            settings: Arc::new(settings),
            encoder: Arc::new(encoder),
            workers: clamp_workers(workers),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Plan, probe and run a whole directory. Missing primaries skip the batch.
    pub async fn process_dir(&self, dirs: &BatchDirs, profile: &JitterProfile) -> Vec<BatchResult> {
        let planned = {
            let mut rng = rand::thread_rng();
            plan_jobs(dirs, profile, &mut rng)
        };
        let mut jobs = match planned {
            Ok(jobs) => jobs,
            Err(reason) => {
                warn!("[BATCH] Skipping batch: {}", reason);
                return Vec::new();
            }
        };
        if let Err(e) = tokio::fs::create_dir_all(&dirs.output).await {
            warn!("[BATCH] Cannot create output directory {:?}: {}", dirs.output, e);
            return jobs
                .into_iter()
                .map(|j| BatchResult::failure(j.primary, format!("output directory unavailable: {}", e)))
                .collect();
        }
        probe_jobs(&self.ffprobe, &mut jobs).await;
        let results = self.run(jobs).await;

        let outputs: Vec<PathBuf> = results
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok().cloned())
            .collect();
        for group in duplicate_outputs(&outputs) {
            warn!("[BATCH] ⚠️ Identical outputs (dedup ineffective): {:?}", group);
        }
        results
    }

    /// Run every job; exactly one result per job comes back.
    pub async fn run(&self, jobs: Vec<RenderJob>) -> Vec<BatchResult> {
        let total = jobs.len();
        info!("[BATCH] 🚀 {} jobs on {} workers", total, self.workers);

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut handles = Vec::with_capacity(total);

        for job in jobs {
            let semaphore = semaphore.clone();
            let runner = self.runner.clone();
            let settings = self.settings.clone();
            let encoder = self.encoder.clone();
            let input = job.primary.clone();
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return BatchResult::failure(job.primary.clone(), format!("worker pool closed: {}", e)),
                };
                runner.run_job(&job, &settings, &encoder).await
            });
            handles.push((input, handle));
        }

        let mut results = Vec::with_capacity(total);
        for (input, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("[BATCH] Worker for {:?} died: {}", input, e);
                    results.push(BatchResult::failure(input, format!("worker task failed: {}", e)));
                }
            }
        }

        let (ok, failed) = tally(&results);
        info!("[BATCH] Done: {} succeeded, {} failed", ok, failed);
        results
    }
}

fn hash_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let count = file.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Groups of files with identical content. Unreadable files are ignored.
pub fn duplicate_outputs(paths: &[PathBuf]) -> Vec<Vec<PathBuf>> {
    let digests: Vec<(String, PathBuf)> = paths
        .par_iter()
        .filter_map(|p| hash_file(p).ok().map(|h| (h, p.clone())))
        .collect();

    let mut by_digest: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for (digest, path) in digests {
        by_digest.entry(digest).or_default().push(path);
    }
    let mut groups: Vec<Vec<PathBuf>> = by_digest.into_values().filter(|g| g.len() > 1).collect();
    for g in groups.iter_mut() {
        g.sort();
    }
    groups.sort();
    groups
}
