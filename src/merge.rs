// SYNOID Reels Merge - Compilation Builder
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Many short clips -> one long landscape compilation. Each clip is
// transcoded to a uniform 854x480 MPEG-TS segment on a small worker pool,
// the segments are joined byte for byte (TS is concatenable) and the result
// is remuxed to MP4 with all metadata dropped.

use crate::dedup::batch::clamp_workers;
use crate::dedup::params::{JitterParams, JitterProfile};
use crate::dedup::runner::{scratch_dir, JobRunner};
use crate::graph::stages::{eq, noise, scale_graph};
use crate::graph::{FilterSpec, InputSpec, ScalePolicy, TrimPolicy};
use crate::media::{discover, probe, EncoderProfile, MediaAsset};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

const MERGE_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    pub size: (u32, u32),
    /// Backdrop blur kernel in pixels
    pub blur: f64,
    pub backdrop_dim: f64,
    /// Tail drop per clip; clips under `min_duration` play whole
    pub trim: TrimPolicy,
    /// Fraction of height kept when cropping landscape clips
    pub crop_keep: f64,
    pub video_bitrate: String,
    pub audio_bitrate: String,
    pub workers: usize,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            size: (854, 480),
            blur: 11.0,
            backdrop_dim: 0.1,
            trim: TrimPolicy {
                tail: 2.0,
                max_duration: 600.0,
                min_duration: 5.0,
            },
            crop_keep: 0.9,
            video_bitrate: "1200k".to_string(),
            audio_bitrate: "96k".to_string(),
            workers: 4,
        }
    }
}

/// Transcode graph for one clip into a TS segment.
pub fn segment_spec(
    clip: &MediaAsset,
    params: &JitterParams,
    settings: &MergeSettings,
    encoder: &EncoderProfile,
) -> FilterSpec {
    let end = settings.trim.end_time(Some(clip.duration));
    let mut spec = FilterSpec::default();
    spec.push_input(InputSpec::file(&clip.path));

    let mut pre = Vec::new();
    if let Some(end) = end {
        pre.push(format!("trim=0:{:.3}", end));
        pre.push("setpts=PTS-STARTPTS".to_string());
    }
    if !clip.is_portrait() {
        pre.push(format!(
            "crop=iw:ih*{:.3}:0:ih*{:.3}",
            settings.crop_keep.clamp(0.1, 1.0),
            params.crop_offset.clamp(0.0, 1.0 - settings.crop_keep.clamp(0.1, 1.0))
        ));
    }
    if let Some(n) = noise(params.noise_strength, params.noise_seed) {
        pre.push(n);
    }
    pre.push(eq(params.brightness, params.contrast, params.saturation));

    let (w, h) = settings.size;
    let mut graph = vec![format!("[0:v]{}[mg_src]", pre.join(","))];
    graph.push(scale_graph(
        ScalePolicy::FitBlurred {
            blur: settings.blur,
            dim: settings.backdrop_dim,
        },
        "mg_src",
        "outv",
        w,
        h,
    ));

    // every segment carries audio so the joined stream stays continuous
    if clip.has_audio {
        let trim = match end {
            Some(end) => format!("atrim=0:{:.3},asetpts=PTS-STARTPTS,", end),
            None => String::new(),
        };
        graph.push(format!("[0:a]{}volume={:.3}[outa]", trim, params.volume));
    } else {
        let length = end.unwrap_or(clip.duration);
        let idx = spec.push_input(
            InputSpec::lavfi("anullsrc=r=44100:cl=stereo").with_option("-t", format!("{:.3}", length)),
        );
        graph.push(format!("[{}:a]anull[outa]", idx));
    }

    spec.filter_complex = Some(graph.join(";"));
    spec.maps = vec!["[outv]".into(), "[outa]".into()];
    let encoder = encoder
        .clone()
        .with_video_bitrate(&settings.video_bitrate)
        .with_audio_bitrate(&settings.audio_bitrate);
    spec.output_args.extend(encoder.video_args());
    spec.output_args.extend(encoder.audio_args());
    spec.output_args.extend(["-ar", "44100", "-ac", "2"].iter().map(|s| s.to_string()));
    spec.output_args.extend(FilterSpec::strip_metadata_args());
    spec.output_args.extend(["-f".to_string(), "mpegts".to_string()]);
    spec
}

/// Append `segments` in order into `dest`.
pub fn join_segments(segments: &[PathBuf], dest: &Path) -> io::Result<u64> {
    let mut out = File::create(dest)?;
    let mut total = 0;
    for seg in segments {
        let mut input = File::open(seg)?;
        total += io::copy(&mut input, &mut out)?;
    }
    Ok(total)
}

/// Stream-copy a TS file into MP4, dropping metadata.
pub fn remux_spec(combined: &Path) -> FilterSpec {
    let mut spec = FilterSpec::default();
    spec.push_input(InputSpec::file(combined));
    spec.output_args = vec!["-c".into(), "copy".into()];
    spec.output_args.extend(FilterSpec::strip_metadata_args());
    spec
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub output: PathBuf,
    pub joined: usize,
    pub failed: usize,
}

pub async fn merge_compilation(
    input_dir: &Path,
    output: &Path,
    settings: &MergeSettings,
    ffprobe: &str,
    runner: &JobRunner,
    encoder: &EncoderProfile,
) -> Result<MergeReport> {
    let files = match discover(input_dir, MERGE_EXTENSIONS) {
        Ok(files) => files,
        Err(reason) => bail!("Nothing to merge: {}", reason),
    };

    let mut clips = Vec::with_capacity(files.len());
    for file in &files {
        match probe(ffprobe, file).await {
            Ok(asset) => clips.push(asset),
            Err(e) => warn!("[MERGE] Skipping unreadable clip {:?}: {:#}", file, e),
        }
    }
    if clips.is_empty() {
        bail!("No clip in {:?} could be probed", input_dir);
    }

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let scratch = scratch_dir(&parent)?;
    let workers = clamp_workers(settings.workers);
    info!("[MERGE] 🚀 Transcoding {} clips on {} workers", clips.len(), workers);

    let profile = JitterProfile::merge();
    let semaphore = Arc::new(Semaphore::new(workers));
    let settings_arc = Arc::new(settings.clone());
    let encoder_arc = Arc::new(encoder.clone());
    let mut handles = Vec::with_capacity(clips.len());
    for (i, clip) in clips.into_iter().enumerate() {
        let params = profile.draw(&mut rand::thread_rng());
        let segment = scratch.path().join(format!("{:04}.ts", i));
        let semaphore = semaphore.clone();
        let runner = runner.clone();
        let settings = settings_arc.clone();
        let encoder = encoder_arc.clone();
        let source = clip.path.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let spec = segment_spec(&clip, &params, &settings, &encoder);
            runner.render(&spec, &segment).await.map(|out| out.output_path)
        });
        handles.push((source, handle));
    }

    let mut segments = Vec::new();
    let mut failed = 0;
    for (source, handle) in handles {
        match handle.await {
            Ok(Ok(path)) => segments.push(path),
            Ok(Err(e)) => {
                error!("[MERGE] ❌ {:?}: {:#}", source, e);
                failed += 1;
            }
            Err(e) => {
                error!("[MERGE] ❌ Worker for {:?} died: {}", source, e);
                failed += 1;
            }
        }
    }
    if segments.is_empty() {
        bail!("Every segment failed to transcode");
    }

    info!("[MERGE] 🔗 Joining {} segments", segments.len());
    let combined = scratch.path().join("combined.ts");
    let bytes = join_segments(&segments, &combined).context("Failed to join segments")?;
    info!("[MERGE] Joined {:.1} MB; remuxing", bytes as f64 / 1_048_576.0);

    let rendered = runner.render(&remux_spec(&combined), output).await?;
    info!("[MERGE] ✅ {:?} ({:.2} MB)", rendered.output_path, rendered.size_mb);
    Ok(MergeReport {
        output: rendered.output_path,
        joined: segments.len(),
        failed,
    })
}
