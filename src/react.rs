// SYNOID Reels React - Reaction Overlay Remix
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Long clip -> vertical parts of at most 59 s. Each part gets a blurred
// fill backdrop, a sped-up colour-jittered foreground, a chroma-keyed
// reaction clip in the corner and a bar showing elapsed time.

use crate::color::Color;
use crate::compose::render::bar_alpha;
use crate::compose::{BarAnchor, ProgressBar, Rect};
use crate::dedup::job::{tally, BatchResult};
use crate::dedup::params::{even_dimension, JitterParams, JitterProfile};
use crate::dedup::runner::JobRunner;
use crate::fetch::{download_file, YtDlpCommand};
use crate::graph::stages::{atempo_chain, blur_radius, eq, scale_graph, segment_windows, setpts_for_speed};
use crate::graph::{FilterSpec, InputSpec, ScalePolicy};
use crate::media::{discover, probe, EncoderProfile, MediaAsset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const REACT_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactSettings {
    pub size: (u32, u32),
    pub foreground_width: u32,
    pub backdrop_blur: f64,
    pub reaction_clip: PathBuf,
    /// Where to fetch the reaction clip when it is missing
    pub reaction_url: Option<String>,
    pub reaction_width: u32,
    pub key_color: Color,
    pub key_similarity: f64,
    pub key_blend: f64,
    /// Distance of the reaction clip from the right and bottom edges
    pub reaction_margin: (u32, u32),
    pub part_length: f64,
    /// Trailing parts shorter than this are dropped
    pub min_part: f64,
    pub bar_height: u32,
    pub bar_color: Color,
    pub video_bitrate: String,
}

impl Default for ReactSettings {
    fn default() -> Self {
        Self {
            size: (1080, 1920),
            foreground_width: 980,
            backdrop_blur: 41.0,
            reaction_clip: PathBuf::from("reaction_green.mp4"),
            reaction_url: Some("https://www.youtube.com/watch?v=J---aiyznGQ".to_string()),
            reaction_width: 350,
            key_color: Color::CHROMA_GREEN,
            key_similarity: 0.3,
            key_blend: 0.1,
            reaction_margin: (30, 200),
            part_length: 59.0,
            min_part: 5.0,
            bar_height: 15,
            bar_color: Color::ORANGE.with_alpha(0.9),
            video_bitrate: "6000k".to_string(),
        }
    }
}

/// Windows of `clip` worth exporting.
pub fn part_windows(duration: f64, settings: &ReactSettings) -> Vec<(f64, f64)> {
    segment_windows(duration, settings.part_length, settings.min_part)
        .into_iter()
        .filter(|(s, e)| e - s >= settings.min_part)
        .collect()
}

pub fn part_name(input: &Path, part: usize) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip.mp4".to_string());
    format!("final_P{}_{}", part, name)
}

/// Graph for one part. `reaction` is skipped when `None`.
pub fn part_spec(
    clip: &MediaAsset,
    window: (f64, f64),
    reaction: Option<&Path>,
    params: &JitterParams,
    settings: &ReactSettings,
    encoder: &EncoderProfile,
) -> FilterSpec {
    let (w, h) = (even_dimension(settings.size.0 as f64), even_dimension(settings.size.1 as f64));
    let (start, end) = window;
    let len = (end - start).max(0.1);
    let speed = if params.speed.is_finite() && params.speed > 0.0 {
        params.speed
    } else {
        1.0
    };

    let mut spec = FilterSpec::default();
    spec.push_input(
        InputSpec::file(&clip.path)
            .with_option("-ss", format!("{:.3}", start))
            .with_option("-t", format!("{:.3}", len)),
    );
    let react_idx = reaction.map(|p| spec.push_input(InputSpec::looped(p)));

    let mut graph = vec!["[0:v]split=2[rc_bgsrc][rc_fgsrc]".to_string()];
    graph.push(scale_graph(ScalePolicy::Fill, "rc_bgsrc", "rc_fill", w, h));
    graph.push(format!(
        "[rc_fill]boxblur={}:10[rc_bg]",
        blur_radius(settings.backdrop_blur, w.min(h))
    ));

    let mut fg = vec![format!("scale={}:-2", even_dimension(settings.foreground_width.min(w) as f64))];
    if let Some(s) = setpts_for_speed(speed) {
        fg.push(s);
    }
    fg.push(eq(params.brightness, params.contrast, params.saturation));
    fg.push("vibrance=intensity=0.3".to_string());
    fg.push("unsharp=5:5:1.0:5:5:0.0".to_string());
    graph.push(format!("[rc_fgsrc]{}[rc_fg]", fg.join(",")));
    graph.push("[rc_bg][rc_fg]overlay=(W-w)/2:(H-h)/2:shortest=1[rc_base]".to_string());

    let mut current = "rc_base".to_string();
    if let Some(idx) = react_idx {
        graph.push(format!(
            "[{}:v]chromakey={}:{:.2}:{:.2},despill,scale={}:-2,setpts=PTS-STARTPTS[rc_react]",
            idx,
            settings.key_color.to_ffmpeg(),
            settings.key_similarity,
            settings.key_blend,
            even_dimension(settings.reaction_width as f64)
        ));
        graph.push(format!(
            "[rc_base][rc_react]overlay=W-w-{}:H-h-{}:shortest=1[rc_comp]",
            settings.reaction_margin.0, settings.reaction_margin.1
        ));
        current = "rc_comp".to_string();
    }

    let played = len / speed;
    let bar = ProgressBar {
        rect: Rect::new(0, (h - settings.bar_height.min(h)) as i64, w, settings.bar_height.max(1)),
        color: settings.bar_color,
        track: None,
        from: 0.0,
        to: 1.0,
        over: played,
        anchor: BarAnchor::Left,
    };
    graph.push(format!(
        "color=c={}:s={}x{}:d={:.3},format=rgba,geq=r='r(X,Y)':g='g(X,Y)':b='b(X,Y)':a='{}*{:.2}'[rc_bar]",
        bar.color.with_alpha(1.0).to_ffmpeg(),
        bar.rect.width,
        bar.rect.height,
        played,
        bar_alpha(&bar),
        bar.color.alpha
    ));
    graph.push(format!(
        "[{}][rc_bar]overlay=x=0:y={}:eof_action=pass,format=yuv420p[outv]",
        current, bar.rect.y
    ));

    spec.maps = vec!["[outv]".into()];
    if clip.has_audio {
        let tempo = atempo_chain(speed).unwrap_or_else(|| "anull".to_string());
        graph.push(format!("[0:a]{}[outa]", tempo));
        spec.maps.push("[outa]".into());
    }
    spec.filter_complex = Some(graph.join(";"));

    let encoder = encoder.clone().with_video_bitrate(&settings.video_bitrate);
    spec.output_args.extend(encoder.video_args());
    if clip.has_audio {
        spec.output_args.extend(encoder.audio_args());
    } else {
        spec.output_args.push("-an".into());
    }
    spec.output_args.extend(FilterSpec::strip_metadata_args());
    spec
}

/// Make sure the reaction clip is on disk; `None` means render without it.
pub async fn ensure_reaction_clip(settings: &ReactSettings, ytdlp: &YtDlpCommand) -> Option<PathBuf> {
    let path = settings.reaction_clip.clone();
    if path.is_file() {
        return Some(path);
    }
    let url = settings.reaction_url.as_deref()?;
    info!("[REACT] 🌐 Fetching green-screen reaction clip");
    match download_file(ytdlp, url, &path).await {
        Ok(()) if path.is_file() => Some(path),
        Ok(()) => {
            warn!("[REACT] ⚠️ Download finished but {:?} is missing; rendering without reaction", path);
            None
        }
        Err(e) => {
            warn!("[REACT] ⚠️ {:#}; place {:?} manually. Rendering without reaction", e, path);
            None
        }
    }
}

/// Remix every clip in `input_dir`. One result per part attempted.
pub async fn react_dir(
    input_dir: &Path,
    output_dir: &Path,
    settings: &ReactSettings,
    reaction: Option<&Path>,
    ffprobe: &str,
    runner: &JobRunner,
    encoder: &EncoderProfile,
) -> Vec<BatchResult> {
    let files = match discover(input_dir, REACT_EXTENSIONS) {
        Ok(files) => files,
        Err(reason) => {
            warn!("[REACT] Nothing to do: {}", reason);
            return Vec::new();
        }
    };
    if let Err(e) = tokio::fs::create_dir_all(output_dir).await {
        error!("[REACT] Cannot create {:?}: {}", output_dir, e);
        return files
            .into_iter()
            .map(|f| BatchResult::failure(f, format!("output directory unavailable: {}", e)))
            .collect();
    }

    let profile = JitterProfile::reaction();
    let mut results = Vec::new();
    for file in files {
        let clip = match probe(ffprobe, &file).await {
            Ok(clip) => clip,
            Err(e) => {
                error!("[REACT] ❌ {:?}: {:#}", file, e);
                results.push(BatchResult::failure(file, format!("{:#}", e)));
                continue;
            }
        };
        info!("[REACT] 🎬 {:?} ({:.1}s)", file.file_name().unwrap_or_default(), clip.duration);
        for (i, window) in part_windows(clip.duration, settings).into_iter().enumerate() {
            let params = profile.draw(&mut rand::thread_rng());
            let out = output_dir.join(part_name(&file, i + 1));
            let spec = part_spec(&clip, window, reaction, &params, settings, encoder);
            match runner.render(&spec, &out).await {
                Ok(r) => {
                    info!("[REACT]   ✅ part {} -> {:?}", i + 1, r.output_path);
                    results.push(BatchResult::success(file.clone(), r.output_path));
                }
                Err(e) => {
                    error!("[REACT]   ❌ part {}: {:#}", i + 1, e);
                    results.push(BatchResult::failure(file.clone(), format!("{:#}", e)));
                }
            }
        }
    }
    let (ok, failed) = tally(&results);
    info!("[REACT] Done: {} parts, {} failed", ok, failed);
    results
}
