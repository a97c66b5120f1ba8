// SYNOID Reels Localization
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Dub a clip into another language:
//   stems -> transcript (translated) -> TTS lines -> voice track
//   -> shorts layout + subtitles + mix -> 59 s parts
// Everything intermediate lives in one scratch directory that is removed
// whatever happens.

pub mod separation;

use crate::color::Color;
use crate::config::ToolPaths;
use crate::dedup::params::even_dimension;
use crate::dedup::runner::{scratch_dir, JobRunner};
use crate::graph::stages::{escape_filter_path, segment_windows};
use crate::graph::{FilterSpec, InputSpec};
use crate::media::{probe, EncoderProfile};
use crate::voice::transcription::WhisperTask;
use crate::voice::{generate_srt, Language, SpeechRequest, TranscriptSegment, Transcriber, TtsEngine};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use separation::{Separator, Stems};

/// ASS scripts rendered from SRT use a 288-line canvas.
const ASS_PLAY_RES_Y: f64 = 288.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizeSettings {
    pub size: (u32, u32),
    pub fps: u32,
    /// Fraction of the source height cut from the bottom (burnt-in captions)
    pub bottom_crop: f64,
    pub backdrop_dim: f64,
    pub colour_boost: f64,
    pub mirror: bool,
    pub subtitle_font_px: u32,
    pub subtitle_colour: Color,
    pub subtitle_outline: Color,
    /// Vertical position of the subtitle baseline as a fraction of height
    pub subtitle_y: f64,
    pub background_gain: f64,
    pub voice_gain: f64,
    pub part_length: f64,
    pub tts_concurrency: usize,
}

impl Default for LocalizeSettings {
    fn default() -> Self {
        Self {
            size: (1080, 1920),
            fps: 24,
            bottom_crop: 0.12,
            backdrop_dim: 0.4,
            colour_boost: 1.05,
            mirror: true,
            subtitle_font_px: 55,
            subtitle_colour: Color::YELLOW,
            subtitle_outline: Color::BLACK,
            subtitle_y: 0.72,
            background_gain: 0.45,
            voice_gain: 2.2,
            part_length: 59.0,
            tts_concurrency: 10,
        }
    }
}

impl LocalizeSettings {
    fn force_style(&self) -> String {
        let (_, h) = self.size;
        let font = (self.subtitle_font_px as f64 * ASS_PLAY_RES_Y / h.max(1) as f64).round().max(1.0);
        let margin = ((1.0 - self.subtitle_y.clamp(0.0, 1.0)) * ASS_PLAY_RES_Y).round();
        format!(
            "FontSize={},PrimaryColour={},OutlineColour={},BorderStyle=1,Outline=1,Alignment=2,MarginV={}",
            font,
            self.subtitle_colour.to_ass(),
            self.subtitle_outline.to_ass(),
            margin
        )
    }
}

/// A spoken line placed on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedClip {
    pub path: PathBuf,
    pub segment: TranscriptSegment,
}

/// Silent bed of `total` seconds with every clip delayed to its segment
/// start and cut to the segment length.
pub fn build_voice_track(clips: &[PlacedClip], total: f64) -> FilterSpec {
    let mut spec = FilterSpec::default();
    spec.push_input(
        InputSpec::lavfi("anullsrc=r=44100:cl=mono").with_option("-t", format!("{:.3}", total.max(0.1))),
    );

    let mut graph = Vec::new();
    let mut labels = vec!["[0:a]".to_string()];
    for clip in clips {
        let idx = spec.push_input(InputSpec::file(&clip.path));
        let delay_ms = (clip.segment.start.max(0.0) * 1000.0).round() as u64;
        graph.push(format!(
            "[{i}:a]aformat=channel_layouts=mono,aresample=44100,atrim=end={d:.3},asetpts=PTS-STARTPTS,adelay={ms}[v{i}]",
            i = idx,
            d = clip.segment.duration(),
            ms = delay_ms
        ));
        labels.push(format!("[v{}]", idx));
    }

    if clips.is_empty() {
        graph.push("[0:a]anull[outa]".to_string());
    } else {
        graph.push(format!(
            "{}amix=inputs={}:duration=first:normalize=0[outa]",
            labels.concat(),
            labels.len()
        ));
    }
    spec.filter_complex = Some(graph.join(";"));
    spec.maps.push("[outa]".into());
    spec.output_args = vec!["-c:a".into(), "pcm_s16le".into()];
    spec
}

/// One exported part: layout, subtitles, mix, cut to `window`.
pub fn build_part(
    video: &Path,
    voice: &Path,
    background: Option<&Path>,
    subtitles: Option<&Path>,
    window: (f64, f64),
    settings: &LocalizeSettings,
    encoder: &EncoderProfile,
) -> FilterSpec {
    let w = even_dimension(settings.size.0 as f64);
    let h = even_dimension(settings.size.1 as f64);
    let keep = (1.0 - settings.bottom_crop).clamp(0.1, 1.0);
    let dim = settings.backdrop_dim.clamp(0.0, 1.0);
    let boost = settings.colour_boost.max(0.0);
    let (start, end) = window;

    let mut spec = FilterSpec::default();
    spec.push_input(InputSpec::file(video).with_leading(encoder.hwaccel_args()));
    let voice_idx = spec.push_input(InputSpec::file(voice));
    let bg_idx = background.map(|p| spec.push_input(InputSpec::file(p)));

    let mut graph = vec![
        format!(
            "[0:v]crop=iw:trunc(ih*{:.3}/2)*2:0:0,split=2[lz_fgsrc][lz_bgsrc]",
            keep
        ),
        format!(
            "[lz_bgsrc]scale=100:-2,scale={w}:{h},setsar=1,colorchannelmixer=rr={d:.2}:gg={d:.2}:bb={d:.2}[lz_bg]",
            w = w,
            h = h,
            d = dim
        ),
        format!(
            "[lz_fgsrc]scale={w}:{h}:force_original_aspect_ratio=decrease:force_divisible_by=2[lz_fg]",
            w = w,
            h = h
        ),
    ];

    let mut post = vec!["overlay=(W-w)/2:(H-h)/2".to_string()];
    if settings.mirror {
        post.push("hflip".into());
    }
    if let Some(srt) = subtitles {
        post.push(format!(
            "subtitles='{}':force_style='{}'",
            escape_filter_path(&srt.to_string_lossy()),
            settings.force_style()
        ));
    }
    post.push(format!(
        "colorchannelmixer=rr={b:.2}:gg={b:.2}:bb={b:.2}",
        b = boost
    ));
    post.push(format!("fps={}", settings.fps));
    post.push(format!("trim=start={:.3}:end={:.3}", start, end));
    post.push("setpts=PTS-STARTPTS".into());
    post.push("format=yuv420p".into());
    graph.push(format!("[lz_bg][lz_fg]{}[outv]", post.join(",")));

    let cut = format!(
        "atrim=start={:.3}:end={:.3},asetpts=PTS-STARTPTS",
        start, end
    );
    graph.push(format!("[{}:a]volume={:.2}[lz_vo]", voice_idx, settings.voice_gain));
    match bg_idx {
        Some(idx) => {
            graph.push(format!("[{}:a]volume={:.2}[lz_bgm]", idx, settings.background_gain));
            graph.push(format!(
                "[lz_bgm][lz_vo]amix=inputs=2:duration=longest:normalize=0,{}[outa]",
                cut
            ));
        }
        None => graph.push(format!("[lz_vo]{}[outa]", cut)),
    }

    spec.filter_complex = Some(graph.join(";"));
    spec.maps = vec!["[outv]".into(), "[outa]".into()];
    spec.output_args.extend(encoder.video_args());
    spec.output_args.extend(encoder.audio_args());
    spec.output_args.extend(FilterSpec::strip_metadata_args());
    spec
}

pub fn part_name(input: &Path, part: usize) -> String {
    let base = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    format!("Final_Subbed_{}_P{}.mp4", base, part)
}

/// Run the whole dub for `input`, writing parts into `output_dir`.
pub async fn localize(
    input: &Path,
    output_dir: &Path,
    language: Language,
    tools: &ToolPaths,
    settings: &LocalizeSettings,
    encoder: &EncoderProfile,
) -> Result<Vec<PathBuf>> {
    info!("[LOCALIZE] 🚀 {:?} -> {}", input, language);
    let asset = probe(&tools.ffprobe, input).await?;
    let scratch = scratch_dir(output_dir)?;
    let work = scratch.path();
    let runner = JobRunner::new(tools.ffmpeg.clone());

    info!("[LOCALIZE] [1/5] Separating stems");
    let stems = Separator::new(tools.python.clone())
        .separate_or_mix(&tools.ffmpeg, input, &work.join("separated"))
        .await?;

    info!("[LOCALIZE] [2/5] Recognising and translating speech");
    let segments = Transcriber::new(tools.whisper.clone(), tools.whisper_model.clone())
        .transcribe(&stems.vocals, work, WhisperTask::Translate)
        .await?;

    info!("[LOCALIZE] [3/5] Voicing {} lines", segments.len());
    let requests: Vec<SpeechRequest> = segments
        .iter()
        .enumerate()
        .map(|(i, s)| SpeechRequest {
            text: s.text.clone(),
            output: work.join(format!("s_{}.mp3", i)),
        })
        .collect();
    let clips = TtsEngine::new(tools.edge_tts.clone())
        .speak_all(requests, language.voice(), settings.tts_concurrency)
        .await;
    let placed: Vec<PlacedClip> = clips
        .into_iter()
        .zip(segments.iter())
        .filter(|(clip, _)| clip.path.exists())
        .map(|(clip, seg)| PlacedClip {
            path: clip.path,
            segment: seg.clone(),
        })
        .collect();
    let voice_path = work.join("v_final.wav");
    runner
        .render(&build_voice_track(&placed, asset.duration), &voice_path)
        .await
        .context("Voice track assembly failed")?;

    info!("[LOCALIZE] [4/5] Writing subtitles");
    let srt_path = if segments.is_empty() {
        warn!("[LOCALIZE] No speech recognised; exporting without subtitles");
        None
    } else {
        let path = work.join("subs.srt");
        tokio::fs::write(&path, generate_srt(&segments))
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        Some(path)
    };

    info!("[LOCALIZE] [5/5] Exporting parts");
    let mut parts = Vec::new();
    for (i, window) in segment_windows(asset.duration, settings.part_length, 0.0)
        .into_iter()
        .enumerate()
    {
        let out = output_dir.join(part_name(input, i + 1));
        let spec = build_part(
            input,
            &voice_path,
            stems.background.as_deref(),
            srt_path.as_deref(),
            window,
            settings,
            encoder,
        );
        let rendered = runner.render(&spec, &out).await?;
        info!("[LOCALIZE] ✅ {:?}", rendered.output_path);
        parts.push(rendered.output_path);
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment {
            start,
            end,
            text: "x".into(),
        }
    }

    #[test]
    fn test_voice_track_delays_each_clip() {
        let clips = vec![
            PlacedClip {
                path: "s_0.mp3".into(),
                segment: seg(0.0, 1.5),
            },
            PlacedClip {
                path: "s_1.mp3".into(),
                segment: seg(2.25, 4.0),
            },
        ];
        let spec = build_voice_track(&clips, 10.0);
        assert_eq!(spec.inputs.len(), 3);
        let graph = spec.filter_complex.unwrap();
        assert!(graph.contains("atrim=end=1.500,asetpts=PTS-STARTPTS,adelay=0[v1]"));
        assert!(graph.contains("atrim=end=1.750,asetpts=PTS-STARTPTS,adelay=2250[v2]"));
        assert!(graph.contains("[0:a][v1][v2]amix=inputs=3:duration=first"));
    }

    #[test]
    fn test_empty_voice_track_is_silence() {
        let spec = build_voice_track(&[], 5.0);
        assert_eq!(spec.inputs.len(), 1);
        assert_eq!(spec.filter_complex.unwrap(), "[0:a]anull[outa]");
    }

    #[test]
    fn test_part_layout_and_mix() {
        let spec = build_part(
            Path::new("in.mp4"),
            Path::new("v.wav"),
            Some(Path::new("bg.wav")),
            Some(Path::new("/tmp/subs.srt")),
            (59.0, 118.0),
            &LocalizeSettings::default(),
            &EncoderProfile::default(),
        );
        let graph = spec.filter_complex.unwrap();
        assert!(graph.contains("crop=iw:trunc(ih*0.880/2)*2:0:0"));
        assert!(graph.contains("colorchannelmixer=rr=0.40"));
        let flip = graph.find("hflip").unwrap();
        let subs = graph.find("subtitles=").unwrap();
        assert!(flip < subs, "subtitles must be drawn after mirroring");
        assert!(graph.contains("trim=start=59.000:end=118.000"));
        assert!(graph.contains("[1:a]volume=2.20"));
        assert!(graph.contains("[2:a]volume=0.45"));
        assert!(spec.output_args.contains(&"-map_metadata".to_string()));
    }

    #[test]
    fn test_part_without_background() {
        let spec = build_part(
            Path::new("in.mp4"),
            Path::new("v.wav"),
            None,
            None,
            (0.0, 30.0),
            &LocalizeSettings::default(),
            &EncoderProfile::default(),
        );
        assert_eq!(spec.inputs.len(), 2);
        let graph = spec.filter_complex.unwrap();
        assert!(!graph.contains("amix"));
        assert!(!graph.contains("subtitles"));
    }

    #[test]
    fn test_force_style() {
        let style = LocalizeSettings::default().force_style();
        assert!(style.starts_with("FontSize=8,PrimaryColour=&H0000FFFF"));
        assert!(style.ends_with("MarginV=81"));
    }

    #[test]
    fn test_part_name() {
        assert_eq!(part_name(Path::new("/a/clip.mp4"), 2), "Final_Subbed_clip_P2.mp4");
    }
}
