// SYNOID Reels Fake-out Hook
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Pretend the video is failing to load: the first moments are blurred, a
// fake progress bar rushes to 99% and stalls, an error caption flashes,
// then the clip plays normally.

use crate::color::Color;
use crate::compose::{scene_spec, AudioCue, BarAnchor, Coord, Layer, LayerKind, ProgressBar, Rect, Scene, TextStyle, Timing};
use crate::dedup::params::even_dimension;
use crate::dedup::runner::JobRunner;
use crate::graph::ScalePolicy;
use crate::media::{probe, EncoderProfile, MediaAsset};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeoutSettings {
    pub hook_seconds: f64,
    /// Blur kernel in pixels
    pub blur: f64,
    pub bar_fill_seconds: f64,
    /// Where the bar stalls, as a fraction
    pub bar_stall: f64,
    /// Bar width as a fraction of the frame width
    pub bar_width: f64,
    pub bar_height: u32,
    /// Bar top as a fraction of the frame height
    pub bar_y: f64,
    pub bar_color: Color,
    pub bar_track: Color,
    pub caption: String,
    pub caption_start: f64,
    pub caption_size: u32,
}

impl Default for FakeoutSettings {
    fn default() -> Self {
        Self {
            hook_seconds: 1.5,
            blur: 25.0,
            bar_fill_seconds: 0.6,
            bar_stall: 0.99,
            bar_width: 0.8,
            bar_height: 10,
            bar_y: 0.82,
            bar_color: Color::RED,
            bar_track: Color::rgb(60, 60, 60),
            caption: "Loading Failed. Reconnecting...".to_string(),
            caption_start: 0.7,
            caption_size: 35,
        }
    }
}

/// The hooked clip as a single scene at the clip's own size.
pub fn fakeout_scene(clip: &MediaAsset, settings: &FakeoutSettings, font: Option<PathBuf>) -> Scene {
    let w = even_dimension(clip.width.unwrap_or(1080) as f64);
    let h = even_dimension(clip.height.unwrap_or(1920) as f64);
    let hook = settings.hook_seconds.clamp(0.0, clip.duration.max(0.0));
    let mut scene = Scene::new(w, h, clip.duration.max(0.1));

    scene.push(Layer::new(LayerKind::Video {
        path: clip.path.clone(),
        rect: Rect::new(0, 0, w, h),
        policy: ScalePolicy::Fill,
        brightness: 1.0,
        looped: false,
        seek: None,
        blur: Some((settings.blur, Timing::at(0.0, hook))),
    }));

    let bar_w = even_dimension(w as f64 * settings.bar_width.clamp(0.05, 1.0));
    scene.push(
        Layer::new(LayerKind::Bar(ProgressBar {
            rect: Rect::centered_x(w, (h as f64 * settings.bar_y.clamp(0.0, 1.0)) as i64, bar_w, settings.bar_height),
            color: settings.bar_color,
            track: Some(settings.bar_track),
            from: 0.0,
            to: settings.bar_stall,
            over: settings.bar_fill_seconds,
            anchor: BarAnchor::Left,
        }))
        .during(Timing::at(0.0, hook)),
    );
    scene.push(
        Layer::text(
            settings.caption.clone(),
            TextStyle::new(settings.caption_size, Color::WHITE)
                .boxed(Color::BLACK)
                .with_font(font),
            Coord::Center,
            Coord::Center,
        )
        .during(Timing::at(settings.caption_start, (hook - settings.caption_start).max(0.0))),
    );

    if clip.has_audio {
        scene.cue(AudioCue::at(&clip.path, 0.0));
    }
    scene
}

pub fn output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    format!("{}_hooked.mp4", stem)
}

pub async fn make_fakeout(
    input: &Path,
    output_dir: &Path,
    settings: &FakeoutSettings,
    font: Option<PathBuf>,
    ffprobe: &str,
    runner: &JobRunner,
    encoder: &EncoderProfile,
) -> Result<PathBuf> {
    let clip = probe(ffprobe, input).await?;
    info!("[FAKEOUT] 🎣 {:?} ({:.1}s)", input, clip.duration);
    let scene = fakeout_scene(&clip, settings, font);
    tokio::fs::create_dir_all(output_dir).await?;
    let output = output_dir.join(output_name(input));
    let rendered = runner.render(&scene_spec(&scene, encoder), &output).await?;
    info!("[FAKEOUT] ✅ {:?}", rendered.output_path);
    Ok(rendered.output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(dir: &Path) -> MediaAsset {
        let path = dir.join("movie.mp4");
        std::fs::write(&path, b"x").unwrap();
        MediaAsset {
            path,
            width: Some(1080),
            height: Some(1920),
            duration: 12.0,
            codec: Some("h264".into()),
            has_audio: true,
        }
    }

    #[test]
    fn test_hook_window() {
        let dir = tempfile::tempdir().unwrap();
        let scene = fakeout_scene(&clip(dir.path()), &FakeoutSettings::default(), None);
        assert!((scene.duration - 12.0).abs() < 1e-9);
        let spec = scene_spec(&scene, &EncoderProfile::default());
        // canvas, silence, the clip as video and as audio
        assert_eq!(spec.inputs.len(), 4);
        let graph = spec.filter_complex.unwrap();
        // 25 px kernel on a 1080 wide frame
        assert!(graph.contains("boxblur=12:1:enable='between(t,0.000,1.500)'"));
        assert!(graph.contains("text='Loading Failed. Reconnecting...'"));
        assert!(graph.contains("enable='between(t,0.700,1.500)'"));
        assert!(graph.contains("if(lt(X,max(1,W*(0.000+(0.990)*min(1,T/0.600)))),255,0)"));
        assert!(graph.contains("s=864x10"));
    }

    #[test]
    fn test_short_clip_clamps_hook() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = clip(dir.path());
        c.duration = 1.0;
        c.has_audio = false;
        let scene = fakeout_scene(&c, &FakeoutSettings::default(), None);
        assert!(scene.cues.is_empty());
        assert_eq!(scene.layers[1].timing, Timing::at(0.0, 1.0));
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name(Path::new("/x/Mac_Viral_11.mp4")), "Mac_Viral_11_hooked.mp4");
    }
}
