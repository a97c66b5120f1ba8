// SYNOID Reels Challenge Hook
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// A dare over the first moments of a clip: the head is blurred under a
// stroked challenge line, then an emoji line pops in and holds for a beat.

use super::MakerAssets;
use crate::color::Color;
use crate::compose::{scene_spec, AudioCue, Coord, Layer, LayerKind, Rect, Scene, Timing};
use crate::dedup::params::even_dimension;
use crate::dedup::runner::JobRunner;
use crate::graph::ScalePolicy;
use crate::media::{probe, EncoderProfile, MediaAsset};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeSettings {
    pub hook_seconds: f64,
    /// Blur kernel in pixels while the dare is up
    pub blur: f64,
    pub text_size: u32,
    pub text_color: Color,
    pub stroke: u32,
    /// Dare line top as a fraction of the frame height
    pub text_y: f64,
    pub emoji_size: u32,
    pub emoji_start: f64,
    pub emoji_end: f64,
    /// Played when the emoji appears, if set
    pub pop_sound: Option<PathBuf>,
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        Self {
            hook_seconds: 0.7,
            blur: 31.0,
            text_size: 70,
            text_color: Color::YELLOW,
            stroke: 2,
            text_y: 0.3,
            emoji_size: 150,
            emoji_start: 0.2,
            emoji_end: 1.5,
            pop_sound: None,
        }
    }
}

/// The hooked clip as one scene at the clip's own size.
pub fn challenge_scene(
    clip: &MediaAsset,
    dare: &str,
    emoji: &str,
    settings: &ChallengeSettings,
    assets: &MakerAssets,
) -> Scene {
    let w = even_dimension(clip.width.unwrap_or(1080) as f64);
    let h = even_dimension(clip.height.unwrap_or(1920) as f64);
    let duration = clip.duration.max(0.1);
    let hook = settings.hook_seconds.clamp(0.0, duration);
    let mut scene = Scene::new(w, h, duration);

    scene.push(Layer::new(LayerKind::Video {
        path: clip.path.clone(),
        rect: Rect::new(0, 0, w, h),
        policy: ScalePolicy::Fill,
        brightness: 1.0,
        looped: false,
        seek: None,
        blur: Some((settings.blur, Timing::at(0.0, hook))),
    }));

    let dare_style = assets
        .caption(settings.text_size, settings.text_color)
        .stroked(Color::BLACK, settings.stroke.max(1));
    scene.push(
        Layer::caption(dare, dare_style, (h as f64 * settings.text_y.clamp(0.0, 1.0)) as i64)
            .during(Timing::at(0.0, hook)),
    );

    let emoji_start = settings.emoji_start.max(0.0);
    let emoji_len = (settings.emoji_end - emoji_start).max(0.0);
    scene.push(
        Layer::text(
            emoji,
            assets.emoji(settings.emoji_size).stroked(Color::BLACK, settings.stroke.max(1)),
            Coord::Center,
            Coord::Center,
        )
        .during(Timing::at(emoji_start, emoji_len)),
    );

    if clip.has_audio {
        scene.cue(AudioCue::at(&clip.path, 0.0));
    }
    if let Some(pop) = &settings.pop_sound {
        scene.cue(AudioCue::at(pop, emoji_start));
    }
    scene
}

pub fn output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    format!("{}_challenge.mp4", stem)
}

#[allow(clippy::too_many_arguments)]
pub async fn make_challenge(
    input: &Path,
    output_dir: &Path,
    dare: &str,
    emoji: &str,
    settings: &ChallengeSettings,
    assets: &MakerAssets,
    ffprobe: &str,
    runner: &JobRunner,
    encoder: &EncoderProfile,
) -> Result<PathBuf> {
    if dare.trim().is_empty() && emoji.trim().is_empty() {
        bail!("Nothing to draw: both the dare and the emoji line are empty");
    }
    let clip = probe(ffprobe, input).await?;
    info!("[CHALLENGE] 🎯 {:?} ({:.1}s): {}", input, clip.duration, dare);
    let scene = challenge_scene(&clip, dare, emoji, settings, assets);
    tokio::fs::create_dir_all(output_dir).await?;
    let output = output_dir.join(output_name(input));
    let rendered = runner.render(&scene_spec(&scene, encoder), &output).await?;
    info!("[CHALLENGE] ✅ {:?}", rendered.output_path);
    Ok(rendered.output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(dir: &Path) -> MediaAsset {
        let path = dir.join("level.mp4");
        std::fs::write(&path, b"x").unwrap();
        MediaAsset {
            path,
            width: Some(1080),
            height: Some(1920),
            duration: 10.0,
            codec: Some("h264".into()),
            has_audio: true,
        }
    }

    #[test]
    fn test_dare_and_emoji_windows() {
        let dir = tempfile::tempdir().unwrap();
        let scene = challenge_scene(
            &clip(dir.path()),
            "99% FAIL THIS LEVEL!",
            "🍿🦁👑",
            &ChallengeSettings::default(),
            &MakerAssets::default(),
        );
        assert!((scene.duration - 10.0).abs() < 1e-9);
        let spec = scene_spec(&scene, &EncoderProfile::default());
        // canvas, silence, the clip as video and as audio
        assert_eq!(spec.inputs.len(), 4);
        let graph = spec.filter_complex.unwrap();
        // 31 px kernel on a 1080 wide frame
        assert!(graph.contains("boxblur=15:1:enable='between(t,0.000,0.700)'"));
        assert!(graph.contains("text='99% FAIL THIS LEVEL!':expansion=none:fontsize=70:fontcolor=0xFFFF00"));
        assert!(graph.contains("y=576:enable='between(t,0.000,0.700)'"));
        assert!(graph.contains("fontsize=150"));
        assert!(graph.contains("enable='between(t,0.200,1.500)'"));
    }

    #[test]
    fn test_short_clip_clamps_hook() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = clip(dir.path());
        c.duration = 0.5;
        c.has_audio = false;
        let scene = challenge_scene(&c, "TRY IT", "🔥", &ChallengeSettings::default(), &MakerAssets::default());
        assert!(scene.cues.is_empty());
        assert_eq!(scene.layers[1].timing, Timing::at(0.0, 0.5));
    }

    #[test]
    fn test_pop_sound_lands_with_emoji() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ChallengeSettings {
            pop_sound: Some(dir.path().join("pop.mp3")),
            ..ChallengeSettings::default()
        };
        let scene = challenge_scene(&clip(dir.path()), "GO", "👀", &settings, &MakerAssets::default());
        assert_eq!(scene.cues.len(), 2);
        assert!((scene.cues[1].start - 0.2).abs() < 1e-9);
        assert_eq!(output_name(Path::new("/x/Mac_Viral_11.mp4")), "Mac_Viral_11_challenge.mp4");
    }
}
