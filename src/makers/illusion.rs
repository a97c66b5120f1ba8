// SYNOID Reels Illusion Hook
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Afterimage trick followed by a "find the odd one" emoji grid:
//   0-5 s   negative of the image, "stare at the dot"
//   5-8 s   same image in grayscale (the eye fills in the colour)
//   8-15 s  grid of identical emoji with one impostor

use super::{MakerAssets, SHORTS_HEIGHT, SHORTS_WIDTH};
use crate::color::Color;
use crate::compose::{render_scenes, AudioCue, Coord, ImageLook, Layer, LayerKind, Rect, Scene, TextStyle, Timing};
use crate::dedup::runner::{scratch_dir, JobRunner};
use crate::graph::ScalePolicy;
use crate::media::EncoderProfile;
use crate::voice::{SpeechRequest, TtsEngine};
use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IllusionDay {
    pub key: String,
    /// Emoji repeated across the grid
    pub main: String,
    pub odd: String,
    /// Spoken name of the character the emoji stand for
    pub name: String,
}

fn entry(key: &str, main: &str, odd: &str, name: &str) -> IllusionDay {
    IllusionDay {
        key: key.to_string(),
        main: main.to_string(),
        odd: odd.to_string(),
        name: name.to_string(),
    }
}

pub fn builtin_days() -> Vec<IllusionDay> {
    vec![
        entry("day1", "🔴", "🛑", "Iron Man"),
        entry("day2", "🤢", "🤮", "Hulk"),
        entry("day3", "🕷️", "🐜", "Spidey"),
        entry("day4", "⚡", "✨", "Pikachu"),
        entry("day5", "🤡", "👺", "Joker"),
        entry("day6", "🛡️", "⚙️", "Cap"),
        entry("day7", "🖤", "💣", "Venom"),
        entry("day8", "🍄", "🌹", "Mario"),
        entry("day9", "🟨", "🟧", "SpongeBob"),
        entry("day10", "🍌", "🌙", "Minion"),
        entry("day11", "🦇", "🦅", "Batman"),
        entry("day12", "⚔️", "🔪", "Deadpool"),
        entry("day13", "❄️", "🧊", "Elsa"),
        entry("day14", "🚀", "🛸", "Buzz"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IllusionSettings {
    pub image_root: PathBuf,
    pub negative_seconds: f64,
    pub grayscale_seconds: f64,
    pub game_seconds: f64,
    pub rows: u32,
    pub cols: u32,
    /// Height of the white grid panel
    pub grid_height: u32,
    pub voice: String,
    pub tts_rate: String,
    pub tick_volume: f64,
}

impl Default for IllusionSettings {
    fn default() -> Self {
        Self {
            image_root: PathBuf::from("assets/illusion"),
            negative_seconds: 5.0,
            grayscale_seconds: 3.0,
            game_seconds: 7.0,
            rows: 7,
            cols: 6,
            grid_height: 1000,
            voice: "en-US-ChristopherNeural".to_string(),
            tts_rate: "+25%".to_string(),
            tick_volume: 0.5,
        }
    }
}

impl IllusionSettings {
    pub fn image_for(&self, day: &IllusionDay) -> PathBuf {
        self.image_root.join(&day.key).join("illusion.jpg")
    }
}

/// The three voice lines, in timeline order.
pub fn voice_lines(day: &IllusionDay) -> [String; 3] {
    [
        "Stare at the red dot. Focus. Do not blink.".to_string(),
        "Now look! Did you see the color?".to_string(),
        format!("Now level 2. Find the odd {} emoji!", day.name),
    ]
}

/// Pick the impostor's cell, `(row, col)`.
pub fn odd_cell<R: Rng + ?Sized>(rows: u32, cols: u32, rng: &mut R) -> (u32, u32) {
    (rng.gen_range(0..rows.max(1)), rng.gen_range(0..cols.max(1)))
}

/// Afterimage part. `speech` holds the clips for the first two lines.
pub fn hook_scene(image: &Path, speech: [Option<&Path>; 2], settings: &IllusionSettings, assets: &MakerAssets) -> Scene {
    let neg = settings.negative_seconds.max(0.1);
    let gray = settings.grayscale_seconds.max(0.1);
    let full = Rect::new(0, 0, SHORTS_WIDTH, SHORTS_HEIGHT);
    let mut scene = Scene::new(SHORTS_WIDTH, SHORTS_HEIGHT, neg + gray);

    for (look, timing) in [
        (ImageLook::Negative, Timing::at(0.0, neg)),
        (ImageLook::Grayscale, Timing::at(neg, gray)),
    ] {
        scene.push(
            Layer::new(LayerKind::Image {
                path: image.to_path_buf(),
                rect: full,
                policy: ScalePolicy::Fill,
                look,
                contrast: 1.0,
            })
            .during(timing),
        );
    }
    let dot = 20;
    scene.push(Layer::rect(
        Color::RED,
        Rect::new(
            (SHORTS_WIDTH as i64 - dot) / 2,
            (SHORTS_HEIGHT as i64 - dot) / 2,
            dot as u32,
            dot as u32,
        ),
    ));
    scene.push(Layer::caption("STARE AT THE DOT", assets.caption(100, Color::YELLOW), 350).during(Timing::at(0.0, neg)));
    scene.push(Layer::caption("DO NOT BLINK!", assets.caption(100, Color::RED), 1550).during(Timing::at(0.0, neg)));

    if let Some(p) = speech[0] {
        scene.cue(AudioCue::at(p, 0.0));
    }
    if let Some(p) = speech[1] {
        scene.cue(AudioCue::at(p, neg));
    }
    scene.cue(AudioCue::at(assets.boom(), neg));
    scene
}

/// Emoji grid part with the impostor at `odd`.
pub fn game_scene(
    day: &IllusionDay,
    odd: (u32, u32),
    speech: Option<&Path>,
    settings: &IllusionSettings,
    assets: &MakerAssets,
) -> Scene {
    let duration = settings.game_seconds.max(0.1);
    let rows = settings.rows.max(1);
    let cols = settings.cols.max(1);
    let grid_h = settings.grid_height.min(SHORTS_HEIGHT);
    let top = (SHORTS_HEIGHT - grid_h) as i64 / 2;
    let cell_w = SHORTS_WIDTH / cols;
    let cell_h = grid_h / rows;
    let glyph = ((cell_w.min(cell_h) as f64) * 0.8) as u32;

    let mut scene = Scene::new(SHORTS_WIDTH, SHORTS_HEIGHT, duration).with_background(Color::WHITE);
    for r in 0..rows {
        for c in 0..cols {
            let symbol = if (r, c) == odd { &day.odd } else { &day.main };
            let x = (c * cell_w + (cell_w - glyph) / 2) as i64;
            let y = top + (r * cell_h + (cell_h - glyph) / 2) as i64;
            scene.push(Layer::text(symbol.clone(), assets.emoji(glyph), Coord::Px(x), Coord::Px(y)));
        }
    }
    let outlined = |color: Color| {
        TextStyle::new(100, color)
            .stroked(Color::WHITE, 6)
            .with_font(assets.text_font.clone())
    };
    scene.push(Layer::caption("FIND THE ODD ONE", outlined(Color::BLACK), 200));
    scene.push(Layer::caption("SUBSCRIBE IF YOU FOUND IT", outlined(Color::RED), 1650));

    if let Some(p) = speech {
        scene.cue(AudioCue::at(p, 0.0));
    }
    scene.cue(AudioCue::at(assets.tick(), 0.0).volume(settings.tick_volume).looped(duration));
    scene
}

pub fn output_name(day: &IllusionDay) -> String {
    format!("Illusion_Day_{}.mp4", day.key)
}

pub async fn make_illusion<R: Rng + ?Sized>(
    day: &IllusionDay,
    output_dir: &Path,
    settings: &IllusionSettings,
    assets: &MakerAssets,
    tts: &TtsEngine,
    runner: &JobRunner,
    encoder: &EncoderProfile,
    rng: &mut R,
) -> Result<PathBuf> {
    let image = settings.image_for(day);
    if !image.is_file() {
        bail!("Illusion image missing: {:?}", image);
    }
    info!("[ILLUSION] 🎬 {}", day.key);
    let scratch = scratch_dir(output_dir)?;

    let requests: Vec<SpeechRequest> = voice_lines(day)
        .iter()
        .enumerate()
        .map(|(i, text)| SpeechRequest {
            text: text.clone(),
            output: scratch.path().join(format!("tts_{}_{}.mp3", day.key, i)),
        })
        .collect();
    let clips = tts
        .clone()
        .with_rate(&settings.tts_rate)
        .speak_all(requests, &settings.voice, 3)
        .await;
    let clip = |i: usize| clips.get(i).map(|c| c.path.as_path());

    let odd = odd_cell(settings.rows, settings.cols, rng);
    let scenes = vec![
        hook_scene(&image, [clip(0), clip(1)], settings, assets),
        game_scene(day, odd, clip(2), settings, assets),
    ];
    let output = output_dir.join(output_name(day));
    let rendered = render_scenes(runner, &scenes, encoder, &output).await?;
    info!("[ILLUSION] ✅ {:?}", rendered.output_path);
    Ok(rendered.output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn iron_man() -> IllusionDay {
        builtin_days().into_iter().next().unwrap()
    }

    #[test]
    fn test_odd_cell_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let (r, c) = odd_cell(7, 6, &mut rng);
            assert!(r < 7 && c < 6);
        }
    }

    #[test]
    fn test_grid_has_exactly_one_impostor() {
        let day = iron_man();
        let scene = game_scene(&day, (3, 2), None, &IllusionSettings::default(), &MakerAssets::default());
        let texts: Vec<&String> = scene
            .layers
            .iter()
            .filter_map(|l| match &l.kind {
                LayerKind::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(texts.iter().filter(|t| **t == &day.odd).count(), 1);
        assert_eq!(texts.iter().filter(|t| **t == &day.main).count(), 41);
    }

    #[test]
    fn test_hook_timeline() {
        let scene = hook_scene(
            Path::new("/missing/illusion.jpg"),
            [Some(Path::new("a.mp3")), Some(Path::new("b.mp3"))],
            &IllusionSettings::default(),
            &MakerAssets::default(),
        );
        assert!((scene.duration - 8.0).abs() < 1e-9);
        assert_eq!(scene.layers[0].timing, Timing::at(0.0, 5.0));
        assert_eq!(scene.layers[1].timing, Timing::at(5.0, 3.0));
        let starts: Vec<f64> = scene.cues.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0.0, 5.0, 5.0]);
        assert_eq!(voice_lines(&iron_man())[2], "Now level 2. Find the odd Iron Man emoji!");
    }

    #[tokio::test]
    async fn test_missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = IllusionSettings {
            image_root: dir.path().to_path_buf(),
            ..IllusionSettings::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let result = make_illusion(
            &iron_man(),
            dir.path(),
            &settings,
            &MakerAssets::default(),
            &TtsEngine::new("__no_tts__"),
            &JobRunner::new("__no_ffmpeg__"),
            &EncoderProfile::default(),
            &mut rng,
        )
        .await;
        assert!(result.is_err());
    }
}
