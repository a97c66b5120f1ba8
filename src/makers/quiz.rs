// SYNOID Reels Emoji Quiz
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// "Guess the movie from the emoji": three questions per video, easy to
// hard, each with a countdown bar and an answer reveal. The last question
// withholds the answer and asks for comments instead.

use super::{MakerAssets, SHORTS_HEIGHT, SHORTS_WIDTH};
use crate::color::Color;
use crate::compose::{render_scenes, AudioCue, BarAnchor, Layer, LayerKind, ProgressBar, Rect, Scene, Timing};
use crate::dedup::runner::JobRunner;
use crate::graph::ScalePolicy;
use crate::media::{discover, pick, EncoderProfile, NoAssets};
use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
    pub emoji_sequence: String,
    pub answer: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    pub title: String,
    pub think_seconds: f64,
    pub reveal_seconds: f64,
    /// How long the last question's call to action stays up
    pub last_hold_seconds: f64,
    pub background_dir: PathBuf,
    pub background_brightness: f64,
    pub fallback_background: Color,
    pub accent: Color,
    pub output_prefix: String,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            title: "GUESS THE MOVIE".to_string(),
            think_seconds: 2.5,
            reveal_seconds: 1.0,
            last_hold_seconds: 1.5,
            background_dir: PathBuf::from("assets/movie/bg"),
            background_brightness: 0.3,
            fallback_background: Color::MIDNIGHT,
            accent: Color::YELLOW,
            output_prefix: "Mac_Viral_".to_string(),
        }
    }
}

pub fn load_bank(path: &Path) -> Result<Vec<QuizItem>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read question bank {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("Malformed question bank {:?}", path))
}

/// Shuffle, then pair the i-th easy, medium and hard question. Questions
/// left over once any tier runs out are not used.
pub fn plan_batches<R: Rng + ?Sized>(items: &[QuizItem], rng: &mut R) -> Vec<[QuizItem; 3]> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    let tier = |d: Difficulty| -> Vec<QuizItem> {
        shuffled.iter().filter(|q| q.difficulty == d).cloned().collect()
    };
    let easy = tier(Difficulty::Easy);
    let medium = tier(Difficulty::Medium);
    let hard = tier(Difficulty::Hard);
    easy.into_iter()
        .zip(medium)
        .zip(hard)
        .map(|((e, m), h)| [e, m, h])
        .collect()
}

/// One question as a scene. `index` is 1-based.
pub fn question_scene(
    item: &QuizItem,
    index: usize,
    total: usize,
    background: Option<&Path>,
    settings: &QuizSettings,
    assets: &MakerAssets,
) -> Scene {
    let is_last = index == total;
    let think = settings.think_seconds.max(0.1);
    let tail = if is_last {
        settings.last_hold_seconds
    } else {
        settings.reveal_seconds
    };
    let mut scene = Scene::new(SHORTS_WIDTH, SHORTS_HEIGHT, think + tail.max(0.0))
        .with_background(settings.fallback_background);

    if let Some(bg) = background {
        scene.push(Layer::new(LayerKind::Video {
            path: bg.to_path_buf(),
            rect: Rect::new(0, 0, SHORTS_WIDTH, SHORTS_HEIGHT),
            policy: ScalePolicy::Fill,
            brightness: settings.background_brightness,
            looped: true,
            seek: None,
            blur: None,
        }));
    }
    scene.push(Layer::caption(
        format!("{} {}/{}", settings.title, index, total),
        assets.caption(60, Color::WHITE),
        200,
    ));
    scene.push(Layer::caption(item.emoji_sequence.clone(), assets.emoji(160), 500));
    scene.push(
        Layer::new(LayerKind::Bar(ProgressBar {
            rect: Rect::centered_x(SHORTS_WIDTH, 1400, 900, 20),
            color: settings.accent,
            track: None,
            from: 1.0,
            to: 0.0,
            over: think,
            anchor: BarAnchor::Center,
        }))
        .during(Timing::at(0.0, think)),
    );

    let reveal = Timing::from(think);
    if is_last {
        scene.push(Layer::caption("???", assets.caption(150, Color::WHITE), 1100).during(reveal));
        scene.push(Layer::caption("COMMENT YOUR ANSWER!", assets.caption(70, Color::WHITE), 1250).during(reveal));
    } else {
        scene.push(Layer::caption(item.answer.to_uppercase(), assets.caption(90, Color::WHITE), 1150).during(reveal));
    }

    let mut second = 0.0;
    while second < think {
        scene.cue(AudioCue::at(assets.tick(), second));
        second += 1.0;
    }
    if !is_last {
        scene.cue(AudioCue::at(assets.ding(), think));
    }
    scene
}

/// Render one video per batch into `output_dir`; returns the files written.
pub async fn make_quizzes<R: Rng + ?Sized>(
    bank: &[QuizItem],
    output_dir: &Path,
    settings: &QuizSettings,
    assets: &MakerAssets,
    runner: &JobRunner,
    encoder: &EncoderProfile,
    rng: &mut R,
) -> Result<Vec<PathBuf>> {
    let batches = plan_batches(bank, &mut *rng);
    if batches.is_empty() {
        warn!("[QUIZ] Not enough questions for one easy/medium/hard batch");
        return Ok(Vec::new());
    }
    let backgrounds = match discover(&settings.background_dir, &["mp4"]) {
        Ok(found) => found,
        Err(NoAssets::MissingDirectory(_)) | Err(NoAssets::Empty(_)) => {
            warn!("[QUIZ] ⚠️ No background clips in {:?}; using a solid colour", settings.background_dir);
            Vec::new()
        }
    };
    tokio::fs::create_dir_all(output_dir).await?;

    let mut written = Vec::new();
    for (i, batch) in batches.iter().enumerate() {
        info!("[QUIZ] 🎬 Rendering video {} of {}", i + 1, batches.len());
        let scenes: Vec<Scene> = batch
            .iter()
            .enumerate()
            .map(|(q, item)| {
                let bg = pick(&backgrounds, &mut *rng).map(|p| p.as_path());
                question_scene(item, q + 1, batch.len(), bg, settings, assets)
            })
            .collect();
        let output = output_dir.join(format!("{}{}.mp4", settings.output_prefix, i + 1));
        match render_scenes(runner, &scenes, encoder, &output).await {
            Ok(out) => {
                info!("[QUIZ] ✅ {:?}", out.output_path);
                written.push(out.output_path);
            }
            Err(e) => error!("[QUIZ] ❌ {:?}: {:#}", output, e),
        }
    }
    Ok(written)
}
