// SYNOID Reels Would-You-Rather Speedrun
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Three rapid split-screen questions per day (3 s, 3 s, 4 s). Each is
// voiced as "A or B?"; the first two reveal the vote split at 60% of their
// length, the last one hides it behind "???" and a call to action.
// The gameplay mix squeezes the question into the top half and runs a
// muted gameplay loop underneath.

use super::{MakerAssets, SHORTS_HEIGHT, SHORTS_WIDTH};
use crate::color::Color;
use crate::compose::{render_scenes, AudioCue, Coord, ImageLook, Layer, LayerKind, Rect, Scene, Timing};
use crate::dedup::runner::{scratch_dir, JobRunner};
use crate::graph::ScalePolicy;
use crate::media::{pick_from_dir, probe, EncoderProfile};
use crate::voice::{SpeechClip, SpeechRequest, TtsEngine};
use anyhow::{bail, Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{info, warn};

const GAMEPLAY_EXTENSIONS: &[&str] = &["mp4"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dilemma {
    pub opt_a: String,
    pub opt_b: String,
    /// Share of votes for A; the B side shows the remainder
    pub percent_a: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedrunDay {
    pub day: u32,
    pub questions: Vec<Dilemma>,
}

impl SpeedrunDay {
    /// `(q{n}_a.jpg, q{n}_b.jpg)` under `root/day{d}` for question `n` (1-based).
    pub fn images(&self, root: &Path, n: usize) -> (PathBuf, PathBuf) {
        let dir = root.join(format!("day{}", self.day));
        (dir.join(format!("q{}_a.jpg", n)), dir.join(format!("q{}_b.jpg", n)))
    }
}

fn day(day: u32, rows: [(&str, &str, u8); 3]) -> SpeedrunDay {
    SpeedrunDay {
        day,
        questions: rows
            .iter()
            .map(|(a, b, p)| Dilemma {
                opt_a: a.to_string(),
                opt_b: b.to_string(),
                percent_a: *p,
            })
            .collect(),
    }
}

/// The two-week prompt calendar used when no bank file is given.
pub fn builtin_days() -> Vec<SpeedrunDay> {
    vec![
        day(1, [("RICH", "HANDSOME", 76), ("FLY", "INVISIBLE", 64), ("SAVE MOM", "SAVE DAD", 0)]),
        day(2, [("IRON SUIT", "CAP SHIELD", 68), ("THOR HAMMER", "HULK POWER", 55), ("KILL THANOS", "KILL LOKI", 0)]),
        day(3, [("FREE WIFI", "FREE FOOD", 82), ("PLAYSTATION", "XBOX", 60), ("UNLIMITED GAMES", "UNLIMITED MONEY", 0)]),
        day(4, [("ZOMBIES", "GHOSTS", 45), ("VAMPIRE", "WEREWOLF", 52), ("TRAPPED IN OCEAN", "TRAPPED IN SPACE", 0)]),
        day(5, [("PIZZA", "BURGER", 51), ("COKE", "PEPSI", 70), ("ONLY SWEET", "ONLY SALTY", 0)]),
        day(6, [("NO HOMEWORK", "NO EXAMS", 55), ("SMARTEST", "POPULAR", 40), ("10Y SCHOOL", "10Y PRISON", 0)]),
        day(7, [("TRUE LOVE", "10 MILLION", 35), ("CHEAT", "BE CHEATED", 10), ("DATE EX", "DATE BOSS", 0)]),
        day(8, [("MJ", "GWEN STACY", 48), ("TOBEY", "TOM HOLLAND", 58), ("SAVE SPIDEY", "SAVE IRON MAN", 0)]),
        day(9, [("IRON MAN", "BATMAN", 52), ("THOR", "SUPERMAN", 45), ("JOKER", "THANOS", 0)]),
        day(10, [("READ MINDS", "SEE FUTURE", 65), ("TELEPORT", "TIME TRAVEL", 72), ("STOP TIME", "REWIND TIME", 0)]),
        day(11, [("GRYFFINDOR", "SLYTHERIN", 60), ("HARRY", "DRACO", 55), ("SAVE DOBBY", "SAVE DUMBLEDORE", 0)]),
        day(12, [("ZOMBIE APOCALYPSE", "ALIEN INVASION", 42), ("FREEZE TO DEATH", "BURN TO DEATH", 50), ("HUNT", "BE HUNTED", 0)]),
        day(13, [("NO PHONE", "NO TV", 20), ("NO MUSIC", "NO MOVIES", 30), ("TALK TO ANIMALS", "SPEAK ALL LANGS", 0)]),
        day(14, [("RED PILL", "BLUE PILL", 50), ("RESTART LIFE", "SKIP TO END", 80), ("WORLD PEACE", "1 BILLION $", 0)]),
    ]
}

pub fn load_days(path: &Path) -> Result<Vec<SpeedrunDay>> {
    let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read speedrun bank {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("Malformed speedrun bank {:?}", path))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedrunSettings {
    pub image_root: PathBuf,
    /// Length of each question in order; the last entry repeats
    pub durations: Vec<f64>,
    pub reveal_at: f64,
    pub top_tint: Color,
    pub bottom_tint: Color,
    pub voice: String,
    pub tts_rate: String,
    pub tick_volume: f64,
    pub boom_volume: f64,
    pub gameplay: GameplaySettings,
}

/// Layout of the gameplay mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    pub dir: PathBuf,
    /// Height of the question area; gameplay fills the rest
    pub content_height: u32,
    pub tts_rate: String,
    pub text_size: u32,
    /// Shown where an option image is missing
    pub placeholder: Color,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/gameplay"),
            content_height: 960,
            tts_rate: "+40%".to_string(),
            text_size: 90,
            placeholder: Color::rgb(50, 50, 50),
        }
    }
}

impl Default for SpeedrunSettings {
    fn default() -> Self {
        Self {
            image_root: PathBuf::from("assets/speedrun"),
            durations: vec![3.0, 3.0, 4.0],
            reveal_at: 0.6,
            top_tint: Color::rgb(200, 0, 0).with_alpha(0.2),
            bottom_tint: Color::rgb(0, 0, 200).with_alpha(0.2),
            voice: "en-US-ChristopherNeural".to_string(),
            tts_rate: "+35%".to_string(),
            tick_volume: 0.6,
            boom_volume: 0.8,
            gameplay: GameplaySettings::default(),
        }
    }
}

impl SpeedrunSettings {
    pub fn duration(&self, index: usize) -> f64 {
        self.durations
            .get(index)
            .or_else(|| self.durations.last())
            .copied()
            .unwrap_or(3.0)
            .max(0.5)
    }
}

pub fn voice_line(q: &Dilemma, is_last: bool) -> String {
    let mut line = format!("{} or {}?", q.opt_a, q.opt_b);
    if is_last {
        line.push_str(" Choose Now!");
    }
    line
}

pub fn output_name(day: u32) -> String {
    format!("Day{}_TTS_Speedrun_v3.mp4", day)
}

pub fn gameplay_output_name(day: u32) -> String {
    format!("Speedrun_Gameplay_Mix_Day{}.mp4", day)
}

fn half(image: &Path, top: bool, tint: Color, label: &str, assets: &MakerAssets) -> Vec<Layer> {
    let half_h = SHORTS_HEIGHT / 2;
    let y0 = if top { 0 } else { half_h as i64 };
    let rect = Rect::new(0, y0, SHORTS_WIDTH, half_h);
    // option text sits near the divider on both halves
    let text_y = if top { y0 + half_h as i64 - 200 } else { y0 + 100 };
    vec![
        Layer::new(LayerKind::Image {
            path: image.to_path_buf(),
            rect,
            policy: ScalePolicy::Fill,
            look: ImageLook::Plain,
            contrast: 1.2,
        }),
        Layer::rect(tint, rect),
        Layer::caption(label, assets.caption(100, Color::WHITE).stroked(Color::BLACK, 8), text_y),
    ]
}

/// One question. Missing images leave the grey canvas showing.
pub fn question_scene(
    q: &Dilemma,
    images: (&Path, &Path),
    duration: f64,
    is_last: bool,
    speech: Option<&Path>,
    settings: &SpeedrunSettings,
    assets: &MakerAssets,
) -> Scene {
    let mut scene = Scene::new(SHORTS_WIDTH, SHORTS_HEIGHT, duration).with_background(Color::GREY);
    for layer in half(images.0, true, settings.top_tint, &q.opt_a, assets)
        .into_iter()
        .chain(half(images.1, false, settings.bottom_tint, &q.opt_b, assets))
    {
        scene.push(layer);
    }
    scene.push(Layer::rect(
        Color::WHITE,
        Rect::new(0, SHORTS_HEIGHT as i64 / 2 - 5, SHORTS_WIDTH, 10),
    ));
    scene.push(Layer::new(LayerKind::Flash {
        color: Color::WHITE.with_alpha(0.5),
    })
    .during(Timing::at(0.0, 0.15)));

    if is_last {
        let bait = Timing::from(0.5);
        scene.push(
            Layer::text("???", assets.caption(100, Color::RED), Coord::Center, Coord::Center).during(bait),
        );
        scene.push(Layer::caption("CHOOSE NOW!", assets.caption(100, Color::WHITE), 1625).during(bait));
    } else {
        let reveal = duration * settings.reveal_at.clamp(0.0, 1.0);
        let pct_a = q.percent_a.min(100);
        let style = assets.caption(100, Color::YELLOW);
        scene.push(Layer::caption(format!("{}%", pct_a), style.clone(), 425).during(Timing::from(reveal)));
        scene.push(Layer::caption(format!("{}%", 100 - pct_a), style, 1425).during(Timing::from(reveal)));
        scene.cue(AudioCue::at(assets.boom(), reveal).volume(settings.boom_volume));
    }

    add_cues(&mut scene, speech, settings, assets);
    scene
}

fn add_cues(scene: &mut Scene, speech: Option<&Path>, settings: &SpeedrunSettings, assets: &MakerAssets) {
    let duration = scene.duration;
    scene.cue(AudioCue::at(assets.tick(), 0.0).volume(settings.tick_volume).looped(duration));
    if let Some(speech) = speech {
        scene.cue(AudioCue::at(speech, 0.0));
    }
}

/// A gameplay file and where to start reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct GameplayClip {
    pub path: PathBuf,
    pub seek: f64,
}

/// Random start that leaves a second of slack before the end; 0 when the
/// clip is too short and has to loop.
pub fn gameplay_seek<R: Rng + ?Sized>(clip_duration: f64, needed: f64, rng: &mut R) -> f64 {
    let room = clip_duration - needed - 1.0;
    if room > 0.0 {
        rng.gen_range(0.0..room)
    } else {
        0.0
    }
}

/// One question over gameplay. Without a gameplay clip the bottom stays black.
#[allow(clippy::too_many_arguments)]
pub fn gameplay_question_scene(
    q: &Dilemma,
    images: (&Path, &Path),
    duration: f64,
    is_last: bool,
    speech: Option<&Path>,
    gameplay: Option<&GameplayClip>,
    settings: &SpeedrunSettings,
    assets: &MakerAssets,
) -> Scene {
    let layout = &settings.gameplay;
    let top_h = layout.content_height.clamp(2, SHORTS_HEIGHT - 2);
    let quarter = top_h / 2;
    let mut scene = Scene::new(SHORTS_WIDTH, SHORTS_HEIGHT, duration).with_background(Color::BLACK);

    if let Some(clip) = gameplay {
        scene.push(Layer::new(LayerKind::Video {
            path: clip.path.clone(),
            rect: Rect::new(0, top_h as i64, SHORTS_WIDTH, SHORTS_HEIGHT - top_h),
            policy: ScalePolicy::Fill,
            brightness: 1.0,
            looped: true,
            seek: Some(clip.seek),
            blur: None,
        }));
    }

    let text = assets
        .caption(layout.text_size, Color::WHITE)
        .stroked(Color::BLACK, 6);
    let halves = [
        (0, images.0, settings.top_tint, &q.opt_a),
        (quarter as i64, images.1, settings.bottom_tint, &q.opt_b),
    ];
    for (y0, image, tint, label) in halves {
        let rect = Rect::new(0, y0, SHORTS_WIDTH, quarter);
        scene.push(Layer::rect(layout.placeholder, rect));
        scene.push(Layer::new(LayerKind::Image {
            path: image.to_path_buf(),
            rect,
            policy: ScalePolicy::Fill,
            look: ImageLook::Plain,
            contrast: 1.0,
        }));
        scene.push(Layer::rect(tint, rect));
        let text_y = if y0 == 0 { quarter as i64 - 150 } else { y0 + 45 };
        scene.push(Layer::caption(label.clone(), text.clone(), text_y));
    }
    scene.push(Layer::rect(Color::WHITE, Rect::new(0, quarter as i64 - 2, SHORTS_WIDTH, 5)));

    let impact = if is_last {
        0.5
    } else {
        duration * settings.reveal_at.clamp(0.0, 1.0)
    };
    if is_last {
        let bait = Timing::from(impact);
        scene.push(Layer::caption("???", assets.caption(layout.text_size, Color::RED), quarter as i64 - 50).during(bait));
        scene.push(
            Layer::caption("CHOOSE NOW!", assets.caption(layout.text_size, Color::WHITE), top_h as i64 - 160)
                .during(bait),
        );
    } else {
        let pct_a = q.percent_a.min(100);
        let style = assets.caption(layout.text_size, Color::YELLOW);
        let offset = quarter as i64 * 25 / 48;
        scene.push(Layer::caption(format!("{}%", pct_a), style.clone(), offset).during(Timing::from(impact)));
        scene.push(
            Layer::caption(format!("{}%", 100 - pct_a), style, quarter as i64 + offset).during(Timing::from(impact)),
        );
        scene.cue(AudioCue::at(assets.boom(), impact).volume(settings.boom_volume));
    }
    scene.push(
        Layer::rect(Color::WHITE.with_alpha(0.5), Rect::new(0, 0, SHORTS_WIDTH, top_h)).during(Timing::at(impact, 0.15)),
    );

    add_cues(&mut scene, speech, settings, assets);
    scene
}

async fn voice_day(day: &SpeedrunDay, scratch: &TempDir, voice: &str, tts: &TtsEngine) -> Vec<SpeechClip> {
    let last = day.questions.len().saturating_sub(1);
    let requests: Vec<SpeechRequest> = day
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| SpeechRequest {
            text: voice_line(q, i == last),
            output: scratch.path().join(format!("tts_q{}.mp3", i + 1)),
        })
        .collect();
    tts.speak_all(requests, voice, day.questions.len()).await
}

/// Voice and render one day into `output_dir`.
pub async fn make_speedrun(
    day: &SpeedrunDay,
    output_dir: &Path,
    settings: &SpeedrunSettings,
    assets: &MakerAssets,
    tts: &TtsEngine,
    runner: &JobRunner,
    encoder: &EncoderProfile,
) -> Result<PathBuf> {
    if day.questions.is_empty() {
        bail!("Day {} has no questions", day.day);
    }
    info!("[SPEEDRUN] 🚀 Day {} ({} questions)", day.day, day.questions.len());
    let scratch = scratch_dir(output_dir)?;
    let last = day.questions.len() - 1;

    let tts = tts.clone().with_rate(&settings.tts_rate);
    let clips = voice_day(day, &scratch, &settings.voice, &tts).await;

    let scenes: Vec<Scene> = day
        .questions
        .iter()
        .zip(clips.iter())
        .enumerate()
        .map(|(i, (q, clip))| {
            let (a, b) = day.images(&settings.image_root, i + 1);
            question_scene(
                q,
                (&a, &b),
                settings.duration(i),
                i == last,
                Some(clip.path.as_path()),
                settings,
                assets,
            )
        })
        .collect();

    let output = output_dir.join(output_name(day.day));
    let rendered = render_scenes(runner, &scenes, encoder, &output).await?;
    info!("[SPEEDRUN] ✅ {:?} ({:.2} MB)", rendered.output_path, rendered.size_mb);
    Ok(rendered.output_path)
}

/// The gameplay mix of one day: a random gameplay file under every question.
#[allow(clippy::too_many_arguments)]
pub async fn make_speedrun_gameplay<R: Rng + ?Sized>(
    day: &SpeedrunDay,
    output_dir: &Path,
    settings: &SpeedrunSettings,
    assets: &MakerAssets,
    tts: &TtsEngine,
    ffprobe: &str,
    runner: &JobRunner,
    encoder: &EncoderProfile,
    rng: &mut R,
) -> Result<PathBuf> {
    if day.questions.is_empty() {
        bail!("Day {} has no questions", day.day);
    }
    info!("[SPEEDRUN] 🎮 Day {} gameplay mix", day.day);
    let scratch = scratch_dir(output_dir)?;
    let last = day.questions.len() - 1;

    let tts = tts.clone().with_rate(&settings.gameplay.tts_rate);
    let clips = voice_day(day, &scratch, &settings.voice, &tts).await;

    let mut scenes = Vec::with_capacity(day.questions.len());
    for (i, (q, clip)) in day.questions.iter().zip(clips.iter()).enumerate() {
        let duration = settings.duration(i);
        let gameplay = match pick_from_dir(&settings.gameplay.dir, GAMEPLAY_EXTENSIONS, rng) {
            Some(path) => {
                let seek = match probe(ffprobe, &path).await {
                    Ok(asset) => gameplay_seek(asset.duration, duration, rng),
                    Err(e) => {
                        warn!("[SPEEDRUN] Could not probe {:?}, starting at 0: {:#}", path, e);
                        0.0
                    }
                };
                Some(GameplayClip { path, seek })
            }
            None => {
                warn!("[SPEEDRUN] ⚠️ No gameplay in {:?}; bottom half stays black", settings.gameplay.dir);
                None
            }
        };
        let (a, b) = day.images(&settings.image_root, i + 1);
        scenes.push(gameplay_question_scene(
            q,
            (&a, &b),
            duration,
            i == last,
            Some(clip.path.as_path()),
            gameplay.as_ref(),
            settings,
            assets,
        ));
    }

    let output = output_dir.join(gameplay_output_name(day.day));
    let rendered = render_scenes(runner, &scenes, encoder, &output).await?;
    info!("[SPEEDRUN] ✅ {:?} ({:.2} MB)", rendered.output_path, rendered.size_mb);
    Ok(rendered.output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::scene_spec;
    use rand::SeedableRng;

    fn dilemma() -> Dilemma {
        Dilemma {
            opt_a: "RICH".into(),
            opt_b: "HANDSOME".into(),
            percent_a: 76,
        }
    }

    #[test]
    fn test_builtin_calendar() {
        let days = builtin_days();
        assert_eq!(days.len(), 14);
        assert!(days.iter().all(|d| d.questions.len() == 3));
        let (a, b) = days[0].images(Path::new("assets/speedrun"), 2);
        assert_eq!(a, PathBuf::from("assets/speedrun/day1/q2_a.jpg"));
        assert_eq!(b, PathBuf::from("assets/speedrun/day1/q2_b.jpg"));
    }

    #[test]
    fn test_durations_and_voice_lines() {
        let s = SpeedrunSettings::default();
        assert_eq!((s.duration(0), s.duration(1), s.duration(2), s.duration(5)), (3.0, 3.0, 4.0, 4.0));
        assert_eq!(voice_line(&dilemma(), false), "RICH or HANDSOME?");
        assert_eq!(voice_line(&dilemma(), true), "RICH or HANDSOME? Choose Now!");
    }

    #[test]
    fn test_reveal_at_sixty_percent() {
        let scene = question_scene(
            &dilemma(),
            (Path::new("/missing/a.jpg"), Path::new("/missing/b.jpg")),
            3.0,
            false,
            None,
            &SpeedrunSettings::default(),
            &MakerAssets::default(),
        );
        let boom = scene.cues.iter().find(|c| c.path.ends_with("boom.mp3")).unwrap();
        assert!((boom.start - 1.8).abs() < 1e-9);
        let spec = scene_spec(&scene, &EncoderProfile::default());
        // grey canvas shows through where the images are missing
        assert_eq!(spec.inputs.len(), 2);
        let graph = spec.filter_complex.unwrap();
        assert!(graph.contains("text='76%'"));
        assert!(graph.contains("text='24%'"));
        assert!(graph.contains("color=0xC80000@0.20"));
        assert!(graph.contains("enable='between(t,1.800,3.000)'"));
    }

    #[test]
    fn test_last_question_hides_split() {
        let scene = question_scene(
            &dilemma(),
            (Path::new("/missing/a.jpg"), Path::new("/missing/b.jpg")),
            4.0,
            true,
            None,
            &SpeedrunSettings::default(),
            &MakerAssets::default(),
        );
        assert!(!scene.cues.iter().any(|c| c.path.ends_with("boom.mp3")));
        let graph = scene_spec(&scene, &EncoderProfile::default()).filter_complex.unwrap();
        assert!(graph.contains("text='???'"));
        assert!(graph.contains("text='CHOOSE NOW!'"));
        assert!(!graph.contains("%'"));
    }

    #[test]
    fn test_gameplay_seek_leaves_slack() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let seek = gameplay_seek(20.0, 3.0, &mut rng);
            assert!((0.0..16.0).contains(&seek));
        }
        assert_eq!(gameplay_seek(3.5, 3.0, &mut rng), 0.0);
    }

    #[test]
    fn test_gameplay_fills_bottom_half() {
        let dir = tempfile::tempdir().unwrap();
        let run = dir.path().join("parkour.mp4");
        std::fs::write(&run, b"x").unwrap();
        let clip = GameplayClip {
            path: run.clone(),
            seek: 3.25,
        };
        let scene = gameplay_question_scene(
            &dilemma(),
            (Path::new("/missing/a.jpg"), Path::new("/missing/b.jpg")),
            3.0,
            false,
            None,
            Some(&clip),
            &SpeedrunSettings::default(),
            &MakerAssets::default(),
        );
        let spec = scene_spec(&scene, &EncoderProfile::default());
        // canvas, silence, gameplay
        assert_eq!(spec.inputs.len(), 3);
        assert_eq!(spec.inputs[2].path, run);
        assert_eq!(spec.inputs[2].options, vec!["-stream_loop", "-1", "-ss", "3.250"]);
        let graph = spec.filter_complex.unwrap();
        assert!(graph.contains("scale=1080:960:force_original_aspect_ratio=increase,crop=1080:960"));
        assert!(graph.contains("overlay=x=0:y=960:eof_action=pass"));
        // grey placeholders stand in for the missing option images
        assert!(graph.contains("drawbox=x=0:y=0:w=1080:h=480:color=0x323232:t=fill"));
        assert!(graph.contains("drawbox=x=0:y=480:w=1080:h=480:color=0x323232:t=fill"));
        assert!(graph.contains("text='76%'"));
        assert!(graph.contains("y=730"));
        // the flash only covers the question area
        assert!(graph.contains("drawbox=x=0:y=0:w=1080:h=960:color=0xFFFFFF@0.50:t=fill:enable='between(t,1.800,1.950)'"));
        let boom = scene.cues.iter().find(|c| c.path.ends_with("boom.mp3")).unwrap();
        assert!((boom.start - 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_gameplay_missing_leaves_black_bottom() {
        let scene = gameplay_question_scene(
            &dilemma(),
            (Path::new("/missing/a.jpg"), Path::new("/missing/b.jpg")),
            4.0,
            true,
            None,
            None,
            &SpeedrunSettings::default(),
            &MakerAssets::default(),
        );
        assert_eq!(scene.background, Color::BLACK);
        assert!(!scene.layers.iter().any(|l| matches!(l.kind, LayerKind::Video { .. })));
        let spec = scene_spec(&scene, &EncoderProfile::default());
        assert_eq!(spec.inputs.len(), 2);
        let graph = spec.filter_complex.unwrap();
        assert!(graph.contains("text='???'"));
        assert!(graph.contains("text='CHOOSE NOW!'"));
        assert!(graph.contains("enable='between(t,0.500,0.650)'"));
        assert!(!graph.contains("%'"));
    }

    #[test]
    fn test_gameplay_defaults() {
        let s = SpeedrunSettings::default();
        assert_eq!(s.gameplay.tts_rate, "+40%");
        assert_eq!(s.gameplay.dir, PathBuf::from("assets/gameplay"));
        assert_eq!(gameplay_output_name(3), "Speedrun_Gameplay_Mix_Day3.mp4");
    }
}
