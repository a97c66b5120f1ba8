// SYNOID Reels Configuration
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// One JSON document replaces the per-script constant tables. Every field has
// a default, so an empty `{}` (or no file at all) is a valid configuration.

use crate::dedup::batch::DEFAULT_WORKERS;
use crate::dedup::{ChainSettings, JitterProfile};
use crate::fetch::FetchOptions;
use crate::localize::LocalizeSettings;
use crate::makers::challenge::ChallengeSettings;
use crate::makers::fakeout::FakeoutSettings;
use crate::makers::illusion::IllusionSettings;
use crate::makers::quiz::QuizSettings;
use crate::makers::speedrun::SpeedrunSettings;
use crate::makers::MakerAssets;
use crate::media::EncoderProfile;
use crate::merge::MergeSettings;
use crate::pipeline::TaskRecord;
use crate::react::ReactSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "SYNOID_REELS_CONFIG";

/// External programs, by name or absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub yt_dlp: String,
    /// Interpreter used for `-m yt_dlp` and `-m demucs`
    pub python: String,
    pub edge_tts: String,
    pub whisper: String,
    pub whisper_model: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            yt_dlp: "yt-dlp".to_string(),
            python: "python3".to_string(),
            edge_tts: "edge-tts".to_string(),
            whisper: "whisper".to_string(),
            whisper_model: "base".to_string(),
        }
    }
}

impl ToolPaths {
    /// `SYNOID_FFMPEG`, `SYNOID_FFPROBE` and `SYNOID_YTDLP` win over the file.
    pub fn apply_env(&mut self) {
        for (var, slot) in [
            ("SYNOID_FFMPEG", &mut self.ffmpeg),
            ("SYNOID_FFPROBE", &mut self.ffprobe),
            ("SYNOID_YTDLP", &mut self.yt_dlp),
        ] {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    *slot = value;
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelsConfig {
    pub tools: ToolPaths,
    /// Dedup worker pool size, clamped to 1..=4
    pub workers: usize,
    pub jitter: JitterProfile,
    pub chain: ChainSettings,
    pub fetch: FetchOptions,
    /// Fixed encoder; detected from ffmpeg when absent
    pub encoder: Option<EncoderProfile>,
    /// Overlay clips used by tasks that do not name their own
    pub secondary_dir: Option<PathBuf>,
    /// Background noise beds mixed under dedup renders
    pub bgm_dir: Option<PathBuf>,
    pub tasks: Vec<TaskRecord>,
    pub assets: MakerAssets,
    pub localize: LocalizeSettings,
    pub merge: MergeSettings,
    pub react: ReactSettings,
    pub quiz: QuizSettings,
    pub speedrun: SpeedrunSettings,
    pub illusion: IllusionSettings,
    pub fakeout: FakeoutSettings,
    pub challenge: ChallengeSettings,
}

impl Default for ReelsConfig {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            workers: DEFAULT_WORKERS,
            jitter: JitterProfile::default(),
            chain: ChainSettings::default(),
            fetch: FetchOptions::default(),
            encoder: None,
            secondary_dir: None,
            bgm_dir: Some(PathBuf::from("assets/bgm")),
            tasks: Vec::new(),
            assets: MakerAssets::default(),
            localize: LocalizeSettings::default(),
            merge: MergeSettings::default(),
            react: ReactSettings::default(),
            quiz: QuizSettings::default(),
            speedrun: SpeedrunSettings::default(),
            illusion: IllusionSettings::default(),
            fakeout: FakeoutSettings::default(),
            challenge: ChallengeSettings::default(),
        }
    }
}

impl ReelsConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("Failed to read config {:?}", path))?;
        serde_json::from_str(&json).with_context(|| format!("Malformed config {:?}", path))
    }

    /// Explicit path, then `SYNOID_REELS_CONFIG`, then defaults.
    /// Tool overrides from the environment are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                info!("[CONFIG] Loading {:?}", path);
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.tools.apply_env();
        Ok(config)
    }

    pub fn task(&self, name: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// The configured encoder, or whatever ffmpeg on this machine supports.
    pub async fn encoder(&self) -> EncoderProfile {
        match &self.encoder {
            Some(profile) => profile.clone(),
            None => EncoderProfile::detect(&self.tools.ffmpeg).await,
        }
    }
}
