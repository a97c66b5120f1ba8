// SYNOID Reels Ear - Speech Recognition
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Runs the whisper command line and reads back its JSON segments.

use crate::process::{run_tool, safe_arg_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperTask {
    Transcribe,
    /// Transcribe and translate into English.
    Translate,
}

impl WhisperTask {
    fn as_arg(&self) -> &'static str {
        match self {
            WhisperTask::Transcribe => "transcribe",
            WhisperTask::Translate => "translate",
        }
    }
}

#[derive(Debug, Deserialize)]
struct WhisperJson {
    #[serde(default)]
    segments: Vec<TranscriptSegment>,
}

/// Segments from whisper's `--output_format json`, blank and zero-length
/// ones removed and text trimmed.
pub fn parse_whisper_json(json: &str) -> Result<Vec<TranscriptSegment>> {
    let parsed: WhisperJson = serde_json::from_str(json).context("whisper returned malformed JSON")?;
    Ok(parsed
        .segments
        .into_iter()
        .map(|s| TranscriptSegment {
            text: s.text.trim().to_string(),
            ..s
        })
        .filter(|s| !s.text.is_empty() && s.duration() > 0.0)
        .collect())
}

#[derive(Debug, Clone)]
pub struct Transcriber {
    program: String,
    model: String,
}

impl Transcriber {
    pub fn new(program: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            model: model.into(),
        }
    }

    pub fn build_args(&self, audio: &Path, out_dir: &Path, task: WhisperTask) -> Vec<String> {
        vec![
            safe_arg_path(audio).to_string_lossy().to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--task".to_string(),
            task.as_arg().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            out_dir.to_string_lossy().to_string(),
            "--fp16".to_string(),
            "False".to_string(),
        ]
    }

    pub async fn transcribe(&self, audio: &Path, out_dir: &Path, task: WhisperTask) -> Result<Vec<TranscriptSegment>> {
        info!("[EAR] Transcribing {:?} ({})", audio, task.as_arg());
        run_tool(&self.program, self.build_args(audio, out_dir, task))
            .await
            .context("whisper failed")?;

        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let json_path: PathBuf = out_dir.join(format!("{}.json", stem));
        let json = tokio::fs::read_to_string(&json_path)
            .await
            .with_context(|| format!("whisper wrote no transcript at {:?}", json_path))?;
        let segments = parse_whisper_json(&json)?;
        info!("[EAR] Transcription complete: {} segments", segments.len());
        Ok(segments)
    }
}

pub fn generate_srt(segments: &[TranscriptSegment]) -> String {
    let mut srt_out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        let start = format_srt_time(seg.start);
        let end = format_srt_time(seg.end);
        srt_out.push_str(&format!("{}\n{} --> {}\n{}\n\n", i + 1, start, end, seg.text.trim()));
    }
    srt_out
}

fn format_srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, millis)
}
