// SYNOID Reels Voice - Text to Speech
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Neural voices through the edge-tts command line. A failed line never
// stops the caller: it gets a short silent placeholder and an Err entry in
// the per-item results.

use crate::audio::noise::write_silence;
use crate::process::run_tool;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Length of the placeholder written when synthesis fails.
const PLACEHOLDER_SECONDS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Vi,
    Zh,
}

impl Language {
    pub fn voice(&self) -> &'static str {
        match self {
            Language::En => "en-US-ChristopherNeural",
            Language::Vi => "vi-VN-NamMinhNeural",
            Language::Zh => "zh-CN-YunxiNeural",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => write!(f, "en"),
            Language::Vi => write!(f, "vi"),
            Language::Zh => write!(f, "zh"),
        }
    }
}

/// One line to speak and where to put it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub output: PathBuf,
}

/// What came back for one request. `path` always exists afterwards: either
/// the speech or the silent placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechClip {
    pub path: PathBuf,
    pub result: Result<(), String>,
}

#[derive(Debug, Clone)]
pub struct TtsEngine {
    program: String,
    rate: String,
}

impl TtsEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            rate: "-5%".to_string(),
        }
    }

    pub fn with_rate(mut self, rate: &str) -> Self {
        self.rate = rate.to_string();
        self
    }

    /// Arguments for one edge-tts call. `=` forms keep a leading '-' in the
    /// rate or the text from being parsed as a flag.
    pub fn build_args(&self, text: &str, voice: &str, output: &Path) -> Vec<String> {
        vec![
            format!("--voice={}", voice),
            format!("--rate={}", self.rate),
            format!("--text={}", text),
            format!("--write-media={}", output.to_string_lossy()),
        ]
    }

    pub async fn speak(&self, text: &str, voice: &str, output: &Path) -> Result<()> {
        info!("[TTS] Generating audio: \"{}\" -> {:?}", text, output);
        run_tool(&self.program, self.build_args(text, voice, output))
            .await
            .context("edge-tts failed")?;
        match tokio::fs::metadata(output).await {
            Ok(m) if m.len() > 0 => Ok(()),
            _ => anyhow::bail!("edge-tts produced no audio for {:?}", output),
        }
    }

    /// Speak, or leave a silent placeholder next to `output` on failure.
    pub async fn speak_or_silence(&self, text: &str, voice: &str, output: &Path) -> SpeechClip {
        match self.speak(text, voice, output).await {
            Ok(()) => SpeechClip {
                path: output.to_path_buf(),
                result: Ok(()),
            },
            Err(e) => {
                warn!("[TTS] ❌ {:#}; using silence", e);
                let placeholder = output.with_extension("silent.wav");
                if let Err(io) = write_silence(&placeholder, PLACEHOLDER_SECONDS) {
                    warn!("[TTS] Placeholder failed too: {:#}", io);
                }
                SpeechClip {
                    path: placeholder,
                    result: Err(format!("{:#}", e)),
                }
            }
        }
    }

    /// Fan out with at most `concurrency` edge-tts processes. Results come
    /// back in request order, one per request.
    pub async fn speak_all(
        &self,
        requests: Vec<SpeechRequest>,
        voice: &str,
        concurrency: usize,
    ) -> Vec<SpeechClip> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut handles = Vec::with_capacity(requests.len());
        for req in requests {
            let engine = self.clone();
            let voice = voice.to_string();
            let semaphore = semaphore.clone();
            let fallback = req.output.clone();
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                engine.speak_or_silence(&req.text, &voice, &req.output).await
            });
            handles.push((fallback, handle));
        }

        let mut clips = Vec::with_capacity(handles.len());
        for (output, handle) in handles {
            clips.push(match handle.await {
                Ok(clip) => clip,
                Err(e) => SpeechClip {
                    path: output,
                    result: Err(format!("tts task failed: {}", e)),
                },
            });
        }
        let failed = clips.iter().filter(|c| c.result.is_err()).count();
        info!("[TTS] {} lines, {} fell back to silence", clips.len(), failed);
        clips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_per_language() {
        assert_eq!(Language::Vi.voice(), "vi-VN-NamMinhNeural");
        assert_eq!(Language::Zh.voice(), "zh-CN-YunxiNeural");
        assert_eq!(Language::En.to_string(), "en");
    }

    #[test]
    fn test_args_guard_leading_dash() {
        let engine = TtsEngine::new("edge-tts");
        let args = engine.build_args("-not a flag", "en-US-ChristopherNeural", Path::new("a.mp3"));
        assert!(args.contains(&"--rate=-5%".to_string()));
        assert!(args.contains(&"--text=-not a flag".to_string()));
        assert_eq!(args.last().unwrap(), "--write-media=a.mp3");
    }

    #[tokio::test]
    async fn test_missing_tool_falls_back_to_silence_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TtsEngine::new("__no_edge_tts__");
        let requests = (0..3)
            .map(|i| SpeechRequest {
                text: format!("line {}", i),
                output: dir.path().join(format!("s_{}.mp3", i)),
            })
            .collect();
        let clips = engine.speak_all(requests, Language::En.voice(), 2).await;
        assert_eq!(clips.len(), 3);
        for (i, clip) in clips.iter().enumerate() {
            assert!(clip.result.is_err());
            assert_eq!(clip.path, dir.path().join(format!("s_{}.silent.wav", i)));
            assert!(clip.path.exists());
        }
    }
}
