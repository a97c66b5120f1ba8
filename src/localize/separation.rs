// SYNOID Reels Stem Separation
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::process::{run_tool, safe_arg_path};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Vocals and accompaniment of one input.
#[derive(Debug, Clone, PartialEq)]
pub struct Stems {
    pub vocals: PathBuf,
    /// `None` when separation failed and only the full mix is available.
    pub background: Option<PathBuf>,
}

/// Where demucs puts its stems for `input` under `out_dir`.
pub fn stem_paths(out_dir: &Path, model: &str, input: &Path) -> (PathBuf, PathBuf) {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = out_dir.join(model).join(stem);
    (base.join("vocals.wav"), base.join("no_vocals.wav"))
}

#[derive(Debug, Clone)]
pub struct Separator {
    python: String,
    model: String,
}

impl Separator {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            model: "htdemucs".to_string(),
        }
    }

    pub fn build_args(&self, input: &Path, out_dir: &Path) -> Vec<String> {
        vec![
            "-m".to_string(),
            "demucs.separate".to_string(),
            "--two-stems=vocals".to_string(),
            "-n".to_string(),
            self.model.clone(),
            "-o".to_string(),
            out_dir.to_string_lossy().to_string(),
            safe_arg_path(input).to_string_lossy().to_string(),
        ]
    }

    pub async fn separate(&self, input: &Path, out_dir: &Path) -> Result<Stems> {
        info!("[LOCALIZE] Separating stems: {:?}", input);
        run_tool(&self.python, self.build_args(input, out_dir))
            .await
            .context("demucs failed")?;
        let (vocals, background) = stem_paths(out_dir, &self.model, input);
        if !vocals.is_file() || !background.is_file() {
            bail!("demucs finished but stems are missing under {:?}", out_dir);
        }
        Ok(Stems {
            vocals,
            background: Some(background),
        })
    }

    /// Separate, or fall back to the full mix (extracted with ffmpeg) as the
    /// recognition input and no accompaniment.
    pub async fn separate_or_mix(&self, ffmpeg: &str, input: &Path, out_dir: &Path) -> Result<Stems> {
        match self.separate(input, out_dir).await {
            Ok(stems) => Ok(stems),
            Err(e) => {
                warn!("[LOCALIZE] ⚠️ Separation unavailable ({:#}); using the full mix", e);
                let mix = out_dir.join("full_mix.wav");
                tokio::fs::create_dir_all(out_dir).await?;
                run_tool(
                    ffmpeg,
                    [
                        "-y".to_string(),
                        "-i".to_string(),
                        safe_arg_path(input).to_string_lossy().to_string(),
                        "-vn".to_string(),
                        "-ac".to_string(),
                        "1".to_string(),
                        "-ar".to_string(),
                        "16000".to_string(),
                        mix.to_string_lossy().to_string(),
                    ],
                )
                .await
                .context("Audio extraction failed")?;
                Ok(Stems {
                    vocals: mix,
                    background: None,
                })
            }
        }
    }
}
