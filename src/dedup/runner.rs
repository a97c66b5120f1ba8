// SYNOID Reels Job Runner
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Executes a FilterSpec with ffmpeg. Renders land in a scratch directory
// next to the final output and are renamed into place only on success; the
// scratch directory is removed on every exit path when it drops.

use super::filter::{build_chain, ChainSettings};
use super::job::{BatchResult, RenderJob};
use crate::graph::FilterSpec;
use crate::media::EncoderProfile;
use crate::process::run_tool;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, error, info};

/// Result of a finished render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput {
    pub output_path: PathBuf,
    pub size_mb: f64,
}

/// Hidden scratch directory inside `parent`; asset scans skip it.
pub fn scratch_dir(parent: &Path) -> Result<TempDir> {
    std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    tempfile::Builder::new()
        .prefix(".synoid-scratch-")
        .tempdir_in(parent)
        .with_context(|| format!("Failed to create scratch directory in {:?}", parent))
}

#[derive(Debug, Clone)]
pub struct JobRunner {
    ffmpeg: String,
}

impl JobRunner {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.ffmpeg
    }

    /// Render `spec` to `output`: one complete file, or none at all.
    pub async fn render(&self, spec: &FilterSpec, output: &Path) -> Result<RenderOutput> {
        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = output
            .file_name()
            .with_context(|| format!("Output path has no file name: {:?}", output))?;

        let scratch = scratch_dir(&parent)?;
        let staged = scratch.path().join(file_name);
        debug!("[JOB] {}", spec.display_command(&self.ffmpeg, &staged));

        run_tool(&self.ffmpeg, spec.to_args(&staged))
            .await
            .with_context(|| format!("Render failed for {:?}", output))?;

        let size = match tokio::fs::metadata(&staged).await {
            Ok(meta) if meta.len() > 0 => meta.len(),
            _ => bail!("{} exited cleanly but wrote no output for {:?}", self.ffmpeg, output),
        };

        tokio::fs::rename(&staged, output)
            .await
            .with_context(|| format!("Failed to move render into place: {:?}", output))?;

        Ok(RenderOutput {
            output_path: output.to_path_buf(),
            size_mb: size as f64 / 1_048_576.0,
        })
    }

    /// Build and render one dedup job. Never fails; the outcome is the result.
    pub async fn run_job(
        &self,
        job: &RenderJob,
        settings: &ChainSettings,
        encoder: &EncoderProfile,
    ) -> BatchResult {
        let spec = build_chain(job, settings, encoder);
        match self.render(&spec, &job.output).await {
            Ok(out) => {
                info!(
                    "[JOB] ✅ {:?} -> {:?} ({:.2} MB)",
                    job.primary.file_name().unwrap_or_default(),
                    out.output_path.file_name().unwrap_or_default(),
                    out.size_mb
                );
                BatchResult::success(job.primary.clone(), out.output_path)
            }
            Err(e) => {
                error!("[JOB] ❌ {:?}: {:#}", job.primary.file_name().unwrap_or_default(), e);
                BatchResult::failure(job.primary.clone(), format!("{:#}", e))
            }
        }
    }
}
