// SYNOID Reels Render Job
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use super::params::JitterParams;
use std::path::PathBuf;

/// One primary input paired with its randomly chosen companions and one
/// fixed parameter draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub primary: PathBuf,
    pub secondary: Option<PathBuf>,
    pub background_audio: Option<PathBuf>,
    pub output: PathBuf,
    pub params: JitterParams,
    /// Probed duration; `None` when probing failed.
    pub primary_duration: Option<f64>,
    /// `None` when unknown. Unknown is treated as "has audio".
    pub primary_has_audio: Option<bool>,
}

impl RenderJob {
    pub fn new(primary: impl Into<PathBuf>, output: impl Into<PathBuf>, params: JitterParams) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
            background_audio: None,
            output: output.into(),
            params,
            primary_duration: None,
            primary_has_audio: None,
        }
    }

    pub fn with_secondary(mut self, path: Option<PathBuf>) -> Self {
        self.secondary = path;
        self
    }

    pub fn with_background(mut self, path: Option<PathBuf>) -> Self {
        self.background_audio = path;
        self
    }

    pub fn with_probe(mut self, duration: Option<f64>, has_audio: Option<bool>) -> Self {
        self.primary_duration = duration;
        self.primary_has_audio = has_audio;
        self
    }
}

/// Outcome of one job. Exactly one per planned job.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub input: PathBuf,
    pub outcome: Result<PathBuf, String>,
}

impl BatchResult {
    pub fn success(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            outcome: Ok(output),
        }
    }

    pub fn failure(input: PathBuf, error: impl Into<String>) -> Self {
        Self {
            input,
            outcome: Err(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// (succeeded, failed)
pub fn tally(results: &[BatchResult]) -> (usize, usize) {
    let ok = results.iter().filter(|r| r.is_success()).count();
    (ok, results.len() - ok)
}
