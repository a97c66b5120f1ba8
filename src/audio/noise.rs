// SYNOID Reels Noise Beds
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Offline synthesis of the low-volume background beds mixed under dedup
// renders. No network, no decoder: samples are computed and written as
// 16-bit mono WAV.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_BED_SECONDS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    White,
    Pink,
    Brown,
    LowHum,
    Static,
}

impl NoiseKind {
    pub const ALL: [NoiseKind; 5] = [
        NoiseKind::White,
        NoiseKind::Pink,
        NoiseKind::Brown,
        NoiseKind::LowHum,
        NoiseKind::Static,
    ];

    pub fn file_name(&self) -> String {
        format!("Noise_{}.wav", self)
    }
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoiseKind::White => "white",
            NoiseKind::Pink => "pink",
            NoiseKind::Brown => "brown",
            NoiseKind::LowHum => "low_hum",
            NoiseKind::Static => "static",
        };
        write!(f, "{}", name)
    }
}

/// Raw samples in [-1, 1], peak-normalised.
pub fn synthesize<R: Rng + ?Sized>(kind: NoiseKind, samples: usize, rng: &mut R) -> Vec<f32> {
    let mut out: Vec<f64> = Vec::with_capacity(samples);
    match kind {
        NoiseKind::White => {
            out.extend((0..samples).map(|_| rng.gen_range(-1.0..=1.0)));
        }
        NoiseKind::Pink => {
            // Paul Kellet's economy filter
            let (mut b0, mut b1, mut b2) = (0.0, 0.0, 0.0);
            for _ in 0..samples {
                let white: f64 = rng.gen_range(-1.0..=1.0);
                b0 = 0.99765 * b0 + white * 0.0990460;
                b1 = 0.96300 * b1 + white * 0.2965164;
                b2 = 0.57000 * b2 + white * 1.0526913;
                out.push(b0 + b1 + b2 + white * 0.1848);
            }
        }
        NoiseKind::Brown => {
            // Leaky integrator keeps the walk from drifting off.
            let mut last = 0.0;
            for _ in 0..samples {
                let white: f64 = rng.gen_range(-1.0..=1.0);
                last = 0.998 * last + 0.02 * white;
                out.push(last);
            }
        }
        NoiseKind::LowHum => {
            for i in 0..samples {
                let t = i as f64 / SAMPLE_RATE as f64;
                // Irwin-Hall approximation of a unit normal
                let gauss: f64 = (0..12).map(|_| rng.gen_range(0.0..1.0)).sum::<f64>() - 6.0;
                out.push(0.5 * (2.0 * PI * 50.0 * t).sin() + 0.2 * gauss);
            }
        }
        NoiseKind::Static => {
            for _ in 0..samples {
                let hiss: f64 = rng.gen_range(-0.3..=0.3);
                let crackle = if rng.gen_bool(0.002) {
                    rng.gen_range(-1.0..=1.0)
                } else {
                    0.0
                };
                out.push(hiss + crackle);
            }
        }
    }
    normalize(&out)
}

fn normalize(samples: &[f64]) -> Vec<f32> {
    let peak = samples.iter().fold(0.0f64, |m, s| m.max(s.abs()));
    if peak <= f64::EPSILON {
        return vec![0.0; samples.len()];
    }
    samples.iter().map(|s| (s / peak) as f32).collect()
}

pub fn write_wav(path: &Path, samples: &[f32]) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).with_context(|| format!("Failed to create {:?}", path))?;
    for sample in samples {
        let amplitude = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(amplitude)?;
    }
    writer.finalize().with_context(|| format!("Failed to finalize {:?}", path))?;
    Ok(())
}

/// A silent mono WAV, used wherever a voice or bed could not be produced.
pub fn write_silence(path: &Path, seconds: f64) -> Result<()> {
    let count = (seconds.max(0.0) * SAMPLE_RATE as f64).round() as usize;
    write_wav(path, &vec![0.0; count])
}

/// Generate every bed into `dir` in parallel, skipping files that exist.
/// Returns the paths that are now present.
pub fn generate_beds(dir: &Path, seconds: u32) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let samples = seconds as usize * SAMPLE_RATE as usize;

    NoiseKind::ALL
        .par_iter()
        .map(|kind| {
            let path = dir.join(kind.file_name());
            if path.exists() {
                return Ok(path);
            }
            info!("[AUDIO] Synthesizing {} noise...", kind);
            let mut rng = StdRng::from_entropy();
            let data = synthesize(*kind, samples, &mut rng);
            write_wav(&path, &data)?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_is_normalised() {
        let mut rng = StdRng::seed_from_u64(5);
        for kind in NoiseKind::ALL {
            let data = synthesize(kind, 4_410, &mut rng);
            assert_eq!(data.len(), 4_410);
            let peak = data.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            assert!((peak - 1.0).abs() < 1e-5, "{} peak {}", kind, peak);
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(NoiseKind::LowHum.file_name(), "Noise_low_hum.wav");
    }

    #[test]
    fn test_generate_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let white = dir.path().join("Noise_white.wav");
        std::fs::write(&white, b"keep").unwrap();
        let paths = generate_beds(dir.path(), 1).unwrap();
        assert_eq!(paths.len(), 5);
        assert_eq!(std::fs::read(&white).unwrap(), b"keep");
        let reader = hound::WavReader::open(dir.path().join("Noise_pink.wav")).unwrap();
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.len(), SAMPLE_RATE);
    }

    #[test]
    fn test_silence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.wav");
        write_silence(&path, 0.5).unwrap();
        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), SAMPLE_RATE / 2);
        assert!(reader.samples::<i16>().all(|s| s.unwrap() == 0));
    }
}
