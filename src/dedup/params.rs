// SYNOID Reels Jitter - Parameter Randomizer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Every output gets small, independent perturbations (colour, speed, noise,
// offsets) so that bulk outputs never hash-match each other or the source.
// Draws are deliberately unseeded in production.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` a parameter is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JitterRange {
    pub min: f64,
    pub max: f64,
}

impl JitterRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A degenerate range that always yields `value`.
    pub const fn fixed(value: f64) -> Self {
        Self { min: value, max: value }
    }

    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = self.bounds();
        value >= lo && value <= hi
    }

    fn bounds(&self) -> (f64, f64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }

    /// Uniform draw rounded to `decimals`, never leaving the interval.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, decimals: u32) -> f64 {
        let (lo, hi) = self.bounds();
        if lo == hi {
            return lo;
        }
        let raw = rng.gen_range(lo..=hi);
        let scale = 10f64.powi(decimals as i32);
        ((raw * scale).round() / scale).clamp(lo, hi)
    }

    /// Uniform integer draw over the rounded-inward bounds.
    pub fn draw_int<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let (lo, hi) = self.bounds();
        let lo = lo.ceil() as i64;
        let hi = (hi.floor() as i64).max(lo);
        rng.gen_range(lo..=hi)
    }
}

/// Configured ranges for one kind of render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterProfile {
    /// Additive `eq` brightness offset
    pub brightness: JitterRange,
    /// Multiplicative `eq` contrast
    pub contrast: JitterRange,
    /// Multiplicative `eq` saturation
    pub saturation: JitterRange,
    /// Playback speed multiplier applied to video and audio
    pub speed: JitterRange,
    /// `noise` filter strength (integer)
    pub noise_strength: JitterRange,
    /// `noise` filter seed (integer)
    pub noise_seed: JitterRange,
    /// Background bed volume
    pub background_volume: JitterRange,
    /// Seconds skipped at the head of the secondary clip
    pub secondary_offset: JitterRange,
    /// Fraction of frame height skipped when cropping landscape input
    pub crop_offset: JitterRange,
    /// Primary audio gain
    pub volume: JitterRange,
    /// Whether the noise filter receives an explicit seed
    pub seeded_noise: bool,
}

impl Default for JitterProfile {
    fn default() -> Self {
        Self {
            brightness: JitterRange::new(-0.03, 0.03),
            contrast: JitterRange::new(0.97, 1.03),
            saturation: JitterRange::new(1.0, 1.08),
            speed: JitterRange::new(0.995, 1.005),
            noise_strength: JitterRange::new(1.0, 2.0),
            noise_seed: JitterRange::new(1.0, 999_999.0),
            background_volume: JitterRange::new(0.007, 0.015),
            secondary_offset: JitterRange::new(0.0, 0.5),
            crop_offset: JitterRange::fixed(0.0),
            volume: JitterRange::fixed(1.0),
            seeded_noise: true,
        }
    }
}

impl JitterProfile {
    /// Compilation merge: lighter colour drift, unseeded noise, landscape crop.
    pub fn merge() -> Self {
        Self {
            brightness: JitterRange::new(-0.01, 0.01),
            contrast: JitterRange::new(0.99, 1.01),
            saturation: JitterRange::fixed(1.0),
            speed: JitterRange::fixed(1.0),
            noise_strength: JitterRange::fixed(1.0),
            crop_offset: JitterRange::new(0.095, 0.105),
            volume: JitterRange::new(0.99, 1.01),
            seeded_noise: false,
            ..Self::default()
        }
    }

    /// Reaction remix: faster playback and stronger colour.
    pub fn reaction() -> Self {
        Self {
            brightness: JitterRange::new(-0.02, 0.02),
            contrast: JitterRange::new(1.0, 1.05),
            saturation: JitterRange::new(1.0, 1.1),
            speed: JitterRange::new(1.01, 1.04),
            ..Self::default()
        }
    }

    /// Draw one independent value per parameter.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> JitterParams {
        JitterParams {
            brightness: self.brightness.draw(rng, 3),
            contrast: self.contrast.draw(rng, 3),
            saturation: self.saturation.draw(rng, 3),
            speed: self.speed.draw(rng, 4),
            noise_strength: self.noise_strength.draw_int(rng).max(0) as u32,
            noise_seed: if self.seeded_noise {
                Some(self.noise_seed.draw_int(rng).max(0) as u32)
            } else {
                None
            },
            background_volume: self.background_volume.draw(rng, 4),
            secondary_offset: self.secondary_offset.draw(rng, 2),
            crop_offset: self.crop_offset.draw(rng, 3),
            volume: self.volume.draw(rng, 3),
        }
    }
}

/// One fixed draw; a RenderJob owns exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct JitterParams {
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub speed: f64,
    pub noise_strength: u32,
    pub noise_seed: Option<u32>,
    pub background_volume: f64,
    pub secondary_offset: f64,
    pub crop_offset: f64,
    pub volume: f64,
}

impl JitterParams {
    /// No perturbation at all.
    pub fn neutral() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            speed: 1.0,
            noise_strength: 0,
            noise_seed: None,
            background_volume: 0.0,
            secondary_offset: 0.0,
            crop_offset: 0.0,
            volume: 1.0,
        }
    }
}

/// Pixel dimensions derived from arithmetic never go below 1.
pub fn clamp_dimension(value: f64) -> u32 {
    if value.is_finite() && value >= 1.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// Kernel sizes for filters that need odd sizes: rounded up, at least 1.
pub fn odd_kernel(value: f64) -> u32 {
    let k = if value.is_finite() && value > 1.0 {
        value.ceil().min((u32::MAX - 1) as f64) as u32
    } else {
        1
    };
    if k % 2 == 0 {
        k + 1
    } else {
        k
    }
}

/// H.264 with yuv420p needs even frame sizes; never below 2.
pub fn even_dimension(value: f64) -> u32 {
    let v = clamp_dimension(value.floor());
    (v - v % 2).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draws_stay_in_closed_interval() {
        let profile = JitterProfile::default();
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let p = profile.draw(&mut rng);
            assert!(profile.brightness.contains(p.brightness), "brightness {}", p.brightness);
            assert!(profile.contrast.contains(p.contrast));
            assert!(profile.saturation.contains(p.saturation));
            assert!(profile.speed.contains(p.speed), "speed {}", p.speed);
            assert!(profile.noise_strength.contains(p.noise_strength as f64));
            assert!(profile.noise_seed.contains(p.noise_seed.unwrap() as f64));
            assert!(profile.background_volume.contains(p.background_volume));
            assert!(profile.secondary_offset.contains(p.secondary_offset));
        }
    }

    #[test]
    fn test_all_profiles_respect_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for profile in [JitterProfile::merge(), JitterProfile::reaction()] {
            for _ in 0..2_000 {
                let p = profile.draw(&mut rng);
                assert!(profile.crop_offset.contains(p.crop_offset));
                assert!(profile.volume.contains(p.volume));
                assert!(profile.speed.contains(p.speed));
            }
        }
        assert!(JitterProfile::merge().draw(&mut rng).noise_seed.is_none());
    }

    #[test]
    fn test_reversed_range_is_tolerated() {
        let range = JitterRange::new(0.5, -0.5);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1_000 {
            assert!(range.contains(range.draw(&mut rng, 3)));
        }
    }

    #[test]
    fn test_draws_vary_between_jobs() {
        let profile = JitterProfile::default();
        let mut rng = rand::thread_rng();
        let first = profile.draw(&mut rng);
        let differs = (0..20).any(|_| profile.draw(&mut rng) != first);
        assert!(differs);
    }

    #[test]
    fn test_clamp_dimension_never_below_one() {
        for v in [-100.0, -0.4, 0.0, 0.3, f64::NAN, f64::NEG_INFINITY] {
            assert!(clamp_dimension(v) >= 1);
        }
        assert_eq!(clamp_dimension(899.6), 900);
    }

    #[test]
    fn test_odd_kernel_always_odd_and_positive() {
        let mut v = -10.0;
        while v < 60.0 {
            let k = odd_kernel(v);
            assert!(k >= 1);
            assert_eq!(k % 2, 1, "kernel for {} was {}", v, k);
            assert!(k as f64 >= v.min(1.0));
            v += 0.25;
        }
        assert_eq!(odd_kernel(24.0), 25);
        assert_eq!(odd_kernel(24.1), 25);
        assert_eq!(odd_kernel(25.0), 25);
        assert_eq!(odd_kernel(f64::NAN), 1);
    }

    #[test]
    fn test_even_dimension() {
        assert_eq!(even_dimension(1079.0), 1078);
        assert_eq!(even_dimension(1080.0), 1080);
        assert_eq!(even_dimension(0.0), 2);
        assert_eq!(even_dimension(-5.0), 2);
    }
}
