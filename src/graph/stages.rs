// SYNOID Reels Filter Stages
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Reusable fragments of an ffmpeg filter graph. Every helper returns plain
// filter text; callers stitch fragments together with labels.

use crate::dedup::params::{clamp_dimension, odd_kernel};
use serde::{Deserialize, Serialize};

/// How a frame is fitted into a fixed working resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ScalePolicy {
    /// Fit inside, pad the remainder with black.
    Fit,
    /// Fill the frame, crop the overflow.
    Fill,
    /// Fit inside over a blurred, dimmed fill of the same frame.
    FitBlurred { blur: f64, dim: f64 },
}

impl Default for ScalePolicy {
    fn default() -> Self {
        ScalePolicy::Fill
    }
}

/// Stretch `[input]` to `width`x`height` under `policy`, emitting `[output]`.
/// Intermediate labels are namespaced by `output` so several calls can share
/// one graph.
pub fn scale_graph(policy: ScalePolicy, input: &str, output: &str, width: u32, height: u32) -> String {
    let w = clamp_dimension(width as f64);
    let h = clamp_dimension(height as f64);
    match policy {
        ScalePolicy::Fit => format!(
            "[{i}]scale={w}:{h}:force_original_aspect_ratio=decrease:force_divisible_by=2,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,setsar=1[{o}]",
            i = input,
            o = output,
            w = w,
            h = h
        ),
        ScalePolicy::Fill => format!(
            "[{i}]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1[{o}]",
            i = input,
            o = output,
            w = w,
            h = h
        ),
        ScalePolicy::FitBlurred { blur, dim } => {
            let radius = blur_radius(blur, w.min(h));
            format!(
                "[{i}]split=2[{o}_bgsrc][{o}_fgsrc];\
                 [{o}_bgsrc]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},\
                 boxblur={r}:1,eq=brightness={d:.3}[{o}_bg];\
                 [{o}_fgsrc]scale={w}:{h}:force_original_aspect_ratio=decrease:force_divisible_by=2[{o}_fg];\
                 [{o}_bg][{o}_fg]overlay=(W-w)/2:(H-h)/2,setsar=1[{o}]",
                i = input,
                o = output,
                w = w,
                h = h,
                r = radius,
                d = -dim.clamp(0.0, 1.0)
            )
        }
    }
}

/// Box blur radius for an odd kernel of roughly `size` pixels. ffmpeg caps
/// the radius at half the smaller plane side, chroma included.
pub fn blur_radius(size: f64, min_side: u32) -> u32 {
    let radius = (odd_kernel(size) - 1) / 2;
    let cap = (min_side / 4).max(1);
    radius.clamp(1, cap)
}

/// Trim window for a clip: drop `tail` seconds, never exceed `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimPolicy {
    pub tail: f64,
    pub max_duration: f64,
    /// Clips shorter than this keep their tail.
    pub min_duration: f64,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self {
            tail: 2.0,
            max_duration: 59.0,
            min_duration: 5.0,
        }
    }
}

impl TrimPolicy {
    /// End timestamp to cut at, or `None` when the clip plays unmodified.
    /// Unknown duration still gets the length cap.
    pub fn end_time(&self, duration: Option<f64>) -> Option<f64> {
        match duration {
            Some(d) if d.is_finite() && d > 0.0 => {
                let end = if d >= self.min_duration && d - self.tail > 0.0 {
                    d - self.tail
                } else {
                    d
                };
                if end < d || end > self.max_duration {
                    Some(round3(end.min(self.max_duration)))
                } else {
                    None
                }
            }
            _ => Some(self.max_duration),
        }
    }
}

/// `eq` with brightness, contrast and saturation in that order.
pub fn eq(brightness: f64, contrast: f64, saturation: f64) -> String {
    format!(
        "eq=brightness={:.3}:contrast={:.3}:saturation={:.3}",
        brightness, contrast, saturation
    )
}

/// Temporal+uniform grain; `None` when strength is zero.
pub fn noise(strength: u32, seed: Option<u32>) -> Option<String> {
    if strength == 0 {
        return None;
    }
    Some(match seed {
        Some(s) => format!("noise=alls={}:allf=t+u:all_seed={}", strength, s),
        None => format!("noise=alls={}:allf=t+u", strength),
    })
}

/// Alpha ramp from transparent at x=0 to opaque at x=`width`.
/// Expects a yuva input; chroma is passed through.
pub fn left_feather(width: u32) -> String {
    let w = clamp_dimension(width as f64);
    format!(
        "geq=lum='lum(X,Y)':cb='cb(X,Y)':cr='cr(X,Y)':a='if(lt(X,{w}),X/{w}*255,255)'",
        w = w
    )
}

/// Split a speed factor into `atempo` steps each inside [0.5, 2.0].
pub fn atempo_factors(speed: f64) -> Vec<f64> {
    let mut remaining = if speed.is_finite() && speed > 0.0 { speed } else { 1.0 };
    let mut factors = Vec::new();
    while remaining > 2.0 {
        factors.push(2.0);
        remaining /= 2.0;
    }
    while remaining < 0.5 {
        factors.push(0.5);
        remaining /= 0.5;
    }
    factors.push(remaining);
    factors
}

/// `atempo` chain for `speed`; `None` at unity.
pub fn atempo_chain(speed: f64) -> Option<String> {
    if (speed - 1.0).abs() < 1e-9 {
        return None;
    }
    Some(
        atempo_factors(speed)
            .iter()
            .map(|f| format!("atempo={:.6}", f))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// `setpts` that matches `atempo_chain(speed)`.
pub fn setpts_for_speed(speed: f64) -> Option<String> {
    if (speed - 1.0).abs() < 1e-9 || !speed.is_finite() || speed <= 0.0 {
        return None;
    }
    Some(format!("setpts=PTS/{:.6}", speed))
}

/// Escape text for a single-quoted drawtext `text=` value rendered with
/// `expansion=none`. Quotes become typographic, backslashes are dropped.
pub fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => {}
            '\'' => out.push('\u{2019}'),
            ':' => out.push_str("\\:"),
            '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a filesystem path for a single-quoted filter option value.
pub fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "'\\''")
}

/// Consecutive `[start, end)` windows of at most `length` seconds covering
/// `total`. A trailing window shorter than `min_tail` is dropped.
pub fn segment_windows(total: f64, length: f64, min_tail: f64) -> Vec<(f64, f64)> {
    let mut windows = Vec::new();
    if !(total.is_finite() && total > 0.0 && length > 0.0) {
        return windows;
    }
    let mut start = 0.0;
    while start < total - 1e-6 {
        let end = (start + length).min(total);
        if end - start >= min_tail || windows.is_empty() {
            windows.push((round3(start), round3(end)));
        }
        start += length;
    }
    windows
}

/// `enable` expression active from `start` for `duration` seconds.
pub fn between(start: f64, duration: f64) -> String {
    format!("between(t,{:.3},{:.3})", start, start + duration.max(0.0))
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_caps_long_clip() {
        let policy = TrimPolicy::default();
        assert_eq!(policy.end_time(Some(70.0)), Some(59.0));
        assert_eq!(policy.end_time(Some(30.0)), Some(28.0));
    }

    #[test]
    fn test_trim_is_noop_for_short_clip() {
        let policy = TrimPolicy::default();
        assert_eq!(policy.end_time(Some(3.0)), None);
        assert_eq!(policy.end_time(Some(0.0)), Some(59.0));
        assert_eq!(policy.end_time(None), Some(59.0));
    }

    #[test]
    fn test_atempo_chain_stays_in_bounds() {
        for speed in [0.1, 0.3, 0.5, 0.99, 1.01, 1.5, 2.0, 3.7, 9.0] {
            let factors = atempo_factors(speed);
            let product: f64 = factors.iter().product();
            assert!((product - speed).abs() < 1e-9, "speed {}", speed);
            assert!(factors.iter().all(|f| (0.5..=2.0).contains(f)), "{:?}", factors);
        }
        assert!(atempo_chain(1.0).is_none());
        assert_eq!(atempo_chain(1.01).unwrap(), "atempo=1.010000");
        assert_eq!(atempo_chain(4.0).unwrap(), "atempo=2.000000,atempo=2.000000");
    }

    #[test]
    fn test_noise_seed_optional() {
        assert_eq!(noise(0, Some(3)), None);
        assert_eq!(noise(2, None).unwrap(), "noise=alls=2:allf=t+u");
        assert!(noise(1, Some(42)).unwrap().ends_with("all_seed=42"));
    }

    #[test]
    fn test_blur_radius_bounded() {
        assert_eq!(blur_radius(0.0, 1080), 1);
        assert_eq!(blur_radius(25.0, 1080), 12);
        assert_eq!(blur_radius(500.0, 40), 10);
    }

    #[test]
    fn test_scale_graph_labels() {
        let g = scale_graph(ScalePolicy::FitBlurred { blur: 40.0, dim: 0.4 }, "in", "out", 854, 480);
        assert!(g.starts_with("[in]split=2"));
        assert!(g.ends_with("[out]"));
        assert!(g.contains("boxblur=20:1"));
        let fill = scale_graph(ScalePolicy::Fill, "a", "b", 0, 0);
        assert!(fill.contains("crop=1:1"));
    }

    #[test]
    fn test_segment_windows() {
        assert_eq!(segment_windows(130.0, 59.0, 0.0), vec![(0.0, 59.0), (59.0, 118.0), (118.0, 130.0)]);
        assert_eq!(segment_windows(120.0, 59.0, 5.0), vec![(0.0, 59.0), (59.0, 118.0)]);
        assert_eq!(segment_windows(3.0, 59.0, 5.0), vec![(0.0, 3.0)]);
        assert!(segment_windows(0.0, 59.0, 5.0).is_empty());
    }

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(escape_filter_path("C:\\tmp\\a.srt"), "C\\:/tmp/a.srt");
    }

    #[test]
    fn test_escape_drawtext() {
        assert_eq!(escape_drawtext("A: 50%"), "A\\: 50%");
        assert_eq!(escape_drawtext("it's"), "it\u{2019}s");
        assert_eq!(escape_drawtext("plain"), "plain");
    }
}
