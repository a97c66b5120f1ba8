// SYNOID Reels Probe - ffprobe Metadata
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use crate::process::{capture_tool, safe_arg_path};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::time::{timeout, Duration};

/// Probing reads container headers only; anything slower is a hung tool.
const PROBE_TIMEOUT_SECS: u64 = 15;

/// A file on disk plus what ffprobe told us about it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub path: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: f64,
    pub codec: Option<String>,
    pub has_audio: bool,
}

impl MediaAsset {
    pub fn is_portrait(&self) -> bool {
        match (self.width, self.height) {
            (Some(w), Some(h)) => w < h,
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -print_format json -show_streams -show_format` output.
pub fn parse_probe_json(path: &Path, json: &str) -> Result<MediaAsset> {
    let probe: ProbeOutput =
        serde_json::from_str(json).context("ffprobe returned malformed JSON")?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));
    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    // Container duration first, stream duration as a fallback (raw audio files)
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter_map(|s| s.duration.as_deref())
                .filter_map(|d| d.parse::<f64>().ok())
                .reduce(f64::max)
        })
        .unwrap_or(0.0);

    let codec = video
        .or_else(|| probe.streams.first())
        .and_then(|s| s.codec_name.clone());

    Ok(MediaAsset {
        path: path.to_path_buf(),
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        duration,
        codec,
        has_audio,
    })
}

/// Probe a media file with ffprobe.
pub async fn probe(ffprobe: &str, path: &Path) -> Result<MediaAsset> {
    let safe_path = safe_arg_path(path);
    let args = [
        "-v".into(),
        "quiet".into(),
        "-print_format".into(),
        "json".into(),
        "-show_streams".into(),
        "-show_format".into(),
        safe_path.into_os_string(),
    ];

    let json = timeout(
        Duration::from_secs(PROBE_TIMEOUT_SECS),
        capture_tool(ffprobe, args),
    )
    .await
    .with_context(|| format!("ffprobe timed out on {:?}", path))??;

    parse_probe_json(path, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "video", "codec_name": "h264", "width": 1080, "height": 1920, "duration": "70.0"},
            {"codec_type": "audio", "codec_name": "aac", "duration": "69.98"}
        ],
        "format": {"duration": "70.016000", "tags": {"creation_time": "2024-01-01T00:00:00Z"}}
    }"#;

    #[test]
    fn test_parse_video_probe() {
        let asset = parse_probe_json(Path::new("clip.mp4"), SAMPLE).unwrap();
        assert_eq!(asset.width, Some(1080));
        assert_eq!(asset.height, Some(1920));
        assert_eq!(asset.codec.as_deref(), Some("h264"));
        assert!(asset.has_audio);
        assert!(asset.is_portrait());
        assert!((asset.duration - 70.016).abs() < 1e-6);
    }

    #[test]
    fn test_parse_audio_only_falls_back_to_stream_duration() {
        let json = r#"{"streams": [{"codec_type": "audio", "codec_name": "pcm_s16le", "duration": "60.0"}], "format": {}}"#;
        let asset = parse_probe_json(Path::new("bed.wav"), json).unwrap();
        assert_eq!(asset.width, None);
        assert!(asset.has_audio);
        assert_eq!(asset.codec.as_deref(), Some("pcm_s16le"));
        assert!((asset.duration - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(parse_probe_json(Path::new("x.mp4"), "not json").is_err());
    }
}
