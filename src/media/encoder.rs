// SYNOID Reels Encoder Profile - Hardware Encoder Selection
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Picks the best H.264 encoder ffmpeg exposes on this machine:
// VideoToolbox (Apple Silicon) -> NVENC -> libx264 on the CPU.

use crate::process::capture_tool;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Hardware backend the encoder runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderBackend {
    VideoToolbox,
    Nvenc,
    Cpu,
}

impl fmt::Display for EncoderBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncoderBackend::VideoToolbox => write!(f, "VideoToolbox"),
            EncoderBackend::Nvenc => write!(f, "NVENC"),
            EncoderBackend::Cpu => write!(f, "CPU (libx264)"),
        }
    }
}

/// Output encoding settings shared by every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderProfile {
    pub backend: EncoderBackend,
    pub video_bitrate: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub pix_fmt: String,
}

impl Default for EncoderProfile {
    fn default() -> Self {
        Self::for_backend(EncoderBackend::Cpu)
    }
}

impl EncoderProfile {
    pub fn for_backend(backend: EncoderBackend) -> Self {
        Self {
            backend,
            video_bitrate: "4800k".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            pix_fmt: "yuv420p".to_string(),
        }
    }

    pub fn with_video_bitrate(mut self, bitrate: &str) -> Self {
        self.video_bitrate = bitrate.to_string();
        self
    }

    pub fn with_audio_bitrate(mut self, bitrate: &str) -> Self {
        self.audio_bitrate = bitrate.to_string();
        self
    }

    pub fn video_codec(&self) -> &'static str {
        match self.backend {
            EncoderBackend::VideoToolbox => "h264_videotoolbox",
            EncoderBackend::Nvenc => "h264_nvenc",
            EncoderBackend::Cpu => "libx264",
        }
    }

    /// Input-side hardware decode flags (go before `-i`).
    pub fn hwaccel_args(&self) -> Vec<String> {
        match self.backend {
            EncoderBackend::VideoToolbox => vec!["-hwaccel".into(), "videotoolbox".into()],
            EncoderBackend::Nvenc => vec!["-hwaccel".into(), "cuda".into()],
            EncoderBackend::Cpu => Vec::new(),
        }
    }

    /// Video encoder flags.
    pub fn video_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.video_codec().to_string(),
            "-b:v".to_string(),
            self.video_bitrate.clone(),
        ];
        if self.backend == EncoderBackend::Cpu {
            args.extend(["-preset".to_string(), "veryfast".to_string()]);
        }
        args.extend(["-pix_fmt".to_string(), self.pix_fmt.clone()]);
        args
    }

    /// Audio encoder flags.
    pub fn audio_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }

    /// Choose a backend from the text of `ffmpeg -hide_banner -encoders`.
    pub fn backend_from_encoder_list(listing: &str) -> EncoderBackend {
        let has = |name: &str| listing.split_whitespace().any(|tok| tok == name);
        if has("h264_videotoolbox") && cfg!(target_os = "macos") {
            EncoderBackend::VideoToolbox
        } else if has("h264_nvenc") && nvidia_present() {
            EncoderBackend::Nvenc
        } else {
            EncoderBackend::Cpu
        }
    }

    /// Ask ffmpeg which encoders it was built with.
    pub async fn detect(ffmpeg: &str) -> Self {
        match capture_tool(ffmpeg, ["-hide_banner", "-encoders"]).await {
            Ok(listing) => {
                let backend = Self::backend_from_encoder_list(&listing);
                info!("[ENCODER] ✓ Using {} ({})", backend, Self::for_backend(backend).video_codec());
                Self::for_backend(backend)
            }
            Err(e) => {
                warn!("[ENCODER] Encoder detection failed, using libx264: {}", e);
                Self::default()
            }
        }
    }
}

/// nvidia-smi answers only when a driver and device exist.
fn nvidia_present() -> bool {
    std::process::Command::new("nvidia-smi")
        .args(["--query-gpu=name", "--format=csv,noheader"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_fallback_when_no_hw_encoder_listed() {
        let listing = " V....D libx264              libx264 H.264 / AVC\n A....D aac AAC";
        assert_eq!(EncoderProfile::backend_from_encoder_list(listing), EncoderBackend::Cpu);
    }

    #[test]
    fn test_cpu_profile_args() {
        let profile = EncoderProfile::default().with_video_bitrate("1200k");
        let args = profile.video_args();
        assert_eq!(&args[..4], &["-c:v", "libx264", "-b:v", "1200k"]);
        assert!(args.contains(&"yuv420p".to_string()));
        assert!(profile.hwaccel_args().is_empty());
    }

    #[test]
    fn test_videotoolbox_profile_args() {
        let profile = EncoderProfile::for_backend(EncoderBackend::VideoToolbox);
        assert_eq!(profile.hwaccel_args(), vec!["-hwaccel", "videotoolbox"]);
        assert_eq!(profile.video_codec(), "h264_videotoolbox");
        assert!(!profile.video_args().contains(&"-preset".to_string()));
    }
}
