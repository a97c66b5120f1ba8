// SYNOID Reels Filter Chain Builder
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Turns a RenderJob into a FilterSpec. Stage order:
//   trim -> fps -> scale -> eq -> noise -> secondary composite -> speed
//   -> background bed -> metadata strip
// Missing companions drop their stage; the graph never names an input that
// is not on disk.

use super::job::RenderJob;
use crate::graph::stages::{self, ScalePolicy, TrimPolicy};
use crate::graph::{FilterSpec, InputSpec};
use crate::media::EncoderProfile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Pixel rectangle for `crop=w:h:x:y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Fixed geometry and audio constants of the side-by-side dedup layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    pub fps: u32,
    /// Output canvas
    pub canvas: (u32, u32),
    /// Size of each half before cropping
    pub band: (u32, u32),
    pub scale_policy: ScalePolicy,
    pub secondary_crop: CropRect,
    /// Width of the linear alpha ramp on the secondary's left edge
    pub feather: u32,
    pub overlay_at: (u32, u32),
    pub trim: TrimPolicy,
    pub lowpass_hz: u32,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            canvas: (1080, 1080),
            band: (608, 1080),
            scale_policy: ScalePolicy::Fill,
            secondary_crop: CropRect {
                width: 540,
                height: 1080,
                x: 68,
                y: 0,
            },
            feather: 68,
            overlay_at: (540, 0),
            trim: TrimPolicy::default(),
            lowpass_hz: 800,
        }
    }
}

/// Keep an optional companion only if it is actually on disk.
fn present(path: &Option<PathBuf>, role: &str) -> Option<PathBuf> {
    match path {
        Some(p) if p.is_file() => Some(p.clone()),
        Some(p) => {
            warn!("[FILTER] {} asset missing, stage skipped: {:?}", role, p);
            None
        }
        None => None,
    }
}

fn join_filters(parts: &[String]) -> String {
    parts.join(",")
}

/// Build the full dedup render for one job.
pub fn build_chain(job: &RenderJob, settings: &ChainSettings, encoder: &EncoderProfile) -> FilterSpec {
    let params = &job.params;
    let secondary = present(&job.secondary, "Secondary");
    let background = present(&job.background_audio, "Background");
    let primary_audio = job.primary_has_audio.unwrap_or(true);
    let end = settings.trim.end_time(job.primary_duration);

    let mut spec = FilterSpec::default();
    spec.push_input(InputSpec::file(&job.primary).with_leading(encoder.hwaccel_args()));
    let secondary_idx = secondary.as_ref().map(|p| {
        spec.push_input(
            InputSpec::file(p)
                .with_option("-ss", format!("{:.2}", params.secondary_offset.max(0.0)))
                .with_leading(vec!["-stream_loop".into(), "-1".into()]),
        )
    });
    let background_idx = background
        .as_ref()
        .map(|p| spec.push_input(InputSpec::looped(p)));

    let mut graph: Vec<String> = Vec::new();

    // 1-2. trim, fps
    let mut head = Vec::new();
    if let Some(t) = end {
        head.push(format!("trim=end={:.3}", t));
        head.push("setpts=PTS-STARTPTS".to_string());
    }
    head.push(format!("fps={}", settings.fps));
    graph.push(format!("[0:v]{}[p_fps]", join_filters(&head)));

    // 3. scale to the band when composing, to the whole canvas otherwise
    let (w, h) = if secondary_idx.is_some() {
        settings.band
    } else {
        settings.canvas
    };
    graph.push(stages::scale_graph(settings.scale_policy, "p_fps", "p_scaled", w, h));

    // 4-5. colour and grain
    let mut look = vec![stages::eq(params.brightness, params.contrast, params.saturation)];
    look.extend(stages::noise(params.noise_strength, params.noise_seed));
    graph.push(format!("[p_scaled]{}[p_look]", join_filters(&look)));

    // 6. secondary composite
    let composed = match secondary_idx {
        Some(idx) => {
            let (cw, ch) = settings.canvas;
            let (bw, bh) = settings.band;
            let crop = settings.secondary_crop;
            graph.push(format!("[p_look]pad={}:{}:0:0[main]", cw, ch));
            graph.push(format!(
                "[{}:v]fps={},scale={}:{},setsar=1,setpts=PTS-STARTPTS,crop={}:{}:{}:{},format=yuva420p,{}[sub]",
                idx,
                settings.fps,
                bw,
                bh,
                crop.width,
                crop.height,
                crop.x,
                crop.y,
                stages::left_feather(settings.feather)
            ));
            graph.push(format!(
                "[main][sub]overlay={}:{}:shortest=1[composed]",
                settings.overlay_at.0, settings.overlay_at.1
            ));
            "composed"
        }
        None => "p_look",
    };

    // 7. speed, video side
    match stages::setpts_for_speed(params.speed) {
        Some(setpts) => graph.push(format!("[{}]{},format=yuv420p[outv]", composed, setpts)),
        None => graph.push(format!("[{}]format=yuv420p[outv]", composed)),
    }
    spec.maps.push("[outv]".into());

    // 7-8. audio: primary track with speed, then the bed
    let mut has_audio = false;
    let primary_label = if primary_audio {
        let mut chain = Vec::new();
        if let Some(t) = end {
            chain.push(format!("atrim=end={:.3}", t));
        }
        chain.push("asetpts=PTS-STARTPTS".to_string());
        if (params.volume - 1.0).abs() > 1e-9 {
            chain.push(format!("volume={:.3}", params.volume));
        }
        chain.extend(stages::atempo_chain(params.speed));
        graph.push(format!("[0:a]{}[pa]", join_filters(&chain)));
        Some("pa")
    } else {
        None
    };

    let bed_label = background_idx.map(|idx| {
        let mut chain = vec![
            format!("lowpass=f={}", settings.lowpass_hz),
            format!("volume={:.4}", params.background_volume),
        ];
        if primary_label.is_none() {
            // Nothing to follow; stop the looped bed with the picture.
            if let Some(t) = end {
                chain.push(format!("atrim=end={:.3}", t / params.speed.max(0.01)));
            }
        }
        graph.push(format!("[{}:a]{}[bed]", idx, join_filters(&chain)));
        "bed"
    });

    match (primary_label, bed_label) {
        (Some(pa), Some(bed)) => {
            graph.push(format!(
                "[{}][{}]amix=inputs=2:duration=first:dropout_transition=2[outa]",
                pa, bed
            ));
            has_audio = true;
        }
        (Some(only), None) | (None, Some(only)) => {
            graph.push(format!("[{}]anull[outa]", only));
            has_audio = true;
        }
        (None, None) => {}
    }
    if has_audio {
        spec.maps.push("[outa]".into());
    }

    spec.filter_complex = Some(graph.join(";"));

    // 9. encode + strip
    spec.output_args.extend(encoder.video_args());
    if has_audio {
        spec.output_args.extend(encoder.audio_args());
        if primary_label.is_none() {
            spec.output_args.push("-shortest".into());
        }
    } else {
        spec.output_args.push("-an".into());
    }
    spec.output_args.extend(FilterSpec::strip_metadata_args());
    spec
}

/// `Final_<name>` inside `output_dir`, always with an `.mp4` extension.
pub fn output_path_for(primary: &Path, output_dir: &Path) -> PathBuf {
    let stem = primary
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clip".to_string());
    output_dir.join(format!("Final_{}.mp4", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::params::{JitterParams, JitterProfile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;

    fn job_in(dir: &Path) -> RenderJob {
        let primary = dir.join("main.mp4");
        fs::write(&primary, b"v").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        RenderJob::new(primary, dir.join("out.mp4"), JitterProfile::default().draw(&mut rng))
            .with_probe(Some(70.0), Some(true))
    }

    #[test]
    fn test_missing_secondary_yields_single_layer() {
        let dir = tempfile::tempdir().unwrap();
        let ghost = dir.path().join("ghost.mp4");
        let job = job_in(dir.path()).with_secondary(Some(ghost.clone()));
        let spec = build_chain(&job, &ChainSettings::default(), &EncoderProfile::default());

        assert_eq!(spec.inputs.len(), 1);
        assert!(!spec.references(&ghost));
        let graph = spec.filter_complex.unwrap();
        assert!(!graph.contains("[1:v]"));
        assert!(!graph.contains("overlay=540:0"));
        assert!(graph.contains("scale=1080:1080"));
    }

    #[test]
    fn test_full_layout_with_companions() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub.mp4");
        let bgm = dir.path().join("bed.mp3");
        fs::write(&sub, b"s").unwrap();
        fs::write(&bgm, b"a").unwrap();
        let job = job_in(dir.path())
            .with_secondary(Some(sub.clone()))
            .with_background(Some(bgm.clone()));
        let spec = build_chain(&job, &ChainSettings::default(), &EncoderProfile::default());

        assert_eq!(spec.inputs.len(), 3);
        assert!(spec.inputs[1].options.contains(&"-ss".to_string()));
        assert_eq!(spec.inputs[2].options, vec!["-stream_loop", "-1"]);
        let graph = spec.filter_complex.as_deref().unwrap();
        let order = ["trim=end=59.000", "fps=30", "eq=brightness", "noise=alls", "overlay=540:0", "[outv]"];
        let mut last = 0;
        for needle in order {
            let pos = graph.find(needle).unwrap_or_else(|| panic!("{} missing", needle));
            assert!(pos >= last, "{} out of order", needle);
            last = pos;
        }
        assert!(graph.contains("crop=540:1080:68:0"));
        assert!(graph.contains("if(lt(X,68),X/68*255,255)"));
        assert!(graph.contains("lowpass=f=800"));
        assert!(graph.contains("amix=inputs=2:duration=first"));
        assert_eq!(spec.maps, vec!["[outv]", "[outa]"]);
    }

    #[test]
    fn test_metadata_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let spec = build_chain(&job_in(dir.path()), &ChainSettings::default(), &EncoderProfile::default());
        let args = spec.output_args.join(" ");
        assert!(args.contains("-map_metadata -1"));
        assert!(args.contains("-map_chapters -1"));
        assert!(args.contains("-fflags +bitexact"));
    }

    #[test]
    fn test_speed_applies_to_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = job_in(dir.path());
        job.params = JitterParams {
            speed: 1.01,
            ..JitterParams::neutral()
        };
        let graph = build_chain(&job, &ChainSettings::default(), &EncoderProfile::default())
            .filter_complex
            .unwrap();
        assert!(graph.contains("setpts=PTS/1.010000"));
        assert!(graph.contains("atempo=1.010000"));
        assert!(!graph.contains("noise="));
    }

    #[test]
    fn test_silent_primary_uses_bed_or_drops_audio() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path()).with_probe(Some(10.0), Some(false));
        let spec = build_chain(&job, &ChainSettings::default(), &EncoderProfile::default());
        assert!(spec.output_args.contains(&"-an".to_string()));
        assert_eq!(spec.maps, vec!["[outv]"]);

        let bgm = dir.path().join("bed.wav");
        fs::write(&bgm, b"a").unwrap();
        let spec = build_chain(
            &job.with_background(Some(bgm)),
            &ChainSettings::default(),
            &EncoderProfile::default(),
        );
        let graph = spec.filter_complex.unwrap();
        assert!(!graph.contains("[0:a]"));
        assert!(graph.contains("[bed]anull[outa]"));
        assert!(spec.output_args.contains(&"-shortest".to_string()));
    }

    #[test]
    fn test_same_job_same_spec() {
        let dir = tempfile::tempdir().unwrap();
        let job = job_in(dir.path());
        let settings = ChainSettings::default();
        let encoder = EncoderProfile::default();
        assert_eq!(build_chain(&job, &settings, &encoder), build_chain(&job, &settings, &encoder));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path_for(Path::new("/in/clip.mov"), Path::new("/out")),
            PathBuf::from("/out/Final_clip.mp4")
        );
    }
}
