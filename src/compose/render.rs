// SYNOID Reels Scene Renderer
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Turns a Scene into one ffmpeg graph (colour canvas + overlay / drawtext /
// drawbox steps gated with enable=between, cues delayed and mixed), renders
// each scene to its own file and joins them with the concat demuxer.

use super::scene::{BarAnchor, Coord, ImageLook, Layer, LayerKind, ProgressBar, Rect, Scene, TextStyle};
use crate::color::Color;
use crate::dedup::params::even_dimension;
use crate::dedup::runner::{scratch_dir, JobRunner, RenderOutput};
use crate::graph::stages::{between, blur_radius, escape_drawtext, escape_filter_path, scale_graph};
use crate::graph::{FilterSpec, InputSpec};
use crate::media::EncoderProfile;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const AUDIO_RATE: u32 = 44_100;

struct GraphBuilder {
    spec: FilterSpec,
    graph: Vec<String>,
    current: String,
    next: usize,
}

impl GraphBuilder {
    fn label(&mut self, prefix: &str) -> String {
        self.next += 1;
        format!("{}{}", prefix, self.next)
    }

    /// Apply an in-place filter to the running canvas.
    fn draw(&mut self, filter: String) {
        let out = self.label("s");
        self.graph.push(format!("[{}]{}[{}]", self.current, filter, out));
        self.current = out;
    }

    /// Composite `[layer]` over the running canvas.
    fn overlay(&mut self, layer: &str, x: i64, y: i64, enable: &str) {
        let out = self.label("s");
        self.graph.push(format!(
            "[{}][{}]overlay=x={}:y={}:eof_action=pass{}[{}]",
            self.current, layer, x, y, enable, out
        ));
        self.current = out;
    }
}

fn enable_clause(layer: &Layer, duration: f64) -> String {
    if layer.timing.covers(duration) {
        String::new()
    } else {
        let (start, len) = layer.timing.window(duration);
        format!(":enable='{}'", between(start, len))
    }
}

fn drawbox(rect: Option<Rect>, color: Color, enable: &str) -> String {
    match rect {
        Some(r) => format!(
            "drawbox=x={}:y={}:w={}:h={}:color={}:t=fill{}",
            r.x,
            r.y,
            r.width.max(1),
            r.height.max(1),
            color.to_ffmpeg(),
            enable
        ),
        None => format!("drawbox=x=0:y=0:w=iw:h=ih:color={}:t=fill{}", color.to_ffmpeg(), enable),
    }
}

fn drawtext(text: &str, style: &TextStyle, x: Coord, y: Coord, enable: &str) -> String {
    let mut filter = String::from("drawtext=");
    if let Some(font) = &style.font_file {
        filter.push_str(&format!("fontfile='{}':", escape_filter_path(&font.to_string_lossy())));
    }
    filter.push_str(&format!(
        "text='{}':expansion=none:fontsize={}:fontcolor={}",
        escape_drawtext(text),
        style.size.max(1),
        style.color.to_ffmpeg()
    ));
    if let Some((color, width)) = style.stroke {
        filter.push_str(&format!(":borderw={}:bordercolor={}", width, color.to_ffmpeg()));
    }
    if let Some(color) = style.boxed {
        filter.push_str(&format!(":box=1:boxcolor={}:boxborderw=12", color.to_ffmpeg()));
    }
    let x = match x {
        Coord::Center => "(w-text_w)/2".to_string(),
        Coord::Px(v) => v.to_string(),
    };
    let y = match y {
        Coord::Center => "(h-text_h)/2".to_string(),
        Coord::Px(v) => v.to_string(),
    };
    filter.push_str(&format!(":x={}:y={}{}", x, y, enable));
    filter
}

/// Alpha expression for a bar's filled part at time `T` of its own clock.
pub fn bar_alpha(bar: &ProgressBar) -> String {
    let over = bar.over.max(0.001);
    let fraction = format!(
        "({:.3}+({:.3})*min(1,T/{:.3}))",
        bar.from.clamp(0.0, 1.0),
        bar.to.clamp(0.0, 1.0) - bar.from.clamp(0.0, 1.0),
        over
    );
    match bar.anchor {
        BarAnchor::Left => format!("if(lt(X,max(1,W*{})),255,0)", fraction),
        BarAnchor::Center => format!("if(lte(abs(X+0.5-W/2),max(0.5,W/2*{})),255,0)", fraction),
    }
}

/// Build the render graph of one scene. Layers whose files are missing are
/// left out with a warning.
pub fn scene_spec(scene: &Scene, encoder: &EncoderProfile) -> FilterSpec {
    let w = even_dimension(scene.width as f64);
    let h = even_dimension(scene.height as f64);
    let fps = scene.fps.max(1);
    let duration = scene.duration.max(0.1);

    let mut b = GraphBuilder {
        spec: FilterSpec::default(),
        graph: Vec::new(),
        current: "0:v".to_string(),
        next: 0,
    };
    b.spec.push_input(InputSpec::lavfi(&format!(
        "color=c={}:s={}x{}:r={}:d={:.3}",
        scene.background.to_ffmpeg(),
        w,
        h,
        fps,
        duration
    )));
    b.spec.push_input(
        InputSpec::lavfi(&format!("anullsrc=r={}:cl=stereo", AUDIO_RATE)).with_option("-t", format!("{:.3}", duration)),
    );

    for layer in &scene.layers {
        if let Some(path) = layer.source() {
            if !path.exists() {
                warn!("[COMPOSE] ⚠️ Layer source missing, skipped: {:?}", path);
                continue;
            }
        }
        let (start, len) = layer.timing.window(duration);
        if len <= 0.0 {
            continue;
        }
        let enable = enable_clause(layer, duration);

        match &layer.kind {
            LayerKind::Solid { color, rect } => b.draw(drawbox(*rect, *color, &enable)),
            LayerKind::Flash { color } => b.draw(drawbox(None, *color, &enable)),
            LayerKind::Text { text, style, x, y } => b.draw(drawtext(text, style, *x, *y, &enable)),
            LayerKind::Video {
                path,
                rect,
                policy,
                brightness,
                looped,
                seek,
                blur,
            } => {
                let mut input = if *looped {
                    InputSpec::looped(path)
                } else {
                    InputSpec::file(path)
                };
                if let Some(offset) = seek.filter(|s| *s > 0.0) {
                    input = input.with_option("-ss", format!("{:.3}", offset));
                }
                let idx = b.spec.push_input(input);
                let src = b.label("vsrc");
                let scaled = b.label("vsc");
                let out = b.label("l");
                b.graph.push(format!(
                    "[{}:v]trim=duration={:.3},setpts=PTS-STARTPTS,fps={}[{}]",
                    idx, len, fps, src
                ));
                b.graph.push(scale_graph(*policy, &src, &scaled, rect.width, rect.height));

                let mut post = Vec::new();
                if (brightness - 1.0).abs() > 1e-9 {
                    let k = brightness.max(0.0);
                    post.push(format!("colorchannelmixer=rr={k:.2}:gg={k:.2}:bb={k:.2}", k = k));
                }
                post.push(format!("setpts=PTS-STARTPTS+{:.3}/TB", start));
                if let Some((size, window)) = blur {
                    let radius = blur_radius(*size, rect.width.min(rect.height));
                    let (bs, bl) = window.window(duration);
                    post.push(format!("boxblur={}:1:enable='{}'", radius, between(bs, bl)));
                }
                b.graph.push(format!("[{}]{}[{}]", scaled, post.join(","), out));
                b.overlay(&out, rect.x, rect.y, &enable);
            }
            LayerKind::Image {
                path,
                rect,
                policy,
                look,
                contrast,
            } => {
                let idx = b.spec.push_input(
                    InputSpec::file(path)
                        .with_option("-loop", 1)
                        .with_option("-framerate", fps)
                        .with_option("-t", format!("{:.3}", len)),
                );
                let src = format!("{}:v", idx);
                let scaled = b.label("isc");
                let out = b.label("l");
                b.graph.push(scale_graph(*policy, &src, &scaled, rect.width, rect.height));

                let mut post = Vec::new();
                match look {
                    ImageLook::Plain => {}
                    ImageLook::Negative => post.push("negate".to_string()),
                    ImageLook::Grayscale => post.push("hue=s=0".to_string()),
                }
                if (contrast - 1.0).abs() > 1e-9 {
                    post.push(format!("eq=contrast={:.3}", contrast));
                }
                post.push(format!("setpts=PTS-STARTPTS+{:.3}/TB", start));
                b.graph.push(format!("[{}]{}[{}]", scaled, post.join(","), out));
                b.overlay(&out, rect.x, rect.y, &enable);
            }
            LayerKind::Bar(bar) => {
                if let Some(track) = bar.track {
                    b.draw(drawbox(Some(bar.rect), track, &enable));
                }
                let out = b.label("bar");
                b.graph.push(format!(
                    "color=c={}:s={}x{}:r={}:d={:.3},format=rgba,\
                     geq=r='r(X,Y)':g='g(X,Y)':b='b(X,Y)':a='{}',\
                     setpts=PTS-STARTPTS+{:.3}/TB[{}]",
                    bar.color.with_alpha(1.0).to_ffmpeg(),
                    bar.rect.width.max(1),
                    bar.rect.height.max(1),
                    fps,
                    len,
                    bar_alpha(bar),
                    start,
                    out
                ));
                b.overlay(&out, bar.rect.x, bar.rect.y, "");
            }
        }
    }
    b.graph.push(format!("[{}]format=yuv420p[outv]", b.current));

    let mut mix = vec!["[1:a]".to_string()];
    for cue in &scene.cues {
        if !cue.path.exists() {
            warn!("[COMPOSE] ⚠️ Sound missing, skipped: {:?}", cue.path);
            continue;
        }
        if cue.start >= duration {
            continue;
        }
        let room = duration - cue.start;
        let len = cue.loop_for.map(|l| l.min(room)).unwrap_or(room);
        let input = if cue.loop_for.is_some() {
            InputSpec::looped(&cue.path)
        } else {
            InputSpec::file(&cue.path)
        };
        let idx = b.spec.push_input(input);
        let out = b.label("c");
        let ms = (cue.start * 1000.0).round() as u64;
        b.graph.push(format!(
            "[{}:a]aformat=sample_rates={}:channel_layouts=stereo,atrim=duration={:.3},asetpts=PTS-STARTPTS,\
             volume={:.2},adelay={ms}|{ms}[{}]",
            idx,
            AUDIO_RATE,
            len,
            cue.volume,
            out,
            ms = ms
        ));
        mix.push(format!("[{}]", out));
    }
    if mix.len() == 1 {
        b.graph.push("[1:a]anull[outa]".to_string());
    } else {
        b.graph.push(format!(
            "{}amix=inputs={}:duration=first:normalize=0[outa]",
            mix.concat(),
            mix.len()
        ));
    }

    let mut spec = b.spec;
    spec.filter_complex = Some(b.graph.join(";"));
    spec.maps = vec!["[outv]".into(), "[outa]".into()];
    spec.output_args = vec!["-t".into(), format!("{:.3}", duration), "-r".into(), fps.to_string()];
    spec.output_args.extend(encoder.video_args());
    spec.output_args.extend(encoder.audio_args());
    spec.output_args.extend(["-ar".to_string(), AUDIO_RATE.to_string()]);
    spec.output_args.extend(FilterSpec::strip_metadata_args());
    spec
}

/// Concat demuxer list. Entries are file names relative to the list.
pub fn concat_manifest(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("file '{}'", name.replace('\'', "'\\''"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stream-copy the files listed in `manifest` into one output.
pub fn concat_spec(manifest: &Path) -> FilterSpec {
    let mut spec = FilterSpec::default();
    spec.push_input(InputSpec {
        options: vec!["-f".into(), "concat".into(), "-safe".into(), "0".into()],
        path: manifest.to_path_buf(),
    });
    spec.output_args = vec!["-c".into(), "copy".into()];
    spec.output_args.extend(FilterSpec::strip_metadata_args());
    spec
}

/// Render every scene, then join them in order into `output`.
pub async fn render_scenes(
    runner: &JobRunner,
    scenes: &[Scene],
    encoder: &EncoderProfile,
    output: &Path,
) -> Result<RenderOutput> {
    if scenes.is_empty() {
        bail!("No scenes to render for {:?}", output);
    }
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let scratch = scratch_dir(&parent)?;

    let mut parts = Vec::with_capacity(scenes.len());
    for (i, scene) in scenes.iter().enumerate() {
        let part = scratch.path().join(format!("scene_{:03}.mp4", i));
        runner
            .render(&scene_spec(scene, encoder), &part)
            .await
            .with_context(|| format!("Scene {} of {:?} failed", i + 1, output))?;
        parts.push(part);
    }

    let manifest = scratch.path().join("scenes.txt");
    std::fs::write(&manifest, concat_manifest(&parts))
        .with_context(|| format!("Failed to write {:?}", manifest))?;
    info!("[COMPOSE] Stitching {} scenes -> {:?}", parts.len(), output);
    runner.render(&concat_spec(&manifest), output).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::scene::{AudioCue, Timing};
    use crate::graph::ScalePolicy;

    fn scene() -> Scene {
        Scene::new(1080, 1920, 3.5)
    }

    #[test]
    fn test_empty_scene_is_canvas_and_silence() {
        let spec = scene_spec(&scene(), &EncoderProfile::default());
        assert_eq!(spec.inputs.len(), 2);
        assert_eq!(spec.inputs[0].path, PathBuf::from("color=c=0x000000:s=1080x1920:r=30:d=3.500"));
        let graph = spec.filter_complex.unwrap();
        assert_eq!(graph, "[0:v]format=yuv420p[outv];[1:a]anull[outa]");
        assert!(spec.output_args.contains(&"-map_metadata".to_string()));
    }

    #[test]
    fn test_text_is_gated_and_escaped() {
        let mut s = scene();
        s.push(
            Layer::caption("IT'S 10:30", TextStyle::new(90, Color::YELLOW), 1150).during(Timing::at(2.5, 1.0)),
        );
        let graph = scene_spec(&s, &EncoderProfile::default()).filter_complex.unwrap();
        assert!(graph.contains("text='IT\u{2019}S 10\\:30':expansion=none:fontsize=90:fontcolor=0xFFFF00"));
        assert!(graph.contains(":x=(w-text_w)/2:y=1150:enable='between(t,2.500,3.500)'"));
    }

    #[test]
    fn test_missing_sources_are_skipped() {
        let mut s = scene();
        s.push(Layer::new(LayerKind::Image {
            path: "/definitely/missing.jpg".into(),
            rect: Rect::new(0, 0, 1080, 960),
            policy: ScalePolicy::Fill,
            look: ImageLook::Plain,
            contrast: 1.2,
        }));
        s.cue(AudioCue::at("/definitely/missing.mp3", 0.0));
        let spec = scene_spec(&s, &EncoderProfile::default());
        assert_eq!(spec.inputs.len(), 2);
        assert!(!spec.references(Path::new("/definitely/missing.jpg")));
    }

    #[test]
    fn test_cues_are_delayed_and_mixed() {
        let dir = tempfile::tempdir().unwrap();
        let tick = dir.path().join("tick.mp3");
        std::fs::write(&tick, b"x").unwrap();
        let mut s = scene();
        s.cue(AudioCue::at(&tick, 0.0));
        s.cue(AudioCue::at(&tick, 2.0).volume(0.6));
        s.cue(AudioCue::at(&tick, 1.0).looped(7.0));
        let spec = scene_spec(&s, &EncoderProfile::default());
        assert_eq!(spec.inputs.len(), 5);
        assert_eq!(spec.inputs[4].options, vec!["-stream_loop".to_string(), "-1".to_string()]);
        let graph = spec.filter_complex.unwrap();
        assert!(graph.contains("volume=0.60,adelay=2000|2000"));
        // looped cue is cut to what is left of the scene
        assert!(graph.contains("atrim=duration=2.500,asetpts=PTS-STARTPTS,volume=1.00,adelay=1000|1000"));
        assert!(graph.contains("amix=inputs=4:duration=first:normalize=0[outa]"));
    }

    #[test]
    fn test_bar_alpha_never_collapses() {
        let bar = ProgressBar {
            rect: Rect::centered_x(1080, 1400, 900, 20),
            color: Color::YELLOW,
            track: None,
            from: 1.0,
            to: 0.0,
            over: 2.5,
            anchor: BarAnchor::Center,
        };
        assert_eq!(
            bar_alpha(&bar),
            "if(lte(abs(X+0.5-W/2),max(0.5,W/2*(1.000+(-1.000)*min(1,T/2.500)))),255,0)"
        );
        let mut s = scene();
        s.push(Layer::new(LayerKind::Bar(bar)).during(Timing::at(0.0, 2.5)));
        let graph = scene_spec(&s, &EncoderProfile::default()).filter_complex.unwrap();
        assert!(graph.contains("color=c=0xFFFF00:s=900x20:r=30:d=2.500,format=rgba,geq="));
        assert!(graph.contains("overlay=x=90:y=1400:eof_action=pass"));
    }

    #[test]
    fn test_concat_manifest_is_relative_and_quoted() {
        let parts = vec![PathBuf::from("/tmp/x/scene_000.mp4"), PathBuf::from("/tmp/x/it's.mp4")];
        assert_eq!(concat_manifest(&parts), "file 'scene_000.mp4'\nfile 'it'\\''s.mp4'");
        let spec = concat_spec(Path::new("/tmp/x/scenes.txt"));
        assert_eq!(spec.inputs[0].options, vec!["-f", "concat", "-safe", "0"]);
        assert_eq!(&spec.output_args[..2], &["-c".to_string(), "copy".to_string()]);
    }

    #[tokio::test]
    async fn test_render_scenes_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let runner = JobRunner::new("__no_ffmpeg__");
        let out = dir.path().join("o.mp4");
        assert!(render_scenes(&runner, &[], &EncoderProfile::default(), &out).await.is_err());
    }
}
