// SYNOID Reels Scene Model
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Object-based description of a templated video: a canvas, layers drawn
// bottom to top, each visible for a time window, and audio cues placed on
// the same timeline.

use crate::color::Color;
use crate::graph::ScalePolicy;
use std::path::PathBuf;

/// When a layer is visible, in scene seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub start: f64,
    /// `None` = until the end of the scene
    pub duration: Option<f64>,
}

impl Timing {
    pub const ALWAYS: Timing = Timing {
        start: 0.0,
        duration: None,
    };

    pub fn at(start: f64, duration: f64) -> Self {
        Self {
            start: start.max(0.0),
            duration: Some(duration.max(0.0)),
        }
    }

    pub fn from(start: f64) -> Self {
        Self {
            start: start.max(0.0),
            duration: None,
        }
    }

    /// `(start, length)` clipped to a scene of `scene_duration` seconds.
    pub fn window(&self, scene_duration: f64) -> (f64, f64) {
        let start = self.start.min(scene_duration);
        let end = match self.duration {
            Some(d) => (start + d).min(scene_duration),
            None => scene_duration,
        };
        (start, (end - start).max(0.0))
    }

    /// True when the layer is on screen for the whole scene.
    pub fn covers(&self, scene_duration: f64) -> bool {
        let (start, len) = self.window(scene_duration);
        start <= 0.0 && len >= scene_duration
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::ALWAYS
    }
}

/// A horizontal or vertical position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coord {
    /// Centred on the canvas along this axis
    Center,
    Px(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// A `width`x`height` box centred on a canvas of `canvas_width` at `y`.
    pub fn centered_x(canvas_width: u32, y: i64, width: u32, height: u32) -> Self {
        Self::new((canvas_width as i64 - width as i64) / 2, y, width, height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: u32,
    pub color: Color,
    /// Outline colour and width in pixels
    pub stroke: Option<(Color, u32)>,
    /// Filled box behind the text
    pub boxed: Option<Color>,
    pub font_file: Option<PathBuf>,
}

impl TextStyle {
    pub fn new(size: u32, color: Color) -> Self {
        Self {
            size,
            color,
            stroke: None,
            boxed: None,
            font_file: None,
        }
    }

    pub fn stroked(mut self, color: Color, width: u32) -> Self {
        self.stroke = Some((color, width));
        self
    }

    pub fn boxed(mut self, color: Color) -> Self {
        self.boxed = Some(color);
        self
    }

    pub fn with_font(mut self, font: Option<PathBuf>) -> Self {
        self.font_file = font;
        self
    }
}

/// Tonal treatment of a still image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageLook {
    #[default]
    Plain,
    Negative,
    Grayscale,
}

/// Which edge a progress bar grows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarAnchor {
    Left,
    /// Shrinks or grows symmetrically around the middle
    Center,
}

/// A bar whose filled fraction moves linearly from `from` to `to` over
/// `over` seconds and then holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBar {
    pub rect: Rect,
    pub color: Color,
    /// Unfilled track drawn underneath
    pub track: Option<Color>,
    pub from: f64,
    pub to: f64,
    pub over: f64,
    pub anchor: BarAnchor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind {
    /// Filled rectangle; the whole canvas when `rect` is `None`
    Solid { color: Color, rect: Option<Rect> },
    /// A moving clip scaled into `rect`
    Video {
        path: PathBuf,
        rect: Rect,
        policy: ScalePolicy,
        /// Channel multiplier, 1.0 = untouched
        brightness: f64,
        looped: bool,
        /// Start this many seconds into the file
        seek: Option<f64>,
        /// Box blur of roughly this many pixels for the given window
        blur: Option<(f64, Timing)>,
    },
    /// A still scaled into `rect`
    Image {
        path: PathBuf,
        rect: Rect,
        policy: ScalePolicy,
        look: ImageLook,
        contrast: f64,
    },
    Text {
        text: String,
        style: TextStyle,
        x: Coord,
        y: Coord,
    },
    Bar(ProgressBar),
    /// Full-frame colour wash
    Flash { color: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub timing: Timing,
}

impl Layer {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            timing: Timing::ALWAYS,
        }
    }

    pub fn during(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn solid(color: Color) -> Self {
        Self::new(LayerKind::Solid { color, rect: None })
    }

    pub fn rect(color: Color, rect: Rect) -> Self {
        Self::new(LayerKind::Solid {
            color,
            rect: Some(rect),
        })
    }

    pub fn text(text: impl Into<String>, style: TextStyle, x: Coord, y: Coord) -> Self {
        Self::new(LayerKind::Text {
            text: text.into(),
            style,
            x,
            y,
        })
    }

    /// Horizontally centred text at `y`.
    pub fn caption(text: impl Into<String>, style: TextStyle, y: i64) -> Self {
        Self::text(text, style, Coord::Center, Coord::Px(y))
    }

    /// Files this layer reads, if any.
    pub fn source(&self) -> Option<&PathBuf> {
        match &self.kind {
            LayerKind::Video { path, .. } | LayerKind::Image { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// A sound placed on the scene timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    pub path: PathBuf,
    pub start: f64,
    pub volume: f64,
    /// Repeat the file to fill this many seconds
    pub loop_for: Option<f64>,
}

impl AudioCue {
    pub fn at(path: impl Into<PathBuf>, start: f64) -> Self {
        Self {
            path: path.into(),
            start: start.max(0.0),
            volume: 1.0,
            loop_for: None,
        }
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume.max(0.0);
        self
    }

    pub fn looped(mut self, seconds: f64) -> Self {
        self.loop_for = Some(seconds.max(0.0));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration: f64,
    pub background: Color,
    pub layers: Vec<Layer>,
    pub cues: Vec<AudioCue>,
}

impl Scene {
    pub fn new(width: u32, height: u32, duration: f64) -> Self {
        Self {
            width,
            height,
            fps: 30,
            duration,
            background: Color::BLACK,
            layers: Vec::new(),
            cues: Vec::new(),
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    pub fn push(&mut self, layer: Layer) -> &mut Self {
        self.layers.push(layer);
        self
    }

    pub fn cue(&mut self, cue: AudioCue) -> &mut Self {
        self.cues.push(cue);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_window_is_clipped() {
        assert_eq!(Timing::at(2.5, 1.0).window(3.0), (2.5, 0.5));
        assert_eq!(Timing::from(1.0).window(4.0), (1.0, 3.0));
        assert_eq!(Timing::at(5.0, 1.0).window(3.0), (3.0, 0.0));
        assert!(Timing::ALWAYS.covers(3.0));
        assert!(!Timing::at(0.0, 2.0).covers(3.0));
    }

    #[test]
    fn test_centered_rect() {
        let r = Rect::centered_x(1080, 1400, 900, 20);
        assert_eq!(r.x, 90);
    }
}
