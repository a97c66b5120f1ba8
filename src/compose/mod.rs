// SYNOID Reels Compose
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod render;
pub mod scene;

pub use render::{render_scenes, scene_spec};
pub use scene::{AudioCue, BarAnchor, Coord, ImageLook, Layer, LayerKind, ProgressBar, Rect, Scene, TextStyle, Timing};
