// SYNOID Reels Makers - Templated Generators
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Each maker turns a small piece of content (a question bank, a day of
// would-you-rather prompts, an illusion image, an existing clip) into
// Scenes and hands them to the compose renderer.

pub mod challenge;
pub mod fakeout;
pub mod illusion;
pub mod quiz;
pub mod speedrun;

use crate::compose::TextStyle;
use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Vertical shorts canvas.
pub const SHORTS_WIDTH: u32 = 1080;
pub const SHORTS_HEIGHT: u32 = 1920;

/// Shared sound effects and fonts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MakerAssets {
    pub sfx_dir: PathBuf,
    /// Bold display font for captions; ffmpeg's default when unset
    pub text_font: Option<PathBuf>,
    /// Font used for emoji lines
    pub emoji_font: Option<PathBuf>,
}

impl Default for MakerAssets {
    fn default() -> Self {
        Self {
            sfx_dir: PathBuf::from("assets/sfx"),
            text_font: None,
            emoji_font: None,
        }
    }
}

impl MakerAssets {
    pub fn tick(&self) -> PathBuf {
        self.sfx_dir.join("tick.mp3")
    }

    pub fn boom(&self) -> PathBuf {
        self.sfx_dir.join("boom.mp3")
    }

    pub fn ding(&self) -> PathBuf {
        self.sfx_dir.join("success.mp3")
    }

    /// Caption style: `color` fill with a black outline.
    pub fn caption(&self, size: u32, color: Color) -> TextStyle {
        TextStyle::new(size, color)
            .stroked(Color::BLACK, (size / 16).max(2))
            .with_font(self.text_font.clone())
    }

    pub fn emoji(&self, size: u32) -> TextStyle {
        TextStyle::new(size, Color::WHITE).with_font(self.emoji_font.clone())
    }
}
