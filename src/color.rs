// SYNOID Reels Color
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use anyhow::{bail, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An sRGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 = transparent, 1.0 = opaque
    pub alpha: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const GREY: Color = Color::rgb(50, 50, 50);
    pub const MIDNIGHT: Color = Color::rgb(20, 20, 30);
    pub const CHROMA_GREEN: Color = Color::rgb(0, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Invalid hex colour '{}'", hex);
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `0xRRGGBB` or `0xRRGGBB@0.50`, the form ffmpeg filters accept.
    pub fn to_ffmpeg(&self) -> String {
        if self.alpha >= 1.0 {
            format!("0x{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("0x{:02X}{:02X}{:02X}@{:.2}", self.r, self.g, self.b, self.alpha)
        }
    }

    /// `&HAABBGGRR` for ASS/SSA subtitle styles; alpha is inverted there.
    pub fn to_ass(&self) -> String {
        let transparency = ((1.0 - self.alpha.clamp(0.0, 1.0)) * 255.0).round() as u8;
        format!("&H{:02X}{:02X}{:02X}{:02X}", transparency, self.b, self.g, self.r)
    }

    /// Multiply each channel, saturating at 255.
    pub fn scaled(&self, factor: f32) -> Self {
        let mul = |c: u8| ((c as f32) * factor).round().clamp(0.0, 255.0) as u8;
        Self {
            r: mul(self.r),
            g: mul(self.g),
            b: mul(self.b),
            alpha: self.alpha,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip_forms() {
        assert_eq!(Color::from_hex("#FFFF00").unwrap(), Color::YELLOW);
        assert_eq!(Color::from_hex("ff0000").unwrap(), Color::RED);
        assert!(Color::from_hex("#FFF").is_err());
        assert!(Color::from_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_ffmpeg_form() {
        assert_eq!(Color::YELLOW.to_ffmpeg(), "0xFFFF00");
        assert_eq!(Color::WHITE.with_alpha(0.5).to_ffmpeg(), "0xFFFFFF@0.50");
    }

    #[test]
    fn test_ass_form() {
        assert_eq!(Color::YELLOW.to_ass(), "&H0000FFFF");
        assert_eq!(Color::rgb(1, 2, 3).to_ass(), "&H00030201");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let c: Color = serde_json::from_str("\"#191923\"").unwrap();
        assert_eq!(c, Color::rgb(25, 25, 35));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#191923\"");
    }
}
