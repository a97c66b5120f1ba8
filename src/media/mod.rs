// SYNOID Reels Media Module
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod assets;
pub mod encoder;
pub mod probe;

pub use assets::{discover, pick, pick_from_dir, NoAssets};
pub use encoder::EncoderProfile;
pub use probe::{probe, MediaAsset};
