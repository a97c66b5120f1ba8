// SYNOID Reels Audio
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod noise;

pub use noise::{generate_beds, write_silence, NoiseKind};
