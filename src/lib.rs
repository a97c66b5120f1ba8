// SYNOID Reels Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod audio;
pub mod color;
pub mod compose;
pub mod config;
pub mod dedup;
pub mod fetch;
pub mod graph;
pub mod localize;
pub mod makers;
pub mod media;
pub mod merge;
pub mod pipeline;
pub mod process;
pub mod react;
pub mod voice;
