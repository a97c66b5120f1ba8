// SYNOID Reels Filter Graph
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod spec;
pub mod stages;

pub use spec::{FilterSpec, InputSpec};
pub use stages::{ScalePolicy, TrimPolicy};
