// SYNOID Reels Dedup - Randomized Filter-Chain Batch Processor
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Asset Selector -> Parameter Randomizer -> Filter Chain Builder
// -> Job Runner -> Batch Executor

pub mod batch;
pub mod filter;
pub mod job;
pub mod params;
pub mod runner;

pub use batch::{BatchDirs, BatchExecutor};
pub use filter::{build_chain, ChainSettings};
pub use job::{BatchResult, RenderJob};
pub use params::{JitterParams, JitterProfile, JitterRange};
pub use runner::{JobRunner, RenderOutput};
