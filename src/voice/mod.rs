// SYNOID Reels Voice
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod transcription;
pub mod tts;

pub use transcription::{generate_srt, TranscriptSegment, Transcriber};
pub use tts::{Language, SpeechClip, SpeechRequest, TtsEngine};
