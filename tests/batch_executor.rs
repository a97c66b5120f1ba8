// SYNOID Reels Batch Executor Tests
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// A shell script stands in for ffmpeg: it writes its last argument (the
// staged output) and fails for any job whose arguments mention "broken".

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use synoid_reels::dedup::job::tally;
use synoid_reels::dedup::{BatchDirs, BatchExecutor, ChainSettings, JitterProfile, JobRunner};
use synoid_reels::media::EncoderProfile;

fn fake_ffmpeg(dir: &Path) -> PathBuf {
    let script = dir.join("fake-ffmpeg.sh");
    let body = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    *broken*) echo "decode error" >&2; exit 1 ;;
  esac
  last="$arg"
done
printf 'rendered %s' "$last" > "$last"
"#;
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn executor(ffmpeg: &Path, workers: usize) -> BatchExecutor {
    BatchExecutor::new(
        JobRunner::new(ffmpeg.to_string_lossy().to_string()),
        "__no_ffprobe__",
        ChainSettings::default(),
        EncoderProfile::default(),
        workers,
    )
}

fn names(dir: &Path) -> Vec<String> {
    let mut found: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    found.sort();
    found
}

#[tokio::test]
async fn test_every_clip_gets_exactly_one_result() {
    let tools = tempfile::tempdir().unwrap();
    let ffmpeg = fake_ffmpeg(tools.path());
    let media = tempfile::tempdir().unwrap();
    for i in 0..5 {
        std::fs::write(media.path().join(format!("clip_{}.mp4", i)), b"video").unwrap();
    }

    let exec = executor(&ffmpeg, 3);
    assert_eq!(exec.workers(), 3);
    let dirs = BatchDirs::new(media.path());
    let results = exec.process_dir(&dirs, &JitterProfile::default()).await;

    assert_eq!(results.len(), 5);
    assert_eq!(tally(&results), (5, 0));
    assert_eq!(
        names(&dirs.output),
        vec![
            "Final_clip_0.mp4",
            "Final_clip_1.mp4",
            "Final_clip_2.mp4",
            "Final_clip_3.mp4",
            "Final_clip_4.mp4"
        ]
    );
}

#[tokio::test]
async fn test_failure_is_isolated() {
    let tools = tempfile::tempdir().unwrap();
    let ffmpeg = fake_ffmpeg(tools.path());
    let media = tempfile::tempdir().unwrap();
    for name in ["a.mp4", "b.mp4", "broken.mp4", "c.mov"] {
        std::fs::write(media.path().join(name), b"video").unwrap();
    }

    let dirs = BatchDirs::new(media.path());
    let results = executor(&ffmpeg, 2).process_dir(&dirs, &JitterProfile::default()).await;

    assert_eq!(results.len(), 4);
    assert_eq!(tally(&results), (3, 1));
    let failed = results.iter().find(|r| !r.is_success()).unwrap();
    assert!(failed.input.ends_with("broken.mp4"));
    assert!(failed.outcome.as_ref().unwrap_err().contains("decode error"));
    // neither a partial render nor a scratch directory survives
    assert_eq!(names(&dirs.output), vec!["Final_a.mp4", "Final_b.mp4", "Final_c.mp4"]);
}

#[tokio::test]
async fn test_missing_companions_do_not_fail_the_batch() {
    let tools = tempfile::tempdir().unwrap();
    let ffmpeg = fake_ffmpeg(tools.path());
    let media = tempfile::tempdir().unwrap();
    std::fs::write(media.path().join("only.mp4"), b"video").unwrap();

    let mut dirs = BatchDirs::new(media.path());
    dirs.secondary = Some(media.path().join("no-such-secondary"));
    dirs.background = Some(media.path().join("no-such-bgm"));
    let results = executor(&ffmpeg, 9).process_dir(&dirs, &JitterProfile::default()).await;

    assert_eq!(tally(&results), (1, 0));
}

#[tokio::test]
async fn test_empty_directory_skips_batch() {
    let tools = tempfile::tempdir().unwrap();
    let ffmpeg = fake_ffmpeg(tools.path());
    let media = tempfile::tempdir().unwrap();
    let dirs = BatchDirs::new(media.path().join("nothing-here"));
    let results = executor(&ffmpeg, 3).process_dir(&dirs, &JitterProfile::default()).await;
    assert!(results.is_empty());
    assert!(!dirs.output.exists());
}
