// SYNOID Reels Filter Chain Tests
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use synoid_reels::dedup::batch::plan_jobs;
use synoid_reels::dedup::{build_chain, BatchDirs, ChainSettings, JitterProfile};
use synoid_reels::graph::FilterSpec;
use synoid_reels::media::EncoderProfile;

/// Every `[N:v]` / `[N:a]` label must name an input that exists.
fn input_refs_valid(spec: &FilterSpec) -> bool {
    let graph = spec.filter_complex.as_deref().unwrap_or("");
    graph.split('[').skip(1).all(|label| {
        match label.split_once(':') {
            Some((idx, rest)) if rest.starts_with("v]") || rest.starts_with("a]") => idx
                .parse::<usize>()
                .map(|i| i < spec.inputs.len())
                .unwrap_or(false),
            _ => true,
        }
    })
}

fn touch(dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    for n in names {
        std::fs::write(dir.join(n), b"x").unwrap();
    }
}

#[test]
fn test_random_plans_always_build_consistent_graphs() {
    let root = tempfile::tempdir().unwrap();
    touch(&root.path().join("main"), &["1.mp4", "2.mp4", "3.mov"]);
    touch(&root.path().join("sub"), &["s1.mp4", "s2.mp4"]);
    touch(&root.path().join("bgm"), &["Noise_white.wav", "Noise_pink.wav"]);

    let dirs = BatchDirs {
        secondary: Some(root.path().join("sub")),
        background: Some(root.path().join("bgm")),
        ..BatchDirs::new(root.path().join("main"))
    };
    let profile = JitterProfile::default();
    let settings = ChainSettings::default();
    let encoder = EncoderProfile::default();

    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let jobs = plan_jobs(&dirs, &profile, &mut rng).unwrap();
        assert_eq!(jobs.len(), 3);
        for job in &jobs {
            assert!(profile.speed.contains(job.params.speed));
            assert!(profile.background_volume.contains(job.params.background_volume));
            let spec = build_chain(job, &settings, &encoder);
            assert_eq!(spec.inputs.len(), 3);
            assert!(input_refs_valid(&spec), "{:?}", spec.filter_complex);
            assert!(spec.output_args.windows(2).any(|w| w == ["-map_metadata", "-1"]));
            assert_eq!(spec, build_chain(job, &settings, &encoder));
        }
    }
}

#[test]
fn test_missing_companion_dirs_give_single_layer_jobs() {
    let root = tempfile::tempdir().unwrap();
    touch(&root.path().join("main"), &["only.mp4"]);
    let dirs = BatchDirs {
        secondary: Some(root.path().join("absent-sub")),
        background: Some(root.path().join("absent-bgm")),
        ..BatchDirs::new(root.path().join("main"))
    };
    let mut rng = StdRng::seed_from_u64(7);
    let jobs = plan_jobs(&dirs, &JitterProfile::default(), &mut rng).unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].secondary.is_none() && jobs[0].background_audio.is_none());

    let spec = build_chain(&jobs[0], &ChainSettings::default(), &EncoderProfile::default());
    assert_eq!(spec.inputs.len(), 1);
    assert!(input_refs_valid(&spec));
    assert!(spec.filter_complex.unwrap().contains("[0:a]"));
}

#[test]
fn test_silent_primary_without_bed_drops_audio() {
    let root = tempfile::tempdir().unwrap();
    touch(&root.path().join("main"), &["mute.mp4"]);
    let dirs = BatchDirs::new(root.path().join("main"));
    let mut rng = StdRng::seed_from_u64(3);
    let job = plan_jobs(&dirs, &JitterProfile::default(), &mut rng)
        .unwrap()
        .remove(0)
        .with_probe(Some(30.0), Some(false));

    let spec = build_chain(&job, &ChainSettings::default(), &EncoderProfile::default());
    assert!(spec.output_args.contains(&"-an".to_string()));
    assert_eq!(spec.maps, vec!["[outv]".to_string()]);
    assert!(!spec.filter_complex.unwrap().contains(":a]"));
}
