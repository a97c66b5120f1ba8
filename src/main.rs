// SYNOID Reels Main Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use synoid_reels::audio::generate_beds;
use synoid_reels::audio::noise::DEFAULT_BED_SECONDS;
use synoid_reels::config::ReelsConfig;
use synoid_reels::dedup::job::tally;
use synoid_reels::dedup::{BatchDirs, BatchExecutor, BatchResult, JobRunner};
use synoid_reels::fetch::http::{client, default_gameplay, default_sfx, download_assets, AssetStatus, GAMEPLAY_MIN_BYTES};
use synoid_reels::fetch::ytdlp::resolve_command;
use synoid_reels::fetch::download_collection;
use synoid_reels::localize::localize;
use synoid_reels::makers::{challenge, fakeout, illusion, quiz, speedrun};
use synoid_reels::media::{probe, EncoderProfile};
use synoid_reels::voice::{Language, TtsEngine};
use synoid_reels::{merge, pipeline, react};

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "synoid-reels")]
#[command(about = "SYNOID Reels - short-form video batch toolkit", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults to $SYNOID_REELS_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remix every clip in a directory with randomized filters
    Dedup {
        /// Directory of primary clips
        #[arg(short, long)]
        input: PathBuf,

        /// Directory of overlay clips
        #[arg(short, long)]
        secondary: Option<PathBuf>,

        /// Directory of background beds
        #[arg(short, long)]
        background: Option<PathBuf>,

        /// Output directory (default: <input>/target)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Parallel renders (1-4)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Run configured tasks: clean, fetch, dedup
    Task {
        /// Task names; every configured task when empty
        names: Vec<String>,
    },

    /// Download a profile or playlist with archive tracking
    Fetch {
        #[arg(short, long)]
        url: String,

        #[arg(short, long)]
        dir: PathBuf,

        /// Override the per-run download cap
        #[arg(long)]
        max: Option<u32>,
    },

    /// Download the sound effects the generators use
    Sfx {
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Also fetch the gameplay loops for `speedrun --gameplay`
        #[arg(long)]
        gameplay: bool,
    },

    /// Join a directory of clips into one landscape compilation
    Merge {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Reaction remix in 59 second parts
    React {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Synthesize background noise beds
    Noise {
        #[arg(short, long, default_value = "assets/bgm")]
        dir: PathBuf,

        /// Length of each bed in seconds
        #[arg(short, long, default_value_t = DEFAULT_BED_SECONDS)]
        seconds: u32,
    },

    /// Dub, subtitle and reframe a clip into another language
    Localize {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value = "en")]
        lang: Language,
    },

    /// Emoji movie quiz videos from a question bank
    Quiz {
        /// Question bank JSON
        #[arg(short, long)]
        bank: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Would-you-rather speedrun videos
    Speedrun {
        #[arg(short, long)]
        output: PathBuf,

        /// Day bank JSON (built-in calendar when absent)
        #[arg(long)]
        days: Option<PathBuf>,

        /// Only this day
        #[arg(short, long)]
        day: Option<u32>,

        /// Question on top, random gameplay loop underneath
        #[arg(long)]
        gameplay: bool,
    },

    /// Afterimage illusion + odd-one-out hooks
    Illusion {
        #[arg(short, long)]
        output: PathBuf,

        /// Only this day key (e.g. day3)
        #[arg(short, long)]
        day: Option<String>,
    },

    /// Fake loading-failure hook on an existing clip
    Fakeout {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Challenge-text + emoji hook over the head of a clip
    Challenge {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// The dare shown over the blurred opening
        #[arg(short, long, default_value = "99% FAIL THIS LEVEL!")]
        text: String,

        #[arg(short, long, default_value = "🍿🦁👑")]
        emoji: String,
    },

    /// Print what ffprobe reports for a file
    Probe { input: PathBuf },

    /// Show which H.264 encoder will be used
    Encoders,
}

fn report(label: &str, results: &[BatchResult]) {
    let (ok, failed) = tally(results);
    for r in results {
        match &r.outcome {
            Ok(out) => info!("[{}] ✅ {:?} -> {:?}", label, r.input, out),
            Err(e) => error!("[{}] ❌ {:?}: {}", label, r.input, e),
        }
    }
    println!("🏁 {}: {} succeeded, {} failed", label, ok, failed);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,reqwest=warn,hyper=warn");
    }
    tracing_subscriber::fmt::init();

    // Global panic handler: log panics instead of crashing silently
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("🚨 [SYNOID PANIC] at {}: {}", location, message);
    }));

    let args = Cli::parse();
    let config = ReelsConfig::load(args.config.as_deref())?;
    let tools = &config.tools;

    info!("--- SYNOID REELS v{} ---", env!("CARGO_PKG_VERSION"));

    match args.command {
        Commands::Dedup {
            input,
            secondary,
            background,
            output,
            workers,
        } => {
            let encoder = config.encoder().await;
            let executor = BatchExecutor::new(
                JobRunner::new(tools.ffmpeg.clone()),
                tools.ffprobe.clone(),
                config.chain.clone(),
                encoder,
                workers.unwrap_or(config.workers),
            );
            let mut dirs = BatchDirs::new(input);
            dirs.secondary = secondary.or_else(|| config.secondary_dir.clone());
            dirs.background = background.or_else(|| config.bgm_dir.clone());
            if let Some(out) = output {
                dirs.output = out;
            }
            let results = executor.process_dir(&dirs, &config.jitter).await;
            report("DEDUP", &results);
        }
        Commands::Task { names } => {
            let selected: Vec<_> = if names.is_empty() {
                config.tasks.iter().collect()
            } else {
                let mut picked = Vec::new();
                for name in &names {
                    match config.task(name) {
                        Some(task) => picked.push(task),
                        None => warn!("[TASK] Unknown task '{}'", name),
                    }
                }
                picked
            };
            if selected.is_empty() {
                warn!("[TASK] Nothing to run; add tasks to the configuration");
                return Ok(());
            }
            let ytdlp = resolve_command(&tools.yt_dlp, &tools.python).await;
            let executor = BatchExecutor::new(
                JobRunner::new(tools.ffmpeg.clone()),
                tools.ffprobe.clone(),
                config.chain.clone(),
                config.encoder().await,
                config.workers,
            );
            for task in selected {
                match pipeline::run_task(task, &config, &ytdlp, &executor).await {
                    Ok(results) => report(&task.name, &results),
                    Err(e) => error!("[TASK] ❌ {}: {:#}", task.name, e),
                }
            }
        }
        Commands::Fetch { url, dir, max } => {
            let ytdlp = resolve_command(&tools.yt_dlp, &tools.python).await;
            let mut opts = config.fetch.clone();
            if max.is_some() {
                opts.max_downloads = max;
            }
            let outcome = download_collection(&ytdlp, &url, &dir, &opts).await?;
            println!("📥 Fetch finished: {:?}", outcome);
        }
        Commands::Sfx { dir, gameplay } => {
            let dir = dir.unwrap_or_else(|| config.assets.sfx_dir.clone());
            let http = client()?;
            let mut statuses = download_assets(&http, &default_sfx(), &dir, 1024).await?;
            if gameplay {
                let gameplay_assets = default_gameplay();
                let loops = download_assets(&http, &gameplay_assets, &config.speedrun.gameplay.dir, GAMEPLAY_MIN_BYTES);
                statuses.extend(loops.await?);
            }
            for (path, status) in statuses {
                match status {
                    AssetStatus::AlreadyPresent => println!("✅ {:?} (present)", path),
                    AssetStatus::Downloaded { bytes } => println!("⬇️ {:?} ({} bytes)", path, bytes),
                    AssetStatus::Failed(e) => println!("❌ {:?}: {}", path, e),
                }
            }
        }
        Commands::Merge { input, output } => {
            let encoder = config.encoder().await;
            let runner = JobRunner::new(tools.ffmpeg.clone());
            let merged = merge::merge_compilation(&input, &output, &config.merge, &tools.ffprobe, &runner, &encoder).await?;
            println!(
                "🔗 Merged {} clips into {:?} ({} failed)",
                merged.joined, merged.output, merged.failed
            );
        }
        Commands::React { input, output } => {
            let encoder = config.encoder().await;
            let runner = JobRunner::new(tools.ffmpeg.clone());
            let ytdlp = resolve_command(&tools.yt_dlp, &tools.python).await;
            let reaction = react::ensure_reaction_clip(&config.react, &ytdlp).await;
            let results = react::react_dir(
                &input,
                &output,
                &config.react,
                reaction.as_deref(),
                &tools.ffprobe,
                &runner,
                &encoder,
            )
            .await;
            report("REACT", &results);
        }
        Commands::Noise { dir, seconds } => {
            let dir_for_task = dir.clone();
            let beds = tokio::task::spawn_blocking(move || generate_beds(&dir_for_task, seconds)).await??;
            println!("🎧 {} noise beds ready in {:?}", beds.len(), dir);
        }
        Commands::Localize { input, output, lang } => {
            let encoder = config.encoder().await;
            tokio::fs::create_dir_all(&output).await?;
            let parts = localize(&input, &output, lang, tools, &config.localize, &encoder).await?;
            for part in &parts {
                println!("🌍 {:?}", part);
            }
        }
        Commands::Quiz { bank, output } => {
            let items = quiz::load_bank(&bank)?;
            let encoder = config.encoder().await;
            let runner = JobRunner::new(tools.ffmpeg.clone());
            let mut rng = rand::thread_rng();
            let written =
                quiz::make_quizzes(&items, &output, &config.quiz, &config.assets, &runner, &encoder, &mut rng).await?;
            println!("🧩 {} quiz videos written to {:?}", written.len(), output);
        }
        Commands::Speedrun {
            output,
            days,
            day,
            gameplay,
        } => {
            let calendar = match days {
                Some(path) => speedrun::load_days(&path)?,
                None => speedrun::builtin_days(),
            };
            let selected: Vec<_> = calendar
                .iter()
                .filter(|d| day.map_or(true, |wanted| d.day == wanted))
                .collect();
            if selected.is_empty() {
                warn!("[SPEEDRUN] No matching day");
                return Ok(());
            }
            tokio::fs::create_dir_all(&output).await?;
            let encoder = config.encoder().await;
            let runner = JobRunner::new(tools.ffmpeg.clone());
            let tts = TtsEngine::new(tools.edge_tts.clone());
            let mut rng = rand::thread_rng();
            for d in selected {
                let rendered = if gameplay {
                    speedrun::make_speedrun_gameplay(
                        d,
                        &output,
                        &config.speedrun,
                        &config.assets,
                        &tts,
                        &tools.ffprobe,
                        &runner,
                        &encoder,
                        &mut rng,
                    )
                    .await
                } else {
                    speedrun::make_speedrun(d, &output, &config.speedrun, &config.assets, &tts, &runner, &encoder).await
                };
                match rendered {
                    Ok(path) => println!("⚡ {:?}", path),
                    Err(e) => error!("[SPEEDRUN] ❌ Day {}: {:#}", d.day, e),
                }
            }
        }
        Commands::Illusion { output, day } => {
            let days: Vec<_> = illusion::builtin_days()
                .into_iter()
                .filter(|d| day.as_deref().map_or(true, |wanted| d.key == wanted))
                .collect();
            if days.is_empty() {
                warn!("[ILLUSION] No matching day");
                return Ok(());
            }
            tokio::fs::create_dir_all(&output).await?;
            let encoder = config.encoder().await;
            let runner = JobRunner::new(tools.ffmpeg.clone());
            let tts = TtsEngine::new(tools.edge_tts.clone());
            let mut rng = rand::thread_rng();
            for d in &days {
                let rendered = illusion::make_illusion(
                    d,
                    &output,
                    &config.illusion,
                    &config.assets,
                    &tts,
                    &runner,
                    &encoder,
                    &mut rng,
                )
                .await;
                match rendered {
                    Ok(path) => println!("👁️ {:?}", path),
                    Err(e) => error!("[ILLUSION] ❌ {}: {:#}", d.key, e),
                }
            }
        }
        Commands::Fakeout { input, output } => {
            let encoder = config.encoder().await;
            let runner = JobRunner::new(tools.ffmpeg.clone());
            let path = fakeout::make_fakeout(
                &input,
                &output,
                &config.fakeout,
                config.assets.text_font.clone(),
                &tools.ffprobe,
                &runner,
                &encoder,
            )
            .await?;
            println!("🎣 {:?}", path);
        }
        Commands::Challenge {
            input,
            output,
            text,
            emoji,
        } => {
            let encoder = config.encoder().await;
            let runner = JobRunner::new(tools.ffmpeg.clone());
            let path = challenge::make_challenge(
                &input,
                &output,
                &text,
                &emoji,
                &config.challenge,
                &config.assets,
                &tools.ffprobe,
                &runner,
                &encoder,
            )
            .await?;
            println!("🎯 {:?}", path);
        }
        Commands::Probe { input } => {
            let asset = probe(&tools.ffprobe, &input).await?;
            println!("📼 {:?}", asset.path);
            println!("   Size:     {}x{}", asset.width.unwrap_or(0), asset.height.unwrap_or(0));
            println!("   Duration: {:.2}s", asset.duration);
            println!("   Codec:    {}", asset.codec.as_deref().unwrap_or("unknown"));
            println!("   Audio:    {}", if asset.has_audio { "yes" } else { "no" });
        }
        Commands::Encoders => {
            let profile = EncoderProfile::detect(&tools.ffmpeg).await;
            println!("🎛️ Backend: {} ({})", profile.backend, profile.video_codec());
        }
    }

    Ok(())
}
