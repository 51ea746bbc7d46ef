//! MuseWave command line - generate a track and visualizer from a prompt.
//!
//! Usage:
//!   musewave "dreamy synthwave"
//!   musewave "epic orchestral" "Riding through the stars" English
//!   musewave --prompt "chill lofi" --video-style waveform

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use musewave_core::config::ConfigManager;
use musewave_core::models::{JobRequest, VideoStyle};
use musewave_core::orchestrator::{run_job, JobOptions};

/// Command-line arguments for musewave.
#[derive(Parser, Debug)]
#[command(name = "musewave")]
#[command(about = "Generate a mixed audio track and visualizer video from a prompt")]
#[command(version)]
struct Args {
    /// Music generation prompt
    #[arg(default_value = "dreamy synthwave")]
    prompt: String,

    /// Lyrics text (optional; empty skips vocals)
    #[arg(default_value = "")]
    lyrics: String,

    /// Vocal language
    #[arg(default_value = "English")]
    language: String,

    /// Video visualization style
    #[arg(long, default_value = "spectrum", value_parser = parse_style)]
    video_style: VideoStyle,

    /// Custom job ID
    #[arg(long)]
    job_id: Option<String>,

    /// Custom output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, default_value = "musewave.toml", env = "MUSEWAVE_CONFIG")]
    config: PathBuf,
}

fn parse_style(value: &str) -> Result<VideoStyle, String> {
    value.parse()
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "musewave=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = ConfigManager::new(&args.config);
    config
        .load_or_create()
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    let request = JobRequest::new(args.prompt)
        .with_lyrics(args.lyrics)
        .with_language(args.language)
        .with_video_style(args.video_style);

    let options = JobOptions {
        job_id: args.job_id,
        output_dir: args.output_dir,
        ..JobOptions::default()
    };

    info!(style = %request.video_style, "starting generation job");

    let outcome = run_job(request, config.settings().clone(), options)
        .context("running generation job")?;

    for warning in &outcome.warnings {
        eprintln!("Warning: {}", warning);
    }

    if !outcome.success {
        let stage = outcome.failed_stage.as_deref().unwrap_or("unknown");
        anyhow::bail!(
            "job {} failed at stage {}: {}",
            outcome.job_id,
            stage,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!("Job {} complete", outcome.job_id);
    println!("Output directory: {}", outcome.output_dir.display());
    if let Some(audio) = outcome.audio_path() {
        println!("Audio: {}", audio.display());
    }
    if let Some(video) = outcome.video_path() {
        println!("Video: {}", video.display());
    }

    Ok(())
}
