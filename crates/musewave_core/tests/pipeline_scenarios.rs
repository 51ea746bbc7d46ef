//! End-to-end pipeline scenarios with stubbed external tools.
//!
//! External generators are stand-in shell scripts that write plausible
//! output files, wired in through `[tools]`. Bridge commands point at
//! nonexistent binaries so the chains exercise their real fallback
//! strategies.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use musewave_core::config::Settings;
use musewave_core::models::{ArtifactKind, JobRequest, StageOutcome, VideoStyle};
use musewave_core::orchestrator::{
    run_job, run_job_with_pipeline, JobOptions, MelodyStep, MixStep, Pipeline, RenderStep,
    TextureStep, VideoStep, VocalsStep,
};
use musewave_core::providers::{ProviderChain, Strategy};
use tempfile::TempDir;

/// Stub fluidsynth: writes 20 KB to the path following `-F`.
const FLUIDSYNTH_STUB: &str = r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-F" ]; then out="$arg"; fi
  prev="$arg"
done
if [ -z "$out" ]; then exit 0; fi
head -c 20000 /dev/zero > "$out"
"#;

/// Stub ffmpeg: writes 20 KB to its last argument.
const FFMPEG_STUB: &str = r#"#!/bin/sh
last=""
for arg in "$@"; do last="$arg"; done
case "$last" in
  --version|-version|"") exit 0 ;;
esac
head -c 20000 /dev/zero > "$last"
"#;

fn write_stub(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Settings with stubbed tools and all bridge commands unavailable.
fn stub_settings(dir: &TempDir) -> Settings {
    let bin = dir.path().join("bin");
    fs::create_dir_all(&bin).unwrap();

    let soundfont = dir.path().join("instrument_bank.sf2");
    fs::write(&soundfont, b"RIFF stub soundfont").unwrap();

    let mut settings = Settings::default();
    settings.paths.assets_root = dir.path().join("assets").display().to_string();
    settings.paths.logs_folder = dir.path().join("logs").display().to_string();
    settings.paths.soundfont = soundfont.display().to_string();
    settings.tools.ffmpeg = write_stub(&bin, "ffmpeg", FFMPEG_STUB).display().to_string();
    settings.tools.ffprobe = "/nonexistent/ffprobe".to_string();
    settings.tools.fluidsynth = write_stub(&bin, "fluidsynth", FLUIDSYNTH_STUB)
        .display()
        .to_string();
    settings.tools.melody_command = vec!["/nonexistent/melody-bridge".to_string()];
    settings.tools.texture_command = vec!["/nonexistent/texture-bridge".to_string()];
    settings.tools.vocals_command = vec!["/nonexistent/tts".to_string()];
    // Long enough that the procedural MIDI clears its size floor.
    settings.audio.duration_secs = 8;
    settings
}

#[test]
fn scenario_a_no_lyrics_two_stem_mix() {
    let dir = TempDir::new().unwrap();
    let settings = stub_settings(&dir);

    let request = JobRequest::new("dreamy synthwave").with_language("English");
    assert_eq!(request.video_style, VideoStyle::Spectrum);

    let outcome = run_job(request, settings, JobOptions::default()).unwrap();

    assert!(outcome.success);
    assert!(outcome.failed_stage.is_none());

    // Vocals skipped, never attempted.
    let vocals = outcome.stage("Vocals").unwrap();
    assert_eq!(vocals.outcome, StageOutcome::Skipped);

    // Melody and texture came from their fallback strategies.
    let melody = outcome.stage("Melody").unwrap();
    assert_eq!(melody.outcome, StageOutcome::OkFallback);
    assert_eq!(melody.engine.as_deref(), Some("progression-midi"));

    let texture = outcome.stage("Texture").unwrap();
    assert_eq!(texture.engine.as_deref(), Some("lavfi-pad"));

    // Two stems: texture + melody audio.
    let mix = outcome.stage("Mix").unwrap();
    assert_eq!(mix.engine.as_deref(), Some("amix:2"));

    // Final artifacts exist on disk with stable names.
    let audio = outcome.audio_path().unwrap();
    let video = outcome.video_path().unwrap();
    assert!(audio.ends_with("mix.wav") && audio.exists());
    assert!(video.ends_with("final.mp4") && video.exists());
    assert!(outcome.artifact(ArtifactKind::VocalsAudio).is_none());

    // Descriptor written next to the artifacts.
    assert!(outcome.output_dir.join("metadata.json").exists());
}

#[test]
fn scenario_b_lyrics_three_stem_mix() {
    let dir = TempDir::new().unwrap();
    let settings = stub_settings(&dir);

    let request = JobRequest::new("epic orchestral")
        .with_lyrics("Riding through the stars")
        .with_language("English");

    let outcome = run_job(request, settings, JobOptions::default()).unwrap();

    assert!(outcome.success);

    // The TTS tool is unavailable; the chain fell back to the
    // procedural voice and the mix used all three stems.
    let vocals = outcome.stage("Vocals").unwrap();
    assert_eq!(vocals.outcome, StageOutcome::OkFallback);
    assert_eq!(vocals.engine.as_deref(), Some("robotic-voice"));

    let mix = outcome.stage("Mix").unwrap();
    assert_eq!(mix.engine.as_deref(), Some("amix:3"));

    assert!(outcome.artifact(ArtifactKind::VocalsAudio).is_some());
}

/// Strategy that always fails after probing as available.
struct BrokenStrategy;

impl Strategy for BrokenStrategy {
    fn name(&self) -> &str {
        "broken"
    }
    fn check_available(
        &self,
        _ctx: &musewave_core::orchestrator::Context,
    ) -> Result<(), String> {
        Ok(())
    }
    fn generate(
        &self,
        _ctx: &musewave_core::orchestrator::Context,
        _output: &Path,
    ) -> Result<(), musewave_core::orchestrator::StageError> {
        Err(musewave_core::orchestrator::StageError::Generation {
            description: "broken vocals generator".to_string(),
            exit_code: Some(1),
            stderr: "boom".to_string(),
        })
    }
}

#[test]
fn scenario_b_exhausted_vocals_degrade_to_skipped() {
    let dir = TempDir::new().unwrap();
    let settings = stub_settings(&dir);

    let request = JobRequest::new("epic orchestral").with_lyrics("Riding through the stars");

    let outcome = run_job_with_pipeline(request, settings, JobOptions::default(), || {
        let broken_chain = ProviderChain::new("vocals", ArtifactKind::VocalsAudio)
            .with_strategy(BrokenStrategy);
        Pipeline::new()
            .with_step(MelodyStep::new())
            .with_step(RenderStep::new())
            .with_step(TextureStep::new())
            .with_step(VocalsStep::with_chain(broken_chain))
            .with_step(MixStep::new())
            .with_step(VideoStep::new())
    })
    .unwrap();

    // Chain exhaustion on the optional stage degrades, never aborts.
    assert!(outcome.success);
    let vocals = outcome.stage("Vocals").unwrap();
    assert_eq!(vocals.outcome, StageOutcome::Skipped);
    assert!(vocals.error.as_deref().unwrap().contains("all providers failed"));

    // Mix proceeded with the two remaining stems.
    let mix = outcome.stage("Mix").unwrap();
    assert_eq!(mix.engine.as_deref(), Some("amix:2"));
}

#[test]
fn scenario_c_missing_soundfont_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut settings = stub_settings(&dir);
    settings.paths.soundfont = "/nonexistent/instrument_bank.sf2".to_string();

    let request = JobRequest::new("dreamy synthwave");
    let outcome = run_job(request, settings, JobOptions::default()).unwrap();

    assert!(!outcome.success);
    assert_eq!(outcome.failed_stage.as_deref(), Some("Render"));
    assert!(outcome
        .error
        .as_deref()
        .unwrap()
        .contains("all providers failed"));

    // Melody completed before the abort; nothing downstream ran.
    let melody = outcome.stage("Melody").unwrap();
    assert!(melody.outcome.is_ok());
    assert!(outcome.stage("Mix").is_none());
    assert!(outcome.artifact(ArtifactKind::MixAudio).is_none());
    assert!(outcome.artifact(ArtifactKind::Video).is_none());
    assert!(!outcome.output_dir.join("metadata.json").exists());
}

#[test]
fn cancelled_job_stops_between_stages() {
    let dir = TempDir::new().unwrap();
    let settings = stub_settings(&dir);

    let cancel = musewave_core::orchestrator::CancelHandle::new();
    cancel.cancel();

    let options = JobOptions {
        cancel: Some(cancel),
        ..JobOptions::default()
    };

    let outcome = run_job(JobRequest::new("dreamy synthwave"), settings, options).unwrap();

    assert!(!outcome.success);
    assert!(outcome.error.as_deref().unwrap().contains("cancelled"));
    assert!(outcome.stage_results.is_empty());
}
