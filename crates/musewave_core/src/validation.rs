//! Artifact validation gate.
//!
//! Two independent checks, applied in order:
//!
//! 1. Existence + minimum size. Failing either is fatal to the calling
//!    attempt (`StageError::Validation`) - it proves the tool did not
//!    actually produce output.
//! 2. Format probe. Mismatches against the expected output format are
//!    warnings only; downstream stages still consume best-effort input.
//!    The one exception is a video artifact with no video stream at all,
//!    which fails the attempt.

use std::fs;
use std::path::Path;

use crate::config::Settings;
use crate::models::{Artifact, ArtifactKind, MediaFormat};
use crate::orchestrator::errors::{StageError, StepResult};
use crate::probe::{self, StreamInfo};

/// Expected audio output format for probe comparison.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedAudio {
    pub sample_rate: u32,
    pub channels: u8,
}

/// Validates produced artifacts before they enter the job record.
#[derive(Debug, Clone)]
pub struct ValidationGate {
    ffprobe: String,
    expected: ExpectedAudio,
}

impl ValidationGate {
    pub fn new(ffprobe: impl Into<String>, expected: ExpectedAudio) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            expected,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.tools.ffprobe.clone(),
            ExpectedAudio {
                sample_rate: settings.audio.sample_rate,
                channels: settings.audio.channels,
            },
        )
    }

    /// Validate a produced file and admit it as an artifact.
    ///
    /// Format findings are appended to `warnings`; only missing/undersized
    /// files (and videos without a video stream) fail.
    pub fn validate(
        &self,
        kind: ArtifactKind,
        path: &Path,
        warnings: &mut Vec<String>,
    ) -> StepResult<Artifact> {
        let metadata = fs::metadata(path).map_err(|_| {
            StageError::validation(format!("{} not created: {}", kind, path.display()))
        })?;

        let size = metadata.len();
        if size < kind.min_bytes() {
            return Err(StageError::validation(format!(
                "{} is too small ({} bytes, minimum {}): {}",
                kind,
                size,
                kind.min_bytes(),
                path.display()
            )));
        }

        let mut artifact = Artifact::new(kind, path, size);

        if kind.is_audio() {
            match probe::probe_streams(&self.ffprobe, path) {
                Ok(streams) => {
                    if let Some(format) = self.check_audio(kind, &streams, warnings) {
                        artifact = artifact.with_format(format);
                    }
                }
                Err(e) => warnings.push(format!("format probe failed for {}: {}", kind, e)),
            }
        } else if kind == ArtifactKind::Video {
            match probe::probe_streams(&self.ffprobe, path) {
                Ok(streams) => {
                    let format = self.check_video(&streams, warnings)?;
                    artifact = artifact.with_format(format);
                }
                Err(e) => warnings.push(format!("format probe failed for {}: {}", kind, e)),
            }
        }

        Ok(artifact)
    }

    /// Compare a probed audio stream against the expected format.
    fn check_audio(
        &self,
        kind: ArtifactKind,
        streams: &[StreamInfo],
        warnings: &mut Vec<String>,
    ) -> Option<MediaFormat> {
        let Some(stream) = streams.iter().find(|s| s.is_audio()) else {
            warnings.push(format!("no audio stream detected in {}", kind));
            return None;
        };

        if let Some(rate) = stream.sample_rate {
            if rate != self.expected.sample_rate {
                warnings.push(format!(
                    "{}: sample rate is {}, expected {}",
                    kind, rate, self.expected.sample_rate
                ));
            }
        }
        if let Some(channels) = stream.channels {
            if channels != self.expected.channels {
                warnings.push(format!(
                    "{}: channel count is {}, expected {}",
                    kind, channels, self.expected.channels
                ));
            }
        }

        Some(MediaFormat::Audio {
            codec: stream.codec_name.clone(),
            sample_rate: stream.sample_rate.unwrap_or(0),
            channels: stream.channels.unwrap_or(0),
        })
    }

    /// Check a probed video artifact. A video stream must be present;
    /// the audio track is optional.
    fn check_video(
        &self,
        streams: &[StreamInfo],
        warnings: &mut Vec<String>,
    ) -> StepResult<MediaFormat> {
        let Some(stream) = streams.iter().find(|s| s.is_video()) else {
            return Err(StageError::validation(format!(
                "no video stream found in {}",
                ArtifactKind::Video
            )));
        };

        if !streams.iter().any(|s| s.is_audio()) {
            warnings.push("video has no audio track".to_string());
        }

        Ok(MediaFormat::Video {
            codec: stream.codec_name.clone(),
            width: stream.width.unwrap_or(0),
            height: stream.height.unwrap_or(0),
            fps: stream.fps(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn gate() -> ValidationGate {
        // Nonexistent ffprobe: probes degrade to warnings.
        ValidationGate::new(
            "/nonexistent/ffprobe",
            ExpectedAudio {
                sample_rate: 44_100,
                channels: 2,
            },
        )
    }

    fn write_bytes(path: &Path, count: usize) {
        let mut file = fs::File::create(path).unwrap();
        file.write_all(&vec![0u8; count]).unwrap();
    }

    #[test]
    fn missing_file_is_rejected() {
        let dir = tempdir().unwrap();
        let mut warnings = Vec::new();
        let result = gate().validate(
            ArtifactKind::MixAudio,
            &dir.path().join("mix.wav"),
            &mut warnings,
        );
        assert!(matches!(result, Err(StageError::Validation(_))));
    }

    #[test]
    fn size_threshold_is_strict() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mix.wav");
        let mut warnings = Vec::new();

        // One byte under the floor: rejected.
        write_bytes(&path, 9_999);
        let result = gate().validate(ArtifactKind::MixAudio, &path, &mut warnings);
        assert!(matches!(result, Err(StageError::Validation(_))));

        // Exactly at the floor: accepted.
        write_bytes(&path, 10_000);
        let artifact = gate()
            .validate(ArtifactKind::MixAudio, &path, &mut warnings)
            .unwrap();
        assert_eq!(artifact.size_bytes, 10_000);
    }

    #[test]
    fn probe_failure_is_warning_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("texture.wav");
        write_bytes(&path, 20_000);

        let mut warnings = Vec::new();
        let artifact = gate()
            .validate(ArtifactKind::TextureAudio, &path, &mut warnings)
            .unwrap();

        assert!(artifact.format.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("format probe failed"));
    }

    #[test]
    fn symbolic_melody_skips_the_probe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("melody.mid");
        write_bytes(&path, 500);

        let mut warnings = Vec::new();
        let artifact = gate()
            .validate(ArtifactKind::MelodyMidi, &path, &mut warnings)
            .unwrap();

        assert!(artifact.format.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn sample_rate_mismatch_keeps_artifact_valid() {
        let streams = vec![StreamInfo {
            codec_type: "audio".to_string(),
            codec_name: "pcm_s16le".to_string(),
            sample_rate: Some(22_050),
            channels: Some(1),
            ..StreamInfo::default()
        }];

        let mut warnings = Vec::new();
        let format = gate().check_audio(ArtifactKind::MixAudio, &streams, &mut warnings);

        assert!(format.is_some());
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("22050"));
        assert!(warnings[1].contains("channel count"));
    }

    #[test]
    fn video_without_video_stream_is_rejected() {
        let streams = vec![StreamInfo {
            codec_type: "audio".to_string(),
            codec_name: "aac".to_string(),
            ..StreamInfo::default()
        }];

        let mut warnings = Vec::new();
        let result = gate().check_video(&streams, &mut warnings);
        assert!(matches!(result, Err(StageError::Validation(_))));
    }

    #[test]
    fn silent_video_gets_a_warning() {
        let streams = vec![StreamInfo {
            codec_type: "video".to_string(),
            codec_name: "h264".to_string(),
            width: Some(1280),
            height: Some(720),
            r_frame_rate: Some("30/1".to_string()),
            ..StreamInfo::default()
        }];

        let mut warnings = Vec::new();
        let format = gate().check_video(&streams, &mut warnings).unwrap();

        assert!(matches!(format, MediaFormat::Video { width: 1280, .. }));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("no audio track"));
    }
}
