//! Artifacts produced by pipeline stages.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The named outputs a job can produce.
///
/// Filenames are fixed; only the per-job parent directory differs, so
/// collaborators can locate outputs from the job identifier alone.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Symbolic melody (Standard MIDI File).
    MelodyMidi,
    /// Melody rendered to audio through the instrument bank.
    MelodyAudio,
    /// Background texture audio keyed off the prompt.
    TextureAudio,
    /// Synthesized vocals (only when lyrics are present).
    VocalsAudio,
    /// Final mixed audio track.
    MixAudio,
    /// Visualizer video.
    Video,
}

impl ArtifactKind {
    /// Fixed filename inside the job's output directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::MelodyMidi => "melody.mid",
            ArtifactKind::MelodyAudio => "melody.wav",
            ArtifactKind::TextureAudio => "texture.wav",
            ArtifactKind::VocalsAudio => "vocals.wav",
            ArtifactKind::MixAudio => "mix.wav",
            ArtifactKind::Video => "final.mp4",
        }
    }

    /// Minimum byte size accepted by the validation gate.
    ///
    /// Audio and video artifacts use the 10 KB floor; a realistic SMF is
    /// a few KB at most, so the symbolic melody gets a floor matched to
    /// its format instead of silently failing every melody attempt.
    pub fn min_bytes(&self) -> u64 {
        match self {
            ArtifactKind::MelodyMidi => 200,
            _ => 10_000,
        }
    }

    /// Whether this artifact is an audio stream.
    pub fn is_audio(&self) -> bool {
        matches!(
            self,
            ArtifactKind::MelodyAudio
                | ArtifactKind::TextureAudio
                | ArtifactKind::VocalsAudio
                | ArtifactKind::MixAudio
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::MelodyMidi => "melody-midi",
            ArtifactKind::MelodyAudio => "melody-audio",
            ArtifactKind::TextureAudio => "texture-audio",
            ArtifactKind::VocalsAudio => "vocals-audio",
            ArtifactKind::MixAudio => "mix-audio",
            ArtifactKind::Video => "video",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded stream metadata from the format probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaFormat {
    Audio {
        codec: String,
        sample_rate: u32,
        channels: u8,
    },
    Video {
        codec: String,
        width: u32,
        height: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        fps: Option<f64>,
    },
}

/// A validated output accepted into the job record.
///
/// An artifact only exists once the existence and size checks passed;
/// a format mismatch never removes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Decoded format, when the probe succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<MediaFormat>,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            kind,
            path: path.into(),
            size_bytes,
            format: None,
        }
    }

    /// Attach a probed format descriptor.
    pub fn with_format(mut self, format: MediaFormat) -> Self {
        self.format = Some(format);
        self
    }
}
