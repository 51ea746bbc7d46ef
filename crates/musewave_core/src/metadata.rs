//! Job descriptor persistence.
//!
//! Once all required stages complete, a JSON descriptor summarizing the
//! inputs and final artifact locations is written into the job's output
//! directory. Purely a side effect, not part of pipeline control flow.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ArtifactKind, JobRequest};
use crate::orchestrator::JobState;

/// Descriptor filename inside the job's output directory.
pub const DESCRIPTOR_FILE: &str = "metadata.json";

/// Errors writing or reading a descriptor.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("failed to write job descriptor: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize job descriptor: {0}")]
    Json(#[from] serde_json::Error),
}

/// Relative filenames of the final outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFiles {
    pub audio: String,
    pub video: String,
}

/// Serialized summary of a completed job.
///
/// Paths are relative to the job's output directory; the REST layer
/// builds absolute URLs from the job id alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub job_id: String,
    pub prompt: String,
    pub lyrics: String,
    pub language: String,
    pub files: MediaFiles,
    pub output_dir: PathBuf,
    /// Engine that produced each completed stage.
    #[serde(default)]
    pub engines: BTreeMap<String, String>,
}

impl JobDescriptor {
    /// Build the descriptor for a completed job.
    pub fn from_state(request: &JobRequest, state: &JobState, output_dir: &Path) -> Self {
        Self {
            job_id: state.job_id.clone(),
            prompt: request.prompt.clone(),
            lyrics: request.lyrics.clone(),
            language: request.language.clone(),
            files: MediaFiles {
                audio: ArtifactKind::MixAudio.file_name().to_string(),
                video: ArtifactKind::Video.file_name().to_string(),
            },
            output_dir: output_dir.to_path_buf(),
            engines: state.engines(),
        }
    }

    /// Write the descriptor into the job's output directory.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf, MetadataError> {
        let path = output_dir.join(DESCRIPTOR_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Read a descriptor back from a job directory.
    pub fn read(output_dir: &Path) -> Result<Self, MetadataError> {
        let content = fs::read_to_string(output_dir.join(DESCRIPTOR_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageResult;
    use tempfile::tempdir;

    #[test]
    fn descriptor_roundtrips_through_json() {
        let dir = tempdir().unwrap();
        let request = JobRequest::new("dreamy synthwave").with_lyrics("neon rain");

        let mut state = JobState::new("ab12cd34");
        state
            .stage_results
            .push(StageResult::ok("Melody", "progression-midi", true));

        let descriptor = JobDescriptor::from_state(&request, &state, dir.path());
        descriptor.write(dir.path()).unwrap();

        let read_back = JobDescriptor::read(dir.path()).unwrap();
        assert_eq!(read_back.job_id, "ab12cd34");
        assert_eq!(read_back.prompt, "dreamy synthwave");
        assert_eq!(read_back.files.audio, "mix.wav");
        assert_eq!(read_back.files.video, "final.mp4");
        assert_eq!(
            read_back.engines.get("Melody").map(String::as_str),
            Some("progression-midi")
        );
    }
}
