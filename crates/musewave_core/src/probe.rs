//! Media format probing using ffprobe.
//!
//! Decodes container/stream metadata for produced artifacts so the
//! validation gate can compare it against the expected output format.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use thiserror::Error;

/// Errors from probing a file.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("failed to run {tool}: {source}")]
    Invoke {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with code {exit_code}: {message}")]
    Failed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("failed to parse probe output: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// One decoded stream descriptor.
#[derive(Debug, Clone, Default)]
pub struct StreamInfo {
    /// Codec type (audio, video, subtitle).
    pub codec_type: String,
    /// Codec name (e.g., "pcm_s16le", "h264").
    pub codec_name: String,
    /// Sample rate for audio streams.
    pub sample_rate: Option<u32>,
    /// Channel count for audio streams.
    pub channels: Option<u8>,
    /// Width for video streams.
    pub width: Option<u32>,
    /// Height for video streams.
    pub height: Option<u32>,
    /// Frame rate as reported (e.g., "30/1", "30000/1001").
    pub r_frame_rate: Option<String>,
}

impl StreamInfo {
    pub fn is_audio(&self) -> bool {
        self.codec_type == "audio"
    }

    pub fn is_video(&self) -> bool {
        self.codec_type == "video"
    }

    /// Frame rate as a float, when the reported ratio parses.
    pub fn fps(&self) -> Option<f64> {
        self.r_frame_rate.as_deref().and_then(parse_frame_rate)
    }
}

/// Probe a media file and return its stream descriptors.
pub fn probe_streams(ffprobe: &str, path: &Path) -> ProbeResult<Vec<StreamInfo>> {
    tracing::debug!(path = %path.display(), "probing media format");

    let output = Command::new(ffprobe)
        .args(["-v", "error", "-show_streams", "-of", "json"])
        .arg(path)
        .output()
        .map_err(|e| ProbeError::Invoke {
            tool: ffprobe.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(ProbeError::Failed {
            tool: ffprobe.to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            message: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let json: Value = serde_json::from_slice(&output.stdout)?;
    let mut streams = Vec::new();

    if let Some(entries) = json.get("streams").and_then(|s| s.as_array()) {
        for stream in entries {
            streams.push(parse_stream(stream));
        }
    }

    Ok(streams)
}

/// Parse one stream entry from ffprobe's JSON output.
fn parse_stream(stream: &Value) -> StreamInfo {
    StreamInfo {
        codec_type: stream
            .get("codec_type")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        codec_name: stream
            .get("codec_name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        // ffprobe reports sample_rate as a string
        sample_rate: stream
            .get("sample_rate")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok()),
        channels: stream
            .get("channels")
            .and_then(|v| v.as_u64())
            .map(|c| c as u8),
        width: stream
            .get("width")
            .and_then(|v| v.as_u64())
            .map(|w| w as u32),
        height: stream
            .get("height")
            .and_then(|v| v.as_u64())
            .map(|h| h as u32),
        r_frame_rate: stream
            .get("r_frame_rate")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    }
}

/// Parse a frame rate string like "30000/1001" into a float.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let parts: Vec<&str> = rate.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den != 0.0 {
            return Some(num / den);
        }
    }
    rate.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_audio_stream_fields() {
        let json: Value = serde_json::from_str(
            r#"{
                "codec_type": "audio",
                "codec_name": "pcm_s16le",
                "sample_rate": "44100",
                "channels": 2
            }"#,
        )
        .unwrap();

        let info = parse_stream(&json);
        assert!(info.is_audio());
        assert_eq!(info.codec_name, "pcm_s16le");
        assert_eq!(info.sample_rate, Some(44_100));
        assert_eq!(info.channels, Some(2));
    }

    #[test]
    fn parses_video_stream_fields() {
        let json: Value = serde_json::from_str(
            r#"{
                "codec_type": "video",
                "codec_name": "h264",
                "width": 1280,
                "height": 720,
                "r_frame_rate": "30/1"
            }"#,
        )
        .unwrap();

        let info = parse_stream(&json);
        assert!(info.is_video());
        assert_eq!(info.width, Some(1280));
        assert_eq!(info.fps(), Some(30.0));
    }

    #[test]
    fn parses_fractional_frame_rates() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("0/0"), None);
    }

    #[test]
    fn probe_missing_tool_fails_to_invoke() {
        let result = probe_streams("/nonexistent/ffprobe", Path::new("/tmp/file.wav"));
        assert!(matches!(result, Err(ProbeError::Invoke { .. })));
    }
}
