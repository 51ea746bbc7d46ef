//! Job request inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Visualizer style for the final video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStyle {
    /// Scrolling frequency spectrum.
    #[default]
    Spectrum,
    /// Oscilloscope-style waveform.
    Waveform,
    /// Vectorscope level display.
    Volumeter,
}

impl VideoStyle {
    /// All supported styles, in CLI help order.
    pub const ALL: [VideoStyle; 3] = [
        VideoStyle::Spectrum,
        VideoStyle::Waveform,
        VideoStyle::Volumeter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStyle::Spectrum => "spectrum",
            VideoStyle::Waveform => "waveform",
            VideoStyle::Volumeter => "volumeter",
        }
    }
}

impl fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spectrum" => Ok(VideoStyle::Spectrum),
            "waveform" => Ok(VideoStyle::Waveform),
            "volumeter" => Ok(VideoStyle::Volumeter),
            other => Err(format!(
                "unknown video style '{}' (expected spectrum, waveform, or volumeter)",
                other
            )),
        }
    }
}

/// Inputs for one generation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Music generation prompt.
    pub prompt: String,
    /// Lyrics text. Empty or whitespace-only means no vocals.
    #[serde(default)]
    pub lyrics: String,
    /// Vocal language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Visualizer style for the final video.
    #[serde(default)]
    pub video_style: VideoStyle,
}

fn default_language() -> String {
    "English".to_string()
}

impl JobRequest {
    /// Create a request with the given prompt and defaults for the rest.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            lyrics: String::new(),
            language: default_language(),
            video_style: VideoStyle::default(),
        }
    }

    /// Set the lyrics (builder pattern).
    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = lyrics.into();
        self
    }

    /// Set the vocal language (builder pattern).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the video style (builder pattern).
    pub fn with_video_style(mut self, style: VideoStyle) -> Self {
        self.video_style = style;
        self
    }

    /// Whether the request carries usable lyrics.
    ///
    /// Empty and whitespace-only lyrics count as absent.
    pub fn has_lyrics(&self) -> bool {
        !self.lyrics.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_parses_case_insensitively() {
        assert_eq!("Spectrum".parse::<VideoStyle>(), Ok(VideoStyle::Spectrum));
        assert_eq!("WAVEFORM".parse::<VideoStyle>(), Ok(VideoStyle::Waveform));
        assert!("disco".parse::<VideoStyle>().is_err());
    }

    #[test]
    fn whitespace_lyrics_count_as_absent() {
        let req = JobRequest::new("dreamy synthwave").with_lyrics("   \n\t ");
        assert!(!req.has_lyrics());

        let req = req.with_lyrics("Riding through the stars");
        assert!(req.has_lyrics());
    }

    #[test]
    fn default_style_is_spectrum() {
        let req = JobRequest::new("epic orchestral");
        assert_eq!(req.video_style, VideoStyle::Spectrum);
    }
}
