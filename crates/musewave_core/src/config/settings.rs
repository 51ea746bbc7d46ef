//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field has a serde default so partial config files load cleanly.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Audio output parameters.
    #[serde(default)]
    pub audio: AudioSettings,

    /// Video output parameters.
    #[serde(default)]
    pub video: VideoSettings,

    /// External tool locations and invocation settings.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Path configuration for job output, the instrument bank, and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder that holds one output directory per job.
    #[serde(default = "default_assets_root")]
    pub assets_root: String,

    /// Soundfont used to render the symbolic melody to audio.
    #[serde(default = "default_soundfont")]
    pub soundfont: String,

    /// Folder for per-job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_assets_root() -> String {
    "public/assets".to_string()
}

fn default_soundfont() -> String {
    "/usr/local/share/soundfonts/GeneralUser.sf2".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            soundfont: default_soundfont(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Audio output parameters shared by every audio stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Target sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Target channel count.
    #[serde(default = "default_channels")]
    pub channels: u8,

    /// Nominal track duration in seconds for generated stems.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,
}

fn default_sample_rate() -> u32 {
    44_100
}

fn default_channels() -> u8 {
    2
}

fn default_duration_secs() -> u32 {
    30
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            duration_secs: default_duration_secs(),
        }
    }
}

/// Video output parameters for the visualizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSettings {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_fps() -> u32 {
    30
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
        }
    }
}

/// External tool locations and provider bridge commands.
///
/// The bridge commands are full argument vectors; the first element is
/// the program. Stage-specific arguments (prompt, duration, output path)
/// are appended by the strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,

    #[serde(default = "default_fluidsynth")]
    pub fluidsynth: String,

    /// Command prefix for the melody model bridge.
    #[serde(default = "default_melody_command")]
    pub melody_command: Vec<String>,

    /// Command prefix for the texture diffusion bridge.
    #[serde(default = "default_texture_command")]
    pub texture_command: Vec<String>,

    /// Command prefix for the vocal synthesis tool.
    #[serde(default = "default_vocals_command")]
    pub vocals_command: Vec<String>,

    /// Per-invocation timeout for external tools, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_fluidsynth() -> String {
    "fluidsynth".to_string()
}

fn default_melody_command() -> Vec<String> {
    vec![
        "python3".to_string(),
        "-m".to_string(),
        "musewave_bridges.melody".to_string(),
    ]
}

fn default_texture_command() -> Vec<String> {
    vec![
        "python3".to_string(),
        "-m".to_string(),
        "musewave_bridges.texture".to_string(),
    ]
}

fn default_vocals_command() -> Vec<String> {
    vec!["tts".to_string()]
}

fn default_timeout_secs() -> u64 {
    600
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            fluidsynth: default_fluidsynth(),
            melody_command: default_melody_command(),
            texture_command: default_texture_command(),
            vocals_command: default_vocals_command(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (filter tool output, show tail on error).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of output lines to replay after an error.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Show timestamps in log output.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: default_true(),
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_timestamps: default_true(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let settings = Settings::default();
        assert_eq!(settings.audio.sample_rate, 44_100);
        assert_eq!(settings.audio.channels, 2);
        assert_eq!(settings.video.width, 1280);
        assert_eq!(settings.video.height, 720);
        assert_eq!(settings.video.fps, 30);
        assert_eq!(settings.tools.ffmpeg, "ffmpeg");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [audio]
            sample_rate = 48000
            "#,
        )
        .unwrap();

        assert_eq!(settings.audio.sample_rate, 48_000);
        assert_eq!(settings.audio.channels, 2);
        assert_eq!(settings.tools.fluidsynth, "fluidsynth");
    }

    #[test]
    fn settings_roundtrip_through_toml() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed.audio.sample_rate, settings.audio.sample_rate);
        assert_eq!(parsed.tools.melody_command, settings.tools.melody_command);
    }
}
