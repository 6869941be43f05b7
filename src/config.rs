use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, ReelbatchError};

fn default_extensions() -> Vec<String> {
    ["mp4", "avi", "mkv", "mov"].iter().map(|s| s.to_string()).collect()
}

// Every section and field falls back to its default, so a config file only
// needs the settings it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub editor: EditorConfig,
    pub downloader: DownloaderConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned by the batch editor
    pub input_dir: PathBuf,
    /// Directory receiving edited videos
    pub output_dir: PathBuf,
    /// JSON file recording filenames that were already edited
    pub processed_state_path: PathBuf,
    /// Directory receiving downloaded videos
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Encoding profile: Standard or High
    pub profile: QualityProfile,
    /// Skip files already listed in the processed-set
    pub track_processed: bool,
    /// Recognized file extensions, matched case-insensitively
    pub extensions: Vec<String>,
    /// Container title written into every output; an empty string disables it
    pub metadata_title: Option<String>,
    pub padding: PaddingConfig,
    pub banner: BannerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityProfile {
    /// Standard: 5000k video, 192k audio, source frame rate
    Standard,
    /// High: 8000k video, 320k audio, 60 fps
    High,
}

/// Encoding constants selected by a quality profile
#[derive(Debug, Clone, PartialEq)]
pub struct EncodingSettings {
    pub video_codec: &'static str,
    pub video_bitrate: &'static str,
    pub audio_codec: &'static str,
    pub audio_bitrate: &'static str,
    pub pixel_format: &'static str,
    pub preset: &'static str,
    pub frame_rate: Option<u32>,
}

impl QualityProfile {
    pub fn settings(&self) -> EncodingSettings {
        match self {
            QualityProfile::Standard => EncodingSettings {
                video_codec: "libx264",
                video_bitrate: "5000k",
                audio_codec: "aac",
                audio_bitrate: "192k",
                pixel_format: "yuv420p",
                preset: "slow",
                frame_rate: None,
            },
            QualityProfile::High => EncodingSettings {
                video_codec: "libx264",
                video_bitrate: "8000k",
                audio_codec: "aac",
                audio_bitrate: "320k",
                pixel_format: "yuv420p",
                preset: "slow",
                frame_rate: Some(60),
            },
        }
    }
}

impl std::str::FromStr for QualityProfile {
    type Err = ReelbatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(QualityProfile::Standard),
            "high" => Ok(QualityProfile::High),
            _ => Err(ReelbatchError::Config(format!(
                "Invalid quality profile '{}'. Valid profiles: standard, high",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingConfig {
    /// Margin added on every side, in pixels
    pub margin: u32,
    /// Fill color for the padded area
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub text: String,
    /// Font file handed to drawtext
    pub font_file: String,
    pub font_size: u32,
    pub font_color: String,
    /// Distance of the banner from the bottom edge of the padded frame
    pub bottom_offset: u32,
    pub box_color: String,
    /// Box opacity between 0.0 and 1.0
    pub box_opacity: f32,
    pub box_border: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Path to yt-dlp binary
    pub binary_path: String,
    /// Minimum video height accepted for the best video stream
    pub min_height: u32,
    /// Container used when merging video and audio
    pub merge_output_format: String,
    /// Output filename template, relative to the download directory
    pub output_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling log file
    pub directory: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("video"),
            output_dir: PathBuf::from("edited_video"),
            processed_state_path: PathBuf::from("processed_videos.json"),
            download_dir: PathBuf::from("video"),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            profile: QualityProfile::Standard,
            track_processed: true,
            extensions: default_extensions(),
            metadata_title: Some("Video created by kgsflink".to_string()),
            padding: PaddingConfig::default(),
            banner: BannerConfig::default(),
        }
    }
}

impl Default for PaddingConfig {
    fn default() -> Self {
        Self {
            margin: 25,
            color: "black".to_string(),
        }
    }
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            text: "KGSFLINK".to_string(),
            font_file: "Debrosee-ALPnL.ttf".to_string(),
            font_size: 12,
            font_color: "white".to_string(),
            bottom_offset: 50,
            box_color: "black".to_string(),
            box_opacity: 0.5,
            box_border: 5,
        }
    }
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            binary_path: "yt-dlp".to_string(),
            min_height: 1080,
            merge_output_format: "mp4".to_string(),
            output_template: "%(title)s.%(ext)s".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(".reelbatch").join("log"),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReelbatchError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ReelbatchError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ReelbatchError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ReelbatchError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
