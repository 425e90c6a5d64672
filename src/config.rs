use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{DualsubError, Result};

fn default_strip_cue_tags() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub downloader: DownloaderConfig,
    pub translate: TranslateConfig,
    pub player: PlayerConfig,
    pub library: LibraryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path to downloader binary (e.g., yt-dlp)
    pub binary_path: String,
    /// Browser to read cookies from, if any (e.g., "chrome", "firefox")
    pub cookies_from_browser: Option<String>,
    /// Fall back to auto-generated subtitles when no uploaded track exists
    pub include_auto_subtitles: bool,
    /// Subtitle file format requested from the downloader
    pub subtitle_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation endpoint base URL
    pub endpoint: String,
    /// Region / interface language sent along with each request
    pub region: String,
    /// Language of the downloaded subtitles
    pub source_language: String,
    /// Language of the generated subtitles
    pub target_language: String,
    /// Maximum characters accepted by the endpoint in a single request
    pub input_limit: usize,
    /// HTTP timeout per request (seconds)
    pub timeout_secs: u64,
    /// Remove WebVTT inline tags (<c>, <i>, timestamps) before translating
    #[serde(default = "default_strip_cue_tags")]
    pub strip_cue_tags: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Path to player binary (e.g., mpv)
    pub binary_path: String,
    /// Lines written to the temporary input.conf handed to the player
    pub keybindings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory (relative to the base directory) holding one folder per video
    pub videos_dir: String,
    /// File extensions recognised as the downloaded video
    pub video_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            downloader: DownloaderConfig {
                binary_path: "yt-dlp".to_string(),
                cookies_from_browser: Some("chrome".to_string()),
                include_auto_subtitles: true,
                subtitle_format: "vtt".to_string(),
            },
            translate: TranslateConfig {
                endpoint: "https://translate.googleapis.com".to_string(),
                region: "EN".to_string(),
                source_language: "fr".to_string(),
                target_language: "en".to_string(),
                input_limit: 5000,
                timeout_secs: 60,
                strip_cue_tags: true,
            },
            player: PlayerConfig {
                binary_path: "mpv".to_string(),
                keybindings: vec!["UP cycle secondary-sid".to_string()],
            },
            library: LibraryConfig {
                videos_dir: "videos".to_string(),
                video_extensions: ["webm", "mp4", "mkv", "mov", "avi", "flv"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DualsubError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DualsubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| DualsubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.translate.input_limit == 0 {
            return Err(DualsubError::Config("translate.input_limit must be positive".to_string()));
        }
        if self.translate.source_language.trim().is_empty()
            || self.translate.target_language.trim().is_empty()
        {
            return Err(DualsubError::Config("translation languages must not be empty".to_string()));
        }
        if self.translate.source_language == self.translate.target_language {
            // Both tracks would be written to the same <lang>.vtt file.
            return Err(DualsubError::Config(format!(
                "source and target language are both '{}'",
                self.translate.source_language
            )));
        }
        if self.library.video_extensions.is_empty() {
            return Err(DualsubError::Config("library.video_extensions must not be empty".to_string()));
        }
        Ok(())
    }
}
