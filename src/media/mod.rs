// External media tools
//
// - commands: command representation shared by all tools
// - downloader: yt-dlp metadata and download
// - player: mpv with two subtitle tracks

pub mod commands;
pub mod downloader;
pub mod player;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use downloader::{VideoMetadata, YtDlpCommandBuilder, YtDlpSource};
pub use player::{MpvCommandBuilder, MpvPlayer, PlaybackRequest};

use crate::config::{DownloaderConfig, PlayerConfig};
use crate::error::Result;

/// Where videos and their subtitles come from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch descriptive metadata without downloading media
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata>;

    /// Download the video and subtitles for `languages` into `target_dir`
    async fn download(&self, url: &str, target_dir: &Path, languages: &[String]) -> Result<()>;
}

/// Plays a video with subtitles, blocking until the player exits
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    async fn play(&self, request: &PlaybackRequest) -> Result<()>;
}

/// Factory for media tool implementations
pub struct MediaFactory;

impl MediaFactory {
    /// Create the default video source (yt-dlp)
    pub fn create_source(config: DownloaderConfig) -> Box<dyn VideoSource> {
        Box::new(YtDlpSource::new(config))
    }

    /// Create the default player (mpv)
    pub fn create_player(config: PlayerConfig) -> Box<dyn MediaPlayer> {
        Box::new(MpvPlayer::new(config))
    }
}
