use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::commands::{stderr_summary, MediaCommand};
use super::VideoSource;
use crate::config::DownloaderConfig;
use crate::error::{DualsubError, Result};

/// Descriptive metadata of a remote video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
}

impl VideoMetadata {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builds yt-dlp invocations
pub struct YtDlpCommandBuilder {
    config: DownloaderConfig,
}

impl YtDlpCommandBuilder {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    fn base(&self, description: &str) -> MediaCommand {
        let cmd = MediaCommand::new(&self.config.binary_path, description)
            .arg("--no-playlist")
            .arg("--no-warnings");

        match &self.config.cookies_from_browser {
            Some(browser) => cmd.arg("--cookies-from-browser").arg(browser.as_str()),
            None => cmd,
        }
    }

    /// Print the video's metadata as JSON without downloading media
    pub fn metadata(&self, url: &str) -> MediaCommand {
        self.base("Metadata fetch")
            .arg("--dump-single-json")
            .arg("--skip-download")
            .arg(url)
    }

    /// Download the video and subtitles for `languages` into `target_dir`
    pub fn download(&self, url: &str, target_dir: &Path, languages: &[String]) -> MediaCommand {
        let mut cmd = self
            .base("Video and subtitle download")
            .arg("--write-subs");

        if self.config.include_auto_subtitles {
            cmd = cmd.arg("--write-auto-subs");
        }

        cmd.arg("--sub-langs")
            .arg(languages.join(","))
            .arg("--sub-format")
            .arg(self.config.subtitle_format.as_str())
            .arg("--paths")
            .path(target_dir)
            .arg(url)
    }
}

/// yt-dlp backed video source
pub struct YtDlpSource {
    builder: YtDlpCommandBuilder,
}

impl YtDlpSource {
    pub fn new(config: DownloaderConfig) -> Self {
        Self {
            builder: YtDlpCommandBuilder::new(config),
        }
    }
}

#[async_trait]
impl VideoSource for YtDlpSource {
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        info!("Fetching metadata for {}", url);

        let output = self
            .builder
            .metadata(url)
            .output()
            .await
            .map_err(|e| DualsubError::Metadata(format!("Failed to run downloader: {}", e)))?;

        if !output.status.success() {
            return Err(DualsubError::Metadata(format!(
                "Metadata fetch for {} failed: {}",
                url,
                stderr_summary(&output)
            )));
        }

        let metadata = VideoMetadata::from_json(&String::from_utf8_lossy(&output.stdout))?;
        if metadata.title.trim().is_empty() {
            return Err(DualsubError::Metadata(format!("{} has an empty title", url)));
        }

        info!("Video title: {}", metadata.title);
        Ok(metadata)
    }

    async fn download(&self, url: &str, target_dir: &Path, languages: &[String]) -> Result<()> {
        info!(
            "Downloading {} with {} subtitles into {}",
            url,
            languages.join(","),
            target_dir.display()
        );

        let output = self
            .builder
            .download(url, target_dir, languages)
            .output()
            .await
            .map_err(|e| DualsubError::Download(format!("Failed to run downloader: {}", e)))?;

        if !output.status.success() {
            return Err(DualsubError::Download(format!(
                "Download of {} failed: {}",
                url,
                stderr_summary(&output)
            )));
        }

        info!("Download completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const URL: &str = "https://www.youtube.com/watch?v=KFv8aqRdlqk";

    fn config() -> DownloaderConfig {
        Config::default().downloader
    }

    #[test]
    fn test_metadata_command() {
        let cmd = YtDlpCommandBuilder::new(config()).metadata(URL);

        assert_eq!(cmd.binary_path, "yt-dlp");
        assert_eq!(
            cmd.args,
            vec![
                "--no-playlist",
                "--no-warnings",
                "--cookies-from-browser",
                "chrome",
                "--dump-single-json",
                "--skip-download",
                URL
            ]
        );
    }

    #[test]
    fn test_download_command() {
        let cmd = YtDlpCommandBuilder::new(config()).download(
            URL,
            Path::new("videos/Clip"),
            &["fr".to_string()],
        );

        let args = cmd.args.join(" ");
        assert!(args.contains("--write-subs --write-auto-subs --sub-langs fr --sub-format vtt"));
        assert!(args.contains("--paths videos/Clip"));
        assert_eq!(cmd.args.last().map(String::as_str), Some(URL));
        assert!(cmd.current_dir.is_none());
    }

    #[test]
    fn test_download_command_without_auto_subs_or_cookies() {
        let mut config = config();
        config.include_auto_subtitles = false;
        config.cookies_from_browser = None;

        let cmd = YtDlpCommandBuilder::new(config).download(
            URL,
            Path::new("out"),
            &["fr".to_string(), "de".to_string()],
        );

        assert!(!cmd.args.contains(&"--write-auto-subs".to_string()));
        assert!(!cmd.args.contains(&"--cookies-from-browser".to_string()));
        assert!(cmd.args.contains(&"fr,de".to_string()));
    }

    #[test]
    fn test_metadata_from_json() {
        let metadata = VideoMetadata::from_json(
            r#"{"id": "KFv8aqRdlqk", "title": "Une vidéo", "duration": 312.0, "formats": []}"#,
        )
        .unwrap();

        assert_eq!(metadata.title, "Une vidéo");
        assert_eq!(metadata.id.as_deref(), Some("KFv8aqRdlqk"));
        assert!(metadata.uploader.is_none());
    }

    #[test]
    fn test_metadata_without_title_is_error() {
        let result = VideoMetadata::from_json(r#"{"id": "x"}"#);
        assert!(matches!(result, Err(DualsubError::Json(_))));
    }

    #[cfg(unix)]
    fn fake_downloader(dir: &Path, script: &str) -> DownloaderConfig {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = config();
        config.binary_path = path.to_string_lossy().to_string();
        config
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_metadata_parses_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let source = YtDlpSource::new(fake_downloader(
            dir.path(),
            r#"echo '{"id": "abc", "title": "Le titre"}'"#,
        ));

        let metadata = source.fetch_metadata(URL).await.unwrap();
        assert_eq!(metadata.title, "Le titre");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_metadata_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = YtDlpSource::new(fake_downloader(
            dir.path(),
            "echo 'ERROR: Video unavailable' >&2; exit 1",
        ));

        let err = source.fetch_metadata(URL).await.unwrap_err();
        assert!(matches!(err, DualsubError::Metadata(msg) if msg.contains("Video unavailable")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = YtDlpSource::new(fake_downloader(dir.path(), "exit 2"));

        let err = source
            .download(URL, dir.path(), &["fr".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DualsubError::Download(_)));
    }
}
