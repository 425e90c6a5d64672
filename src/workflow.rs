use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::library::AssetDirectory;
use crate::media::{MediaFactory, MediaPlayer, PlaybackRequest, VideoMetadata, VideoSource};
use crate::subtitle::SubtitleTrack;
use crate::translate::{SubtitleTranslator, TranslatorFactory};

/// Files of a video ready to be watched
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedVideo {
    pub directory: PathBuf,
    pub video: PathBuf,
    pub foreign_subtitles: PathBuf,
    pub native_subtitles: PathBuf,
}

impl PreparedVideo {
    pub fn playback_request(&self) -> PlaybackRequest {
        PlaybackRequest::dual(
            self.video.clone(),
            self.foreign_subtitles.clone(),
            self.native_subtitles.clone(),
            self.directory.clone(),
        )
    }
}

pub struct Workflow {
    config: Config,
    source: Box<dyn VideoSource>,
    translator: SubtitleTranslator,
    player: Box<dyn MediaPlayer>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let source = MediaFactory::create_source(config.downloader.clone());
        let translator = TranslatorFactory::create_translator(&config.translate)?;
        let player = MediaFactory::create_player(config.player.clone());

        Ok(Self::with_components(config, source, translator, player))
    }

    /// Assemble a workflow from explicit components
    pub fn with_components(
        config: Config,
        source: Box<dyn VideoSource>,
        translator: SubtitleTranslator,
        player: Box<dyn MediaPlayer>,
    ) -> Self {
        Self {
            config,
            source,
            translator,
            player,
        }
    }

    pub async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        self.source.fetch_metadata(url).await
    }

    /// Download, translate and lay out a video under `base_dir`
    pub async fn prepare(&self, url: &str, base_dir: &Path) -> Result<PreparedVideo> {
        let source_language = self.translator.source_language();
        let target_language = self.translator.target_language();

        // Step 1: Metadata
        let metadata = self.source.fetch_metadata(url).await?;
        let assets = AssetDirectory::create(base_dir, &self.config.library, &metadata.title).await?;

        // Step 2: Video and foreign subtitles
        self.source
            .download(url, assets.path(), &[source_language.to_string()])
            .await?;
        let downloaded = assets.downloaded_subtitle(source_language, &self.config.downloader.subtitle_format)?;

        // Step 3: Translate
        let mut track = SubtitleTrack::from_file(&downloaded).await?;
        self.translator.translate_track(&mut track).await?;

        // Step 4: Write native subtitles, then give the foreign ones their final name
        let native_subtitles = assets.subtitle_path(target_language);
        track.save(&native_subtitles).await?;

        let foreign_subtitles = assets.subtitle_path(source_language);
        fs::rename(&downloaded, &foreign_subtitles).await?;

        let video = assets.video_file(&self.config.library.video_extensions)?;

        info!("Prepared {} in {}", metadata.title, assets.path().display());
        Ok(PreparedVideo {
            directory: assets.path().to_path_buf(),
            video,
            foreign_subtitles,
            native_subtitles,
        })
    }

    /// Full pipeline: prepare the video, then watch it unless `launch_player` is false
    pub async fn watch(&self, url: &str, base_dir: &Path, launch_player: bool) -> Result<PreparedVideo> {
        let prepared = self.prepare(url, base_dir).await?;

        if launch_player {
            self.player.play(&prepared.playback_request()).await?;
        }

        Ok(prepared)
    }

    /// Launch the player on a previously prepared directory
    pub async fn play_directory(&self, dir: &Path) -> Result<PreparedVideo> {
        let assets = AssetDirectory::open(dir)?;

        let prepared = PreparedVideo {
            directory: assets.path().to_path_buf(),
            video: assets.video_file(&self.config.library.video_extensions)?,
            foreign_subtitles: assets.existing_subtitle(self.translator.source_language())?,
            native_subtitles: assets.existing_subtitle(self.translator.target_language())?,
        };

        self.player.play(&prepared.playback_request()).await?;
        Ok(prepared)
    }

    /// Translate a single WebVTT file; returns the number of cues written
    pub async fn translate_file(&self, input: &Path, output: &Path) -> Result<usize> {
        let mut track = SubtitleTrack::from_file(input).await?;
        self.translator.translate_track(&mut track).await?;
        track.save(output).await?;
        Ok(track.len())
    }
}
