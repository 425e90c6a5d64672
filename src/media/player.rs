use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::commands::MediaCommand;
use super::MediaPlayer;
use crate::config::PlayerConfig;
use crate::error::{DualsubError, Result};

/// What to play: a video plus subtitle files in track order
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    pub video: PathBuf,
    pub subtitles: Vec<PathBuf>,
    /// 1-based track number shown as the primary subtitle
    pub primary_track: usize,
    /// 1-based track number shown as the secondary subtitle
    pub secondary_track: usize,
    /// Working directory of the player process
    pub working_dir: PathBuf,
}

impl PlaybackRequest {
    /// Foreign subtitles as the primary track, native ones as the secondary track
    pub fn dual(video: PathBuf, foreign: PathBuf, native: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            video,
            subtitles: vec![foreign, native],
            primary_track: 1,
            secondary_track: 2,
            working_dir,
        }
    }
}

/// Builds mpv invocations
pub struct MpvCommandBuilder {
    binary_path: String,
}

impl MpvCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub fn play(&self, request: &PlaybackRequest, input_conf: &Path) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, "Dual subtitle playback");

        for subtitle in &request.subtitles {
            cmd = cmd.option("--sub-file", subtitle.to_string_lossy());
        }

        cmd.option("--sid", request.primary_track.to_string())
            .option("--secondary-sid", request.secondary_track.to_string())
            .option("--input-conf", input_conf.to_string_lossy())
            .path(&request.video)
            .current_dir(&request.working_dir)
    }
}

/// mpv backed player
pub struct MpvPlayer {
    config: PlayerConfig,
    builder: MpvCommandBuilder,
}

impl MpvPlayer {
    pub fn new(config: PlayerConfig) -> Self {
        let builder = MpvCommandBuilder::new(&config.binary_path);
        Self { config, builder }
    }

    /// Temporary input.conf with the configured key bindings; removed when dropped
    fn write_input_conf(&self) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("dualsub-input-")
            .suffix(".conf")
            .tempfile()?;

        for binding in &self.config.keybindings {
            writeln!(file, "{}", binding)?;
        }
        file.flush()?;

        Ok(file)
    }
}

#[async_trait]
impl MediaPlayer for MpvPlayer {
    async fn play(&self, request: &PlaybackRequest) -> Result<()> {
        let input_conf = self.write_input_conf()?;
        let command = self.builder.play(request, input_conf.path());

        info!("Launching player: {}", command);

        let mut child = command
            .to_command()
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DualsubError::Player(format!("Failed to launch {}: {}", command.binary_path, e)))?;

        tokio::select! {
            status = child.wait() => match status {
                Ok(status) if status.success() => info!("Player exited"),
                Ok(status) => warn!("Player exited with {}", status),
                Err(e) => warn!("Failed to wait for player: {}", e),
            },
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted, stopping player");
                if let Err(e) = child.kill().await {
                    warn!("Failed to stop player: {}", e);
                }
            }
        }

        drop(input_conf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn request(dir: &Path) -> PlaybackRequest {
        PlaybackRequest::dual(
            dir.join("Clip [abc].webm"),
            dir.join("fr.vtt"),
            dir.join("en.vtt"),
            dir.to_path_buf(),
        )
    }

    #[test]
    fn test_play_command() {
        let dir = Path::new("/videos/Clip");
        let cmd = MpvCommandBuilder::new("mpv").play(&request(dir), Path::new("/tmp/input.conf"));

        assert_eq!(
            cmd.args,
            vec![
                "--sub-file=/videos/Clip/fr.vtt",
                "--sub-file=/videos/Clip/en.vtt",
                "--sid=1",
                "--secondary-sid=2",
                "--input-conf=/tmp/input.conf",
                "/videos/Clip/Clip [abc].webm",
            ]
        );
        assert_eq!(cmd.current_dir.as_deref(), Some(dir));
    }

    #[test]
    fn test_input_conf_contains_bindings_and_is_removed() {
        let player = MpvPlayer::new(Config::default().player);
        let file = player.write_input_conf().unwrap();
        let path = file.path().to_path_buf();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "UP cycle secondary-sid\n");
        drop(file);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_player_binary() {
        let mut config = Config::default().player;
        config.binary_path = "dualsub-no-such-player".to_string();
        let dir = tempfile::tempdir().unwrap();

        let err = MpvPlayer::new(config).play(&request(dir.path())).await.unwrap_err();
        assert!(matches!(err, DualsubError::Player(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_status_is_ignored_and_input_conf_removed() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("args.log");
        let script = dir.path().join("fake-mpv");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nfor a in \"$@\"; do echo \"$a\" >> '{}'; done\nexit 3\n",
                log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = Config::default().player;
        config.binary_path = script.to_string_lossy().to_string();

        MpvPlayer::new(config).play(&request(dir.path())).await.unwrap();

        let args = std::fs::read_to_string(&log).unwrap();
        assert!(args.contains("--secondary-sid=2"));
        let input_conf = args
            .lines()
            .find_map(|l| l.strip_prefix("--input-conf="))
            .unwrap();
        assert!(!Path::new(input_conf).exists());
    }
}
