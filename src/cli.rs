use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video, translate its subtitles and play it with both tracks
    Watch {
        /// Video URL
        url: String,

        /// Directory under which the videos folder is created
        #[arg(short, long, default_value = ".")]
        base_dir: PathBuf,

        /// Prepare the files but do not launch the player
        #[arg(long)]
        no_play: bool,
    },

    /// Show the video's metadata without downloading it
    Info {
        /// Video URL
        url: String,
    },

    /// Translate a WebVTT file
    Translate {
        /// Input subtitle file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Play an already prepared video directory
    Play {
        /// Video directory containing the video and both subtitle files
        dir: PathBuf,
    },

    /// Write the default configuration file
    InitConfig {
        /// Output path
        #[arg(short, long, default_value = "dualsub.toml")]
        output: PathBuf,
    },
}
