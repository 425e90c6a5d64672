//! dualsub - watch foreign videos with native subtitles
//!
//! Entry point: downloads a video with yt-dlp, translates its subtitles and
//! launches mpv with the original and translated tracks shown together.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::{non_blocking, rolling};

use dualsub::cli::{Args, Commands};
use dualsub::config::Config;
use dualsub::workflow::Workflow;

const DEFAULT_CONFIG_FILE: &str = "dualsub.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting dualsub");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Watch { url, base_dir, no_play } => {
            let workflow = Workflow::new(config)?;
            let prepared = workflow.watch(&url, &base_dir, !no_play).await?;
            println!("{}", prepared.directory.display());
        }
        Commands::Info { url } => {
            let workflow = Workflow::new(config)?;
            let metadata = workflow.fetch_metadata(&url).await?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Commands::Translate { input, output } => {
            info!("Translating subtitles: {}", input.display());
            let workflow = Workflow::new(config)?;
            let count = workflow.translate_file(&input, &output).await?;
            println!("Translated {} cues into {}", count, output.display());
        }
        Commands::Play { dir } => {
            let workflow = Workflow::new(config)?;
            workflow.play_directory(&dir).await?;
        }
        Commands::InitConfig { output } => {
            config.save_to_file(&output)?;
            println!("Wrote configuration to {}", output.display());
        }
    }

    info!("dualsub completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".dualsub").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotation
    let file_appender = rolling::daily(&log_dir, "dualsub.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("dualsub.log").display());

    Ok(())
}
