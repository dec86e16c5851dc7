//! meetbook bot entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use meetbook_bot::config::BotConfig;
use meetbook_bot::error::{BotError, BotResult};
use meetbook_bot::handler::BotHandler;
use meetbook_bot::telegram::TelegramClient;
use meetbook_store::MeetingStore;
use meetbook_youtube::{YouTubeCredentials, YouTubeUploader};
use meetbook_zoom::ZoomScheduler;

/// meetbook - Telegram bot booking Zoom meetings across an account pool
#[derive(Debug, Parser)]
#[command(name = "meetbook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "MEETBOOK_CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug output
    #[arg(long, short = 'v')]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        meetbook_core::tracing::TracingConfig::debug()
    } else {
        meetbook_core::tracing::TracingConfig::default()
    };
    if let Err(e) = meetbook_core::tracing::init_tracing(tracing_config) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> BotResult<()> {
    let config = BotConfig::load_from(&cli.config)?;
    let timezone = config.timezone()?;

    let scheduler = ZoomScheduler::new(config.zoom_config()?)?;
    let store = MeetingStore::open(&config.database_path)?;
    let telegram = TelegramClient::new(&config.telegram_token);
    let uploader = match &config.youtube_credentials {
        Some(path) => Some(YouTubeUploader::new(YouTubeCredentials::from_file(path)?)),
        None => None,
    };

    if !config.work_dir.exists() {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| BotError::Config(format!("cannot create work_dir: {e}")))?;
    }

    let mut handler = BotHandler::new(
        telegram,
        scheduler,
        store,
        uploader,
        timezone,
        config.work_dir.clone(),
    );
    handler.run().await;
    Ok(())
}
