//! Bot configuration.
//!
//! All settings live in a single TOML file passed on the command line:
//!
//! ```toml
//! telegram_token = "123456:ABC"
//! timezone = "Asia/Almaty"
//! database_path = "meetings.db"
//! work_dir = "recordings"
//! youtube_credentials = "youtube.json"
//!
//! [[accounts]]
//! email = "host@example.com"
//! client_id = "..."
//! client_secret = "..."
//! account_id = "..."
//! ```

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;

use meetbook_zoom::{ZoomAccount, ZoomConfig};

use crate::error::{BotError, BotResult};

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from("meetings.db")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Configuration for the bot process.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Telegram bot token.
    pub telegram_token: String,

    /// IANA timezone meetings are entered in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// SQLite database location.
    #[serde(default = "default_database")]
    pub database_path: PathBuf,

    /// Directory recordings and summaries land in.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// YouTube OAuth credentials file; uploads are disabled without it.
    #[serde(default)]
    pub youtube_credentials: Option<PathBuf>,

    /// Zoom REST base override; defaults to the public endpoint.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Zoom token endpoint override; defaults to the public endpoint.
    #[serde(default)]
    pub token_url: Option<String>,

    /// Ordered Zoom account pool.
    pub accounts: Vec<ZoomAccount>,
}

impl BotConfig {
    /// Loads the configuration from a TOML file.
    pub fn load_from(path: &Path) -> BotResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| BotError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&text)
    }

    /// Parses a TOML configuration string.
    pub fn parse(text: &str) -> BotResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| BotError::Config(e.to_string()))?;
        if config.telegram_token.is_empty() {
            return Err(BotError::Config("telegram_token is required".into()));
        }
        Ok(config)
    }

    /// Resolves the configured timezone name.
    pub fn timezone(&self) -> BotResult<Tz> {
        self.timezone
            .parse()
            .map_err(|_| BotError::Config(format!("unknown timezone: {}", self.timezone)))
    }

    /// Builds the provider configuration from this file.
    pub fn zoom_config(&self) -> BotResult<ZoomConfig> {
        let mut config = ZoomConfig::new(self.accounts.clone())
            .with_timezone(self.timezone()?)
            .with_work_dir(&self.work_dir);
        if let Some(base) = &self.api_base {
            config = config.with_api_base(base);
        }
        if let Some(url) = &self.token_url {
            config = config.with_token_url(url);
        }
        Ok(config)
    }
}
