//! Process settings.
//!
//! Values come from an optional TOML file (`config/financebot.toml` unless
//! `--config` says otherwise), overridden by environment variables such as
//! `TELEGRAM_TOKEN`. A `.env` file is loaded into the environment first.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/financebot.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub telegram_token: String,
    pub openai_api_key: String,
    /// Comma-separated Telegram usernames.
    pub authorized_users: String,
    /// SQLite file; the ledger lives in memory when unset.
    pub database_path: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            openai_api_key: String::new(),
            authorized_users: String::new(),
            database_path: None,
            openai_model: classifier::DEFAULT_MODEL.to_string(),
            openai_api_base: classifier::DEFAULT_API_BASE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "financebot", about = "Telegram expense tracker")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long)]
    log_level: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let mut settings = Self::load(config_path)?;
        if let Some(level) = args.log_level {
            settings.log_level = level;
        }
        Ok(settings)
    }

    fn load(config_path: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::default().try_parsing(false))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token.trim().is_empty() || self.openai_api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "TELEGRAM_TOKEN or OPENAI_API_KEY not set".to_string(),
            ));
        }
        Ok(())
    }

    /// The database path, if one is configured and non-blank.
    pub fn database_path(&self) -> Option<&str> {
        self.database_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}
