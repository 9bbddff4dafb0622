use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use clap::{Parser, ValueEnum};
use url::Url;

use crate::error::AppError;
use crate::models::Locale;
use crate::steam::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "steam-card",
    version,
    about = "HTTP service that builds Steam profile cards"
)]
pub struct Cli {
    /// Steam Web API key.
    #[arg(long, env = "STEAM_API_KEY", hide_env_values = true)]
    pub api_key: String,
    #[arg(long, env = "STEAM_CARD_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,
    #[arg(long, env = "STEAM_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub api_base_url: Url,
    /// Timeout for each request made to Steam.
    #[arg(
        long,
        env = "STEAM_CARD_TIMEOUT_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
    /// Origins allowed by CORS. Leave empty to allow any origin.
    #[arg(
        long = "allowed-origin",
        env = "STEAM_CARD_ALLOWED_ORIGINS",
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,
    #[arg(long, env = "STEAM_CARD_LOCALE", value_enum, default_value_t = Locale::Es)]
    pub locale: Locale,
    #[arg(long, env = "STEAM_CARD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>, AppError> {
        self.allowed_origins
            .iter()
            .map(|raw| raw.trim())
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| AppError::Internal(format!("invalid allowed origin '{origin}'")))
            })
            .collect()
    }
}
