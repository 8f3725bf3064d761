use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const PLACEHOLDER_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Startup settings, read once from `HERALD_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub bot_token: Option<String>,
    pub admin_password: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub send_delay: Duration,
    pub telegram_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("HERALD_PORT", "5000");
        let port = port.parse().map_err(|_| ConfigError::Invalid {
            var: "HERALD_PORT",
            expected: "a port number",
            value: port,
        })?;

        let delay = var("HERALD_SEND_DELAY_MS", "1000");
        let send_delay = delay
            .parse()
            .map(Duration::from_millis)
            .map_err(|_| ConfigError::Invalid {
                var: "HERALD_SEND_DELAY_MS",
                expected: "a whole number of milliseconds",
                value: delay,
            })?;

        Ok(Self {
            jwt_secret: var("HERALD_JWT_SECRET", PLACEHOLDER_JWT_SECRET),
            bot_token: lookup("HERALD_BOT_TOKEN").filter(|t| !t.trim().is_empty()),
            admin_password: var("HERALD_ADMIN_PASSWORD", "admin123"),
            db_path: PathBuf::from(var("HERALD_DB_PATH", "herald.db")),
            host: var("HERALD_HOST", "0.0.0.0"),
            port,
            send_delay,
            telegram_api_url: var(
                "HERALD_TELEGRAM_API_URL",
                herald_dispatch::telegram::DEFAULT_API_URL,
            ),
        })
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.jwt_secret == PLACEHOLDER_JWT_SECRET
    }
}
