// src/config.rs
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::prompt::PromptVariant;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TRADE_LOG_PATH: &str = "chartgpt_trade_log.csv";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub trade_log_path: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub prompt_variant: PromptVariant,
    pub completion_timeout: Duration,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        _ => Ok(default),
    }
}

impl AppConfig {
    /// Reads configuration from the environment (call `dotenv().ok()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;

        let timeout_secs: u64 = parse_var("COMPLETION_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "COMPLETION_TIMEOUT_SECS",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            host: var_or("HOST", DEFAULT_HOST),
            port: parse_var("PORT", DEFAULT_PORT)?,
            trade_log_path: var_or("TRADE_LOG_PATH", DEFAULT_TRADE_LOG_PATH),
            openai_api_key,
            openai_model: var_or("OPENAI_MODEL", DEFAULT_MODEL),
            openai_base_url: var_or("OPENAI_BASE_URL", DEFAULT_BASE_URL),
            prompt_variant: parse_var("PROMPT_VARIANT", PromptVariant::Structured)?,
            completion_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
