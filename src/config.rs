use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    gemini::DEMO_KEY,
    generator::{GenerationSettings, GENERATION_TIMEOUT, MAX_RETRIES, RETRY_BACKOFF},
};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-002";

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub cors_origin: String,
    pub generation: GenerationSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = GenerationSettings::default();
        let generation = GenerationSettings {
            max_retries: try_load("GENERATION_MAX_RETRIES", MAX_RETRIES)?.max(1),
            timeout: Duration::from_secs(try_load("GENERATION_TIMEOUT_SECS", GENERATION_TIMEOUT.as_secs())?),
            backoff: Duration::from_millis(try_load("GENERATION_BACKOFF_MS", RETRY_BACKOFF.as_millis() as u64)?),
            max_output_tokens: try_load("GENERATION_MAX_OUTPUT_TOKENS", defaults.max_output_tokens)?,
            ..defaults
        };

        Ok(Self {
            port: try_load("PORT", 8080)?,
            api_key: try_load("GEMINI_API_KEY", DEMO_KEY.to_string())?,
            api_base: try_load("GEMINI_API_BASE", DEFAULT_API_BASE.to_string())?,
            model: try_load("GEMINI_MODEL", DEFAULT_MODEL.to_string())?,
            cors_origin: try_load("CORS_ORIGIN", "*".to_string())?,
            generation,
        })
    }
}

fn try_load<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => {
            info!("{key} not set, using default: {}", redact(key, &default));
            Ok(default)
        }
    }
}

fn redact<T: Display>(key: &str, value: &T) -> String {
    if key.ends_with("_KEY") {
        "***".to_string()
    } else {
        value.to_string()
    }
}
