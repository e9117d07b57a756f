use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmSettings,
}

/// Settings for the text-completion client.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub mock: bool,
    pub model: String,
    pub timeout_s: f64,
    pub retries: u32,
    pub prompts_dir: PathBuf,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            mock: false,
            model: "gpt-4o-mini".to_string(),
            timeout_s: 20.0,
            retries: 2,
            prompts_dir: PathBuf::from("prompts"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = LlmSettings::default();

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm: LlmSettings {
                api_key: optional_env("OPENAI_API_KEY"),
                mock: optional_env("LLM_MOCK").as_deref().is_some_and(is_truthy),
                model: optional_env("LLM_MODEL").unwrap_or(defaults.model),
                timeout_s: match optional_env("LLM_TIMEOUT_S") {
                    Some(raw) => raw
                        .parse::<f64>()
                        .context("LLM_TIMEOUT_S must be a number of seconds")?,
                    None => defaults.timeout_s,
                },
                retries: match optional_env("LLM_RETRIES") {
                    // Negative retry counts clamp to zero.
                    Some(raw) => raw
                        .parse::<i64>()
                        .context("LLM_RETRIES must be an integer")?
                        .clamp(0, u32::MAX as i64) as u32,
                    None => defaults.retries,
                },
                prompts_dir: optional_env("PROMPTS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.prompts_dir),
            },
        })
    }
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `1`, `true`, `yes` and `on` (any case) enable a flag.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
