use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Everything has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Internal mailbox that receives demo and hiring notifications.
    pub notify_to: String,
    pub notify_from: String,
    pub rate_limit_sweep_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            notify_to: std::env::var("NOTIFY_TO").unwrap_or_else(|_| "team@fornix.ai".to_string()),
            notify_from: std::env::var("NOTIFY_FROM")
                .unwrap_or_else(|_| "noreply@fornix.ai".to_string()),
            rate_limit_sweep_secs: parse_env("RATE_LIMIT_SWEEP_SECS", 300)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            notify_to: "team@example.test".to_string(),
            notify_from: "noreply@example.test".to_string(),
            rate_limit_sweep_secs: 300,
        }
    }
}
