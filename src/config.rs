use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    /// Minimum age in whole years a user must have reached to be saved.
    pub min_age: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub user: UserConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let min_age = var("USER_MIN_AGE")
            .context("USER_MIN_AGE must be set")?
            .trim()
            .parse::<u32>()
            .context("USER_MIN_AGE must be a non-negative integer")?;
        let port = match var("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT must be a valid port")?,
            None => 8080,
        };
        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            user: UserConfig { min_age },
        })
    }
}
