use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEV_IP_HASH_SALT: &str = "dev-only-salt";

/// Which completion backend serves chat and analysis requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProviderKind {
    OpenAi,
    Anthropic,
}

impl AiProviderKind {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProviderKind::OpenAi),
            "anthropic" => Ok(AiProviderKind::Anthropic),
            other => bail!("AI_PROVIDER must be 'openai' or 'anthropic', got '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a production deployment is missing its IP hash salt.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub ai_provider: AiProviderKind,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub ip_hash_salt: String,
    pub seed_data_base64: Option<String>,
    pub seed_data_dir: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("APP_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let ip_hash_salt = match (get("IP_HASH_SALT"), environment) {
            (Some(salt), _) => salt,
            (None, Environment::Production) => {
                bail!("IP_HASH_SALT must be set when APP_ENV=production")
            }
            (None, Environment::Development) => DEV_IP_HASH_SALT.to_string(),
        };

        let ai_provider = match get("AI_PROVIDER") {
            Some(raw) => AiProviderKind::parse(&raw)?,
            None => AiProviderKind::OpenAi,
        };

        Ok(Config {
            environment,
            database_url: get("DATABASE_URL"),
            database_max_connections: get("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            redis_url: get("REDIS_URL"),
            ai_provider,
            openai_api_key: get("OPENAI_API_KEY"),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            ip_hash_salt,
            seed_data_base64: get("SEED_DATA_BASE64"),
            seed_data_dir: get("SEED_DATA_DIR").map(PathBuf::from),
            port: get("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
