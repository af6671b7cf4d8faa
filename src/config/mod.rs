use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct CommonConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl CommonConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: CommonConfig,
    pub ntfy: NtfyConfig,
}

#[derive(Debug, Clone)]
pub struct NtfyConfig {
    pub base_url: String,
    /// Opaque subscriber channel on the push service.
    pub topic: String,
    pub tags: String,
    pub priority: String,
    pub enabled: bool,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = CommonConfig::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(RelayConfig {
            common,
            ntfy: NtfyConfig {
                base_url: get_env("NTFY_BASE_URL", Some("https://ntfy.sh"), is_prod)?,
                topic: get_env("NTFY_TOPIC", Some("pushme-relay-dev"), is_prod)?,
                tags: get_env("NTFY_TAGS", Some("incoming_envelope"), is_prod)?,
                priority: get_env("NTFY_PRIORITY", Some("3"), is_prod)?,
                enabled: env::var("NTFY_ENABLED")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .unwrap_or(true),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
