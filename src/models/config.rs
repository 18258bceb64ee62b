//! Configuration module for GlucoGuard
//!
//! Values come from environment variables with defaults from
//! `utils/constants.rs`. Both binaries build their config here.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_HOST, DEFAULT_MODEL_PATH, DEFAULT_PORT, DEFAULT_RATE_LIMIT_PER_MINUTE,
    DEFAULT_SCALER_PATH, DEFAULT_STATS_DIR,
};

/// Environment variable names
pub mod env_keys {
    pub const MODEL_PATH: &str = "GLUCOGUARD_MODEL_PATH";
    pub const SCALER_PATH: &str = "GLUCOGUARD_SCALER_PATH";
    pub const HOST: &str = "GLUCOGUARD_HOST";
    /// Platform-provided port takes precedence
    pub const PLATFORM_PORT: &str = "PORT";
    pub const PORT: &str = "GLUCOGUARD_PORT";
    pub const API_KEY: &str = "GLUCOGUARD_API_KEY";
    pub const RATE_LIMIT: &str = "GLUCOGUARD_RATE_LIMIT";
    pub const STATS_DIR: &str = "GLUCOGUARD_STATS_DIR";
}

/// Where the model and scaler artifacts live
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: std::env::var(env_keys::MODEL_PATH)
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
                .into(),
            scaler_path: std::env::var(env_keys::SCALER_PATH)
                .unwrap_or_else(|_| DEFAULT_SCALER_PATH.to_string())
                .into(),
        }
    }
}

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: DEFAULT_RATE_LIMIT_PER_MINUTE,
            window_duration: Duration::from_secs(60),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// When set, `/v1/*` (except health) requires a matching `X-API-Key`
    pub api_key: Option<String>,
    pub rate_limit: RateLimitConfig,
    /// Directory for statistics exports
    pub stats_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            rate_limit: RateLimitConfig::default(),
            stats_dir: PathBuf::from(DEFAULT_STATS_DIR),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> AppResult<SocketAddr> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|_| AppError::invalid_config(env_keys::HOST, &raw))
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Build from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let model = ModelConfig {
            model_path: lookup(env_keys::MODEL_PATH)
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
                .into(),
            scaler_path: lookup(env_keys::SCALER_PATH)
                .unwrap_or_else(|| DEFAULT_SCALER_PATH.to_string())
                .into(),
        };

        let port = match lookup(env_keys::PLATFORM_PORT).or_else(|| lookup(env_keys::PORT)) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::invalid_config(env_keys::PORT, &raw))?,
            None => DEFAULT_PORT,
        };

        let requests_per_window = match lookup(env_keys::RATE_LIMIT) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(AppError::invalid_config(env_keys::RATE_LIMIT, &raw)),
            },
            None => DEFAULT_RATE_LIMIT_PER_MINUTE,
        };

        let server = ServerConfig {
            host: lookup(env_keys::HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            api_key: lookup(env_keys::API_KEY).filter(|k| !k.trim().is_empty()),
            rate_limit: RateLimitConfig {
                requests_per_window,
                ..RateLimitConfig::default()
            },
            stats_dir: lookup(env_keys::STATS_DIR)
                .unwrap_or_else(|| DEFAULT_STATS_DIR.to_string())
                .into(),
        };

        Ok(Self { model, server })
    }

    /// Log the effective configuration (API key is never logged)
    pub fn log_summary(&self) {
        info!("📦 Model artifact:  {}", self.model.model_path.display());
        info!("📦 Scaler artifact: {}", self.model.scaler_path.display());
        info!(
            "🔐 API key auth: {}",
            if self.server.api_key.is_some() { "enabled" } else { "disabled" }
        );
        info!(
            "⏱️ Rate limit: {} req / {}s",
            self.server.rate_limit.requests_per_window,
            self.server.rate_limit.window_duration.as_secs()
        );
    }
}
