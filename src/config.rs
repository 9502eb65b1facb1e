use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::stores::StoreLatency;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_LIST_LATENCY_MS: u64 = 500;
const DEFAULT_DETAIL_LATENCY_MS: u64 = 300;
const DEFAULT_LISTING_LIMIT: usize = 8;
const DEFAULT_MAX_LISTING_LIMIT: usize = 100;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[validate(length(min = 1))]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[validate(length(min = 1))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS fallback
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Path to a catalog seed JSON document; the embedded seed is used when unset
    #[serde(default)]
    pub catalog_seed_path: Option<String>,

    /// Apply the simulated store latency when resolving navigation requests
    #[serde(default)]
    pub simulate_latency: bool,

    /// Simulated latency for list fetches (milliseconds)
    #[serde(default = "default_list_latency_ms")]
    #[validate(range(max = 10000))]
    pub list_latency_ms: u64,

    /// Simulated latency for single-record fetches (milliseconds)
    #[serde(default = "default_detail_latency_ms")]
    #[validate(range(max = 10000))]
    pub detail_latency_ms: u64,

    /// Default number of items for latest / most-enquired listings
    #[serde(default = "default_listing_limit")]
    #[validate(range(min = 1))]
    pub default_listing_limit: usize,

    /// Upper bound accepted for a `limit` query parameter
    #[serde(default = "default_max_listing_limit")]
    #[validate(range(min = 1))]
    pub max_listing_limit: usize,
}

impl AppConfig {
    pub fn new(host: String, port: u16, environment: String) -> Self {
        Self {
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            catalog_seed_path: None,
            simulate_latency: false,
            list_latency_ms: default_list_latency_ms(),
            detail_latency_ms: default_detail_latency_ms(),
            default_listing_limit: default_listing_limit(),
            max_listing_limit: default_max_listing_limit(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Latency applied by the stores. Zero unless `simulate_latency` is set.
    pub fn store_latency(&self) -> StoreLatency {
        if self.simulate_latency {
            StoreLatency {
                list: Duration::from_millis(self.list_latency_ms),
                detail: Duration::from_millis(self.detail_latency_ms),
            }
        } else {
            StoreLatency::none()
        }
    }

    /// Clamps a requested listing size into `1..=max_listing_limit`.
    pub fn listing_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_listing_limit)
            .clamp(1, self.max_listing_limit)
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if self.default_listing_limit > self.max_listing_limit {
            let mut err = ValidationError::new("default_listing_limit_exceeds_max");
            err.message = Some("default_listing_limit must not exceed max_listing_limit".into());
            errors.add("default_listing_limit", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_list_latency_ms() -> u64 {
    DEFAULT_LIST_LATENCY_MS
}

fn default_detail_latency_ms() -> u64 {
    DEFAULT_DETAIL_LATENCY_MS
}

fn default_listing_limit() -> usize {
    DEFAULT_LISTING_LIMIT
}

fn default_max_listing_limit() -> usize {
    DEFAULT_MAX_LISTING_LIMIT
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("skyline_catalog={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit config directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_latency_is_zero_unless_simulated() {
        let mut cfg = AppConfig::new("127.0.0.1".into(), 8080, "development".into());
        assert_eq!(cfg.store_latency(), StoreLatency::none());

        cfg.simulate_latency = true;
        let latency = cfg.store_latency();
        assert_eq!(latency.list, Duration::from_millis(500));
        assert_eq!(latency.detail, Duration::from_millis(300));
    }

    #[test]
    fn listing_limit_is_clamped() {
        let cfg = AppConfig::new("127.0.0.1".into(), 8080, "development".into());
        assert_eq!(cfg.listing_limit(None), 8);
        assert_eq!(cfg.listing_limit(Some(0)), 1);
        assert_eq!(cfg.listing_limit(Some(500)), 100);
        assert_eq!(cfg.listing_limit(Some(12)), 12);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut cfg = AppConfig::new("127.0.0.1".into(), 8080, "development".into());
        cfg.log_level = "verbose".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn loads_file_overrides_from_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "port = 9090\nsimulate_latency = true\nlist_latency_ms = 120\n",
        )
        .unwrap();

        let cfg = load_config_from(dir.path()).unwrap();
        assert_eq!(cfg.port, 9090);
        assert!(cfg.simulate_latency);
        assert_eq!(cfg.list_latency_ms, 120);
        assert_eq!(cfg.detail_latency_ms, 300);
    }
}
