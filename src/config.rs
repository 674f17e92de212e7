//! Process-wide configuration, loaded once at start-up from environment variables.
//!
//! Everything here is immutable after construction. The HTTP layer wraps
//! `Settings` in an `Arc` and hands `&ThresholdConfig` to the pipeline;
//! no pipeline stage reads the environment itself.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::pipeline::Thresholds;

/// Application-level constants
pub const APP_NAME: &str = "image-quality-gate";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BLUR_MIN: f64 = 140.0;
pub const DEFAULT_BRIGHT_MIN: f64 = 20.0;
pub const DEFAULT_BRIGHT_MAX: f64 = 235.0;
pub const DEFAULT_RESIZE_MAX_DIM: u32 = 1600;
pub const DEFAULT_MAX_UPLOAD_MB: u32 = 6;

/// Smallest `RESIZE_MAX_DIM` accepted. Below this the blur metric stops
/// discriminating between sharp and soft photos.
pub const MIN_RESIZE_MAX_DIM: u32 = 256;
/// Upload ceiling range in megabytes.
pub const MAX_UPLOAD_MB_RANGE: (u32, u32) = (1, 25);

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?} as {expected}")]
    Parse {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{key}: {reason}")]
    OutOfRange { key: &'static str, reason: String },
}

// ═══════════════════════════════════════════════════════════
// ThresholdConfig
// ═══════════════════════════════════════════════════════════

/// Scoring and decision parameters shared by every request.
///
/// `resize_max_dim` must be identical between threshold tuning and serving:
/// both metrics are resolution-dependent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdConfig {
    pub blur_min: f64,
    pub bright_min: f64,
    pub bright_max: f64,
    pub resize_max_dim: u32,
    pub max_upload_mb: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            blur_min: DEFAULT_BLUR_MIN,
            bright_min: DEFAULT_BRIGHT_MIN,
            bright_max: DEFAULT_BRIGHT_MAX,
            resize_max_dim: DEFAULT_RESIZE_MAX_DIM,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl ThresholdConfig {
    /// Upload ceiling in bytes, enforced before any decode work.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * BYTES_PER_MB
    }

    /// The three decision bounds, as reported back to callers.
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            blur_min: self.blur_min,
            bright_min: self.bright_min,
            bright_max: self.bright_max,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.blur_min.is_finite() || self.blur_min < 0.0 {
            return Err(ConfigError::OutOfRange {
                key: "BLUR_MIN",
                reason: format!("must be a finite value >= 0, got {}", self.blur_min),
            });
        }
        for (key, value) in [("BRIGHT_MIN", self.bright_min), ("BRIGHT_MAX", self.bright_max)] {
            if !(0.0..=255.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    key,
                    reason: format!("must be within 0..=255, got {value}"),
                });
            }
        }
        if self.bright_min > self.bright_max {
            return Err(ConfigError::OutOfRange {
                key: "BRIGHT_MIN",
                reason: format!(
                    "must not exceed BRIGHT_MAX ({} > {})",
                    self.bright_min, self.bright_max
                ),
            });
        }
        if self.resize_max_dim < MIN_RESIZE_MAX_DIM {
            return Err(ConfigError::OutOfRange {
                key: "RESIZE_MAX_DIM",
                reason: format!(
                    "must be >= {MIN_RESIZE_MAX_DIM}, got {}",
                    self.resize_max_dim
                ),
            });
        }
        let (lo, hi) = MAX_UPLOAD_MB_RANGE;
        if !(lo..=hi).contains(&self.max_upload_mb) {
            return Err(ConfigError::OutOfRange {
                key: "MAX_UPLOAD_MB",
                reason: format!("must be within {lo}..={hi}, got {}", self.max_upload_mb),
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════

/// Full service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub request_timeout_secs: u64,
    pub thresholds: ThresholdConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            app_version: APP_VERSION.to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            log_json: true,
            request_timeout_secs: 30,
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Settings::default();

        let thresholds = ThresholdConfig {
            blur_min: parse_or(get("BLUR_MIN"), "BLUR_MIN", "number", defaults.thresholds.blur_min)?,
            bright_min: parse_or(
                get("BRIGHT_MIN"),
                "BRIGHT_MIN",
                "number",
                defaults.thresholds.bright_min,
            )?,
            bright_max: parse_or(
                get("BRIGHT_MAX"),
                "BRIGHT_MAX",
                "number",
                defaults.thresholds.bright_max,
            )?,
            resize_max_dim: parse_or(
                get("RESIZE_MAX_DIM"),
                "RESIZE_MAX_DIM",
                "positive integer",
                defaults.thresholds.resize_max_dim,
            )?,
            max_upload_mb: parse_or(
                get("MAX_UPLOAD_MB"),
                "MAX_UPLOAD_MB",
                "positive integer",
                defaults.thresholds.max_upload_mb,
            )?,
        };
        thresholds.validate()?;

        let log_json = match get("LOG_JSON") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Parse {
                key: "LOG_JSON",
                value: raw,
                expected: "boolean",
            })?,
            None => defaults.log_json,
        };

        let request_timeout_secs: u64 = parse_or(
            get("REQUEST_TIMEOUT_SECS"),
            "REQUEST_TIMEOUT_SECS",
            "positive integer",
            defaults.request_timeout_secs,
        )?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                key: "REQUEST_TIMEOUT_SECS",
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            app_version: get("APP_VERSION").unwrap_or(defaults.app_version),
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(get("PORT"), "PORT", "port number", defaults.port)?,
            log_level: get("LOG_LEVEL")
                .map(|l| l.to_ascii_lowercase())
                .unwrap_or(defaults.log_level),
            log_json,
            request_timeout_secs,
            thresholds,
        })
    }

    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    key: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Parse {
            key,
            value,
            expected,
        }),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Default `tracing` filter directive when `RUST_LOG` is unset.
pub fn default_log_filter(level: &str) -> String {
    format!("{level},hyper=warn,tower_http=info")
}
