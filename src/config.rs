//! Configuration management for the classification service.

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file location.
const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifact: ArtifactConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Model artifact configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    /// Path to the bundle manifest.
    #[serde(default = "default_bundle_path")]
    pub bundle_path: PathBuf,
    /// Number of intra-op threads for ONNX inference.
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Append-only log file, in addition to stdout.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Metrics reporting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between periodic summary logs; 0 disables the reporter.
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_bundle_path() -> PathBuf {
    PathBuf::from("artifacts/bundle.json")
}

fn default_onnx_threads() -> usize {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_report_interval() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Lookup order: first CLI argument, `MUSHROOM_CONFIG` env var, then
    /// `config/config.toml` if present, otherwise built-in defaults. A path
    /// that was explicitly given must load; the default path is optional.
    pub fn load() -> Result<Self> {
        let explicit: Option<PathBuf> = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("MUSHROOM_CONFIG").ok())
            .map(PathBuf::from);

        match explicit {
            Some(path) => Self::load_from_path(&path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from_path(DEFAULT_CONFIG_PATH)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            artifact: ArtifactConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            bundle_path: default_bundle_path(),
            onnx_threads: default_onnx_threads(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: default_report_interval(),
        }
    }
}
