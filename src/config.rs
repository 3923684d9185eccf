//! Process configuration from environment variables.
//!
//! Resolved once at startup; every variable has a local-serving default.

use std::net::SocketAddr;
use std::path::PathBuf;

/// 10 MiB default upload cap.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Invalid configuration value.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {var}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub bind: SocketAddr,
    /// Directory holding the exported model artifacts.
    pub model_dir: PathBuf,
    /// Directory staged uploads are written under.
    pub upload_dir: PathBuf,
    /// Request body cap applied to the router.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Resolve configuration from `MEDSCREEN_*` environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError` when a set variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind = match std::env::var("MEDSCREEN_BIND") {
            Ok(v) => v.parse().map_err(|e| ConfigError {
                var: "MEDSCREEN_BIND",
                message: format!("`{v}`: {e}"),
            })?,
            Err(_) => SocketAddr::from(([127, 0, 0, 1], 8000)),
        };

        let model_dir = std::env::var("MEDSCREEN_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("models"));

        let upload_dir = std::env::var("MEDSCREEN_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("medscreen-uploads"));

        let max_upload_bytes = match std::env::var("MEDSCREEN_MAX_UPLOAD_BYTES") {
            Ok(v) => v
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| ConfigError {
                    var: "MEDSCREEN_MAX_UPLOAD_BYTES",
                    message: format!("`{v}` is not a positive byte count"),
                })?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            bind,
            model_dir,
            upload_dir,
            max_upload_bytes,
        })
    }
}
