//! Service config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use devicemon_core::error::{DeviceMonError, Result};

pub use schema::{AppConfig, AppSection, DelaySection, MetricsSection, ServerSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<AppConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| DeviceMonError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

/// Like [`load_from_file`], but a missing file yields the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(DeviceMonError::Internal(format!("read config failed: {e}"))),
    }
}

pub fn load_from_str(s: &str) -> Result<AppConfig> {
    let cfg: AppConfig = serde_yaml::from_str(s)
        .map_err(|e| DeviceMonError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
