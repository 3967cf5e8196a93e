use std::net::SocketAddr;

use serde::Deserialize;
use devicemon_core::error::{DeviceMonError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub app: AppSection,

    #[serde(default)]
    pub delay: DelaySection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
            app: AppSection::default(),
            delay: DelaySection::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(DeviceMonError::BadRequest(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.server.validate()?;
        self.metrics.validate()?;
        self.delay.validate()?;

        if self.app.version.trim().is_empty() {
            return Err(DeviceMonError::BadRequest("app.version must not be empty".into()));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_api_listen")]
    pub api_listen: String,

    #[serde(default = "default_metrics_listen")]
    pub metrics_listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            api_listen: default_api_listen(),
            metrics_listen: default_metrics_listen(),
        }
    }
}

impl ServerSection {
    pub fn api_addr(&self) -> Result<SocketAddr> {
        parse_addr("server.api_listen", &self.api_listen)
    }

    pub fn metrics_addr(&self) -> Result<SocketAddr> {
        parse_addr("server.metrics_listen", &self.metrics_listen)
    }

    pub fn validate(&self) -> Result<()> {
        let api = self.api_addr()?;
        let metrics = self.metrics_addr()?;
        // port 0 asks the OS for a free port, so two of them never collide
        if api == metrics && api.port() != 0 {
            return Err(DeviceMonError::BadRequest(
                "server.api_listen and server.metrics_listen must differ".into(),
            ));
        }
        Ok(())
    }
}

fn parse_addr(field: &str, s: &str) -> Result<SocketAddr> {
    s.parse()
        .map_err(|e| DeviceMonError::BadRequest(format!("{field} must be a valid SocketAddr: {e}")))
}

fn default_api_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_metrics_listen() -> String {
    "0.0.0.0:8081".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.namespace.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(DeviceMonError::BadRequest(format!(
                "metrics.namespace is not a valid metric name prefix: {:?}",
                self.namespace
            )));
        }
        Ok(())
    }
}

fn default_namespace() -> String {
    "prometheus_app".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    /// Reported through `version_info{version=...}`.
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            version: default_version(),
        }
    }
}

fn default_version() -> String {
    "1.0.0".into()
}

const MAX_DELAY_MS: u64 = 60_000;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelaySection {
    #[serde(default = "default_delay_enabled")]
    pub enabled: bool,

    #[serde(default = "default_list_max_ms")]
    pub list_max_ms: u64,

    #[serde(default = "default_upgrade_max_ms")]
    pub upgrade_max_ms: u64,
}

impl Default for DelaySection {
    fn default() -> Self {
        Self {
            enabled: default_delay_enabled(),
            list_max_ms: default_list_max_ms(),
            upgrade_max_ms: default_upgrade_max_ms(),
        }
    }
}

impl DelaySection {
    pub fn validate(&self) -> Result<()> {
        if self.list_max_ms > MAX_DELAY_MS || self.upgrade_max_ms > MAX_DELAY_MS {
            return Err(DeviceMonError::BadRequest(format!(
                "delay.*_max_ms must be at most {MAX_DELAY_MS}"
            )));
        }
        Ok(())
    }
}

fn default_delay_enabled() -> bool {
    true
}
fn default_list_max_ms() -> u64 {
    200
}
fn default_upgrade_max_ms() -> u64 {
    1000
}
