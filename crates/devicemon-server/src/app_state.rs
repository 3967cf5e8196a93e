//! Shared application state for the device service.
//!
//! Built once at startup: registers every instrument (duplicate names fail
//! the build), seeds the store, and publishes the initial gauge values.

use std::sync::Arc;

use devicemon_core::device::seed_devices;
use devicemon_core::error::Result;

use crate::config::AppConfig;
use crate::latency::{self, LatencyInjector};
use crate::obs::{DeviceMetrics, Registry};
use crate::store::DeviceStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: DeviceStore,
    registry: Registry,
    metrics: DeviceMetrics,
    latency: Box<dyn LatencyInjector>,
}

impl AppState {
    /// Build state from config, with latency as configured.
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        Self::with_latency(cfg, latency::from_config(&cfg.delay))
    }

    /// Build state with an explicit latency injector.
    pub fn with_latency(cfg: &AppConfig, latency: Box<dyn LatencyInjector>) -> Result<Self> {
        let mut registry = Registry::new(cfg.metrics.namespace.clone());
        let metrics = DeviceMetrics::register(&mut registry)?;

        let seed = seed_devices();
        metrics.set_device_count(seed.len());
        metrics.set_version(&cfg.app.version);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                store: DeviceStore::new(seed),
                registry,
                metrics,
                latency,
            }),
        })
    }

    pub fn store(&self) -> &DeviceStore {
        &self.inner.store
    }

    pub fn metrics(&self) -> &DeviceMetrics {
        &self.inner.metrics
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn latency(&self) -> &dyn LatencyInjector {
        self.inner.latency.as_ref()
    }
}
