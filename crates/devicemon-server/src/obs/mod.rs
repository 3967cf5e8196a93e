//! Lightweight in-process metrics.
//!
//! Instruments are stored as atomics (or small windows behind a mutex for
//! summaries) and rendered in Prometheus text format by the `/metrics`
//! handler on the metrics listener.

pub mod metrics;
pub mod registry;

use std::sync::Arc;

use devicemon_core::error::Result;

pub use metrics::{Collector, CounterVec, GaugeVec, HistogramVec, SummaryVec};
pub use registry::Registry;

/// Upper bounds (seconds) for the list-latency histogram.
pub const LIST_BUCKETS_SECS: [f64; 5] = [0.1, 0.15, 0.2, 0.25, 0.3];
/// Quantiles tracked by the request summary.
pub const SUMMARY_OBJECTIVES: [f64; 3] = [0.5, 0.9, 0.99];

/// The device service's instruments.
pub struct DeviceMetrics {
    pub devices: Arc<GaugeVec>,
    pub info: Arc<GaugeVec>,
    pub upgrades: Arc<CounterVec>,
    pub duration: Arc<HistogramVec>,
    pub duration_summary: Arc<SummaryVec>,
}

impl DeviceMetrics {
    /// Create every instrument and register it with `reg`.
    pub fn register(reg: &mut Registry) -> Result<Self> {
        let m = Self {
            devices: Arc::new(GaugeVec::default()),
            info: Arc::new(GaugeVec::default()),
            upgrades: Arc::new(CounterVec::default()),
            duration: Arc::new(HistogramVec::new(&LIST_BUCKETS_SECS)),
            duration_summary: Arc::new(SummaryVec::new(&SUMMARY_OBJECTIVES, SummaryVec::DEFAULT_WINDOW)),
        };

        reg.register("device_count", "Number of devices", m.devices.clone())?;
        reg.register("version_info", "Version information", m.info.clone())?;
        reg.register("device_upgrades_total", "Number of device upgrades", m.upgrades.clone())?;
        reg.register("request_duration_seconds", "Request duration in seconds", m.duration.clone())?;
        reg.register(
            "request_duration_seconds_summary",
            "Request duration in seconds (quantiles)",
            m.duration_summary.clone(),
        )?;

        Ok(m)
    }

    pub fn set_device_count(&self, n: usize) {
        self.devices.set(&[], n as i64);
    }

    pub fn set_version(&self, version: &str) {
        self.info.set(&[("version", version)], 1);
    }
}
