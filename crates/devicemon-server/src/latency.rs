//! Artificial request latency for demo traffic.
//!
//! Handlers call [`LatencyInjector::inject`] at a fixed point; the injector
//! decides how long (if at all) to wait. `RandomLatency` owns a single
//! generator seeded once at construction.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DelaySection;

/// Where the delay is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayOp {
    ListDevices,
    UpgradeDevice,
}

#[async_trait]
pub trait LatencyInjector: Send + Sync {
    async fn inject(&self, op: DelayOp);
}

/// No delay at all.
#[derive(Debug, Default)]
pub struct NoLatency;

#[async_trait]
impl LatencyInjector for NoLatency {
    async fn inject(&self, _op: DelayOp) {}
}

/// Uniform delay in `0..max_ms` per operation.
pub struct RandomLatency {
    list_max_ms: u64,
    upgrade_max_ms: u64,
    rng: Mutex<StdRng>,
}

impl RandomLatency {
    pub fn new(list_max_ms: u64, upgrade_max_ms: u64) -> Self {
        Self::with_rng(list_max_ms, upgrade_max_ms, StdRng::from_entropy())
    }

    /// Deterministic sequence, for tests.
    pub fn seeded(list_max_ms: u64, upgrade_max_ms: u64, seed: u64) -> Self {
        Self::with_rng(list_max_ms, upgrade_max_ms, StdRng::seed_from_u64(seed))
    }

    fn with_rng(list_max_ms: u64, upgrade_max_ms: u64, rng: StdRng) -> Self {
        Self {
            list_max_ms,
            upgrade_max_ms,
            rng: Mutex::new(rng),
        }
    }

    fn max_ms(&self, op: DelayOp) -> u64 {
        match op {
            DelayOp::ListDevices => self.list_max_ms,
            DelayOp::UpgradeDevice => self.upgrade_max_ms,
        }
    }

    /// Next delay for `op`, always below the operation's bound.
    pub fn sample(&self, op: DelayOp) -> Duration {
        let max = self.max_ms(op);
        if max == 0 {
            return Duration::ZERO;
        }
        let ms = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..max),
            Err(_) => 0,
        };
        Duration::from_millis(ms)
    }
}

#[async_trait]
impl LatencyInjector for RandomLatency {
    async fn inject(&self, op: DelayOp) {
        let d = self.sample(op);
        if !d.is_zero() {
            tracing::trace!(?op, delay_ms = d.as_millis() as u64, "injecting latency");
            tokio::time::sleep(d).await;
        }
    }
}

/// Build the injector described by the `delay` config section.
pub fn from_config(cfg: &DelaySection) -> Box<dyn LatencyInjector> {
    if cfg.enabled {
        Box::new(RandomLatency::new(cfg.list_max_ms, cfg.upgrade_max_ms))
    } else {
        Box::new(NoLatency)
    }
}
