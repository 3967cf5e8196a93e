//! Namespaced metric registry and the process/runtime collector.
//!
//! Instruments are registered once at startup. A second registration under
//! the same fully-qualified name is an error, which startup propagates.

use std::fmt::Write;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use devicemon_core::error::{DeviceMonError, Result};

use super::metrics::Collector;

struct Entry {
    name: String,
    help: String,
    collector: Arc<dyn Collector>,
}

pub struct Registry {
    namespace: String,
    entries: Vec<Entry>,
    runtime: RuntimeCollector,
}

impl Registry {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: Vec::new(),
            runtime: RuntimeCollector::new(),
        }
    }

    fn fq_name(&self, name: &str) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}_{}", self.namespace, name)
        }
    }

    /// Register an instrument under `<namespace>_<name>`.
    pub fn register(&mut self, name: &str, help: &str, collector: Arc<dyn Collector>) -> Result<()> {
        let fq = self.fq_name(name);
        if self.entries.iter().any(|e| e.name == fq) {
            return Err(DeviceMonError::DuplicateMetric(fq));
        }
        tracing::debug!(metric = %fq, kind = collector.kind(), "metric registered");
        self.entries.push(Entry {
            name: fq,
            help: help.to_string(),
            collector,
        });
        Ok(())
    }

    /// Render all registered instruments, then the runtime collector.
    pub fn gather(&self) -> String {
        let mut out = String::new();
        for e in &self.entries {
            let _ = writeln!(out, "# HELP {} {}", e.name, e.help);
            let _ = writeln!(out, "# TYPE {} {}", e.name, e.collector.kind());
            e.collector.render(&e.name, &mut out);
        }
        self.runtime.render(&mut out);
        out
    }
}

/// Process and tokio runtime gauges, sampled at scrape time.
struct RuntimeCollector {
    started: Instant,
    start_unix_secs: u64,
}

impl RuntimeCollector {
    fn new() -> Self {
        let start_unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            started: Instant::now(),
            start_unix_secs,
        }
    }

    fn render(&self, out: &mut String) {
        let _ = writeln!(out, "# HELP process_start_time_seconds Start time of the process since unix epoch in seconds.");
        let _ = writeln!(out, "# TYPE process_start_time_seconds gauge");
        let _ = writeln!(out, "process_start_time_seconds {}", self.start_unix_secs);

        let _ = writeln!(out, "# HELP process_uptime_seconds Seconds since the process started.");
        let _ = writeln!(out, "# TYPE process_uptime_seconds gauge");
        let _ = writeln!(out, "process_uptime_seconds {}", self.started.elapsed().as_secs_f64());

        // Only available when gathered from inside a runtime.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let m = handle.metrics();
            let _ = writeln!(out, "# HELP tokio_workers Number of runtime worker threads.");
            let _ = writeln!(out, "# TYPE tokio_workers gauge");
            let _ = writeln!(out, "tokio_workers {}", m.num_workers());
            let _ = writeln!(out, "# HELP tokio_alive_tasks Number of alive tasks in the runtime.");
            let _ = writeln!(out, "# TYPE tokio_alive_tasks gauge");
            let _ = writeln!(out, "tokio_alive_tasks {}", m.num_alive_tasks());
        }
    }
}
