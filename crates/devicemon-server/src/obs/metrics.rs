//! Metric instruments for the device service.
//!
//! Counter/gauge/histogram/summary types with dynamic labels backed by
//! `DashMap`. Labels are flattened into sorted key vectors to keep
//! deterministic ordering. Histogram sums are accumulated in integer
//! microseconds and rendered in seconds.

use std::collections::VecDeque;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;

type LabelKey = Vec<(String, String)>;

/// An instrument the registry can render.
///
/// `render` writes sample lines only; the registry emits `# HELP`/`# TYPE`.
pub trait Collector: Send + Sync {
    /// Prometheus type name (`counter`, `gauge`, ...).
    fn kind(&self) -> &'static str;
    fn render(&self, name: &str, out: &mut String);
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

/// `{a="x",b="y"}` plus an optional trailing pair (`le`, `quantile`).
/// Empty when there is nothing to print.
fn label_str(key: &LabelKey, extra: Option<(&str, &str)>) -> String {
    let mut parts: Vec<String> = key
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some((k, v)) = extra {
        parts.push(format!("{}=\"{}\"", k, escape_label(v)));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("{{{}}}", parts.join(","))
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl Collector for CounterVec {
    fn kind(&self) -> &'static str {
        "counter"
    }

    fn render(&self, name: &str, out: &mut String) {
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{} {}", name, label_str(r.key(), None), val);
        }
    }
}

/// Integer gauge. Use an empty label slice for an unlabelled gauge.
#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    /// Decrement by 1.
    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1);
    }

    /// Add an arbitrary signed delta.
    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.fetch_add(v, Ordering::Relaxed);
    }

    /// Overwrite the current value.
    pub fn set(&self, labels: &[(&str, &str)], v: i64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0));
        gauge.store(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<i64> {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
    }
}

impl Collector for GaugeVec {
    fn kind(&self) -> &'static str {
        "gauge"
    }

    fn render(&self, name: &str, out: &mut String) {
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{} {}", name, label_str(r.key(), None), val);
        }
    }
}

struct AtomicHistogram {
    count: AtomicU64,
    sum_micros: AtomicU64,
    buckets: Vec<AtomicU64>,
}

impl AtomicHistogram {
    fn new(n: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
            buckets: (0..n).map(|_| AtomicU64::new(0)).collect(),
        }
    }
}

/// Latency histogram with fixed upper bounds in seconds.
pub struct HistogramVec {
    bounds_secs: Vec<f64>,
    bounds_micros: Vec<u64>,
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Bounds are sorted and deduplicated; `+Inf` is implicit.
    pub fn new(buckets_secs: &[f64]) -> Self {
        let mut bounds_secs: Vec<f64> = buckets_secs
            .iter()
            .copied()
            .filter(|b| b.is_finite() && *b > 0.0)
            .collect();
        bounds_secs.sort_by(f64::total_cmp);
        bounds_secs.dedup();
        let bounds_micros = bounds_secs
            .iter()
            .map(|b| (b * 1_000_000.0).round() as u64)
            .collect();
        Self {
            bounds_secs,
            bounds_micros,
            map: DashMap::new(),
        }
    }

    /// Observe a duration and increment cumulative buckets.
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let n = self.bounds_micros.len();
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicHistogram::new(n));
        let micros = duration.as_micros() as u64;

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_micros.fetch_add(micros, Ordering::Relaxed);

        // Cumulative: every bucket whose bound is >= the value
        for (i, &b) in self.bounds_micros.iter().enumerate() {
            if micros <= b {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Number of observations recorded for a label set.
    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|h| h.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl Collector for HistogramVec {
    fn kind(&self) -> &'static str {
        "histogram"
    }

    fn render(&self, name: &str, out: &mut String) {
        for r in self.map.iter() {
            let key = r.key();
            let hist = r.value();

            for (i, le) in self.bounds_secs.iter().enumerate() {
                let count = hist.buckets[i].load(Ordering::Relaxed);
                let le = le.to_string();
                let _ = writeln!(out, "{}_bucket{} {}", name, label_str(key, Some(("le", &le))), count);
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{}_bucket{} {}", name, label_str(key, Some(("le", "+Inf"))), count);

            let sum = hist.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0;
            let labels = label_str(key, None);
            let _ = writeln!(out, "{}_sum{} {}", name, labels, sum);
            let _ = writeln!(out, "{}_count{} {}", name, labels, count);
        }
    }
}

#[derive(Default)]
struct SummaryState {
    window: VecDeque<f64>,
    sum: f64,
    count: u64,
}

/// Quantile summary over a sliding window of recent observations.
///
/// `_sum` and `_count` are cumulative; quantiles only see the last
/// `window` samples of each label set.
pub struct SummaryVec {
    objectives: Vec<f64>,
    window: usize,
    map: DashMap<LabelKey, Mutex<SummaryState>>,
}

impl SummaryVec {
    pub const DEFAULT_WINDOW: usize = 500;

    pub fn new(objectives: &[f64], window: usize) -> Self {
        Self {
            objectives: objectives
                .iter()
                .copied()
                .filter(|q| (0.0..=1.0).contains(q))
                .collect(),
            window: window.max(1),
            map: DashMap::new(),
        }
    }

    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let entry = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| Mutex::new(SummaryState::default()));
        if let Ok(mut s) = entry.value().lock() {
            let v = duration.as_secs_f64();
            if s.window.len() == self.window {
                s.window.pop_front();
            }
            s.window.push_back(v);
            s.sum += v;
            s.count += 1;
        };
    }

    /// Nearest-rank quantile over the current window, `None` when empty.
    pub fn quantile(&self, labels: &[(&str, &str)], q: f64) -> Option<f64> {
        let entry = self.map.get(&label_key(labels))?;
        let samples = match entry.value().lock() {
            Ok(s) => sorted(&s.window),
            Err(_) => return None,
        };
        nearest_rank(&samples, q)
    }

    pub fn count(&self, labels: &[(&str, &str)]) -> u64 {
        let Some(entry) = self.map.get(&label_key(labels)) else {
            return 0;
        };
        let count = match entry.value().lock() {
            Ok(s) => s.count,
            Err(_) => 0,
        };
        count
    }
}

fn sorted(window: &VecDeque<f64>) -> Vec<f64> {
    let mut v: Vec<f64> = window.iter().copied().collect();
    v.sort_by(f64::total_cmp);
    v
}

fn nearest_rank(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (q * sorted.len() as f64).ceil() as usize;
    let idx = rank.clamp(1, sorted.len()) - 1;
    Some(sorted[idx])
}

impl Collector for SummaryVec {
    fn kind(&self) -> &'static str {
        "summary"
    }

    fn render(&self, name: &str, out: &mut String) {
        for r in self.map.iter() {
            let key = r.key();
            let Ok(s) = r.value().lock() else {
                continue;
            };
            let samples = sorted(&s.window);

            for q in &self.objectives {
                let v = nearest_rank(&samples, *q).unwrap_or(f64::NAN);
                let q = q.to_string();
                let _ = writeln!(out, "{}{} {}", name, label_str(key, Some(("quantile", &q))), v);
            }
            let labels = label_str(key, None);
            let _ = writeln!(out, "{}_sum{} {}", name, labels, s.sum);
            let _ = writeln!(out, "{}_count{} {}", name, labels, s.count);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn histogram_buckets_are_cumulative() {
        let h = HistogramVec::new(&[0.1, 0.2, 0.3]);
        let l = [("path", "/devices")];
        h.observe(&l, Duration::from_millis(50));
        h.observe(&l, Duration::from_millis(150));
        h.observe(&l, Duration::from_millis(900));

        let mut out = String::new();
        h.render("lat", &mut out);
        assert!(out.contains("lat_bucket{path=\"/devices\",le=\"0.1\"} 1"));
        assert!(out.contains("lat_bucket{path=\"/devices\",le=\"0.2\"} 2"));
        assert!(out.contains("lat_bucket{path=\"/devices\",le=\"0.3\"} 2"));
        assert!(out.contains("lat_bucket{path=\"/devices\",le=\"+Inf\"} 3"));
        assert!(out.contains("lat_sum{path=\"/devices\"} 1.1"));
        assert!(out.contains("lat_count{path=\"/devices\"} 3"));
    }

    #[test]
    fn summary_window_drops_oldest() {
        let s = SummaryVec::new(&[0.5, 0.99], 3);
        for ms in [2000, 250, 500, 1000] {
            s.observe(&[], Duration::from_millis(ms));
        }
        // 2s fell out of the window but is still in sum/count
        assert_eq!(s.quantile(&[], 0.99), Some(1.0));
        assert_eq!(s.quantile(&[], 0.5), Some(0.5));
        assert_eq!(s.count(&[]), 4);

        let mut out = String::new();
        s.render("d", &mut out);
        assert!(out.contains("d{quantile=\"0.5\"} 0.5\n"));
        assert!(out.contains("d{quantile=\"0.99\"} 1\n"));
        assert!(out.contains("d_sum 3.75\n"));
        assert!(out.contains("d_count 4\n"));
    }

    #[test]
    fn labels_render_sorted_and_escaped() {
        let c = CounterVec::default();
        c.inc(&[("type", "rou\"ter"), ("a", "x")]);
        c.inc(&[("a", "x"), ("type", "rou\"ter")]);

        let mut out = String::new();
        c.render("up", &mut out);
        assert_eq!(out, "up{a=\"x\",type=\"rou\\\"ter\"} 2\n");
    }

    #[test]
    fn unlabelled_gauge_has_no_braces() {
        let g = GaugeVec::default();
        g.set(&[], 7);
        g.dec(&[]);
        let mut out = String::new();
        g.render("count", &mut out);
        assert_eq!(out, "count 6\n");
        assert_eq!(g.get(&[]), Some(6));
    }
}
