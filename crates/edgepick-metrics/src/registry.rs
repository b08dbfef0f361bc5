use crate::snapshot::{HostMetrics, SelectionSnapshot};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock as StdRwLock};
use std::time::Instant;

/// Per-host counters.
///
/// All fields are atomics so recording never takes a lock once the entry
/// exists.
#[derive(Debug, Default)]
struct HostStats {
    selected_count: AtomicU64,
    probe_success_count: AtomicU64,
    probe_failure_count: AtomicU64,
    /// Sum of probe latencies in microseconds, for the average
    total_probe_latency_us: AtomicU64,
}

impl HostStats {
    fn record_probe(&self, alive: bool, latency_us: u64) {
        if alive {
            self.probe_success_count.fetch_add(1, Ordering::Relaxed);
        } else {
            self.probe_failure_count.fetch_add(1, Ordering::Relaxed);
        }
        self.total_probe_latency_us.fetch_add(latency_us, Ordering::Relaxed);
    }

    fn snapshot(&self, host: &str) -> HostMetrics {
        let probe_success_count = self.probe_success_count.load(Ordering::Relaxed);
        let probe_failure_count = self.probe_failure_count.load(Ordering::Relaxed);
        let probes = probe_success_count + probe_failure_count;
        let avg_probe_latency_us = if probes == 0 {
            0
        } else {
            self.total_probe_latency_us.load(Ordering::Relaxed) / probes
        };

        HostMetrics {
            host: host.to_string(),
            selected_count: self.selected_count.load(Ordering::Relaxed),
            probe_success_count,
            probe_failure_count,
            avg_probe_latency_us,
        }
    }
}

/// Thread-safe selection metrics registry.
///
/// # Concurrency Model
///
/// - **Global counters**: lock-free `AtomicU64` with relaxed ordering
/// - **Per-host stats**: lock-free `AtomicU64` once the entry is created
/// - **Host map**: `RwLock`, read-locked on the hot path and write-locked only
///   to insert a host seen for the first time
///
/// Relaxed ordering is enough here: counters are independent of each other and
/// snapshots are best-effort.
///
/// The host set is bounded by the configured host lists, so entries are never
/// evicted.
///
/// # Example
///
/// ```rust
/// use edgepick_metrics::SelectionMetrics;
/// use std::sync::Arc;
///
/// let metrics = Arc::new(SelectionMetrics::new());
/// metrics.record_selection("edge-1");
/// metrics.record_no_live_host();
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.total_selections, 1);
/// assert_eq!(snapshot.failed_selections, 1);
/// ```
#[derive(Debug)]
pub struct SelectionMetrics {
    total_selections: AtomicU64,
    failed_selections: AtomicU64,
    total_probes: AtomicU64,
    hosts: StdRwLock<HashMap<String, Arc<HostStats>>>,
    start_time: Instant,
}

impl SelectionMetrics {
    pub fn new() -> Self {
        Self {
            total_selections: AtomicU64::new(0),
            failed_selections: AtomicU64::new(0),
            total_probes: AtomicU64::new(0),
            hosts: StdRwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Records that a selection returned `host`.
    pub fn record_selection(&self, host: &str) {
        self.total_selections.fetch_add(1, Ordering::Relaxed);
        self.host_stats(host).selected_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one probe outcome for `host`.
    ///
    /// # Arguments
    /// * `host` - The probed host
    /// * `alive` - Whether the probe passed
    /// * `latency_us` - Probe wall-clock time in microseconds
    pub fn record_probe(&self, host: &str, alive: bool, latency_us: u64) {
        self.total_probes.fetch_add(1, Ordering::Relaxed);
        self.host_stats(host).record_probe(alive, latency_us);
    }

    /// Records a selection that exhausted every candidate.
    pub fn record_no_live_host(&self) {
        self.failed_selections.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the uptime of this registry in milliseconds.
    pub fn uptime_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Takes a snapshot of current metrics.
    ///
    /// The read lock on the host map is held only while copying.
    pub fn snapshot(&self) -> SelectionSnapshot {
        let hosts = {
            let hosts_guard = self.hosts.read().unwrap();
            hosts_guard
                .iter()
                .map(|(host, stats)| (host.clone(), stats.snapshot(host)))
                .collect()
        };

        SelectionSnapshot {
            total_selections: self.total_selections.load(Ordering::Relaxed),
            failed_selections: self.failed_selections.load(Ordering::Relaxed),
            total_probes: self.total_probes.load(Ordering::Relaxed),
            uptime_ms: self.uptime_ms(),
            hosts,
        }
    }

    /// Gets or creates the stats entry for a host.
    fn host_stats(&self, host: &str) -> Arc<HostStats> {
        if let Some(stats) = self.hosts.read().unwrap().get(host) {
            return stats.clone();
        }

        let mut hosts = self.hosts.write().unwrap();
        hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(HostStats::default()))
            .clone()
    }
}

impl Default for SelectionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
