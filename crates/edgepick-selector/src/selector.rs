use crate::cursor::CursorStore;
use crate::probe::{LivenessProbe, Probe};
use edgepick_common::{EdgeNodeConf, NoLiveHost};
use edgepick_metrics::SelectionMetrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// A host chosen by [`EdgeNodeSelector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub host: String,
    /// Position of `host` in the configured host list
    pub index: usize,
}

/// Round-robin edge node selector with liveness probing.
///
/// Each call reads the profile's cursor once, then walks the host list from
/// that position, probing each candidate until one is alive. A call probes at
/// most `hosts.len()` hosts and fails with [`NoLiveHost`] when none respond.
/// Failed selections still advance the cursor, so the next call starts one
/// position further along.
///
/// Selectors are cheap to clone and share their cursor store; by default
/// that is [`CursorStore::global`], so every selector in the process rotates
/// through the same per-profile counters.
#[derive(Debug, Clone)]
pub struct EdgeNodeSelector {
    cursors: Arc<CursorStore>,
    metrics: Option<Arc<SelectionMetrics>>,
}

impl EdgeNodeSelector {
    /// Creates a selector backed by the process-wide cursor store.
    pub fn new() -> Self {
        Self::with_cursors(CursorStore::global())
    }

    /// Creates a selector with its own rotation state.
    pub fn with_cursors(cursors: Arc<CursorStore>) -> Self {
        Self {
            cursors,
            metrics: None,
        }
    }

    /// Records selections and probe outcomes into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<SelectionMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cursors(&self) -> &Arc<CursorStore> {
        &self.cursors
    }

    pub fn metrics(&self) -> Option<&Arc<SelectionMetrics>> {
        self.metrics.as_ref()
    }

    /// Selects a live host using the probe the configuration asks for.
    ///
    /// `exclude` names a host that must not be returned (typically one the
    /// caller just failed against); it is skipped without being probed.
    pub async fn select(
        &self,
        conf: &EdgeNodeConf,
        profile: &str,
        exclude: Option<&str>,
    ) -> Result<Selection, NoLiveHost> {
        let probe = Probe::from_conf(conf);
        self.select_with_probe(conf, profile, exclude, &probe).await
    }

    /// Selects a live host, checking candidates with `probe`.
    ///
    /// The probe kind in a returned [`NoLiveHost`] is the configured one.
    pub async fn select_with_probe<P>(
        &self,
        conf: &EdgeNodeConf,
        profile: &str,
        exclude: Option<&str>,
        probe: &P,
    ) -> Result<Selection, NoLiveHost>
    where
        P: LivenessProbe + ?Sized,
    {
        let hosts = conf.hosts();
        let timeout = conf.check_timeout();
        let len = hosts.len() as u64;

        // Reduce before narrowing; start < len so start + offset never overflows
        let start = self.cursors.next_index(profile) % len;

        for offset in 0..len {
            let index = ((start + offset) % len) as usize;
            let host = &hosts[index];

            if exclude == Some(host.as_str()) {
                debug!("Skipping excluded edge node '{}'", host);
                continue;
            }

            let probe_start = Instant::now();
            let liveness = probe.check(host, timeout).await;
            let latency_us = probe_start.elapsed().as_micros() as u64;

            if let Some(metrics) = &self.metrics {
                metrics.record_probe(host, liveness.is_alive(), latency_us);
            }

            if liveness.is_alive() {
                if let Some(metrics) = &self.metrics {
                    metrics.record_selection(host);
                }
                debug!(
                    "Selected edge node '{}' (index {}) for profile '{}'",
                    host, index, profile
                );
                return Ok(Selection {
                    host: host.clone(),
                    index,
                });
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_no_live_host();
        }

        let error = NoLiveHost::new(hosts, conf.check_timeout_ms(), conf.probe_kind());
        warn!("Profile '{}': {}", profile, error);
        Err(error)
    }
}

impl Default for EdgeNodeSelector {
    fn default() -> Self {
        Self::new()
    }
}
