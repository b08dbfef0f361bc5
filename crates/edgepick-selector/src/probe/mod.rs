//! Liveness probes.
//!
//! A probe answers one question about one host: did it respond within the
//! deadline? Probes never fail; every error (refused connection, DNS failure,
//! missing `ping` binary, hung subprocess) is logged and reported as
//! [`Liveness::Dead`]. Every probe returns within twice the timeout it is given.
//!
//! | Probe | Method | Check |
//! |---|---|---|
//! | [`NoopProbe`] | `roundRobin` | none, always alive |
//! | [`TcpConnectProbe`] | `roundRobinSocket` | TCP connect to the check port |
//! | [`ExternalPingProbe`] | `roundRobinPing` | one echo request via `ping` |
//!
//! [`Probe`] wraps the three so the selector can build the right one from a
//! configuration; [`LivenessProbe`] is the seam for custom probes.

mod ping;
mod tcp;

pub use ping::ExternalPingProbe;
pub use tcp::TcpConnectProbe;

use async_trait::async_trait;
use edgepick_common::{EdgeNodeConf, ProbeKind};
use std::time::Duration;

/// Outcome of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
}

impl Liveness {
    pub fn is_alive(self) -> bool {
        self == Liveness::Alive
    }
}

impl From<bool> for Liveness {
    fn from(alive: bool) -> Self {
        if alive {
            Liveness::Alive
        } else {
            Liveness::Dead
        }
    }
}

/// A bounded-time liveness check for a single host.
///
/// Implementations must be stateless with respect to hosts, safe to call
/// concurrently, and must return within `2 * timeout`.
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Checks whether `host` is reachable within `timeout`.
    async fn check(&self, host: &str, timeout: Duration) -> Liveness;

    /// The load-balancing method this probe implements.
    fn kind(&self) -> ProbeKind;
}

/// Probe that reports every host alive without touching the network.
///
/// Used when health judgment is left to the downstream transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProbe;

#[async_trait]
impl LivenessProbe for NoopProbe {
    async fn check(&self, _host: &str, _timeout: Duration) -> Liveness {
        Liveness::Alive
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::None
    }
}

/// The built-in probes, selected by [`ProbeKind`].
#[derive(Debug, Clone)]
pub enum Probe {
    Noop(NoopProbe),
    TcpConnect(TcpConnectProbe),
    ExternalPing(ExternalPingProbe),
}

impl Probe {
    /// Builds the probe a configuration asks for.
    ///
    /// The TCP probe uses the configured check port.
    pub fn from_conf(conf: &EdgeNodeConf) -> Self {
        Self::from_kind(conf.probe_kind(), conf.check_port())
    }

    /// Builds the probe for `kind`; `port` is only used by the TCP probe.
    pub fn from_kind(kind: ProbeKind, port: u16) -> Self {
        match kind {
            ProbeKind::None => Probe::Noop(NoopProbe),
            ProbeKind::TcpConnect => Probe::TcpConnect(TcpConnectProbe::new(port)),
            ProbeKind::ExternalPing => Probe::ExternalPing(ExternalPingProbe::new()),
        }
    }
}

#[async_trait]
impl LivenessProbe for Probe {
    async fn check(&self, host: &str, timeout: Duration) -> Liveness {
        match self {
            Probe::Noop(probe) => probe.check(host, timeout).await,
            Probe::TcpConnect(probe) => probe.check(host, timeout).await,
            Probe::ExternalPing(probe) => probe.check(host, timeout).await,
        }
    }

    fn kind(&self) -> ProbeKind {
        match self {
            Probe::Noop(probe) => probe.kind(),
            Probe::TcpConnect(probe) => probe.kind(),
            Probe::ExternalPing(probe) => probe.kind(),
        }
    }
}
