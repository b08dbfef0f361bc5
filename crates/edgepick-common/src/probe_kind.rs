use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness probe selected by the `loadBalancingMethod` property.
///
/// Every variant rotates through the host list round-robin; they only differ in
/// how a candidate is judged alive before it is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProbeKind {
    /// No probing, every candidate is considered alive (`roundRobin`)
    #[default]
    #[serde(rename = "roundRobin")]
    None,
    /// TCP connect to the check port (`roundRobinSocket`)
    #[serde(rename = "roundRobinSocket")]
    TcpConnect,
    /// One echo request through the system `ping` utility (`roundRobinPing`)
    #[serde(rename = "roundRobinPing")]
    ExternalPing,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 3] = [ProbeKind::None, ProbeKind::TcpConnect, ProbeKind::ExternalPing];

    /// Returns the property value naming this method.
    pub fn method_name(self) -> &'static str {
        match self {
            ProbeKind::None => "roundRobin",
            ProbeKind::TcpConnect => "roundRobinSocket",
            ProbeKind::ExternalPing => "roundRobinPing",
        }
    }

    /// Resolves a `loadBalancingMethod` value, ignoring case.
    ///
    /// Unknown names fall back to the default (`roundRobin`).
    pub fn from_method_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.method_name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    /// Resolves the legacy `edgeNodeCheckMethod` value (`ping` / `none`).
    pub fn from_legacy_check_method(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("ping") {
            ProbeKind::ExternalPing
        } else {
            ProbeKind::None
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}
