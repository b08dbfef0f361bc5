use crate::probe_kind::ProbeKind;
use thiserror::Error;

/// Invalid or incomplete edge node configuration.
///
/// Raised only while parsing a property map; a selection never produces it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be specified")]
    MissingKey(&'static str),

    #[error("host must contain at least one entry")]
    EmptyHostList,

    #[error("host entry {position} is empty in '{value}'")]
    EmptyHostEntry { position: usize, value: String },

    #[error("host entry {position} contains a ',' in '{value}'")]
    InvalidHostEntry { position: usize, value: String },

    #[error("checkTimeout must be a positive number of milliseconds, got '{0}'")]
    InvalidTimeout(String),

    #[error("checkPort must be a port number between 1 and 65535, got '{0}'")]
    InvalidPort(String),
}

/// Every candidate host failed its probe during one selection pass.
///
/// Carries a copy of the probed host list, the timeout that was used and the
/// load-balancing method, which is enough for a caller to log the failure and
/// decide whether to back off and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "No live host was found among: '{}' with timeout: '{}' and check method: '{}'",
    .hosts.join(", "),
    .timeout_ms,
    .probe_kind
)]
pub struct NoLiveHost {
    pub hosts: Vec<String>,
    pub timeout_ms: u64,
    pub probe_kind: ProbeKind,
}

impl NoLiveHost {
    pub fn new(hosts: &[String], timeout_ms: u64, probe_kind: ProbeKind) -> Self {
        Self {
            hosts: hosts.to_vec(),
            timeout_ms,
            probe_kind,
        }
    }
}

#[derive(Error, Debug)]
pub enum EdgepickError {
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    NoLiveHost(#[from] NoLiveHost),
}

impl EdgepickError {
    /// Returns `true` when retrying later may succeed.
    ///
    /// Exhausted candidates are worth another attempt after a backoff; a bad
    /// configuration is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EdgepickError::NoLiveHost(_))
    }
}

pub type Result<T> = std::result::Result<T, EdgepickError>;
