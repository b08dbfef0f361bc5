use super::{Liveness, LivenessProbe};
use async_trait::async_trait;
use edgepick_common::{ProbeKind, DEFAULT_CHECK_PORT};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, warn};

/// Probe that opens (and immediately closes) a TCP connection.
///
/// Name resolution and the connect attempt share one deadline, so a slow DNS
/// server cannot stretch the probe past `timeout`. No bytes are exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpConnectProbe {
    port: u16,
}

impl TcpConnectProbe {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for TcpConnectProbe {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_PORT)
    }
}

#[async_trait]
impl LivenessProbe for TcpConnectProbe {
    async fn check(&self, host: &str, timeout: Duration) -> Liveness {
        let connect = TcpStream::connect((host, self.port));

        match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(stream)) => {
                drop(stream);
                debug!(
                    "Edge node '{}' check passed on port {} for timeout {}ms",
                    host,
                    self.port,
                    timeout.as_millis()
                );
                Liveness::Alive
            }
            Ok(Err(e)) => {
                warn!("Edge node '{}' check failed on port {}: {}", host, self.port, e);
                Liveness::Dead
            }
            Err(_) => {
                warn!(
                    "Edge node '{}' check timed out after {}ms on port {}",
                    host,
                    timeout.as_millis(),
                    self.port
                );
                Liveness::Dead
            }
        }
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::TcpConnect
    }
}
