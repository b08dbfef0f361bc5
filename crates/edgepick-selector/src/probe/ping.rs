use super::{Liveness, LivenessProbe};
use async_trait::async_trait;
use edgepick_common::ProbeKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, enabled, warn, Level};

const DEFAULT_PING_PROGRAM: &str = "ping";

/// Probe that sends one ICMP echo request through the system `ping` utility.
///
/// # Subprocess control
///
/// The child's stdout and stderr are piped and drained while waiting, so a
/// chatty `ping` can never block on a full pipe. The wait is capped at
/// `2 * timeout`; on overrun the child is killed and the host is reported dead.
/// The child is also killed if the probe future is dropped, which is how a
/// cancelled selection releases it.
///
/// | Outcome | Result |
/// |---|---|
/// | exit code 0 | alive |
/// | non-zero exit code | dead |
/// | still running after `2 * timeout` | killed, dead |
/// | spawn or wait error | dead |
///
/// # Flags
///
/// `ping -n -c 1 -W <wait> <host>`. Linux `ping` takes the wait in whole
/// seconds (rounded up, at least 1); macOS and the BSDs take milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalPingProbe {
    program: PathBuf,
}

impl ExternalPingProbe {
    /// Uses `ping` from `PATH`.
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PING_PROGRAM)
    }

    /// Uses a specific ping executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Builds the argument list for one echo request with the given wait.
    pub fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
        vec![
            "-n".to_string(),
            "-c".to_string(),
            "1".to_string(),
            "-W".to_string(),
            wait_arg(timeout),
            host.to_string(),
        ]
    }

    async fn run(&self, host: &str, timeout: Duration) -> Liveness {
        let process_timeout = timeout * 2;

        let child = Command::new(&self.program)
            .args(Self::ping_args(host, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(
                    "Edge node '{}' check could not start '{}': {}",
                    host,
                    self.program.display(),
                    e
                );
                return Liveness::Dead;
            }
        };

        // Dropping the timed-out future drops the child, and kill_on_drop kills it
        match tokio::time::timeout(process_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                if enabled!(Level::DEBUG) {
                    let (stdout, stderr) = output_text(&output);
                    debug!(
                        "Edge node '{}' check passed. Error: {}. Output: {}",
                        host, stderr, stdout
                    );
                }
                Liveness::Alive
            }
            Ok(Ok(output)) => {
                let (stdout, stderr) = output_text(&output);
                let code = output
                    .status
                    .code()
                    .map_or_else(|| "none (killed by signal)".to_string(), |c| c.to_string());
                warn!(
                    "Edge node '{}' check failed with exit code {}. Error: {}. Output: {}",
                    host, code, stderr, stdout
                );
                Liveness::Dead
            }
            Ok(Err(e)) => {
                warn!("Edge node '{}' check failed while waiting for ping: {}", host, e);
                Liveness::Dead
            }
            Err(_) => {
                warn!(
                    "Edge node '{}' check process killed after {}ms",
                    host,
                    process_timeout.as_millis()
                );
                Liveness::Dead
            }
        }
    }
}

impl Default for ExternalPingProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LivenessProbe for ExternalPingProbe {
    async fn check(&self, host: &str, timeout: Duration) -> Liveness {
        self.run(host, timeout).await
    }

    fn kind(&self) -> ProbeKind {
        ProbeKind::ExternalPing
    }
}

#[cfg(any(target_os = "macos", target_os = "freebsd", target_os = "openbsd", target_os = "netbsd"))]
fn wait_arg(timeout: Duration) -> String {
    timeout.as_millis().max(1).to_string()
}

#[cfg(not(any(target_os = "macos", target_os = "freebsd", target_os = "openbsd", target_os = "netbsd")))]
fn wait_arg(timeout: Duration) -> String {
    let millis = timeout.as_millis();
    millis.div_ceil(1000).max(1).to_string()
}

fn output_text(output: &Output) -> (String, String) {
    (
        String::from_utf8_lossy(&output.stdout).trim().to_string(),
        String::from_utf8_lossy(&output.stderr).trim().to_string(),
    )
}
