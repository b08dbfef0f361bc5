//! Edge node configuration parsed from a flat property map.
//!
//! Provisioner profiles deliver their settings as string key/value pairs. This
//! module turns such a map into a validated [`EdgeNodeConf`] and back again.
//!
//! # Recognized keys
//!
//! | Key | Required | Meaning |
//! |---|---|---|
//! | `host` | yes | comma-separated host list |
//! | `user` | yes | transport user, passed through |
//! | `sshKey` | yes | transport private key, passed through |
//! | `loadBalancingMethod` | no | `roundRobin`, `roundRobinSocket` or `roundRobinPing` |
//! | `edgeNodeCheckMethod` | no | legacy alias, `ping` or `none` |
//! | `checkTimeout` | no | probe timeout in milliseconds (default 5000) |
//! | `checkPort` | no | TCP probe port (default 22) |
//! | `initializationAction` | no | passed through |
//! | `kerberosPrincipal` | no | passed through |
//! | `kerberosKeytabPath` | no | passed through |
//!
//! Unknown keys are ignored so newer profiles keep working with older builds.

use crate::error::ConfigError;
use crate::probe_kind::ProbeKind;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default probe timeout in milliseconds
pub const DEFAULT_CHECK_TIMEOUT_MS: u64 = 5000;

/// Default port for TCP connect probes (SSH)
pub const DEFAULT_CHECK_PORT: u16 = 22;

pub const HOST_PROPERTY: &str = "host";
pub const USER_PROPERTY: &str = "user";
pub const SSH_KEY_PROPERTY: &str = "sshKey";
pub const LOAD_BALANCING_METHOD_PROPERTY: &str = "loadBalancingMethod";
pub const EDGE_NODE_CHECK_METHOD_PROPERTY: &str = "edgeNodeCheckMethod";
pub const CHECK_TIMEOUT_PROPERTY: &str = "checkTimeout";
pub const CHECK_PORT_PROPERTY: &str = "checkPort";
pub const INITIALIZATION_ACTION_PROPERTY: &str = "initializationAction";
pub const KERBEROS_PRINCIPAL_PROPERTY: &str = "kerberosPrincipal";
pub const KERBEROS_KEYTAB_PATH_PROPERTY: &str = "kerberosKeytabPath";

/// Transport credentials carried alongside the host list.
///
/// edgepick never interprets them; they are handed back to whatever runs the
/// SSH session on the selected host. `Debug` output redacts the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub ssh_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("ssh_key", &"<redacted>")
            .finish()
    }
}

/// Validated edge node selection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeNodeConf {
    hosts: Vec<String>,
    credentials: Credentials,
    probe_kind: ProbeKind,
    check_timeout_ms: u64,
    check_port: u16,
    initialization_action: Option<String>,
    kerberos_principal: Option<String>,
    kerberos_keytab_path: Option<String>,
}

impl EdgeNodeConf {
    /// Creates a configuration with default probe settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptyHostList`] if `hosts` is empty and
    /// [`ConfigError::EmptyHostEntry`] if any host is blank, and
    /// [`ConfigError::InvalidHostEntry`] if a host contains the `,` separator.
    pub fn new(hosts: Vec<String>, credentials: Credentials) -> Result<Self, ConfigError> {
        if hosts.is_empty() {
            return Err(ConfigError::EmptyHostList);
        }
        if let Some(position) = hosts.iter().position(|h| h.trim().is_empty()) {
            return Err(ConfigError::EmptyHostEntry {
                position,
                value: hosts.join(","),
            });
        }
        // A comma would split the host in two on the next from_properties
        if let Some(position) = hosts.iter().position(|h| h.contains(',')) {
            return Err(ConfigError::InvalidHostEntry {
                position,
                value: hosts.join(","),
            });
        }

        Ok(Self {
            hosts: hosts.into_iter().map(|h| h.trim().to_string()).collect(),
            credentials,
            probe_kind: ProbeKind::default(),
            check_timeout_ms: DEFAULT_CHECK_TIMEOUT_MS,
            check_port: DEFAULT_CHECK_PORT,
            initialization_action: None,
            kerberos_principal: None,
            kerberos_keytab_path: None,
        })
    }

    /// Sets the liveness probe.
    pub fn with_probe_kind(mut self, probe_kind: ProbeKind) -> Self {
        self.probe_kind = probe_kind;
        self
    }

    /// Sets the probe timeout.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidTimeout`] for a zero timeout.
    pub fn with_check_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(timeout_ms.to_string()));
        }
        self.check_timeout_ms = timeout_ms;
        Ok(self)
    }

    /// Sets the port used by TCP connect probes.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidPort`] for port 0.
    pub fn with_check_port(mut self, port: u16) -> Result<Self, ConfigError> {
        if port == 0 {
            return Err(ConfigError::InvalidPort(port.to_string()));
        }
        self.check_port = port;
        Ok(self)
    }

    /// Parses and validates a property map.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingKey`] if `host`, `user` or `sshKey` is absent
    /// - [`ConfigError::EmptyHostEntry`] if the host list has a blank entry
    /// - [`ConfigError::InvalidTimeout`] if `checkTimeout` is not a positive integer
    /// - [`ConfigError::InvalidPort`] if `checkPort` is not a valid port
    ///
    /// # Example
    ///
    /// ```
    /// use edgepick_common::{ConfigError, EdgeNodeConf};
    /// use std::collections::HashMap;
    ///
    /// let props: HashMap<String, String> =
    ///     [("host", "a"), ("user", "u")]
    ///         .into_iter()
    ///         .map(|(k, v)| (k.to_string(), v.to_string()))
    ///         .collect();
    ///
    /// let err = EdgeNodeConf::from_properties(&props).unwrap_err();
    /// assert_eq!(err, ConfigError::MissingKey("sshKey"));
    /// ```
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let host = required(properties, HOST_PROPERTY)?;
        let user = required(properties, USER_PROPERTY)?;
        let ssh_key = required(properties, SSH_KEY_PROPERTY)?;

        let hosts = parse_hosts(host)?;
        let probe_kind = parse_probe_kind(properties);

        let check_timeout_ms = match properties.get(CHECK_TIMEOUT_PROPERTY) {
            Some(value) => parse_timeout(value)?,
            None => DEFAULT_CHECK_TIMEOUT_MS,
        };

        let check_port = match properties.get(CHECK_PORT_PROPERTY) {
            Some(value) => parse_port(value)?,
            None => DEFAULT_CHECK_PORT,
        };

        let conf = Self {
            hosts,
            credentials: Credentials {
                user: user.to_string(),
                ssh_key: ssh_key.to_string(),
            },
            probe_kind,
            check_timeout_ms,
            check_port,
            initialization_action: properties.get(INITIALIZATION_ACTION_PROPERTY).cloned(),
            kerberos_principal: properties.get(KERBEROS_PRINCIPAL_PROPERTY).cloned(),
            kerberos_keytab_path: properties.get(KERBEROS_KEYTAB_PATH_PROPERTY).cloned(),
        };

        debug!(
            "Parsed edge node config: {} hosts, method {}, timeout {}ms",
            conf.hosts.len(),
            conf.probe_kind,
            conf.check_timeout_ms
        );

        Ok(conf)
    }

    /// Serializes the configuration back into a property map.
    ///
    /// The result always parses back into an equal configuration. The legacy
    /// `edgeNodeCheckMethod` key is never emitted.
    pub fn to_properties(&self) -> HashMap<String, String> {
        let mut properties = HashMap::new();
        properties.insert(HOST_PROPERTY.to_string(), self.hosts.join(","));
        properties.insert(USER_PROPERTY.to_string(), self.credentials.user.clone());
        properties.insert(SSH_KEY_PROPERTY.to_string(), self.credentials.ssh_key.clone());
        properties.insert(
            LOAD_BALANCING_METHOD_PROPERTY.to_string(),
            self.probe_kind.method_name().to_string(),
        );
        properties.insert(CHECK_TIMEOUT_PROPERTY.to_string(), self.check_timeout_ms.to_string());
        properties.insert(CHECK_PORT_PROPERTY.to_string(), self.check_port.to_string());

        let optional = [
            (INITIALIZATION_ACTION_PROPERTY, &self.initialization_action),
            (KERBEROS_PRINCIPAL_PROPERTY, &self.kerberos_principal),
            (KERBEROS_KEYTAB_PATH_PROPERTY, &self.kerberos_keytab_path),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                properties.insert(key.to_string(), value.clone());
            }
        }

        properties
    }

    /// Candidate hosts in rotation order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn probe_kind(&self) -> ProbeKind {
        self.probe_kind
    }

    pub fn check_timeout_ms(&self) -> u64 {
        self.check_timeout_ms
    }

    /// Probe timeout as a [`Duration`].
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    pub fn check_port(&self) -> u16 {
        self.check_port
    }

    pub fn initialization_action(&self) -> Option<&str> {
        self.initialization_action.as_deref()
    }

    pub fn kerberos_principal(&self) -> Option<&str> {
        self.kerberos_principal.as_deref()
    }

    pub fn kerberos_keytab_path(&self) -> Option<&str> {
        self.kerberos_keytab_path.as_deref()
    }
}

fn required<'a>(
    properties: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    properties
        .get(key)
        .map(String::as_str)
        .ok_or(ConfigError::MissingKey(key))
}

fn parse_hosts(value: &str) -> Result<Vec<String>, ConfigError> {
    value
        .split(',')
        .enumerate()
        .map(|(position, entry)| {
            let entry = entry.trim();
            if entry.is_empty() {
                Err(ConfigError::EmptyHostEntry {
                    position,
                    value: value.to_string(),
                })
            } else {
                Ok(entry.to_string())
            }
        })
        .collect()
}

/// `loadBalancingMethod` wins; the legacy key only applies when it is absent.
fn parse_probe_kind(properties: &HashMap<String, String>) -> ProbeKind {
    if let Some(method) = properties.get(LOAD_BALANCING_METHOD_PROPERTY) {
        return ProbeKind::from_method_name(method);
    }
    properties
        .get(EDGE_NODE_CHECK_METHOD_PROPERTY)
        .map(|legacy| ProbeKind::from_legacy_check_method(legacy))
        .unwrap_or_default()
}

fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(timeout) if timeout > 0 => Ok(timeout),
        _ => Err(ConfigError::InvalidTimeout(value.to_string())),
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    match value.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(value.to_string())),
    }
}
