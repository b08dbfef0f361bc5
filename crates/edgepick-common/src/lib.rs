//! edgepick Common Types
//!
//! This crate provides the configuration model and error taxonomy shared by
//! the edgepick selector, metrics and CLI crates.
//!
//! # Overview
//!
//! edgepick picks a live edge node out of a fixed host list. Callers hand it a
//! flat string property map (usually coming from a provisioner profile), and it
//! answers with one host that passed a liveness probe, rotating between hosts
//! per profile so that load is spread evenly.
//!
//! This crate holds the pieces every other crate needs:
//!
//! - **Configuration**: [`EdgeNodeConf`] parsed and validated from a property map
//! - **Probe kinds**: [`ProbeKind`], the load-balancing method chosen by config
//! - **Errors**: [`ConfigError`], [`NoLiveHost`] and the umbrella [`EdgepickError`]
//!
//! # Example
//!
//! ```
//! use edgepick_common::{EdgeNodeConf, ProbeKind};
//! use std::collections::HashMap;
//!
//! let mut props = HashMap::new();
//! props.insert("host".to_string(), "edge-1, edge-2".to_string());
//! props.insert("user".to_string(), "hadoop".to_string());
//! props.insert("sshKey".to_string(), "-----BEGIN KEY-----".to_string());
//! props.insert("loadBalancingMethod".to_string(), "roundRobinSocket".to_string());
//!
//! let conf = EdgeNodeConf::from_properties(&props).unwrap();
//! assert_eq!(conf.hosts(), ["edge-1", "edge-2"]);
//! assert_eq!(conf.probe_kind(), ProbeKind::TcpConnect);
//! ```

pub mod config;
pub mod error;
pub mod probe_kind;

pub use config::{Credentials, EdgeNodeConf, DEFAULT_CHECK_PORT, DEFAULT_CHECK_TIMEOUT_MS};
pub use error::{ConfigError, EdgepickError, NoLiveHost, Result};
pub use probe_kind::ProbeKind;
