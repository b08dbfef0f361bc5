//! edgepick Selector
//!
//! Picks a live edge node from a configured host list so that downstream work
//! (SSH sessions, job submission) can be dispatched to it.
//!
//! # Components
//!
//! - [`CursorStore`]: per-profile rotating counters, shared process-wide
//! - [`LivenessProbe`] and [`Probe`]: bounded-time "is this host up?" checks
//! - [`EdgeNodeSelector`]: walks the host list from the profile's cursor and
//!   returns the first host whose probe passes
//!
//! # Example
//!
//! ```no_run
//! use edgepick_common::EdgeNodeConf;
//! use edgepick_selector::EdgeNodeSelector;
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let props: HashMap<String, String> = [
//!     ("host", "edge-1,edge-2,edge-3"),
//!     ("user", "hadoop"),
//!     ("sshKey", "..."),
//!     ("loadBalancingMethod", "roundRobinSocket"),
//!     ("checkTimeout", "2000"),
//! ]
//! .into_iter()
//! .map(|(k, v)| (k.to_string(), v.to_string()))
//! .collect();
//!
//! let conf = EdgeNodeConf::from_properties(&props)?;
//! let selector = EdgeNodeSelector::new();
//! let selection = selector.select(&conf, "default", None).await?;
//! println!("dispatching to {}", selection.host);
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod probe;
pub mod selector;

pub use cursor::CursorStore;
pub use probe::{ExternalPingProbe, Liveness, LivenessProbe, NoopProbe, Probe, TcpConnectProbe};
pub use selector::{EdgeNodeSelector, Selection};
