//! edgepick Metrics Collection
//!
//! Thread-safe counters describing how the edge node selector behaves: which
//! hosts get picked, how often probes pass or fail, how long they take, and how
//! many selections ended without a live host.
//!
//! # Architecture
//!
//! - [`SelectionMetrics`]: the registry, shared through `Arc` by selectors
//! - [`SelectionSnapshot`]: serializable point-in-time copy of the registry
//! - [`HostMetrics`]: per-host counters inside a snapshot
//!
//! # Thread Safety
//!
//! Counter increments are lock-free atomics. A `RwLock` guards the host map and
//! is only taken for writing the first time a host is seen.
//!
//! # Usage Example
//!
//! ```rust
//! use edgepick_metrics::SelectionMetrics;
//!
//! let metrics = SelectionMetrics::new();
//! metrics.record_probe("edge-1", false, 1_200);
//! metrics.record_probe("edge-2", true, 300);
//! metrics.record_selection("edge-2");
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.total_selections, 1);
//! assert_eq!(snapshot.hosts["edge-1"].probe_failure_count, 1);
//! ```

mod registry;
mod snapshot;

pub use registry::SelectionMetrics;
pub use snapshot::{HostMetrics, SelectionSnapshot};
