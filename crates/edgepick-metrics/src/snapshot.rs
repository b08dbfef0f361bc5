// Copyright 2025 edgepick Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Counters for a single host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMetrics {
    pub host: String,
    /// Times this host was returned by a selection
    pub selected_count: u64,
    pub probe_success_count: u64,
    pub probe_failure_count: u64,
    /// Mean probe wall-clock time, 0 when never probed
    pub avg_probe_latency_us: u64,
}

impl HostMetrics {
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Self::default()
        }
    }

    pub fn probe_count(&self) -> u64 {
        self.probe_success_count + self.probe_failure_count
    }
}

/// Complete metrics snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    /// Selections that returned a host
    pub total_selections: u64,
    /// Selections that ended with no live host
    pub failed_selections: u64,
    pub total_probes: u64,
    pub uptime_ms: u64,
    pub hosts: HashMap<String, HostMetrics>,
}

impl SelectionSnapshot {
    pub fn new(uptime_ms: u64) -> Self {
        Self {
            uptime_ms,
            ..Self::default()
        }
    }

    /// Share of successful selections that landed on `host`, in `[0, 1]`.
    pub fn selection_share(&self, host: &str) -> f64 {
        if self.total_selections == 0 {
            return 0.0;
        }
        let selected = self.hosts.get(host).map_or(0, |h| h.selected_count);
        selected as f64 / self.total_selections as f64
    }
}
