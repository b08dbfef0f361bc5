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

//! # edgepick CLI
//!
//! Helpers behind the `edgepick` binary: turning a JSON properties file and
//! `key=value` overrides into the string map that
//! [`EdgeNodeConf::from_properties`](edgepick_common::EdgeNodeConf::from_properties)
//! parses, resolving `--method` names, and mapping failures to exit codes.
//!
//! ## Key Commands
//!
//! - `edgepick select`: pick live hosts from a configuration
//! - `edgepick probe`: run one liveness probe against one host

use anyhow::Result;
use edgepick_common::{EdgepickError, ProbeKind};
use std::collections::HashMap;
use std::path::Path;

/// Reads a JSON object of properties.
///
/// String values are taken as-is; numbers and booleans are converted to their
/// JSON text so `"checkTimeout": 2000` works. Anything else is rejected.
pub fn load_properties(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
    parse_properties_json(&content)
        .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))
}

/// Parses a JSON object into a property map.
pub fn parse_properties_json(content: &str) -> Result<HashMap<String, String>> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let object = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("expected a JSON object of properties"))?;

    object
        .iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => anyhow::bail!("property '{}' must be a string, got {}", key, other),
            };
            Ok((key.clone(), value))
        })
        .collect()
}

/// Splits a `key=value` override at the first `=`.
pub fn parse_property(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(anyhow::anyhow!(
            "Invalid property '{}': expected key=value",
            pair
        )),
    }
}

/// Loads the optional config file and applies overrides on top, in order.
pub fn build_properties(
    config: Option<&Path>,
    overrides: &[String],
) -> Result<HashMap<String, String>> {
    let mut properties = match config {
        Some(path) => load_properties(path)?,
        None => HashMap::new(),
    };

    for pair in overrides {
        let (key, value) = parse_property(pair)?;
        properties.insert(key, value);
    }

    Ok(properties)
}

/// Resolves a load-balancing method name, rejecting unknown names.
///
/// Configuration parsing falls back to `roundRobin` for unknown values; on the
/// command line a typo should be an error instead.
pub fn parse_method(name: &str) -> Result<ProbeKind> {
    ProbeKind::ALL
        .into_iter()
        .find(|kind| kind.method_name().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| {
            let known: Vec<&str> = ProbeKind::ALL.iter().map(|k| k.method_name()).collect();
            anyhow::anyhow!(
                "Unknown method '{}': expected one of {}",
                name,
                known.join(", ")
            )
        })
}

/// Exit status for failures that may succeed on retry (`EX_TEMPFAIL`).
pub const EXIT_RETRYABLE: i32 = 75;

/// Exit status for every other failure.
pub const EXIT_FAILURE: i32 = 1;

/// Maps a command failure to the process exit status.
///
/// Selections that found no live host exit with [`EXIT_RETRYABLE`] so wrapper
/// scripts can back off and try again; configuration and usage errors exit
/// with [`EXIT_FAILURE`].
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<EdgepickError>() {
        Some(err) if err.is_retryable() => EXIT_RETRYABLE,
        _ => EXIT_FAILURE,
    }
}
