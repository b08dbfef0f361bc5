//! Selection Integration Tests
//!
//! Exercises `EdgeNodeSelector` from many tasks on a multi-threaded runtime,
//! against real sockets and against scripted `ping` subprocesses.

use edgepick_common::{Credentials, EdgeNodeConf, ProbeKind};
use edgepick_metrics::SelectionMetrics;
use edgepick_selector::{CursorStore, EdgeNodeSelector, ExternalPingProbe, NoopProbe};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::task::JoinSet;

// ============================================================================
// Helpers
// ============================================================================

fn conf(hosts: &[&str]) -> EdgeNodeConf {
    EdgeNodeConf::new(
        hosts.iter().map(|h| h.to_string()).collect(),
        Credentials {
            user: "hadoop".to_string(),
            ssh_key: "key".to_string(),
        },
    )
    .unwrap()
}

fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn isolated_selector() -> EdgeNodeSelector {
    EdgeNodeSelector::with_cursors(Arc::new(CursorStore::new()))
}

/// Runs `tasks` concurrent workers, each making `per_task` no-op selections,
/// and returns how often each host index was picked.
async fn run_concurrent_selections(
    selector: &EdgeNodeSelector,
    conf: &Arc<EdgeNodeConf>,
    tasks: u64,
    per_task: u64,
) -> Vec<u64> {
    let mut set = JoinSet::new();
    for _ in 0..tasks {
        let selector = selector.clone();
        let conf = conf.clone();
        set.spawn(async move {
            let mut counts = vec![0u64; conf.hosts().len()];
            for _ in 0..per_task {
                let selection = selector
                    .select_with_probe(&conf, "p", None, &NoopProbe)
                    .await
                    .unwrap();
                counts[selection.index] += 1;
            }
            counts
        });
    }

    let mut totals = vec![0u64; conf.hosts().len()];
    while let Some(result) = set.join_next().await {
        for (total, count) in totals.iter_mut().zip(result.unwrap()) {
            *total += count;
        }
    }
    totals
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 5)]
async fn test_concurrent_fairness_across_counter_wrap() {
    const TASKS: u64 = 5;
    const PER_TASK: u64 = 60_000;

    let conf = Arc::new(conf(&["h0", "h1", "h2"]));
    let selector = isolated_selector();
    let initial = u64::MAX - (TASKS * PER_TASK) / 2;
    selector.cursors().seed("p", initial);

    let counts = run_concurrent_selections(&selector, &conf, TASKS, PER_TASK).await;

    let total = TASKS * PER_TASK;
    assert_eq!(counts.iter().sum::<u64>(), total);
    for count in &counts {
        let deviation = (*count as i64 - (total / 3) as i64).abs();
        assert!(deviation <= 10, "counts: {:?}", counts);
    }
    assert_eq!(selector.cursors().peek("p"), Some(initial.wrapping_add(total)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 5)]
#[ignore = "runs 5 * i32::MAX selections"]
async fn test_concurrent_fairness_full_scale() {
    const TASKS: u64 = 5;
    const PER_TASK: u64 = i32::MAX as u64;

    let conf = Arc::new(conf(&["h0", "h1", "h2"]));
    let selector = isolated_selector();

    let counts = run_concurrent_selections(&selector, &conf, TASKS, PER_TASK).await;

    let total = TASKS * PER_TASK;
    for count in &counts {
        let deviation = (*count as i64 - (total / 3) as i64).abs();
        assert!(deviation <= 10, "counts: {:?}", counts);
    }
    assert_eq!(selector.cursors().peek("p"), Some(total));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_selectors_sharing_a_store_share_rotation() {
    let cursors = Arc::new(CursorStore::new());
    let first = EdgeNodeSelector::with_cursors(cursors.clone());
    let second = EdgeNodeSelector::with_cursors(cursors.clone());
    let conf = conf(&["h0", "h1", "h2", "h3"]);

    let futures = (0..40).map(|i| {
        let selector = if i % 2 == 0 { &first } else { &second };
        let conf = &conf;
        async move { selector.select(conf, "shared", None).await.unwrap() }
    });
    let selections = futures::future::join_all(futures).await;

    let mut per_host: HashMap<String, usize> = HashMap::new();
    for selection in selections {
        *per_host.entry(selection.host).or_default() += 1;
    }
    assert!(per_host.values().all(|&count| count == 10), "{:?}", per_host);
    assert_eq!(cursors.peek("shared"), Some(40));
}

#[tokio::test]
async fn test_default_selectors_use_global_store() {
    let profile = "selection-test-global-profile";
    let conf = conf(&["h0", "h1"]);

    let before = CursorStore::global().peek(profile).unwrap_or(0);
    EdgeNodeSelector::new().select(&conf, profile, None).await.unwrap();
    EdgeNodeSelector::default().select(&conf, profile, None).await.unwrap();

    assert_eq!(CursorStore::global().peek(profile), Some(before + 2));
}

// ============================================================================
// TCP probing
// ============================================================================

#[tokio::test]
async fn test_tcp_selection_skips_unreachable_host() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port().to_string();

    let conf = EdgeNodeConf::from_properties(&props(&[
        ("host", "edge-a.invalid, 127.0.0.1"),
        ("user", "hadoop"),
        ("sshKey", "key"),
        ("loadBalancingMethod", "roundRobinSocket"),
        ("checkTimeout", "1000"),
        ("checkPort", port.as_str()),
    ]))
    .unwrap();

    let metrics = Arc::new(SelectionMetrics::new());
    let selector = isolated_selector().with_metrics(metrics.clone());
    let selection = selector.select(&conf, "p", None).await.unwrap();

    assert_eq!(selection.host, "127.0.0.1");
    assert_eq!(selection.index, 1);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.hosts["edge-a.invalid"].probe_failure_count, 1);
    assert_eq!(snapshot.hosts["127.0.0.1"].selected_count, 1);
}

#[tokio::test]
async fn test_tcp_exhaustion_reports_configuration() {
    // Bind then drop to get a port nobody listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let conf = conf(&["127.0.0.1", "localhost"])
        .with_probe_kind(ProbeKind::TcpConnect)
        .with_check_timeout_ms(300)
        .unwrap()
        .with_check_port(port)
        .unwrap();

    let start = Instant::now();
    let err = isolated_selector().select(&conf, "p", None).await.unwrap_err();

    assert!(start.elapsed() < Duration::from_millis(2 * 2 * 300 + 500));
    assert_eq!(err.hosts, vec!["127.0.0.1", "localhost"]);
    assert_eq!(err.timeout_ms, 300);
    assert_eq!(err.probe_kind, ProbeKind::TcpConnect);
}

// ============================================================================
// Ping probing
// ============================================================================

#[cfg(unix)]
mod ping {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fake_ping(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("fake-ping");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_ping_selection_follows_exit_codes() {
        let dir = TempDir::new().unwrap();
        // Only edge-2 answers
        let probe = ExternalPingProbe::with_program(fake_ping(
            &dir,
            "for last in \"$@\"; do :; done; [ \"$last\" = \"edge-2\" ]",
        ));
        let conf = conf(&["edge-0", "edge-1", "edge-2"]).with_probe_kind(ProbeKind::ExternalPing);

        let selection = isolated_selector()
            .select_with_probe(&conf, "p", None, &probe)
            .await
            .unwrap();
        assert_eq!(selection.host, "edge-2");
    }

    #[tokio::test]
    async fn test_hung_ping_bounds_selection_time() {
        let dir = TempDir::new().unwrap();
        let probe = ExternalPingProbe::with_program(fake_ping(&dir, "exec sleep 30"));
        let conf = conf(&["edge-0", "edge-1"])
            .with_probe_kind(ProbeKind::ExternalPing)
            .with_check_timeout_ms(150)
            .unwrap();

        let start = Instant::now();
        let err = isolated_selector()
            .select_with_probe(&conf, "p", None, &probe)
            .await
            .unwrap_err();

        // Two probes, each capped at twice the timeout
        assert!(start.elapsed() < Duration::from_millis(2 * 2 * 150 + 700));
        assert_eq!(err.probe_kind, ProbeKind::ExternalPing);
    }

    #[tokio::test]
    async fn test_dropped_selection_kills_ping() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("finished");
        let probe = ExternalPingProbe::with_program(fake_ping(
            &dir,
            &format!("sleep 1\ntouch '{}'", marker.display()),
        ));
        let conf = conf(&["edge-0"])
            .with_probe_kind(ProbeKind::ExternalPing)
            .with_check_timeout_ms(5000)
            .unwrap();
        let selector = isolated_selector();

        let outcome = tokio::time::timeout(
            Duration::from_millis(200),
            selector.select_with_probe(&conf, "p", None, &probe),
        )
        .await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "ping child outlived the cancelled selection");
        assert_eq!(selector.cursors().peek("p"), Some(1));
    }
}
