//! # edgepick CLI Entry Point
//!
//! Picks live edge nodes from a configuration, or probes a single host.
//!
//! ## Usage
//!
//! ```bash
//! # Pick one host using a JSON properties file
//! edgepick select --config edge.json
//!
//! # Build the configuration from the command line, pick three hosts
//! edgepick select -p host=edge-1,edge-2 -p user=hadoop -p sshKey=~/.ssh/id \
//!     -p loadBalancingMethod=roundRobinSocket --count 3
//!
//! # Avoid a host that just failed, print metrics as JSON
//! edgepick select --config edge.json --exclude edge-1 --metrics
//!
//! # Probe one host
//! edgepick probe edge-1 --method roundRobinPing --timeout 2000
//! ```
//!
//! Selected hosts go to stdout one per line. Logs go to stderr at `warn`
//! unless `RUST_LOG` says otherwise. A selection that finds no live host exits
//! with status 75; every other failure exits with 1.

use anyhow::Result;
use argh::FromArgs;
use edgepick_cli::{build_properties, exit_code, parse_method};
use edgepick_common::{EdgeNodeConf, EdgepickError, DEFAULT_CHECK_PORT, DEFAULT_CHECK_TIMEOUT_MS};
use edgepick_metrics::SelectionMetrics;
use edgepick_selector::{EdgeNodeSelector, LivenessProbe, Probe};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[derive(FromArgs)]
/// edgepick - pick a live edge node
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Select(SelectArgs),
    Probe(ProbeArgs),
}

/// Arguments for selecting hosts.
///
/// Properties are read from `--config` first, then each `-p key=value` is
/// applied on top in order.
#[derive(FromArgs)]
#[argh(subcommand, name = "select")]
/// select live hosts from a configuration
struct SelectArgs {
    /// path to a JSON object of configuration properties
    #[argh(option, short = 'c', long = "config")]
    config: Option<String>,

    /// property override as key=value (repeatable)
    #[argh(option, short = 'p', long = "property")]
    properties: Vec<String>,

    /// rotation profile name
    #[argh(option, long = "profile", default = "\"default\".into()")]
    profile: String,

    /// host that must not be returned
    #[argh(option, long = "exclude")]
    exclude: Option<String>,

    /// number of selections to perform
    #[argh(option, short = 'n', long = "count", default = "1")]
    count: u32,

    /// print a JSON metrics snapshot after the selections
    #[argh(switch, long = "metrics")]
    metrics: bool,
}

/// Arguments for probing a single host.
#[derive(FromArgs)]
#[argh(subcommand, name = "probe")]
/// check whether one host is alive
struct ProbeArgs {
    /// host to probe
    #[argh(positional)]
    host: String,

    /// roundRobin, roundRobinSocket or roundRobinPing
    #[argh(option, short = 'm', long = "method", default = "\"roundRobinSocket\".into()")]
    method: String,

    /// probe timeout in milliseconds
    #[argh(option, short = 't', long = "timeout", default = "DEFAULT_CHECK_TIMEOUT_MS")]
    timeout_ms: u64,

    /// TCP port for roundRobinSocket
    #[argh(option, long = "port", default = "DEFAULT_CHECK_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Default to WARN so stdout stays clean for scripting; RUST_LOG overrides
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Select(args) => run_select(args).await,
        Commands::Probe(args) => run_probe(args).await,
    };

    // No live host exits with a distinct status so callers can retry
    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
        std::process::exit(exit_code(&e));
    }
    Ok(())
}

async fn run_select(args: SelectArgs) -> Result<()> {
    let properties = build_properties(args.config.as_deref().map(Path::new), &args.properties)?;
    let conf = EdgeNodeConf::from_properties(&properties)
        .map_err(EdgepickError::from)?;

    tracing::debug!(
        "Selecting {} host(s) for profile '{}' with method {}",
        args.count,
        args.profile,
        conf.probe_kind()
    );

    let metrics = Arc::new(SelectionMetrics::new());
    let selector = EdgeNodeSelector::new().with_metrics(metrics.clone());

    let mut outcome = Ok(());
    for _ in 0..args.count {
        match selector
            .select(&conf, &args.profile, args.exclude.as_deref())
            .await
        {
            Ok(selection) => println!("{}", selection.host),
            Err(e) => {
                outcome = Err(EdgepickError::from(e).into());
                break;
            }
        }
    }

    if args.metrics {
        println!("{}", serde_json::to_string_pretty(&metrics.snapshot())?);
    }

    outcome
}

async fn run_probe(args: ProbeArgs) -> Result<()> {
    if args.timeout_ms == 0 {
        anyhow::bail!("Invalid timeout: must be a positive number of milliseconds");
    }
    let kind = parse_method(&args.method)?;
    let probe = Probe::from_kind(kind, args.port);

    let liveness = probe
        .check(&args.host, Duration::from_millis(args.timeout_ms))
        .await;

    if liveness.is_alive() {
        println!("alive");
        Ok(())
    } else {
        println!("dead");
        Err(anyhow::anyhow!(
            "Host '{}' did not respond to {} within {}ms",
            args.host,
            kind,
            args.timeout_ms
        ))
    }
}
