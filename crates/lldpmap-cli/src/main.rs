use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use lldpmap::{ConfigOverrides, LldpmapOptions, ZabbixOptions, run_main};
use lldpmap_sync::MapOutcome;

#[derive(Parser, Debug)]
#[command(
    name = "lldpmap",
    about = "lldpmap: draw and publish the network as LLDP sees it",
    version
)]
pub struct Cli {
    /// Device snapshot with inventory and LLDP neighbor tables (JSON)
    #[arg(short = 'd', long = "devices", value_name = "FILE")]
    devices: PathBuf,

    /// Map configuration (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", env = "LLDPMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Use precomputed node positions (JSON) instead of running Graphviz
    #[arg(long = "positions", value_name = "FILE")]
    positions: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(flatten)]
    zabbix: ZabbixOptions,

    /// Reconcile the map in memory only, even when a Zabbix url is set
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run(args: Cli) -> anyhow::Result<()> {
    let total_start = Instant::now();
    init_tracing(args.verbose);

    let opts = LldpmapOptions {
        devices: args.devices,
        config: args.config,
        positions: args.positions,
        overrides: args.overrides,
        zabbix: args.zabbix,
        dry_run: args.dry_run,
    };

    let summary = run_main(&opts).inspect_err(|e| {
        tracing::error!(error = %e, "run failed");
    })?;

    match &summary.outcome {
        Some(MapOutcome::Created(id)) => tracing::info!(map = %id, "map created"),
        Some(MapOutcome::Updated(id)) => tracing::info!(map = %id, "map updated"),
        None => {}
    }

    let total_secs = total_start.elapsed().as_secs_f64();
    tracing::info!(
        nodes = summary.nodes,
        edges = summary.edges,
        total_secs,
        "complete"
    );
    Ok(())
}

pub fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    run(args)
}
