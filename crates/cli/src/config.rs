//! Command-line configuration and topology file handling.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use corelib::address::{DEFAULT_GROUP_COUNT, DEFAULT_REPLICA_COUNT};
use corelib::ClusterTopology;
use replication::config::DEFAULT_PROBE_BUDGET;
use replication::PlacementConfig;
use tracing::{debug, Level};

use crate::commands::Command;

/// Inspect file-to-node placement for a cluster topology.
#[derive(Debug, Parser)]
#[command(name = "pgmap", version)]
pub struct CliConfig {
    /// Topology snapshot, JSON or binary
    #[arg(short, long, global = true)]
    pub topology: Option<PathBuf>,

    /// Number of placement groups
    #[arg(long, default_value_t = DEFAULT_GROUP_COUNT, global = true)]
    pub groups: u32,

    /// Replicas per placement group
    #[arg(short, long, default_value_t = DEFAULT_REPLICA_COUNT, global = true)]
    pub replicas: usize,

    /// Draws per replica slot
    #[arg(long, default_value_t = DEFAULT_PROBE_BUDGET, global = true)]
    pub probe_budget: usize,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(&self) -> Result<()> {
        init_tracing(self.verbose);
        let output = self.command.execute(self)?;
        println!("{output}");
        Ok(())
    }

    pub fn placement_config(&self) -> PlacementConfig {
        PlacementConfig {
            group_count: self.groups,
            replica_count: self.replicas,
            probe_budget: self.probe_budget,
        }
    }

    pub fn load_topology(&self) -> Result<ClusterTopology> {
        let path = self
            .topology
            .as_deref()
            .context("a topology file is required (--topology)")?;
        read_topology(path)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // Already installed when run repeatedly in one process.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read a topology file, detecting binary snapshots by their magic bytes.
pub fn read_topology(path: &Path) -> Result<ClusterTopology> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let topology = if streaming::has_magic(&bytes) {
        streaming::deserialize(&bytes)
            .with_context(|| format!("decoding binary topology {}", path.display()))?
    } else {
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing JSON topology {}", path.display()))?
    };
    debug!(path = %path.display(), version = topology.version(), "loaded topology");
    Ok(topology)
}

/// Write a topology as JSON when the path ends in `.json`, binary otherwise.
pub fn write_topology(path: &Path, topology: &ClusterTopology) -> Result<()> {
    let bytes = if is_json(path) {
        serde_json::to_vec_pretty(topology)?
    } else {
        streaming::serialize(topology)?.to_vec()
    };
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
