//! CLI subcommands.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use corelib::address::block_for_offset;
use corelib::{ClusterTopology, NodeId, PlacementGroupId};
use replication::distribution::expected_shares;
use replication::{distribution, Locator, Placement};

use crate::config::{write_topology, CliConfig};

/// Output of a command, printed by the caller.
pub type CommandResult = Result<String>;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the object, placement group and replicas of a file block
    Locate {
        /// Inode number
        #[arg(long)]
        inode: u64,
        /// Block number within the file
        #[arg(long, conflicts_with = "offset", required_unless_present = "offset")]
        block: Option<u64>,
        /// Byte offset within the file
        #[arg(long)]
        offset: Option<u64>,
    },
    /// Show the replicas of one placement group
    MapPg {
        /// Placement group index
        pg: u32,
    },
    /// Show the replicas of every placement group
    PgDump,
    /// Show per-node load against the weight each node should carry
    Distribution,
    /// Summarize the topology
    Show,
    /// Mark a node failed and write the resulting topology
    Fail {
        node: u32,
        /// Destination file (.json for JSON, anything else for binary)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Mark a node recovered and write the resulting topology
    Recover {
        node: u32,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Rewrite the topology in the format implied by the output path
    Convert {
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Command {
    pub fn execute(&self, config: &CliConfig) -> CommandResult {
        let topology = config.load_topology()?;
        match self {
            Command::Locate {
                inode,
                block,
                offset,
            } => {
                let blockno = match (block, offset) {
                    (Some(block), _) => *block,
                    (None, Some(offset)) => block_for_offset(*offset)?.0,
                    (None, None) => anyhow::bail!("either --block or --offset is required"),
                };
                let locator = Locator::new(&config.placement_config())?;
                let location = locator.locate(*inode, blockno, &topology)?;
                let mut out = String::new();
                writeln!(out, "object    {} ({})", location.object, location.object.as_u64())?;
                writeln!(out, "pg        {} ({})", location.pg(), location.pg().index())?;
                write!(out, "{}", format_placement(&location.placement))?;
                Ok(out)
            }
            Command::MapPg { pg } => {
                let locator = Locator::new(&config.placement_config())?;
                let placement = locator.map_pg(PlacementGroupId(*pg), &topology)?;
                Ok(format_placement(&placement))
            }
            Command::PgDump => {
                let placements = map_all(config, &topology)?;
                let mut out = String::new();
                for placement in &placements {
                    writeln!(
                        out,
                        "{}\t{}{}",
                        placement.pg,
                        join(&placement.replicas),
                        if placement.is_under_replicated() { "\tdegraded" } else { "" }
                    )?;
                }
                Ok(out)
            }
            Command::Distribution => {
                let placements = map_all(config, &topology)?;
                let loads = distribution(&topology, &placements);
                let shares = expected_shares(&topology);
                let assigned: usize = loads.values().map(|l| l.total).sum();
                let mut out = String::from("node\tprimary\ttotal\tshare\texpected\n");
                for (id, load) in &loads {
                    let share = if assigned == 0 {
                        0.0
                    } else {
                        load.total as f64 / assigned as f64
                    };
                    let expected = shares.get(id).copied().unwrap_or(0.0);
                    writeln!(
                        out,
                        "{id}\t{}\t{}\t{:.4}\t{:.4}",
                        load.primary, load.total, share, expected
                    )?;
                }
                Ok(out)
            }
            Command::Show => Ok(format_topology(&topology)),
            Command::Fail { node, output } => {
                let next = topology.mark_failed(NodeId(*node))?;
                write_topology(output, &next)?;
                Ok(format!(
                    "{} failed, topology v{} written to {}",
                    NodeId(*node),
                    next.version(),
                    output.display()
                ))
            }
            Command::Recover { node, output } => {
                let next = topology.mark_recovered(NodeId(*node))?;
                write_topology(output, &next)?;
                Ok(format!(
                    "{} recovered, topology v{} written to {}",
                    NodeId(*node),
                    next.version(),
                    output.display()
                ))
            }
            Command::Convert { output } => {
                write_topology(output, &topology)?;
                Ok(format!("topology v{} written to {}", topology.version(), output.display()))
            }
        }
    }
}

fn map_all(config: &CliConfig, topology: &ClusterTopology) -> Result<Vec<Placement>> {
    let locator = Locator::new(&config.placement_config())?;
    locator
        .selector()
        .map_all(locator.replica_count(), topology)
        .context("computing placement map")
}

fn join(ids: &[NodeId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn format_placement(placement: &Placement) -> String {
    let mut out = format!(
        "replicas  [{}] (topology v{})\n",
        join(&placement.replicas),
        placement.topology_version
    );
    if placement.is_under_replicated() {
        out.push_str(&format!(
            "warning   under-replicated: {} of {} replicas\n",
            placement.len(),
            placement.requested
        ));
    }
    out
}

fn format_topology(topology: &ClusterTopology) -> String {
    let mut out = format!(
        "version {}: {} nodes, {} live, {} failed\n",
        topology.version(),
        topology.num_nodes(),
        topology.num_live_nodes(),
        topology.num_failed()
    );
    for (index, group) in topology.groups().iter().enumerate() {
        out.push_str(&format!(
            "group {index}: weight {}, {} nodes [{}]\n",
            group.weight(),
            group.size(),
            join(group.nodes())
        ));
    }
    if topology.num_failed() > 0 {
        out.push_str(&format!("failed: [{}]\n", join(&topology.failed_nodes())));
    }
    out
}
