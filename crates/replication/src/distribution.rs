//! Load accounting over a full placement map.

use std::collections::BTreeMap;

use corelib::{ClusterTopology, NodeId};
use serde::Serialize;

use crate::placement::Placement;

/// Placement groups referencing one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeLoad {
    /// Groups where the node is the first replica.
    pub primary: usize,
    /// Groups holding the node in any slot.
    pub total: usize,
}

/// Count how many groups each node serves.
///
/// Every node of the topology appears in the result, including failed and
/// zero-weight ones (with zero load).
pub fn distribution(topology: &ClusterTopology, placements: &[Placement]) -> BTreeMap<NodeId, NodeLoad> {
    let mut loads: BTreeMap<NodeId, NodeLoad> = topology
        .nodes()
        .map(|(id, _)| (id, NodeLoad::default()))
        .collect();
    for placement in placements {
        for (slot, id) in placement.replicas.iter().enumerate() {
            let load = loads.entry(*id).or_default();
            load.total += 1;
            if slot == 0 {
                load.primary += 1;
            }
        }
    }
    loads
}

/// Share of the total weight held by each live node, for comparison with
/// observed load.
pub fn expected_shares(topology: &ClusterTopology) -> BTreeMap<NodeId, f64> {
    let total: u64 = topology.eligible_nodes().map(|(_, w)| u64::from(w)).sum();
    topology
        .eligible_nodes()
        .map(|(id, w)| (id, if total == 0 { 0.0 } else { f64::from(w) / total as f64 }))
        .collect()
}
