//! Placement results.

use corelib::{NodeId, PlacementGroupId};
use serde::{Deserialize, Serialize};

/// Ordered replica node ids, primary first.
pub type ReplicaList = Vec<NodeId>;

/// Replica placement for one placement group, attributable to the topology
/// version it was computed against.
///
/// A selector returns `min(requested, topology.num_eligible_nodes())`
/// replicas. Zero-weight nodes are live but hold no data, so a cluster whose
/// live nodes outnumber the request can still be under-replicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub pg: PlacementGroupId,
    pub topology_version: u64,
    /// Replicas asked for.
    pub requested: usize,
    pub replicas: ReplicaList,
}

impl Placement {
    pub fn primary(&self) -> Option<NodeId> {
        self.replicas.first().copied()
    }

    pub fn len(&self) -> usize {
        self.replicas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replicas.is_empty()
    }

    /// Fewer eligible replicas were found than requested.
    pub fn is_under_replicated(&self) -> bool {
        self.replicas.len() < self.requested
    }

    /// Number of replicas short of the request.
    pub fn missing(&self) -> usize {
        self.requested.saturating_sub(self.replicas.len())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.replicas.contains(&id)
    }
}
