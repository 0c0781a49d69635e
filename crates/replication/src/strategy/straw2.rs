//! Straw2 weighted replica selection.
//!
//! Every node draws a "straw" from a hash of `(seed, node_id)`, scaled by
//! its weight; the longest straw wins. Draws are independent per node, so a
//! node joining, leaving or failing only changes outcomes it wins or loses
//! itself.
//!
//! # Algorithm
//!
//! Selection runs in two passes.
//!
//! 1. **Base pass.** For slot `i` and attempt `a` in `0..probe_budget - 1`,
//!    seed = `H(pg, i, a)` and run a straw2 draw over every weighted node,
//!    failed ones included. The winner takes the slot unless an earlier slot
//!    already holds it. The last attempt draws only among weighted nodes no
//!    slot holds yet. The base list depends on membership and weights only.
//! 2. **Replacement pass.** Each base slot holding a failed node is refilled,
//!    in slot order, from a separate seed domain. Candidates must be live and
//!    absent from the base list and from earlier replacements. The last
//!    attempt draws only among such candidates; a slot with none is dropped.
//!
//! A single failure therefore rewrites exactly the slot that held the failed
//! node: every other slot keeps its base node, and the replacement can never
//! collide with one of them.
//!
//! Straw length is `ln(u) / weight` with `u` uniform on `(0, 1]`: the
//! maximum over nodes is attained by node `k` with probability
//! `weight_k / Σ weight`.

use corelib::hash::{hash2, hash3, unit_interval};
use corelib::{ClusterTopology, NodeId, PlacementGroupId};
use tracing::{debug, warn};

use crate::config::{PlacementConfig, DEFAULT_PROBE_BUDGET};
use crate::error::{ReplicationError, Result};
use crate::placement::Placement;
use crate::strategy::ReplicaSelector;

/// Separates replacement draws from base draws for the same slot.
const REPLACEMENT_DOMAIN: u64 = 0x7265_706c_6163_6521;

/// Weighted, failure-aware selector.
///
/// # Example
///
/// ```rust
/// use corelib::{PlacementGroupId, TopologyBuilder};
/// use replication::{ReplicaSelector, Straw2Selector};
///
/// let topology = TopologyBuilder::new().group(1, 0..8).build().unwrap();
/// let selector = Straw2Selector::new(1024);
///
/// let placement = selector.select(PlacementGroupId(42), 3, &topology).unwrap();
/// assert_eq!(placement.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Straw2Selector {
    group_count: u32,
    probe_budget: usize,
}

impl Straw2Selector {
    pub fn new(group_count: u32) -> Self {
        Self {
            group_count,
            probe_budget: DEFAULT_PROBE_BUDGET,
        }
    }

    pub fn from_config(config: &PlacementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            group_count: config.group_count,
            probe_budget: config.probe_budget,
        })
    }

    pub fn with_probe_budget(mut self, probe_budget: usize) -> Self {
        self.probe_budget = probe_budget.max(1);
        self
    }

    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    pub fn probe_budget(&self) -> usize {
        self.probe_budget
    }

    /// Distinct weighted nodes for each slot, failure state ignored.
    fn base_slots(&self, pg: u64, replica_count: usize, topology: &ClusterTopology) -> Vec<NodeId> {
        let weighted = topology.nodes().filter(|(_, weight)| *weight > 0).count();
        let mut base = Vec::with_capacity(replica_count.min(weighted));
        for slot in 0..replica_count as u64 {
            if base.len() == weighted {
                break;
            }
            let pick = self.draw_slot(
                |attempt| hash3(pg, slot, attempt),
                |id| !base.contains(&id),
                topology,
            );
            match pick {
                Some(node) => base.push(node),
                None => break,
            }
        }
        base
    }

    /// Live stand-in for the failed node in `slot`, outside `taken`.
    fn replacement(
        &self,
        pg: u64,
        slot: u64,
        topology: &ClusterTopology,
        taken: &[NodeId],
    ) -> Option<NodeId> {
        let domain = hash2(pg, REPLACEMENT_DOMAIN);
        self.draw_slot(
            |attempt| hash3(domain, slot, attempt),
            |id| !topology.is_failed(id) && !taken.contains(&id),
            topology,
        )
    }

    /// Bounded draw sequence: `probe_budget - 1` draws over every node,
    /// then one draw restricted to the nodes `accept` allows.
    fn draw_slot(
        &self,
        seed: impl Fn(u64) -> u64,
        accept: impl Fn(NodeId) -> bool,
        topology: &ClusterTopology,
    ) -> Option<NodeId> {
        for attempt in 0..self.probe_budget - 1 {
            let candidate = straw2_draw(seed(attempt as u64), topology.nodes())?;
            if accept(candidate) {
                return Some(candidate);
            }
        }
        let last = (self.probe_budget - 1) as u64;
        straw2_draw(seed(last), topology.nodes().filter(|&(id, _)| accept(id)))
    }

    /// Placement for every group, in group order.
    pub fn map_all(&self, replica_count: usize, topology: &ClusterTopology) -> Result<Vec<Placement>> {
        (0..self.group_count)
            .map(|pg| self.select(PlacementGroupId(pg), replica_count, topology))
            .collect()
    }
}

impl ReplicaSelector for Straw2Selector {
    fn select(
        &self,
        pg: PlacementGroupId,
        replica_count: usize,
        topology: &ClusterTopology,
    ) -> Result<Placement> {
        if replica_count == 0 {
            return Err(ReplicationError::InvalidArgument(
                "replica count must be positive".into(),
            ));
        }
        if pg.index() >= self.group_count {
            return Err(ReplicationError::InvalidArgument(format!(
                "{pg} out of range (group count {})",
                self.group_count
            )));
        }

        let index = u64::from(pg.index());
        let base = self.base_slots(index, replica_count, topology);
        let mut taken = base.clone();
        let mut replicas = Vec::with_capacity(base.len());
        for (slot, node) in base.iter().copied().enumerate() {
            if !topology.is_failed(node) {
                replicas.push(node);
                continue;
            }
            if let Some(stand_in) = self.replacement(index, slot as u64, topology, &taken) {
                taken.push(stand_in);
                replicas.push(stand_in);
            }
        }

        let placement = Placement {
            pg,
            topology_version: topology.version(),
            requested: replica_count,
            replicas,
        };
        debug!(%pg, version = topology.version(), replicas = ?placement.replicas, "selected replicas");
        if placement.is_under_replicated() {
            warn!(
                %pg,
                version = topology.version(),
                found = placement.len(),
                requested = replica_count,
                "placement group under-replicated"
            );
            metrics::counter!("placement_under_replicated_total").increment(1);
        }
        Ok(placement)
    }

    fn name(&self) -> &'static str {
        "Straw2Selector"
    }
}

/// Longest straw among `candidates`; ties go to the lower node id.
/// Zero-weight nodes never win.
fn straw2_draw(seed: u64, candidates: impl Iterator<Item = (NodeId, u32)>) -> Option<NodeId> {
    let mut best: Option<(f64, NodeId)> = None;
    for (id, weight) in candidates {
        if weight == 0 {
            continue;
        }
        let u = unit_interval(hash2(seed, u64::from(id.as_u32())));
        let straw = u.ln() / f64::from(weight);
        best = match best {
            Some((longest, holder)) if longest > straw || (longest == straw && holder < id) => {
                Some((longest, holder))
            }
            _ => Some((straw, id)),
        };
    }
    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::TopologyBuilder;
    use std::collections::HashSet;

    #[test]
    fn test_selection_is_deterministic() {
        let topology = TopologyBuilder::new().group(1, 0..20).build().unwrap();
        let selector = Straw2Selector::new(64);
        for pg in 0..64 {
            let a = selector.select(PlacementGroupId(pg), 5, &topology).unwrap();
            let b = selector.select(PlacementGroupId(pg), 5, &topology).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_replicas_are_distinct() {
        let topology = TopologyBuilder::new().group(1, 0..6).build().unwrap();
        let selector = Straw2Selector::new(128);
        for pg in 0..128 {
            let placement = selector.select(PlacementGroupId(pg), 6, &topology).unwrap();
            let unique: HashSet<_> = placement.replicas.iter().collect();
            assert_eq!(unique.len(), 6);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        let topology = TopologyBuilder::new().group(1, 0..4).build().unwrap();
        let selector = Straw2Selector::new(16);
        assert!(matches!(
            selector.select(PlacementGroupId(0), 0, &topology),
            Err(ReplicationError::InvalidArgument(_))
        ));
        assert!(matches!(
            selector.select(PlacementGroupId(16), 3, &topology),
            Err(ReplicationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_topology_returns_empty_list() {
        let selector = Straw2Selector::new(8);
        let placement = selector
            .select(PlacementGroupId(1), 3, &ClusterTopology::new())
            .unwrap();
        assert!(placement.is_empty());
        assert_eq!(placement.missing(), 3);
    }

    #[test]
    fn test_zero_weight_group_is_never_chosen() {
        let topology = TopologyBuilder::new()
            .group(0, 0..4)
            .group(1, 4..8)
            .build()
            .unwrap();
        let selector = Straw2Selector::new(256);
        for placement in selector.map_all(3, &topology).unwrap() {
            assert!(placement.replicas.iter().all(|id| id.as_u32() >= 4));
        }
    }

    #[test]
    fn test_straw2_draw_weighting() {
        let nodes = [(NodeId(1), 1), (NodeId(2), 3)];
        let mut heavy = 0u32;
        for seed in 0..20_000u64 {
            if straw2_draw(seed, nodes.iter().copied()) == Some(NodeId(2)) {
                heavy += 1;
            }
        }
        let share = f64::from(heavy) / 20_000.0;
        assert!((share - 0.75).abs() < 0.02, "heavy share {share}");
    }

    #[test]
    fn test_budget_of_one_still_places() {
        let topology = TopologyBuilder::new()
            .group(1, 0..5)
            .failed(NodeId(0))
            .failed(NodeId(1))
            .build()
            .unwrap();
        let selector = Straw2Selector::new(32).with_probe_budget(1);
        for placement in selector.map_all(3, &topology).unwrap() {
            assert_eq!(placement.len(), 3);
            assert!(!placement.contains(NodeId(0)) && !placement.contains(NodeId(1)));
        }
    }

    #[test]
    fn test_failure_rewrites_only_its_slot() {
        let healthy = TopologyBuilder::new()
            .group(1, 0..8)
            .group(3, 8..12)
            .build()
            .unwrap();
        let selector = Straw2Selector::new(512);
        for failed in [NodeId(2), NodeId(9)] {
            let degraded = healthy.mark_failed(failed).unwrap();
            for pg in 0..512 {
                let pg = PlacementGroupId(pg);
                let before = selector.select(pg, 10, &healthy).unwrap();
                let after = selector.select(pg, 10, &degraded).unwrap();
                assert_eq!(before.len(), after.len());
                for (slot, (old, new)) in before.replicas.iter().zip(&after.replicas).enumerate() {
                    if *old == failed {
                        assert_ne!(new, old, "{pg} slot {slot} kept {failed}");
                    } else {
                        assert_eq!(new, old, "{pg} slot {slot} moved");
                    }
                }
            }
        }
    }

    #[test]
    fn test_replacements_skip_every_base_node() {
        let topology = TopologyBuilder::new()
            .group(1, 0..10)
            .failed(NodeId(0))
            .failed(NodeId(1))
            .failed(NodeId(2))
            .build()
            .unwrap();
        let selector = Straw2Selector::new(256);
        for pg in 0..256 {
            let placement = selector.select(PlacementGroupId(pg), 5, &topology).unwrap();
            let unique: HashSet<_> = placement.replicas.iter().collect();
            assert_eq!(unique.len(), 5);
            assert!(placement.replicas.iter().all(|id| !topology.is_failed(*id)));
        }
    }
}
