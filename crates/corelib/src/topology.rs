//! Cluster topology snapshots.
//!
//! A [`ClusterTopology`] is an immutable, versioned description of the
//! cluster: the ordered node groups and the set of failed nodes. Every
//! change (failure, recovery, weight or membership edit) produces a new
//! snapshot with the version bumped by one; the old snapshot is untouched,
//! so readers holding it keep computing against a consistent view.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::node::{NodeGroup, NodeId};

/// Immutable snapshot of cluster membership, weights and failures.
///
/// # Invariants
///
/// - Node ids are unique across all groups
/// - Every failed node is a member of some group
/// - `num_nodes()` is the sum of group sizes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TopologyRepr", into = "TopologyRepr")]
pub struct ClusterTopology {
    version: u64,
    groups: Vec<NodeGroup>,
    failed: HashSet<NodeId>,
}

impl ClusterTopology {
    /// Empty topology at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from raw parts, checking every invariant.
    pub fn from_parts(
        version: u64,
        groups: Vec<NodeGroup>,
        failed: impl IntoIterator<Item = NodeId>,
    ) -> Result<Self> {
        let topology = Self {
            version,
            groups,
            failed: failed.into_iter().collect(),
        };
        topology.validate()?;
        Ok(topology)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.num_nodes());
        for group in &self.groups {
            for &id in group.nodes() {
                if !seen.insert(id) {
                    return Err(Error::DuplicateNode(id));
                }
            }
        }
        if let Some(&id) = self.failed.iter().find(|id| !seen.contains(id)) {
            return Err(Error::UnknownNode(id));
        }
        Ok(())
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn groups(&self) -> &[NodeGroup] {
        &self.groups
    }

    /// Failed node ids in ascending order.
    pub fn failed_nodes(&self) -> Vec<NodeId> {
        let mut failed: Vec<NodeId> = self.failed.iter().copied().collect();
        failed.sort_unstable();
        failed
    }

    pub fn num_nodes(&self) -> usize {
        self.groups.iter().map(NodeGroup::size).sum()
    }

    pub fn num_failed(&self) -> usize {
        self.failed.len()
    }

    pub fn num_live_nodes(&self) -> usize {
        self.num_nodes() - self.failed.len()
    }

    /// Live nodes with positive weight: the most replicas any placement
    /// group can get from this snapshot.
    pub fn num_eligible_nodes(&self) -> usize {
        self.eligible_nodes().count()
    }

    #[inline]
    pub fn is_failed(&self, id: NodeId) -> bool {
        self.failed.contains(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.groups.iter().any(|g| g.contains(id))
    }

    /// Weight of the group the node belongs to.
    pub fn weight_of(&self, id: NodeId) -> Option<u32> {
        self.groups
            .iter()
            .find(|g| g.contains(id))
            .map(NodeGroup::weight)
    }

    /// Every node with its weight, in group order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.nodes().iter().map(move |&id| (id, g.weight())))
    }

    /// Live nodes that can receive data (positive weight).
    pub fn eligible_nodes(&self) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.nodes()
            .filter(move |&(id, weight)| weight > 0 && !self.is_failed(id))
    }

    /// Copy with the version advanced, ready to be edited.
    fn successor(&self) -> Result<Self> {
        let version = self
            .version
            .checked_add(1)
            .ok_or_else(|| Error::Topology("topology version overflow".into()))?;
        Ok(Self {
            version,
            ..self.clone()
        })
    }

    fn check_known(&self, id: NodeId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(Error::UnknownNode(id))
        }
    }

    fn check_group_index(&self, index: usize) -> Result<()> {
        if index < self.groups.len() {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "group index {index} out of range ({} groups)",
                self.groups.len()
            )))
        }
    }

    /// New snapshot with `id` failed. Already-failed nodes yield an
    /// unchanged copy.
    pub fn mark_failed(&self, id: NodeId) -> Result<Self> {
        self.check_known(id)?;
        if self.is_failed(id) {
            return Ok(self.clone());
        }
        let mut next = self.successor()?;
        next.failed.insert(id);
        info!(node = %id, version = next.version, "node marked failed");
        Ok(next)
    }

    /// New snapshot with `id` live again. Live nodes yield an unchanged copy.
    pub fn mark_recovered(&self, id: NodeId) -> Result<Self> {
        self.check_known(id)?;
        if !self.is_failed(id) {
            return Ok(self.clone());
        }
        let mut next = self.successor()?;
        next.failed.remove(&id);
        info!(node = %id, version = next.version, "node recovered");
        Ok(next)
    }

    /// New snapshot with another group appended.
    pub fn add_group(&self, group: NodeGroup) -> Result<Self> {
        let mut next = self.successor()?;
        let size = group.size();
        next.groups.push(group);
        next.validate()?;
        info!(size, version = next.version, "node group added");
        Ok(next)
    }

    /// New snapshot with one group re-weighted.
    pub fn set_group_weight(&self, index: usize, weight: u32) -> Result<Self> {
        self.check_group_index(index)?;
        let mut next = self.successor()?;
        next.groups[index] = next.groups[index].with_weight(weight);
        info!(group = index, weight, version = next.version, "group weight changed");
        Ok(next)
    }

    /// New snapshot without the group at `index`. Its members leave the
    /// failed set as well.
    pub fn remove_group(&self, index: usize) -> Result<Self> {
        self.check_group_index(index)?;
        let mut next = self.successor()?;
        let removed = next.groups.remove(index);
        for id in removed.nodes() {
            next.failed.remove(id);
        }
        info!(group = index, version = next.version, "node group removed");
        Ok(next)
    }
}

/// Serde form: failed nodes as a sorted list so output is stable.
#[derive(Serialize, Deserialize)]
struct TopologyRepr {
    version: u64,
    groups: Vec<NodeGroup>,
    #[serde(default)]
    failed: Vec<NodeId>,
}

impl TryFrom<TopologyRepr> for ClusterTopology {
    type Error = Error;

    fn try_from(repr: TopologyRepr) -> Result<Self> {
        ClusterTopology::from_parts(repr.version, repr.groups, repr.failed)
    }
}

impl From<ClusterTopology> for TopologyRepr {
    fn from(topology: ClusterTopology) -> Self {
        let failed = topology.failed_nodes();
        TopologyRepr {
            version: topology.version,
            groups: topology.groups,
            failed,
        }
    }
}

/// Builder for validated topologies.
///
/// # Example
///
/// ```rust
/// use corelib::{NodeId, TopologyBuilder};
///
/// let topology = TopologyBuilder::new()
///     .group(1, 0..4)
///     .group(2, 4..6)
///     .failed(NodeId(3))
///     .build()
///     .unwrap();
/// assert_eq!(topology.num_nodes(), 6);
/// assert_eq!(topology.num_live_nodes(), 5);
/// ```
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    version: u64,
    groups: Vec<NodeGroup>,
    failed: Vec<NodeId>,
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Append a group whose members are the given raw ids.
    pub fn group(mut self, weight: u32, ids: impl IntoIterator<Item = u32>) -> Self {
        self.groups
            .push(NodeGroup::new(weight, ids.into_iter().map(NodeId)));
        self
    }

    pub fn node_group(mut self, group: NodeGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn failed(mut self, id: NodeId) -> Self {
        self.failed.push(id);
        self
    }

    pub fn build(self) -> Result<ClusterTopology> {
        ClusterTopology::from_parts(self.version, self.groups, self.failed)
    }
}
