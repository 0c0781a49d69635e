//! Node abstractions for the placement map.
//!
//! Nodes are storage daemons identified by a compact `NodeId`. They are added
//! to the cluster in `NodeGroup`s: homogeneous batches sharing one weight.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Compact identifier for a storage node.
///
/// Newtype over `u32`; ids are unique across the whole topology.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "osd.{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

/// A batch of identical nodes added to the cluster together.
///
/// The weight is a relative selection probability shared by every node in
/// the group; a weight of zero means the group holds no data. The group size
/// is always the length of the node list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroup {
    weight: u32,
    nodes: Vec<NodeId>,
}

impl NodeGroup {
    /// Construct a group from its weight and ordered members.
    pub fn new(weight: u32, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            weight,
            nodes: nodes.into_iter().collect(),
        }
    }

    /// Group of `size` nodes with consecutive ids starting at `first`.
    ///
    /// Fails with `InvalidArgument` when the last id would not fit in `u32`.
    pub fn contiguous(weight: u32, first: u32, size: u32) -> Result<Self> {
        let end = first.checked_add(size).ok_or_else(|| {
            Error::InvalidArgument(format!("{size} node ids starting at {first} overflow u32"))
        })?;
        Ok(Self::new(weight, (first..end).map(NodeId)))
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn weight(&self) -> u32 {
        self.weight
    }

    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Same members, different weight.
    pub fn with_weight(&self, weight: u32) -> Self {
        Self {
            weight,
            nodes: self.nodes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contiguous_group() {
        let group = NodeGroup::contiguous(3, 10, 4).unwrap();
        assert_eq!(group.size(), 4);
        assert_eq!(group.weight(), 3);
        assert_eq!(group.nodes(), &[NodeId(10), NodeId(11), NodeId(12), NodeId(13)]);
        assert!(group.contains(NodeId(12)));
        assert!(!group.contains(NodeId(14)));
    }

    #[test]
    fn test_contiguous_group_at_id_limit() {
        let last = NodeGroup::contiguous(1, u32::MAX - 2, 2).unwrap();
        assert_eq!(last.nodes(), &[NodeId(u32::MAX - 2), NodeId(u32::MAX - 1)]);

        let err = NodeGroup::contiguous(1, u32::MAX - 1, 2).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(NodeGroup::contiguous(1, u32::MAX, 1).is_err());
    }

    #[test]
    fn test_with_weight_keeps_members() {
        let group = NodeGroup::contiguous(1, 0, 3).unwrap();
        let heavier = group.with_weight(5);
        assert_eq!(heavier.weight(), 5);
        assert_eq!(heavier.nodes(), group.nodes());
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(7).to_string(), "osd.7");
    }
}
