//! End-to-end lookup: file block to replica nodes.

use corelib::{AddressTranslator, ClusterTopology, ObjectId, PlacementGroupId};

use crate::config::PlacementConfig;
use crate::error::Result;
use crate::placement::Placement;
use crate::strategy::{ReplicaSelector, Straw2Selector};

/// Where one file block lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub object: ObjectId,
    pub placement: Placement,
}

impl Location {
    pub fn pg(&self) -> PlacementGroupId {
        self.placement.pg
    }
}

/// Address translator and replica selector configured from one
/// [`PlacementConfig`].
#[derive(Debug, Clone)]
pub struct Locator {
    translator: AddressTranslator,
    selector: Straw2Selector,
    replica_count: usize,
}

impl Locator {
    pub fn new(config: &PlacementConfig) -> Result<Self> {
        let selector = Straw2Selector::from_config(config)?;
        let translator = AddressTranslator::new(config.group_count)?;
        Ok(Self {
            translator,
            selector,
            replica_count: config.replica_count,
        })
    }

    pub fn translator(&self) -> &AddressTranslator {
        &self.translator
    }

    pub fn selector(&self) -> &Straw2Selector {
        &self.selector
    }

    pub fn replica_count(&self) -> usize {
        self.replica_count
    }

    /// Resolve `(inode, blockno)` against one topology snapshot.
    pub fn locate(&self, inode: u64, blockno: u64, topology: &ClusterTopology) -> Result<Location> {
        let (object, pg) = self.translator.locate(inode, blockno)?;
        let placement = self.selector.select(pg, self.replica_count, topology)?;
        Ok(Location { object, placement })
    }

    /// Replicas for a placement group with the configured replica count.
    pub fn map_pg(&self, pg: PlacementGroupId, topology: &ClusterTopology) -> Result<Placement> {
        self.selector.select(pg, self.replica_count, topology)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplicationError;
    use corelib::TopologyBuilder;

    #[test]
    fn test_locate_concrete_example() {
        let topology = TopologyBuilder::new().group(1, 0..16).build().unwrap();
        let locator = Locator::new(&PlacementConfig::default()).unwrap();

        let location = locator.locate(5, 3, &topology).unwrap();
        assert_eq!(location.object.as_u64(), 5_368_709_123);
        assert_eq!(location.pg(), PlacementGroupId(3));
        assert_eq!(location.placement.len(), 10);
        assert_eq!(location.placement.topology_version, topology.version());
    }

    #[test]
    fn test_locate_rejects_bad_inode() {
        let topology = TopologyBuilder::new().group(1, 0..4).build().unwrap();
        let locator = Locator::new(&PlacementConfig::default()).unwrap();
        assert!(matches!(
            locator.locate(1 << 34, 0, &topology),
            Err(ReplicationError::Core(corelib::Error::InvalidArgument(_)))
        ));
    }
}
