//! Inode modulo partitioner.

use crate::address::{ObjectId, PlacementGroupId};
use crate::partitioner::traits::Partitioner;

/// `inode mod group_count`: every block of a file shares one group.
#[derive(Clone, Copy, Debug, Default)]
pub struct InodePartitioner;

impl Partitioner for InodePartitioner {
    fn placement_group(&self, id: ObjectId, group_count: u32) -> PlacementGroupId {
        PlacementGroupId((id.inode() % u64::from(group_count)) as u32)
    }

    fn name(&self) -> &'static str {
        "InodePartitioner"
    }
}
