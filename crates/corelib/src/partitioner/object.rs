//! Object-id modulo partitioner.

use crate::address::{ObjectId, PlacementGroupId};
use crate::partitioner::traits::Partitioner;

/// `object_id mod group_count`.
///
/// With a power-of-two group count no larger than 2^30 only the block bits
/// reach the result, so consecutive blocks of a file land in consecutive
/// groups.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectPartitioner;

impl Partitioner for ObjectPartitioner {
    fn placement_group(&self, id: ObjectId, group_count: u32) -> PlacementGroupId {
        PlacementGroupId((id.as_u64() % u64::from(group_count)) as u32)
    }

    fn name(&self) -> &'static str {
        "ObjectPartitioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_in_range() {
        let partitioner = ObjectPartitioner;
        for count in [1, 7, 1024, u32::MAX] {
            for raw in [0, 1, 5_368_709_123, u64::MAX] {
                let pg = partitioner.placement_group(ObjectId::from_raw(raw), count);
                assert!(pg.index() < count);
            }
        }
    }
}
