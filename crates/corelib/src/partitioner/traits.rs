//! Core partitioner trait definitions.

use std::fmt::Debug;

use crate::address::{ObjectId, PlacementGroupId};

/// A partitioner maps object ids into placement groups.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// translation without synchronization.
pub trait Partitioner: Send + Sync + Debug + 'static {
    /// Maps an object id into `[0, group_count)`.
    ///
    /// Callers guarantee `group_count > 0`.
    fn placement_group(&self, id: ObjectId, group_count: u32) -> PlacementGroupId;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
