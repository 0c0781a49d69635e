//! Replica selection strategies.
//!
//! A selector maps a placement group onto an ordered list of live nodes for
//! one topology snapshot. Selection must be:
//!
//! - **Deterministic**: same group and snapshot, same answer, everywhere
//! - **Weighted**: nodes chosen in proportion to their group weight
//! - **Minimally disruptive**: one node changing state only moves the slots
//!   that referenced it
//!
//! Index arithmetic such as `(pg + i) % num_nodes` fails the last two and is
//! deliberately not offered.

pub mod straw2;

pub use straw2::Straw2Selector;

use corelib::{ClusterTopology, PlacementGroupId};

use crate::error::Result;
use crate::placement::Placement;

/// Trait for replica selection algorithms.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync); a selector is shared
/// by every request and only reads the snapshot it is handed.
pub trait ReplicaSelector: Send + Sync + 'static {
    /// Choose up to `replica_count` distinct live nodes for `pg`.
    ///
    /// # Errors
    /// `InvalidArgument` when `replica_count` is zero or `pg` is outside the
    /// configured group range. A degraded cluster yields a shorter list, not
    /// an error.
    fn select(
        &self,
        pg: PlacementGroupId,
        replica_count: usize,
        topology: &ClusterTopology,
    ) -> Result<Placement>;

    /// Get the strategy name (for logging/debugging).
    fn name(&self) -> &'static str;
}
