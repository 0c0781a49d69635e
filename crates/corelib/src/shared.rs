//! Atomic publication of topology snapshots.
//!
//! Readers take an `Arc` to the current snapshot and compute against it for
//! as long as they like; writers build a complete successor and swap the
//! pointer. No reader ever observes a half-applied change.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{Error, Result};
use crate::topology::ClusterTopology;

/// Shared handle to the current topology snapshot.
#[derive(Debug)]
pub struct SharedTopology {
    current: RwLock<Arc<ClusterTopology>>,
    /// Serializes writers so `update` never loses a concurrent change.
    writer: Mutex<()>,
}

impl SharedTopology {
    pub fn new(topology: ClusterTopology) -> Self {
        Self {
            current: RwLock::new(Arc::new(topology)),
            writer: Mutex::new(()),
        }
    }

    /// The snapshot current at the time of the call.
    pub fn load(&self) -> Arc<ClusterTopology> {
        Arc::clone(&self.current.read())
    }

    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    /// Replace the current snapshot. The new version must be strictly
    /// greater than the published one.
    pub fn publish(&self, next: ClusterTopology) -> Result<Arc<ClusterTopology>> {
        let _guard = self.writer.lock();
        self.swap(next)
    }

    /// Derive a successor from the current snapshot and publish it.
    ///
    /// Returns the current snapshot unchanged when `f` yields the same
    /// version (e.g. failing an already-failed node).
    pub fn update<F>(&self, f: F) -> Result<Arc<ClusterTopology>>
    where
        F: FnOnce(&ClusterTopology) -> Result<ClusterTopology>,
    {
        let _guard = self.writer.lock();
        let current = self.load();
        let next = f(&current)?;
        if next.version() == current.version() && next == *current {
            return Ok(current);
        }
        self.swap(next)
    }

    fn swap(&self, next: ClusterTopology) -> Result<Arc<ClusterTopology>> {
        let next = Arc::new(next);
        let mut current = self.current.write();
        if next.version() <= current.version() {
            return Err(Error::Topology(format!(
                "stale topology version {} (current {})",
                next.version(),
                current.version()
            )));
        }
        debug!(
            from = current.version(),
            to = next.version(),
            "publishing topology snapshot"
        );
        *current = Arc::clone(&next);
        metrics::counter!("topology_snapshots_published_total").increment(1);
        Ok(next)
    }
}

impl Default for SharedTopology {
    fn default() -> Self {
        Self::new(ClusterTopology::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use crate::topology::TopologyBuilder;

    fn topology() -> ClusterTopology {
        TopologyBuilder::new().group(1, 0..4).build().unwrap()
    }

    #[test]
    fn test_readers_keep_old_snapshot() {
        let shared = SharedTopology::new(topology());
        let before = shared.load();

        shared.update(|t| t.mark_failed(NodeId(1))).unwrap();

        assert!(!before.is_failed(NodeId(1)));
        assert!(shared.load().is_failed(NodeId(1)));
        assert_eq!(shared.version(), before.version() + 1);
    }

    #[test]
    fn test_stale_publish_rejected() {
        let shared = SharedTopology::new(topology().mark_failed(NodeId(0)).unwrap());
        assert!(shared.publish(topology()).is_err());
        assert_eq!(shared.version(), 1);
    }

    #[test]
    fn test_noop_update_keeps_snapshot() {
        let shared = SharedTopology::new(topology());
        let failed = shared.update(|t| t.mark_failed(NodeId(2))).unwrap();
        let again = shared.update(|t| t.mark_failed(NodeId(2))).unwrap();
        assert!(Arc::ptr_eq(&failed, &again));
    }

    #[test]
    fn test_update_error_leaves_snapshot() {
        let shared = SharedTopology::new(topology());
        assert!(shared.update(|t| t.mark_failed(NodeId(42))).is_err());
        assert_eq!(shared.version(), 0);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let shared = Arc::new(SharedTopology::new(
            TopologyBuilder::new().group(1, 0..16).build().unwrap(),
        ));
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    shared.update(|t| t.mark_failed(NodeId(i))).unwrap();
                    shared.update(|t| t.mark_failed(NodeId(i + 8))).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let last = shared.load();
        assert_eq!(last.num_failed(), 16);
        assert_eq!(last.version(), 16);
    }
}
