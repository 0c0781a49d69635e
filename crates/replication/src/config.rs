//! Placement configuration.

use corelib::address::{DEFAULT_GROUP_COUNT, DEFAULT_REPLICA_COUNT};
use serde::{Deserialize, Serialize};

use crate::error::{ReplicationError, Result};

/// Default number of draws per replica slot before the slot is given up.
pub const DEFAULT_PROBE_BUDGET: usize = 50;

/// Parameters every cooperating client must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Number of placement groups.
    pub group_count: u32,

    /// Replicas requested for each placement group.
    pub replica_count: usize,

    /// Draws attempted per replica slot.
    pub probe_budget: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            group_count: DEFAULT_GROUP_COUNT,
            replica_count: DEFAULT_REPLICA_COUNT,
            probe_budget: DEFAULT_PROBE_BUDGET,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> Result<()> {
        if self.group_count == 0 {
            return Err(ReplicationError::InvalidArgument(
                "group_count must be positive".into(),
            ));
        }
        if self.replica_count == 0 {
            return Err(ReplicationError::InvalidArgument(
                "replica_count must be positive".into(),
            ));
        }
        if self.probe_budget == 0 {
            return Err(ReplicationError::InvalidArgument(
                "probe_budget must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlacementConfig::default();
        assert_eq!(config.group_count, 1024);
        assert_eq!(config.replica_count, 10);
        assert_eq!(config.probe_budget, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        for config in [
            PlacementConfig { group_count: 0, ..Default::default() },
            PlacementConfig { replica_count: 0, ..Default::default() },
            PlacementConfig { probe_budget: 0, ..Default::default() },
        ] {
            assert!(config.validate().is_err());
        }
    }
}
