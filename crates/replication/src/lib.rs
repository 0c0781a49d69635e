//! Replica placement for placement groups.
//!
//! This crate decides which storage nodes hold the replicas of a placement
//! group:
//! - The `ReplicaSelector` trait and the weighted `Straw2Selector`
//! - Placement results carrying the topology version they came from
//! - Configuration shared by all clients
//! - Load accounting over a full placement map

pub mod config;
pub mod distribution;
pub mod error;
pub mod locator;
pub mod placement;
pub mod strategy;

pub use config::PlacementConfig;
pub use distribution::{distribution, NodeLoad};
pub use error::ReplicationError;
pub use locator::{Location, Locator};
pub use placement::{Placement, ReplicaList};
pub use strategy::{ReplicaSelector, Straw2Selector};
