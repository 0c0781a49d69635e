//! Core library for file-to-node placement.
//!
//! This crate provides the fundamental abstractions shared by every client
//! of the cluster:
//! - File address translation (`(inode, blockno)` → object → placement group)
//! - Grouping policies (partitioners)
//! - Node and node-group abstractions
//! - Immutable, versioned cluster topology snapshots and their publication
//! - Placement hash functions

pub mod address;
pub mod error;
pub mod hash;
pub mod node;
pub mod partitioner;
pub mod shared;
pub mod topology;

pub use address::{encode_object_id, AddressTranslator, ObjectId, PlacementGroupId};
pub use error::{Error, Result};
pub use node::{NodeGroup, NodeId};
pub use partitioner::Partitioner;
pub use shared::SharedTopology;
pub use topology::{ClusterTopology, TopologyBuilder};
