//! Wire formats for placement state.
//!
//! This crate provides the codecs used when topology snapshots and
//! placement decisions leave the process:
//! - Binary topology snapshots (`serialize` / `deserialize`)
//! - Length-prefixed replica lists and placements

pub mod codec;
pub mod error;
pub mod replicas;

pub use codec::{deserialize, has_magic, serialize};
pub use error::StreamingError;
pub use replicas::{decode_placement, decode_replica_list, encode_placement, encode_replica_list};
