//! File address translation.
//!
//! A file block is named by an `(inode, blockno)` pair. The pair is packed
//! into a 64-bit [`ObjectId`] and the object id is bucketed into a
//! [`PlacementGroupId`] by the translator's partitioner.
//!
//! ```text
//!  63                             30 29                     0
//! ┌─────────────────────────────────┬────────────────────────┐
//! │           inode (34)            │      blockno (30)      │
//! └─────────────────────────────────┴────────────────────────┘
//! ```
//!
//! All cooperating processes must agree on these constants.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::partitioner::{ObjectPartitioner, Partitioner};

/// Size of one file block, which is also the size of one object (1 MiB).
pub const OBJECT_SIZE: u64 = 1 << 20;
/// Bits of the object id holding the block number.
pub const BLOCK_BITS: u32 = 30;
/// Bits of the object id holding the inode number.
pub const INODE_BITS: u32 = 64 - BLOCK_BITS;
/// Exclusive upper bound for inode numbers (2^34).
pub const INODE_LIMIT: u64 = 1 << INODE_BITS;
/// Exclusive upper bound for block numbers (2^30).
pub const BLOCK_LIMIT: u64 = 1 << BLOCK_BITS;
/// Largest addressable file (1 PiB).
pub const MAX_FILE_SIZE: u64 = OBJECT_SIZE << BLOCK_BITS;
/// Number of placement groups unless configured otherwise.
pub const DEFAULT_GROUP_COUNT: u32 = 1024;
/// Replicas requested per placement group unless configured otherwise.
pub const DEFAULT_REPLICA_COUNT: usize = 10;

const BLOCK_MASK: u64 = BLOCK_LIMIT - 1;

/// Globally unique name of one file block.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Pack an inode and block number. Fails if either is out of range.
    pub fn encode(inode: u64, blockno: u64) -> Result<Self> {
        if inode >= INODE_LIMIT {
            return Err(Error::InvalidArgument(format!(
                "inode {inode} does not fit in {INODE_BITS} bits"
            )));
        }
        if blockno >= BLOCK_LIMIT {
            return Err(Error::InvalidArgument(format!(
                "block {blockno} does not fit in {BLOCK_BITS} bits"
            )));
        }
        Ok(ObjectId((inode << BLOCK_BITS) | blockno))
    }

    /// Every 64-bit value is a valid object id.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        ObjectId(raw)
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn inode(self) -> u64 {
        self.0 >> BLOCK_BITS
    }

    #[inline]
    pub const fn block(self) -> u64 {
        self.0 & BLOCK_MASK
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}.{:08x}", self.inode(), self.block())
    }
}

/// Bucket of objects sharing one replica placement decision.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementGroupId(pub u32);

impl PlacementGroupId {
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PlacementGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pg.{:x}", self.0)
    }
}

/// Pack `(inode, blockno)` into an object id.
///
/// # Example
///
/// ```rust
/// use corelib::address::encode_object_id;
///
/// let oid = encode_object_id(5, 3).unwrap();
/// assert_eq!(oid.as_u64(), 5_368_709_123);
/// ```
pub fn encode_object_id(inode: u64, blockno: u64) -> Result<ObjectId> {
    ObjectId::encode(inode, blockno)
}

/// Split a byte offset within a file into `(blockno, offset_in_block)`.
pub fn block_for_offset(offset: u64) -> Result<(u64, u64)> {
    if offset >= MAX_FILE_SIZE {
        return Err(Error::InvalidArgument(format!(
            "offset {offset} is past the maximum file size {MAX_FILE_SIZE}"
        )));
    }
    Ok((offset / OBJECT_SIZE, offset % OBJECT_SIZE))
}

/// Pure `(inode, blockno) -> object -> placement group` translation.
///
/// The grouping policy is fixed at construction. The default
/// [`ObjectPartitioner`] takes the object id modulo the group count, so the
/// blocks of one file are striped over consecutive groups.
#[derive(Clone, Debug)]
pub struct AddressTranslator<P: Partitioner = ObjectPartitioner> {
    group_count: u32,
    partitioner: P,
}

impl AddressTranslator<ObjectPartitioner> {
    /// Translator with the default object-id policy.
    pub fn new(group_count: u32) -> Result<Self> {
        Self::with_partitioner(group_count, ObjectPartitioner)
    }
}

impl Default for AddressTranslator<ObjectPartitioner> {
    fn default() -> Self {
        Self {
            group_count: DEFAULT_GROUP_COUNT,
            partitioner: ObjectPartitioner,
        }
    }
}

impl<P: Partitioner> AddressTranslator<P> {
    pub fn with_partitioner(group_count: u32, partitioner: P) -> Result<Self> {
        if group_count == 0 {
            return Err(Error::InvalidArgument(
                "placement group count must be positive".into(),
            ));
        }
        Ok(Self {
            group_count,
            partitioner,
        })
    }

    #[inline]
    pub fn group_count(&self) -> u32 {
        self.group_count
    }

    /// Name of the grouping policy in use.
    pub fn policy(&self) -> &'static str {
        self.partitioner.name()
    }

    pub fn encode_object_id(&self, inode: u64, blockno: u64) -> Result<ObjectId> {
        ObjectId::encode(inode, blockno)
    }

    /// Never fails; the result is always below `group_count`.
    pub fn object_to_placement_group(&self, id: ObjectId) -> PlacementGroupId {
        self.partitioner.placement_group(id, self.group_count)
    }

    /// Object id and placement group for one file block.
    pub fn locate(&self, inode: u64, blockno: u64) -> Result<(ObjectId, PlacementGroupId)> {
        let oid = self.encode_object_id(inode, blockno)?;
        Ok((oid, self.object_to_placement_group(oid)))
    }
}
