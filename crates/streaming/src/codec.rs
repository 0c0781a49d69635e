//! Binary topology snapshot codec.
//!
//! # Layout
//!
//! All integers are big-endian.
//!
//! ```text
//! magic        4 bytes  "PGTP"
//! format       u16      currently 1
//! version      u64      topology version
//! group_count  u32
//! groups       group_count × { weight: u32, size: u32, size × node_id: u32 }
//! failed_count u32
//! failed       failed_count × node_id: u32, strictly ascending
//! checksum     u64      xxh3-64 of every preceding byte
//! ```
//!
//! Decoding is strict: every invariant of [`ClusterTopology`] is checked and
//! trailing bytes are rejected, so `deserialize(serialize(t)) == t` and any
//! accepted input re-encodes to the same bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use corelib::{ClusterTopology, NodeGroup, NodeId};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{Result, StreamingError};

/// Leading bytes of every snapshot.
pub const MAGIC: [u8; 4] = *b"PGTP";
/// Current format revision.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = 4 + 2 + 8;
const CHECKSUM_LEN: usize = 8;

/// True if `bytes` starts like a binary snapshot.
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.len() >= MAGIC.len() && bytes[..MAGIC.len()] == MAGIC
}

/// Encoded size of `topology` in bytes.
pub fn encoded_len(topology: &ClusterTopology) -> usize {
    HEADER_LEN
        + 4
        + topology
            .groups()
            .iter()
            .map(|g| 8 + 4 * g.size())
            .sum::<usize>()
        + 4
        + 4 * topology.num_failed()
        + CHECKSUM_LEN
}

/// Encode a topology snapshot.
///
/// Fails with [`StreamingError::TooLarge`] when a group count, group size or
/// failed count does not fit its `u32` prefix.
pub fn serialize(topology: &ClusterTopology) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(encoded_len(topology));
    buf.put_slice(&MAGIC);
    buf.put_u16(FORMAT_VERSION);
    buf.put_u64(topology.version());

    buf.put_u32(wire_len("group", topology.groups().len())?);
    for group in topology.groups() {
        buf.put_u32(group.weight());
        buf.put_u32(wire_len("group member", group.size())?);
        for id in group.nodes() {
            buf.put_u32(id.as_u32());
        }
    }

    let failed = topology.failed_nodes();
    buf.put_u32(wire_len("failed node", failed.len())?);
    for id in failed {
        buf.put_u32(id.as_u32());
    }

    let checksum = xxh3_64(&buf);
    buf.put_u64(checksum);
    Ok(buf.freeze())
}

/// Length prefix for `len` items of `field`.
pub(crate) fn wire_len(field: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| StreamingError::TooLarge { field, len })
}

/// Decode a topology snapshot produced by [`serialize`].
pub fn deserialize(bytes: &[u8]) -> Result<ClusterTopology> {
    let mut cursor = bytes;

    ensure(&cursor, MAGIC.len())?;
    let mut magic = [0u8; 4];
    cursor.copy_to_slice(&mut magic);
    if magic != MAGIC {
        return Err(StreamingError::BadMagic(magic));
    }

    ensure(&cursor, 2 + 8 + 4)?;
    let format = cursor.get_u16();
    if format != FORMAT_VERSION {
        return Err(StreamingError::UnsupportedFormat(format));
    }
    let version = cursor.get_u64();

    let group_count = cursor.get_u32() as usize;
    // Each group needs at least 8 bytes; bounds the allocation below.
    ensure(&cursor, group_count.saturating_mul(8))?;
    let mut groups = Vec::with_capacity(group_count);
    for _ in 0..group_count {
        ensure(&cursor, 8)?;
        let weight = cursor.get_u32();
        let ids = read_ids(&mut cursor)?;
        groups.push(NodeGroup::new(weight, ids));
    }

    ensure(&cursor, 4)?;
    let failed = read_ids(&mut cursor)?;
    if failed.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(StreamingError::InvalidField(
            "failed nodes are not strictly ascending".into(),
        ));
    }

    let body_len = bytes.len() - cursor.remaining();
    ensure(&cursor, CHECKSUM_LEN)?;
    let stored = cursor.get_u64();
    let computed = xxh3_64(&bytes[..body_len]);
    if stored != computed {
        return Err(StreamingError::ChecksumMismatch { stored, computed });
    }
    if cursor.has_remaining() {
        return Err(StreamingError::TrailingBytes(cursor.remaining()));
    }

    let topology = ClusterTopology::from_parts(version, groups, failed)?;
    debug!(
        version,
        groups = topology.groups().len(),
        nodes = topology.num_nodes(),
        "decoded topology snapshot"
    );
    Ok(topology)
}

/// `u32` count followed by that many node ids.
pub(crate) fn read_ids(cursor: &mut &[u8]) -> Result<Vec<NodeId>> {
    ensure(cursor, 4)?;
    let count = cursor.get_u32() as usize;
    ensure(cursor, count.saturating_mul(4))?;
    Ok((0..count).map(|_| NodeId(cursor.get_u32())).collect())
}

pub(crate) fn ensure(cursor: &&[u8], needed: usize) -> Result<()> {
    if cursor.remaining() < needed {
        return Err(StreamingError::Truncated {
            needed,
            available: cursor.remaining(),
        });
    }
    Ok(())
}
