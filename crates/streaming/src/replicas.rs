//! Replica list wire form.
//!
//! A replica list is a big-endian `u32` length followed by that many `u32`
//! node ids, primary first. A placement prefixes the list with the topology
//! version (`u64`), the placement group (`u32`) and the requested replica
//! count (`u32`) so a receiver can tell which snapshot produced it.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use corelib::{NodeId, PlacementGroupId};
use replication::Placement;

use crate::codec::{ensure, read_ids, wire_len};
use crate::error::{Result, StreamingError};

fn put_ids(buf: &mut BytesMut, ids: &[NodeId]) -> Result<()> {
    buf.put_u32(wire_len("replica", ids.len())?);
    for id in ids {
        buf.put_u32(id.as_u32());
    }
    Ok(())
}

pub fn encode_replica_list(ids: &[NodeId]) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(4 + 4 * ids.len());
    put_ids(&mut buf, ids)?;
    Ok(buf.freeze())
}

pub fn decode_replica_list(bytes: &[u8]) -> Result<Vec<NodeId>> {
    let mut cursor = bytes;
    let ids = read_ids(&mut cursor)?;
    finish(&cursor)?;
    Ok(ids)
}

/// Fails with [`StreamingError::TooLarge`] if the requested replica count
/// does not fit in `u32`.
pub fn encode_placement(placement: &Placement) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(8 + 4 + 4 + 4 + 4 * placement.len());
    buf.put_u64(placement.topology_version);
    buf.put_u32(placement.pg.index());
    buf.put_u32(wire_len("requested replica", placement.requested)?);
    put_ids(&mut buf, &placement.replicas)?;
    Ok(buf.freeze())
}

pub fn decode_placement(bytes: &[u8]) -> Result<Placement> {
    let mut cursor = bytes;
    ensure(&cursor, 8 + 4 + 4)?;
    let topology_version = cursor.get_u64();
    let pg = PlacementGroupId(cursor.get_u32());
    let requested = cursor.get_u32() as usize;
    let replicas = read_ids(&mut cursor)?;
    finish(&cursor)?;

    if replicas.len() > requested {
        return Err(StreamingError::InvalidField(format!(
            "{} replicas exceed requested {requested}",
            replicas.len()
        )));
    }
    Ok(Placement {
        pg,
        topology_version,
        requested,
        replicas,
    })
}

fn finish(cursor: &&[u8]) -> Result<()> {
    if cursor.has_remaining() {
        return Err(StreamingError::TrailingBytes(cursor.remaining()));
    }
    Ok(())
}
