//! Tests for file address translation.
//!
//! # Test Strategy
//!
//! 1. **Encoding**: bit layout, bounds, injectivity
//! 2. **Grouping**: range, determinism, fixed policy
//! 3. **Offsets**: byte offset to block mapping

use corelib::address::{
    block_for_offset, encode_object_id, AddressTranslator, ObjectId, PlacementGroupId,
    BLOCK_LIMIT, DEFAULT_GROUP_COUNT, INODE_LIMIT, MAX_FILE_SIZE, OBJECT_SIZE,
};
use corelib::partitioner::InodePartitioner;
use corelib::Error;
use proptest::prelude::*;

// ============================================================================
// Encoding Tests
// ============================================================================

#[test]
fn test_bit_layout() {
    let oid = encode_object_id(0b101, 0b11).unwrap();
    assert_eq!(oid.as_u64() >> 30, 0b101);
    assert_eq!(oid.as_u64() & ((1 << 30) - 1), 0b11);
}

#[test]
fn test_out_of_range_inputs_fail() {
    assert!(matches!(
        encode_object_id(1 << 34, 0),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        encode_object_id(0, 1 << 30),
        Err(Error::InvalidArgument(_))
    ));
    assert!(encode_object_id(u64::MAX, u64::MAX).is_err());
}

#[test]
fn test_constants() {
    assert_eq!(OBJECT_SIZE, 1024 * 1024);
    assert_eq!(MAX_FILE_SIZE, 1 << 50);
    assert_eq!(DEFAULT_GROUP_COUNT, 1024);
}

proptest! {
    #[test]
    fn prop_encoding_is_injective(
        a in (0..INODE_LIMIT, 0..BLOCK_LIMIT),
        b in (0..INODE_LIMIT, 0..BLOCK_LIMIT),
    ) {
        let oa = encode_object_id(a.0, a.1).unwrap();
        let ob = encode_object_id(b.0, b.1).unwrap();
        prop_assert_eq!(oa == ob, a == b);
    }

    #[test]
    fn prop_fields_decode(inode in 0..INODE_LIMIT, block in 0..BLOCK_LIMIT) {
        let oid = encode_object_id(inode, block).unwrap();
        prop_assert_eq!(oid.inode(), inode);
        prop_assert_eq!(oid.block(), block);
        prop_assert_eq!(ObjectId::from_raw(oid.as_u64()), oid);
    }

    #[test]
    fn prop_group_in_range(raw in any::<u64>(), count in 1u32..100_000) {
        let translator = AddressTranslator::new(count).unwrap();
        let pg = translator.object_to_placement_group(ObjectId::from_raw(raw));
        prop_assert!(pg.index() < count);
        prop_assert_eq!(pg, translator.object_to_placement_group(ObjectId::from_raw(raw)));
    }
}

// ============================================================================
// Grouping Tests
// ============================================================================

#[test]
fn test_file_blocks_stripe_across_groups() {
    let translator = AddressTranslator::new(DEFAULT_GROUP_COUNT).unwrap();
    let groups: Vec<PlacementGroupId> = (0..4)
        .map(|block| translator.locate(77, block).unwrap().1)
        .collect();
    assert_eq!(
        groups,
        vec![
            PlacementGroupId(0),
            PlacementGroupId(1),
            PlacementGroupId(2),
            PlacementGroupId(3)
        ]
    );
}

#[test]
fn test_odd_group_count_mixes_inode() {
    let translator = AddressTranslator::new(1000).unwrap();
    let (oid, pg) = translator.locate(5, 3).unwrap();
    assert_eq!(u64::from(pg.index()), oid.as_u64() % 1000);
    assert_eq!(pg, PlacementGroupId(123));
}

#[test]
fn test_policies_are_named() {
    let by_object = AddressTranslator::new(16).unwrap();
    let by_inode = AddressTranslator::with_partitioner(16, InodePartitioner).unwrap();
    assert_eq!(by_object.policy(), "ObjectPartitioner");
    assert_eq!(by_inode.policy(), "InodePartitioner");
}

// ============================================================================
// Offset Tests
// ============================================================================

#[test]
fn test_offset_to_object() {
    let (block, within) = block_for_offset(3 * OBJECT_SIZE + 10).unwrap();
    assert_eq!((block, within), (3, 10));
    let oid = encode_object_id(9, block).unwrap();
    assert_eq!(oid.block(), 3);
}
