//! Placement hash functions.
//!
//! Every client must derive the same pseudo-random draws from the same
//! inputs, so the hash is SipHash-1-3 under a fixed key, fed explicit
//! little-endian bytes (independent of host byte order).

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

/// Fixed key shared by all cooperating processes.
const PLACEMENT_HASH_KEY: (u64, u64) = (0x7067_6d61_7000_0001, 0x6f73_642d_6d61_7073);

#[inline]
fn hasher() -> SipHasher13 {
    SipHasher13::new_with_keys(PLACEMENT_HASH_KEY.0, PLACEMENT_HASH_KEY.1)
}

/// Hash two inputs. Order matters.
#[inline]
pub fn hash2(a: u64, b: u64) -> u64 {
    let mut h = hasher();
    h.write(&a.to_le_bytes());
    h.write(&b.to_le_bytes());
    h.finish()
}

/// Hash three inputs. Order matters.
#[inline]
pub fn hash3(a: u64, b: u64, c: u64) -> u64 {
    let mut h = hasher();
    h.write(&a.to_le_bytes());
    h.write(&b.to_le_bytes());
    h.write(&c.to_le_bytes());
    h.finish()
}

/// Map a hash onto `(0, 1]` using its top 53 bits. Never returns zero, so
/// `ln` of the result is always finite.
#[inline]
pub fn unit_interval(hash: u64) -> f64 {
    const SCALE: f64 = (1u64 << 53) as f64;
    ((hash >> 11) as f64 + 1.0) / SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash2(1, 2), hash2(1, 2));
        assert_eq!(hash3(1, 2, 3), hash3(1, 2, 3));
    }

    #[test]
    fn test_hash_order_matters() {
        assert_ne!(hash2(1, 2), hash2(2, 1));
        assert_ne!(hash3(1, 2, 3), hash3(3, 2, 1));
    }

    #[test]
    fn test_unit_interval_bounds() {
        assert!(unit_interval(0) > 0.0);
        assert_eq!(unit_interval(u64::MAX), 1.0);
        for i in 0..1000 {
            let u = unit_interval(hash2(i, 0));
            assert!(u > 0.0 && u <= 1.0);
            assert!(u.ln().is_finite());
        }
    }
}
