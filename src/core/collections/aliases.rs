use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Optimized `HashMap` type for grid buckets and facet keys.
/// Uses `FastHasher` (`rustc_hash::FxHasher`), which is fast on the small
/// integer-array keys the triangulation hashes.
///
/// # Security Warning
///
/// ⚠️ **Not DoS-resistant**: Do not use with attacker-controlled keys.
///
/// # Examples
///
/// ```rust
/// use dewall::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<[usize; 2], usize> = FastHashMap::default();
/// map.insert([1, 2], 3);
/// assert_eq!(map[&[1, 2]], 3);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast non-cryptographic hasher alias for internal collections.
pub type FastHasher = FxHasher;

/// Build hasher that instantiates [`FastHasher`].
pub type FastBuildHasher = FxBuildHasher;

/// Re-export the Entry enum for `FastHashMap`.
pub use std::collections::hash_map::Entry;

/// Optimized `HashSet` type for membership tests.
///
/// ```rust
/// use dewall::core::collections::FastHashSet;
///
/// let mut seen: FastHashSet<usize> = FastHashSet::default();
/// assert!(seen.insert(7));
/// assert!(!seen.insert(7));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that stays on the stack for up to `N` elements.
///
/// # Size Guidelines
///
/// - **N=8**: simplex vertex ids and grid buckets
///
/// ```rust
/// use dewall::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<usize, 8> = SmallBuffer::new();
/// buffer.extend([3, 1, 2]);
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

// =============================================================================
// SEMANTIC SIZE CONSTANTS AND TYPE ALIASES
// =============================================================================

/// Semantic constant for the maximum practical dimension in computational geometry.
///
/// A simplex in D ≤ 7 dimensions fits inline; higher dimensions spill to the
/// heap but still work.
pub const MAX_PRACTICAL_DIMENSION_SIZE: usize = 8;

/// Index of a point in the caller's input slice.
pub type PointId = usize;

/// Inline buffer of point ids, sized for one simplex.
pub type PointIdBuffer = SmallBuffer<PointId, MAX_PRACTICAL_DIMENSION_SIZE>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_collections_basic_operations() {
        let mut map: FastHashMap<[usize; 3], usize> = FastHashMap::default();
        assert!(map.is_empty());
        map.insert([0, 1, 2], 4);
        assert_eq!(map.get(&[0, 1, 2]), Some(&4));
        assert_eq!(map.get(&[2, 1, 0]), None);

        let mut set: FastHashSet<PointId> = FastHashSet::default();
        set.insert(789);
        assert!(set.contains(&789));
        assert!(!set.contains(&999));
    }

    #[test]
    fn test_point_id_buffer_spills_past_inline_capacity() {
        let mut buffer = PointIdBuffer::new();
        buffer.extend(0..MAX_PRACTICAL_DIMENSION_SIZE);
        assert!(!buffer.spilled());
        buffer.push(MAX_PRACTICAL_DIMENSION_SIZE);
        assert!(buffer.spilled());
    }
}
