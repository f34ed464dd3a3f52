//! Optimized allocation and collection types for Lumen.
//!
//! This module provides:
//! - Re-exports of optimized hash collections using AHash
//! - [`SparseSet`] for long-lived objects addressed by generational handles
//! - [`FrameArena`] for objects that live exactly one frame

pub mod frame_arena;
pub mod sparse_set;

pub use frame_arena::{FrameArena, FrameHandle};
pub use sparse_set::{IndexSlot, SparseSet};

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_ahash() {
        let mut map = HashMap::new();
        map.insert("key", "value");
        assert_eq!(map.get("key"), Some(&"value"));
    }

    #[test]
    fn test_hashset_ahash() {
        let mut set = HashSet::new();
        set.insert(42);
        assert!(set.contains(&42));
    }
}
