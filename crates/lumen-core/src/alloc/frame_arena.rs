//! Per-frame bump storage with stale-handle detection.
//!
//! Everything pushed into a [`FrameArena`] lives until the next [`FrameArena::reset`].
//! Handles carry the frame they were issued in; resolving a handle from an earlier
//! frame is caught instead of silently reading whatever now occupies the slot.

use crate::profiling::profile_function;

/// Handle to a value stored in a [`FrameArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle {
    frame: u32,
    index: u32,
}

impl FrameHandle {
    /// Frame counter value at the time the handle was issued.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Position of the value inside its frame.
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Arena reset once per frame.
///
/// # Example
///
/// ```
/// use lumen_core::alloc::FrameArena;
///
/// let mut arena = FrameArena::new();
/// let handle = arena.alloc(42u32);
/// assert_eq!(*arena.get(handle), 42);
///
/// arena.reset();
/// assert!(arena.try_get(handle).is_none());
/// ```
pub struct FrameArena<T> {
    items: Vec<T>,
    frame: u32,
    high_water: usize,
}

impl<T> FrameArena<T> {
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            frame: 0,
            high_water: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            frame: 0,
            high_water: 0,
        }
    }

    pub fn alloc(&mut self, value: T) -> FrameHandle {
        let index = self.items.len() as u32;
        self.items.push(value);
        FrameHandle {
            frame: self.frame,
            index,
        }
    }

    /// Resolve a handle issued during the current frame.
    ///
    /// # Panics
    /// Panics when the handle belongs to a previous frame.
    pub fn get(&self, handle: FrameHandle) -> &T {
        match self.try_get(handle) {
            Some(value) => value,
            None => panic!(
                "stale frame handle: issued in frame {}, arena is at frame {}",
                handle.frame, self.frame
            ),
        }
    }

    pub fn get_mut(&mut self, handle: FrameHandle) -> &mut T {
        let frame = self.frame;
        match self.try_get_mut(handle) {
            Some(value) => value,
            None => panic!(
                "stale frame handle: issued in frame {}, arena is at frame {}",
                handle.frame, frame
            ),
        }
    }

    pub fn try_get(&self, handle: FrameHandle) -> Option<&T> {
        if handle.frame != self.frame {
            return None;
        }
        self.items.get(handle.index as usize)
    }

    pub fn try_get_mut(&mut self, handle: FrameHandle) -> Option<&mut T> {
        if handle.frame != self.frame {
            return None;
        }
        self.items.get_mut(handle.index as usize)
    }

    /// Whether `handle` still resolves.
    pub fn is_live(&self, handle: FrameHandle) -> bool {
        handle.frame == self.frame && (handle.index as usize) < self.items.len()
    }

    /// Drop every value and advance the frame counter, invalidating all handles.
    pub fn reset(&mut self) {
        profile_function!();
        self.high_water = self.high_water.max(self.items.len());
        self.items.clear();
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Largest number of values held by any completed frame.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn iter(&self) -> impl Iterator<Item = (FrameHandle, &T)> {
        let frame = self.frame;
        self.items.iter().enumerate().map(move |(index, value)| {
            (
                FrameHandle {
                    frame,
                    index: index as u32,
                },
                value,
            )
        })
    }
}

impl<T> Default for FrameArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_eq_size!(FrameHandle, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_get() {
        let mut arena = FrameArena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(*arena.get(a), "a");
        assert_eq!(*arena.get(b), "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut arena = FrameArena::new();
        let a = arena.alloc(1);
        arena.reset();
        let b = arena.alloc(2);

        // Same slot index, different frame.
        assert_eq!(a.index(), b.index());
        assert!(!arena.is_live(a));
        assert!(arena.try_get(a).is_none());
        assert_eq!(*arena.get(b), 2);
    }

    #[test]
    #[should_panic(expected = "stale frame handle")]
    fn test_stale_handle_panics() {
        let mut arena = FrameArena::new();
        let a = arena.alloc(1);
        arena.reset();
        arena.alloc(99);
        let _ = arena.get(a);
    }

    #[test]
    fn test_high_water_tracks_largest_frame() {
        let mut arena = FrameArena::new();
        for i in 0..5 {
            arena.alloc(i);
        }
        arena.reset();
        arena.alloc(0);
        arena.reset();
        assert_eq!(arena.high_water(), 5);
        assert_eq!(arena.frame(), 2);
    }
}
