//! Frame arena lifetime tests.
//!
//! These mirror how the render pass manager uses the arena: instances are
//! allocated during submission, read during sort/render, then the arena is
//! reset and every outstanding handle must stop resolving.

use lumen_core::alloc::{FrameArena, FrameHandle};

#[derive(Debug, Clone, PartialEq)]
struct Inst {
    key: u32,
    depth: f32,
}

#[test]
fn test_handles_resolve_within_frame() {
    let mut arena = FrameArena::new();
    let handles: Vec<FrameHandle> = (0..16)
        .map(|i| arena.alloc(Inst { key: i, depth: i as f32 }))
        .collect();

    for (i, handle) in handles.iter().enumerate() {
        assert_eq!(arena.get(*handle).key, i as u32);
    }
}

#[test]
fn test_get_mut_updates_in_place() {
    let mut arena = FrameArena::new();
    let h = arena.alloc(Inst { key: 1, depth: 0.0 });
    arena.get_mut(h).depth = 5.0;
    assert_eq!(arena.get(h).depth, 5.0);
}

#[test]
fn test_no_handle_survives_reset() {
    let mut arena = FrameArena::new();
    let old: Vec<FrameHandle> = (0..8).map(|i| arena.alloc(Inst { key: i, depth: 0.0 })).collect();
    arena.reset();

    // Refill so that every old index is occupied again.
    for i in 0..8 {
        arena.alloc(Inst { key: 100 + i, depth: 0.0 });
    }

    for handle in old {
        assert!(arena.try_get(handle).is_none());
        assert!(!arena.is_live(handle));
    }
}

#[test]
#[should_panic(expected = "stale frame handle")]
fn test_dereferencing_after_reset_panics() {
    let mut arena = FrameArena::new();
    let h = arena.alloc(Inst { key: 7, depth: 0.0 });
    arena.reset();
    arena.alloc(Inst { key: 8, depth: 0.0 });
    let _ = arena.get(h);
}

#[test]
fn test_iter_yields_current_frame_handles() {
    let mut arena = FrameArena::new();
    arena.alloc(Inst { key: 1, depth: 0.0 });
    arena.reset();
    arena.alloc(Inst { key: 2, depth: 0.0 });
    arena.alloc(Inst { key: 3, depth: 0.0 });

    let collected: Vec<_> = arena.iter().map(|(h, inst)| (h.frame(), inst.key)).collect();
    assert_eq!(collected, vec![(1, 2), (1, 3)]);
}
