//! Translucent geometry.

use lumen_core::alloc::{FrameArena, FrameHandle};
use lumen_core::profiling::profile_function;

use super::{AddInstResult, BinCore, RenderBinManager, RenderContext};
use crate::render_inst::{RenderInst, RenderInstType};
use crate::scene::{BinKind, ScenePassType};

/// Everything translucent, drawn back to front after the opaque bins.
///
/// Claims stop routing, so a translucent instance is never also drawn by an
/// opaque or pre-pass bin later in the add order.
#[derive(Debug)]
pub struct TranslucentBin {
    core: BinCore,
}

impl TranslucentBin {
    pub const RENDER_ORDER: f32 = 1.0;
    pub const PROCESS_ADD_ORDER: f32 = 1.0;

    pub fn new() -> Self {
        Self::with_orders(Self::RENDER_ORDER, Self::PROCESS_ADD_ORDER)
    }

    pub fn with_orders(render_order: f32, process_add_order: f32) -> Self {
        Self {
            core: BinCore::new("translucent", render_order, process_add_order, &[]),
        }
    }
}

impl Default for TranslucentBin {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBinManager for TranslucentBin {
    fn core(&self) -> &BinCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BinCore {
        &mut self.core
    }

    fn add_element(&mut self, handle: FrameHandle, inst: &RenderInst) -> AddInstResult {
        if !self.core.accepts(inst) || !inst.is_translucent() {
            return AddInstResult::Skipped;
        }
        if inst.ty == RenderInstType::ObjectTranslucent && inst.delegate.is_none() {
            return AddInstResult::Skipped;
        }
        self.core.push(handle, inst);
        AddInstResult::Stopped
    }

    fn sort(&mut self, _arena: &FrameArena<RenderInst>) {
        self.core.sort_back_to_front();
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>, arena: &FrameArena<RenderInst>) {
        profile_function!();
        if ctx.scene.pass_type == ScenePassType::Shadow {
            return;
        }
        self.core.render_each(ctx, arena, None, BinKind::Translucent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MatFlags, MatInstanceId};
    use glam::{Mat4, Vec3};
    use lumen_core::alloc::IndexSlot;
    use lumen_gfx::{BufferHandle, PrimitiveRange};

    #[test]
    fn test_back_to_front() {
        let mut arena = FrameArena::new();
        let mut bin = TranslucentBin::new();
        let id = MatInstanceId::from_slot(IndexSlot::new(0, 0));

        for z in [1.0, 5.0, 3.0] {
            let mut inst = RenderInst::mesh(id, BufferHandle::from_raw(0), None, PrimitiveRange::triangles(0, 3))
                .with_world(Mat4::from_translation(Vec3::new(0.0, 0.0, z)))
                .with_camera(Vec3::ZERO);
            inst.mat_flags = MatFlags::TRANSLUCENT;
            let handle = arena.alloc(inst.clone());
            assert_eq!(bin.add_element(handle, &inst), AddInstResult::Stopped);
        }

        bin.sort(&arena);
        let order: Vec<_> = bin.core().elements().iter().map(|e| e.distance_sq).collect();
        assert_eq!(order, vec![25.0, 9.0, 1.0]);
    }
}
