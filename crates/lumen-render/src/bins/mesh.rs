//! Opaque meshes.

use lumen_core::alloc::{FrameArena, FrameHandle};
use lumen_core::profiling::profile_function;

use super::{AddInstResult, BinCore, RenderBinManager, RenderContext};
use crate::material::HookKind;
use crate::render_inst::{RenderInst, RenderInstType};
use crate::scene::{BinKind, ScenePassType};

/// Opaque geometry sorted by material then vertex buffer so consecutive
/// draws share pass setup.
///
/// In a shadow pass the instances are drawn through their shadow hook;
/// instances without one are left out.
#[derive(Debug)]
pub struct MeshBin {
    core: BinCore,
}

impl MeshBin {
    pub const RENDER_ORDER: f32 = 0.5;
    pub const PROCESS_ADD_ORDER: f32 = 1.0;

    pub fn new() -> Self {
        Self::with_orders(Self::RENDER_ORDER, Self::PROCESS_ADD_ORDER)
    }

    pub fn with_orders(render_order: f32, process_add_order: f32) -> Self {
        Self {
            core: BinCore::new("mesh", render_order, process_add_order, &[RenderInstType::Mesh]),
        }
    }
}

impl Default for MeshBin {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBinManager for MeshBin {
    fn core(&self) -> &BinCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BinCore {
        &mut self.core
    }

    fn add_element(&mut self, handle: FrameHandle, inst: &RenderInst) -> AddInstResult {
        if !self.core.accepts(inst) || inst.material.is_none() || inst.is_translucent() {
            return AddInstResult::Skipped;
        }
        self.core.push(handle, inst);
        AddInstResult::Added
    }

    fn sort(&mut self, _arena: &FrameArena<RenderInst>) {
        self.core.sort_by_keys();
    }

    fn render(&mut self, ctx: &mut RenderContext<'_>, arena: &FrameArena<RenderInst>) {
        profile_function!();
        let hook = match ctx.scene.pass_type {
            ScenePassType::Shadow => Some(HookKind::Shadow),
            _ => None,
        };
        self.core.render_elements(ctx, arena, hook, BinKind::Regular, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MatFlags, MatInstanceId};
    use lumen_core::alloc::IndexSlot;
    use lumen_gfx::{BufferHandle, PrimitiveRange};

    #[test]
    fn test_claims_opaque_meshes_only() {
        let mut arena = FrameArena::new();
        let mut bin = MeshBin::new();
        let id = MatInstanceId::from_slot(IndexSlot::new(0, 0));
        let mut inst = RenderInst::mesh(id, BufferHandle::from_raw(0), None, PrimitiveRange::triangles(0, 3));

        let handle = arena.alloc(inst.clone());
        assert_eq!(bin.add_element(handle, &inst), AddInstResult::Added);

        inst.mat_flags = MatFlags::TRANSLUCENT;
        let handle = arena.alloc(inst.clone());
        assert_eq!(bin.add_element(handle, &inst), AddInstResult::Skipped);

        inst.mat_flags = MatFlags::empty();
        inst.ty = RenderInstType::Terrain;
        let handle = arena.alloc(inst.clone());
        assert_eq!(bin.add_element(handle, &inst), AddInstResult::Skipped);

        assert_eq!(bin.element_count(), 1);
        bin.clear();
        assert_eq!(bin.element_count(), 0);
    }
}
