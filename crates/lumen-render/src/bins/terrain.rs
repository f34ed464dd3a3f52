//! Terrain blocks.

use lumen_core::alloc::{FrameArena, FrameHandle};
use lumen_core::profiling::profile_function;

use super::{AddInstResult, BinCore, RenderBinManager, RenderContext};
use crate::material::HookKind;
use crate::render_inst::{RenderInst, RenderInstType};
use crate::scene::{BinKind, ScenePassType};

/// Terrain is drawn before other opaque geometry, batched by material.
#[derive(Debug)]
pub struct TerrainBin {
    core: BinCore,
}

impl TerrainBin {
    pub const RENDER_ORDER: f32 = 0.4;
    pub const PROCESS_ADD_ORDER: f32 = 1.0;

    pub fn new() -> Self {
        Self::with_orders(Self::RENDER_ORDER, Self::PROCESS_ADD_ORDER)
    }

    pub fn with_orders(render_order: f32, process_add_order: f32) -> Self {
        Self {
            core: BinCore::new("terrain", render_order, process_add_order, &[RenderInstType::Terrain]),
        }
    }
}

impl Default for TerrainBin {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBinManager for TerrainBin {
    fn core(&self) -> &BinCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BinCore {
        &mut self.core
    }

    fn add_element(&mut self, handle: FrameHandle, inst: &RenderInst) -> AddInstResult {
        if !self.core.accepts(inst) || inst.material.is_none() {
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
        let hook = (ctx.scene.pass_type == ScenePassType::Shadow).then_some(HookKind::Shadow);
        self.core.render_elements(ctx, arena, hook, BinKind::Regular, true);
    }
}
