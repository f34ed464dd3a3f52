//! Objects with custom render delegates.

use lumen_core::alloc::{FrameArena, FrameHandle};
use lumen_core::profiling::profile_function;

use super::{AddInstResult, BinCore, RenderBinManager, RenderContext};
use crate::render_inst::{RenderInst, RenderInstType};
use crate::scene::BinKind;

/// Opaque objects that draw themselves through an
/// [`ObjectRenderDelegate`](crate::ObjectRenderDelegate).
#[derive(Debug)]
pub struct ObjectBin {
    core: BinCore,
}

impl ObjectBin {
    pub const RENDER_ORDER: f32 = 0.6;
    pub const PROCESS_ADD_ORDER: f32 = 1.0;

    pub fn new() -> Self {
        Self::with_orders(Self::RENDER_ORDER, Self::PROCESS_ADD_ORDER)
    }

    pub fn with_orders(render_order: f32, process_add_order: f32) -> Self {
        Self {
            core: BinCore::new("object", render_order, process_add_order, &[RenderInstType::Object]),
        }
    }
}

impl Default for ObjectBin {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBinManager for ObjectBin {
    fn core(&self) -> &BinCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BinCore {
        &mut self.core
    }

    fn add_element(&mut self, handle: FrameHandle, inst: &RenderInst) -> AddInstResult {
        if !self.core.accepts(inst) || inst.delegate.is_none() {
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
        self.core.render_each(ctx, arena, None, BinKind::Regular);
    }
}
