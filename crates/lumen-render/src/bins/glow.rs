//! Glow buffer.

use lumen_core::alloc::{FrameArena, FrameHandle};
use lumen_core::profiling::profile_function;
use lumen_gfx::{GfxDevice, RenderTargetDesc};

use super::{AddInstResult, BinCore, OffscreenTarget, RenderBinManager, RenderContext};
use crate::material::{HookKind, MatFlags};
use crate::render_inst::RenderInst;
use crate::scene::{BinKind, ScenePassType};

/// Draws the glowing stages of materials into an offscreen target.
///
/// The target is bound and cleared every diffuse frame, even with nothing
/// to draw, so the later glow composite always reads a defined buffer.
#[derive(Debug)]
pub struct GlowBin {
    core: BinCore,
    target: OffscreenTarget,
}

impl GlowBin {
    pub const RENDER_ORDER: f32 = 1.5;
    pub const PROCESS_ADD_ORDER: f32 = 1.0;

    pub fn new(width: u32, height: u32) -> Self {
        let desc = RenderTargetDesc::new("glow", width, height, wgpu::TextureFormat::Rgba8Unorm).with_depth();
        Self {
            core: BinCore::new("glow", Self::RENDER_ORDER, Self::PROCESS_ADD_ORDER, &[]),
            target: OffscreenTarget::new(desc),
        }
    }

    pub fn target(&self) -> &OffscreenTarget {
        &self.target
    }

    pub fn resize(&mut self, device: &dyn GfxDevice, width: u32, height: u32) {
        self.target.resize(device, width, height);
    }
}

impl RenderBinManager for GlowBin {
    fn core(&self) -> &BinCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BinCore {
        &mut self.core
    }

    fn add_element(&mut self, handle: FrameHandle, inst: &RenderInst) -> AddInstResult {
        if !self.core.accepts(inst) || !inst.mat_flags.contains(MatFlags::GLOW_HOOK) {
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
        if ctx.scene.pass_type != ScenePassType::Diffuse {
            return;
        }
        let device = ctx.device;
        let Some(_scope) = self.target.acquire(device) else {
            return;
        };
        self.core
            .render_elements(ctx, arena, Some(HookKind::Glow), BinKind::Glow, true);
    }

    fn on_device_reset(&mut self, device: &dyn GfxDevice) {
        self.target.release(device);
    }
}
