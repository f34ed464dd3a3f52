//! Depth and normal pre-pass.

use lumen_core::alloc::{FrameArena, FrameHandle};
use lumen_core::profiling::profile_function;
use lumen_gfx::{GfxDevice, RenderTargetDesc};

use super::{AddInstResult, BinCore, OffscreenTarget, RenderBinManager, RenderContext};
use crate::material::{HookKind, MatFlags};
use crate::render_inst::{RenderInst, RenderInstType};
use crate::scene::{BinKind, ScenePassType};

/// Renders opaque geometry through each material's pre-pass hook into a
/// depth/normal target, nearest first.
///
/// Claims never stop routing: the same instance is drawn again by the
/// colour bins.
#[derive(Debug)]
pub struct PrePassBin {
    core: BinCore,
    target: OffscreenTarget,
}

impl PrePassBin {
    pub const RENDER_ORDER: f32 = 0.01;
    pub const PROCESS_ADD_ORDER: f32 = 0.01;

    pub fn new(width: u32, height: u32) -> Self {
        let desc = RenderTargetDesc::new("prepass", width, height, wgpu::TextureFormat::Rgba16Float).with_depth();
        Self {
            core: BinCore::new(
                "prepass",
                Self::RENDER_ORDER,
                Self::PROCESS_ADD_ORDER,
                &[RenderInstType::Mesh, RenderInstType::Terrain],
            ),
            target: OffscreenTarget::new(desc).with_clear_color([0.0, 0.0, 1.0, 1.0]),
        }
    }

    pub fn target(&self) -> &OffscreenTarget {
        &self.target
    }

    pub fn resize(&mut self, device: &dyn GfxDevice, width: u32, height: u32) {
        self.target.resize(device, width, height);
    }
}

impl RenderBinManager for PrePassBin {
    fn core(&self) -> &BinCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BinCore {
        &mut self.core
    }

    fn add_element(&mut self, handle: FrameHandle, inst: &RenderInst) -> AddInstResult {
        if !self.core.accepts(inst)
            || !inst.mat_flags.contains(MatFlags::PREPASS_HOOK)
            || inst.is_translucent()
        {
            return AddInstResult::Skipped;
        }
        self.core.push(handle, inst);
        AddInstResult::Added
    }

    fn sort(&mut self, _arena: &FrameArena<RenderInst>) {
        self.core.sort_front_to_back();
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
            .render_elements(ctx, arena, Some(HookKind::PrePass), BinKind::PrePass, true);
    }

    fn on_device_reset(&mut self, device: &dyn GfxDevice) {
        self.target.release(device);
    }
}
