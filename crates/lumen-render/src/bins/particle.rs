//! Particle systems.

use lumen_core::alloc::{FrameArena, FrameHandle};
use lumen_core::profiling::profile_function;
use lumen_gfx::{GfxDevice, RenderTargetDesc};

use super::{AddInstResult, BinCore, OffscreenTarget, RenderBinManager, RenderContext};
use crate::render_inst::{RenderInst, RenderInstType};
use crate::scene::{BinKind, ScenePassType};

/// Particles, back to front, optionally into their own offscreen target.
///
/// Particle claims stop routing so the translucent bin does not draw them
/// a second time.
#[derive(Debug)]
pub struct ParticleBin {
    core: BinCore,
    target: Option<OffscreenTarget>,
}

impl ParticleBin {
    pub const RENDER_ORDER: f32 = 1.2;
    pub const PROCESS_ADD_ORDER: f32 = 0.9;

    pub fn new() -> Self {
        Self {
            core: BinCore::new(
                "particle",
                Self::RENDER_ORDER,
                Self::PROCESS_ADD_ORDER,
                &[RenderInstType::Particle],
            ),
            target: None,
        }
    }

    /// Render into an offscreen target of the given size.
    pub fn offscreen(width: u32, height: u32) -> Self {
        let desc = RenderTargetDesc::new("particles", width, height, wgpu::TextureFormat::Rgba16Float);
        Self {
            target: Some(OffscreenTarget::new(desc)),
            ..Self::new()
        }
    }

    pub fn target(&self) -> Option<&OffscreenTarget> {
        self.target.as_ref()
    }
}

impl Default for ParticleBin {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBinManager for ParticleBin {
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
        let device = ctx.device;
        let _scope = match self.target.as_mut() {
            Some(target) => match target.acquire(device) {
                Some(scope) => Some(scope),
                None => return,
            },
            None => None,
        };
        self.core.render_each(ctx, arena, None, BinKind::Translucent);
    }

    fn on_device_reset(&mut self, device: &dyn GfxDevice) {
        if let Some(target) = self.target.as_mut() {
            target.release(device);
        }
    }
}
