//! Offscreen targets owned by bins.

use lumen_gfx::{ClearFlags, GfxDevice, RenderTargetDesc, RenderTargetHandle};

/// A lazily created render target.
#[derive(Debug)]
pub struct OffscreenTarget {
    desc: RenderTargetDesc,
    clear_color: [f32; 4],
    handle: Option<RenderTargetHandle>,
}

impl OffscreenTarget {
    pub fn new(desc: RenderTargetDesc) -> Self {
        Self {
            desc,
            clear_color: [0.0; 4],
            handle: None,
        }
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn desc(&self) -> &RenderTargetDesc {
        &self.desc
    }

    pub fn handle(&self) -> Option<RenderTargetHandle> {
        self.handle
    }

    /// Create the target if needed, bind it and clear it.
    ///
    /// Returns `None` when the device refuses the target; the bin then draws
    /// nothing this frame.
    pub fn acquire<'a>(&mut self, device: &'a dyn GfxDevice) -> Option<TargetScope<'a>> {
        let target = match self.handle {
            Some(target) => target,
            None => match device.create_render_target(&self.desc) {
                Ok(target) => {
                    tracing::debug!(
                        "Created render target '{}' ({}x{})",
                        self.desc.label,
                        self.desc.width,
                        self.desc.height
                    );
                    self.handle = Some(target);
                    target
                }
                Err(err) => {
                    tracing::warn!("Render target '{}' unavailable: {}", self.desc.label, err);
                    return None;
                }
            },
        };
        Some(TargetScope::begin(device, target, self.clear_color))
    }

    /// Destroy the target. The next `acquire` recreates it.
    pub fn release(&mut self, device: &dyn GfxDevice) {
        if let Some(target) = self.handle.take() {
            device.destroy_render_target(target);
        }
    }

    /// Change the size, dropping the current target.
    pub fn resize(&mut self, device: &dyn GfxDevice, width: u32, height: u32) {
        if self.desc.width == width && self.desc.height == height {
            return;
        }
        self.release(device);
        self.desc.width = width;
        self.desc.height = height;
    }
}

/// A bound offscreen target. Unbinds and resolves it when dropped.
#[must_use = "the target is unbound as soon as the scope is dropped"]
pub struct TargetScope<'a> {
    device: &'a dyn GfxDevice,
    target: RenderTargetHandle,
}

impl<'a> TargetScope<'a> {
    fn begin(device: &'a dyn GfxDevice, target: RenderTargetHandle, clear_color: [f32; 4]) -> Self {
        device.push_render_target(target);
        device.clear(ClearFlags::ALL, clear_color, 1.0, 0);
        Self { device, target }
    }

    pub fn target(&self) -> RenderTargetHandle {
        self.target
    }
}

impl Drop for TargetScope<'_> {
    fn drop(&mut self) {
        self.device.pop_render_target();
        self.device.resolve_render_target(self.target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_test_utils::{GfxCall, MockGfxDevice};

    fn target() -> OffscreenTarget {
        OffscreenTarget::new(RenderTargetDesc::new("glow", 256, 256, wgpu::TextureFormat::Rgba8Unorm))
    }

    #[test]
    fn test_scope_brackets_target() {
        let mock = MockGfxDevice::new();
        let mut offscreen = target();
        {
            let scope = offscreen.acquire(&mock).unwrap();
            assert_eq!(mock.target_depth(), 1);
            let _ = scope.target();
        }
        assert_eq!(mock.target_depth(), 0);

        let handle = offscreen.handle().unwrap();
        let calls = mock.calls();
        assert_eq!(
            &calls[1..],
            &[
                GfxCall::PushRenderTarget(handle),
                GfxCall::Clear(ClearFlags::ALL),
                GfxCall::PopRenderTarget,
                GfxCall::ResolveRenderTarget(handle),
            ]
        );
    }

    #[test]
    fn test_target_created_once() {
        let mock = MockGfxDevice::new();
        let mut offscreen = target();
        drop(offscreen.acquire(&mock));
        drop(offscreen.acquire(&mock));
        assert_eq!(mock.count(|c| matches!(c, GfxCall::CreateRenderTarget { .. })), 1);

        offscreen.resize(&mock, 512, 512);
        assert!(offscreen.handle().is_none());
        drop(offscreen.acquire(&mock));
        assert_eq!(mock.count(|c| matches!(c, GfxCall::CreateRenderTarget { width: 512, .. })), 1);
    }

    #[test]
    fn test_refused_target() {
        let mock = MockGfxDevice::new();
        mock.fail_render_targets(true);
        let mut offscreen = target();
        assert!(offscreen.acquire(&mock).is_none());
        assert_eq!(mock.target_depth(), 0);
    }
}
