//! Offscreen render target descriptors.

use bitflags::bitflags;

bitflags! {
    /// Which attachments a clear touches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const ALL = Self::COLOR.bits() | Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

/// Describes an offscreen render target owned by a render bin.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTargetDesc {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    /// Whether the target carries its own depth attachment.
    pub with_depth: bool,
}

impl RenderTargetDesc {
    pub fn new(label: impl Into<String>, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            format,
            with_depth: false,
        }
    }

    pub fn with_depth(mut self) -> Self {
        self.with_depth = true;
        self
    }
}
