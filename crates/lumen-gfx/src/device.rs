//! The device trait consumed by the material pipeline.

use crate::error::GfxResult;
use crate::handles::{BufferHandle, RenderTargetHandle, ShaderHandle, StateBlockHandle, TextureHandle};
use crate::limits::HardwareLimits;
use crate::shader::ShaderDesc;
use crate::state::StateBlockData;
use crate::target::{ClearFlags, RenderTargetDesc};

/// What a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDesc {
    pub label: String,
    pub size: u64,
    pub kind: BufferKind,
}

impl BufferDesc {
    pub fn vertex(label: impl Into<String>, size: u64) -> Self {
        Self {
            label: label.into(),
            size,
            kind: BufferKind::Vertex,
        }
    }

    pub fn index(label: impl Into<String>, size: u64) -> Self {
        Self {
            label: label.into(),
            size,
            kind: BufferKind::Index,
        }
    }
}

/// A range of primitives to draw from the bound buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimitiveRange {
    pub topology: wgpu::PrimitiveTopology,
    /// First vertex, or first index when `indexed`.
    pub start: u32,
    /// Vertex or index count.
    pub count: u32,
    pub indexed: bool,
    pub base_vertex: i32,
}

impl PrimitiveRange {
    pub fn triangles(start: u32, count: u32) -> Self {
        Self {
            topology: wgpu::PrimitiveTopology::TriangleList,
            start,
            count,
            indexed: false,
            base_vertex: 0,
        }
    }

    pub fn indexed_triangles(start: u32, count: u32, base_vertex: i32) -> Self {
        Self {
            topology: wgpu::PrimitiveTopology::TriangleList,
            start,
            count,
            indexed: true,
            base_vertex,
        }
    }
}

/// Graphics device abstraction.
///
/// All methods take `&self`: implementations keep their own interior state, so
/// the device can be shared as `Arc<dyn GfxDevice>` between the material
/// manager, processed materials and render bins.
///
/// Binding methods (`set_*`) describe state for the next [`GfxDevice::draw`].
/// Render targets form a stack; [`GfxDevice::push_render_target`] redirects
/// output until the matching [`GfxDevice::pop_render_target`].
pub trait GfxDevice: Send + Sync {
    /// Resource limits of the hardware.
    fn limits(&self) -> HardwareLimits;

    /// Compile a generated program.
    fn create_shader(&self, desc: &ShaderDesc) -> GfxResult<ShaderHandle>;

    fn destroy_shader(&self, shader: ShaderHandle);

    /// Create a state object. Identical data may return a shared handle.
    fn create_state_block(&self, data: &StateBlockData) -> StateBlockHandle;

    fn destroy_state_block(&self, block: StateBlockHandle);

    /// Load a texture by authored path.
    fn load_texture(&self, path: &str) -> GfxResult<TextureHandle>;

    fn release_texture(&self, texture: TextureHandle);

    fn create_buffer(&self, desc: &BufferDesc) -> BufferHandle;

    fn destroy_buffer(&self, buffer: BufferHandle);

    fn create_render_target(&self, desc: &RenderTargetDesc) -> GfxResult<RenderTargetHandle>;

    fn destroy_render_target(&self, target: RenderTargetHandle);

    fn push_render_target(&self, target: RenderTargetHandle);

    fn pop_render_target(&self);

    /// Make the contents of `target` available for sampling.
    fn resolve_render_target(&self, target: RenderTargetHandle);

    fn clear(&self, flags: ClearFlags, color: [f32; 4], depth: f32, stencil: u32);

    fn set_shader(&self, shader: ShaderHandle);

    /// Upload raw constant data by name to the bound program.
    fn set_shader_constant(&self, shader: ShaderHandle, name: &str, data: &[u8]);

    fn set_state_block(&self, block: StateBlockHandle);

    fn set_texture(&self, slot: u32, texture: Option<TextureHandle>);

    fn set_vertex_buffer(&self, buffer: BufferHandle);

    fn set_index_buffer(&self, buffer: Option<BufferHandle>);

    fn draw(&self, range: &PrimitiveRange);
}
