//! Graphics device abstraction for Lumen.
//!
//! The material and render-bin pipeline never talks to a GPU API directly. It
//! consumes the [`GfxDevice`] trait defined here: program and state-block
//! creation, texture and target management, binding and draw submission, and
//! hardware limit queries. A real backend implements the trait on top of its
//! API; tests use `MockGfxDevice` from `lumen-test-utils`.
//!
//! Plain state enums (blend factors, compare functions, address modes, ...) are
//! taken from `wgpu` so descriptors stay directly translatable to a wgpu backend.

pub mod device;
pub mod error;
pub mod handles;
pub mod limits;
pub mod shader;
pub mod state;
pub mod target;
pub mod vertex;

pub use device::{BufferDesc, BufferKind, GfxDevice, PrimitiveRange};
pub use error::{GfxError, GfxResult};
pub use handles::{
    BufferHandle, RenderTargetHandle, ShaderHandle, StateBlockHandle, TextureHandle,
};
pub use limits::{DEFAULT_INTERPOLATOR_LIMIT, DEFAULT_TEXTURE_SLOT_LIMIT, HardwareLimits};
pub use shader::{SamplerDecl, ShaderDesc, UniformDecl, UniformType};
pub use state::{
    BlendDesc, CullMode, MAX_SAMPLER_SLOTS, SamplerState, StateBlockData, StateBlockDesc, StencilState,
};
pub use target::{ClearFlags, RenderTargetDesc};
pub use vertex::{VertexElement, VertexFormat, VertexSemantic};
