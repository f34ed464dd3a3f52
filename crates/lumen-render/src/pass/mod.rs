//! Passes: a compiled program, its constant table, sixteen precomputed state
//! blocks and the texture bindings for the stages it covers.

use glam::{Mat4, Vec2, Vec3, Vec4};
use indexmap::IndexMap;
use lumen_gfx::{GfxDevice, SamplerState, ShaderDesc, ShaderHandle, StateBlockHandle, UniformType};

use crate::features::{FeatureSet, Resources, TexBindings};
use crate::material::BlendOp;

pub mod builder;
pub mod state;

pub use builder::{HalvingRetry, PassBuilder};
pub use state::{PassStateInputs, RenderConditions, STATE_COUNT};

/// A shader constant value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl ConstantValue {
    pub fn ty(&self) -> UniformType {
        match self {
            ConstantValue::Float(_) => UniformType::Float,
            ConstantValue::Vec2(_) => UniformType::Float2,
            ConstantValue::Vec3(_) => UniformType::Float3,
            ConstantValue::Vec4(_) => UniformType::Float4,
            ConstantValue::Mat4(_) => UniformType::Float4x4,
        }
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ConstantValue::Float(v) => bytemuck::bytes_of(v),
            ConstantValue::Vec2(v) => bytemuck::bytes_of(v),
            ConstantValue::Vec3(v) => bytemuck::bytes_of(v),
            ConstantValue::Vec4(v) => bytemuck::bytes_of(v),
            ConstantValue::Mat4(v) => bytemuck::bytes_of(v),
        }
    }
}

/// Constants declared by a pass's program, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantTable {
    constants: IndexMap<String, UniformType>,
}

impl ConstantTable {
    pub fn from_desc(desc: &ShaderDesc) -> Self {
        Self {
            constants: desc
                .uniforms
                .iter()
                .map(|uniform| (uniform.name.clone(), uniform.ty))
                .collect(),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<UniformType> {
        self.constants.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constants.keys().map(String::as_str)
    }

    /// Upload `value` if the program declares `name` with a matching type.
    pub fn set(&self, device: &dyn GfxDevice, shader: ShaderHandle, name: &str, value: ConstantValue) -> bool {
        match self.get(name) {
            Some(ty) if ty == value.ty() => {
                device.set_shader_constant(shader, name, value.as_bytes());
                true
            }
            Some(ty) => {
                tracing::warn!(
                    "Constant '{}' declared as {:?}, refusing {:?} value",
                    name,
                    ty,
                    value.ty()
                );
                false
            }
            None => false,
        }
    }
}

/// One draw submission unit of a processed material.
#[derive(Debug)]
pub struct Pass {
    pub shader: ShaderHandle,
    pub constants: ConstantTable,
    /// Indexed by [`RenderConditions::bits`].
    pub states: [StateBlockHandle; STATE_COUNT],
    /// Material stages this pass renders, ascending.
    pub stages: Vec<usize>,
    pub features: FeatureSet,
    pub tex_bindings: TexBindings,
    /// Sampler per bound slot.
    pub samplers: Vec<SamplerState>,
    pub resources: Resources,
    /// How the pass composites over earlier passes.
    pub blend_op: BlendOp,
}

impl Pass {
    pub fn state(&self, conditions: RenderConditions) -> StateBlockHandle {
        self.states[conditions.bits() as usize]
    }

    pub fn num_tex(&self) -> usize {
        self.tex_bindings.len()
    }

    /// Release the program and state blocks.
    pub fn destroy(&self, device: &dyn GfxDevice) {
        device.destroy_shader(self.shader);
        for block in &self.states {
            device.destroy_state_block(*block);
        }
    }
}
