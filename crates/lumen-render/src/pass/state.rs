//! Fixed-function state derivation for the sixteen render conditions.
//!
//! Each state is a stack of sparse layers: base, translucent, glow, reflect,
//! the pass-specific layer and finally wireframe. A later layer only replaces
//! the fields it sets.

use bitflags::bitflags;
use lumen_gfx::{BlendDesc, CullMode, SamplerState, StateBlockData, StateBlockDesc};
use wgpu::{CompareFunction, PolygonMode};

use crate::material::{BlendOp, Material};

bitflags! {
    /// Conditions a pass can be drawn under.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderConditions: u8 {
        const REFLECT = 1 << 0;
        const TRANSLUCENT = 1 << 1;
        const GLOW = 1 << 2;
        const WIREFRAME = 1 << 3;
    }
}

/// Number of distinct [`RenderConditions`] values.
pub const STATE_COUNT: usize = 16;

/// Everything the pass-specific layer depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct PassStateInputs {
    pub translucent_blend_op: BlendOp,
    pub translucent_z_write: bool,
    /// Blend against previous passes; `None` for the first pass.
    pub pass_blend_op: BlendOp,
    pub alpha_test: bool,
    pub alpha_ref: u8,
    pub double_sided: bool,
    /// Sampler per texture slot.
    pub samplers: Vec<SamplerState>,
}

impl PassStateInputs {
    pub fn from_material(material: &Material) -> Self {
        Self {
            translucent_blend_op: material.translucent_blend_op,
            translucent_z_write: material.translucent_z_write,
            pass_blend_op: BlendOp::None,
            alpha_test: material.alpha_test,
            alpha_ref: material.alpha_ref,
            double_sided: material.double_sided,
            samplers: Vec::new(),
        }
    }
}

fn base_layer() -> StateBlockDesc {
    let mut desc = StateBlockDesc::new();
    desc.blend_enable = Some(false);
    desc.alpha_test_enable = Some(false);
    desc.set_cull(CullMode::Back).set_z_read_write(true, true);
    desc.depth_compare = Some(CompareFunction::LessEqual);
    desc.fill_mode = Some(PolygonMode::Fill);
    desc
}

fn translucent_layer(op: BlendOp) -> StateBlockDesc {
    let mut desc = StateBlockDesc::new();
    desc.set_blend(op.blend_desc().unwrap_or(BlendDesc::ALPHA));
    desc.depth_write = Some(false);
    desc
}

fn glow_layer() -> StateBlockDesc {
    let mut desc = StateBlockDesc::new();
    desc.depth_write = Some(false);
    desc
}

fn reflect_layer() -> StateBlockDesc {
    let mut desc = StateBlockDesc::new();
    desc.set_cull(CullMode::Back.flipped());
    desc
}

fn pass_layer(inputs: &PassStateInputs, conditions: RenderConditions) -> StateBlockDesc {
    let mut desc = StateBlockDesc::new();

    if let Some(blend) = inputs.pass_blend_op.blend_desc() {
        desc.set_blend(blend);
        desc.depth_write = Some(false);
        desc.depth_compare = Some(CompareFunction::LessEqual);
    }
    if conditions.contains(RenderConditions::TRANSLUCENT) && inputs.translucent_z_write {
        desc.depth_write = Some(true);
    }
    if inputs.alpha_test {
        desc.set_alpha_test(inputs.alpha_ref, CompareFunction::GreaterEqual);
    }
    if inputs.double_sided {
        desc.set_cull(CullMode::None);
    }
    for (slot, sampler) in inputs.samplers.iter().enumerate() {
        desc.set_sampler(slot, *sampler);
    }
    desc
}

fn wireframe_layer() -> StateBlockDesc {
    let mut desc = StateBlockDesc::new();
    desc.fill_mode = Some(PolygonMode::Line);
    desc
}

/// Sparse state for one condition set.
pub fn derive_state(inputs: &PassStateInputs, conditions: RenderConditions) -> StateBlockDesc {
    let mut desc = base_layer();
    if conditions.contains(RenderConditions::TRANSLUCENT) {
        desc.add_desc(&translucent_layer(inputs.translucent_blend_op));
    }
    if conditions.contains(RenderConditions::GLOW) {
        desc.add_desc(&glow_layer());
    }
    if conditions.contains(RenderConditions::REFLECT) {
        desc.add_desc(&reflect_layer());
    }
    desc.add_desc(&pass_layer(inputs, conditions));
    if conditions.contains(RenderConditions::WIREFRAME) {
        desc.add_desc(&wireframe_layer());
    }
    desc
}

/// Resolved state for every condition set, indexed by [`RenderConditions::bits`].
pub fn derive_all(inputs: &PassStateInputs) -> Vec<StateBlockData> {
    (0..STATE_COUNT as u8)
        .map(|bits| derive_state(inputs, RenderConditions::from_bits_truncate(bits)).resolve())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> PassStateInputs {
        PassStateInputs::from_material(&Material::new("test"))
    }

    #[test]
    fn test_opaque_base() {
        let state = derive_state(&inputs(), RenderConditions::empty()).resolve();
        assert!(!state.blend_enable);
        assert!(state.depth_write);
        assert_eq!(state.cull, CullMode::Back);
        assert_eq!(state.fill_mode, PolygonMode::Fill);
    }

    #[test]
    fn test_translucent_layer() {
        let mut inputs = inputs();
        inputs.translucent_blend_op = BlendOp::Add;
        let state = derive_state(&inputs, RenderConditions::TRANSLUCENT).resolve();
        assert!(state.blend_enable);
        assert_eq!(state.blend, BlendDesc::ADDITIVE);
        assert!(!state.depth_write);

        inputs.translucent_z_write = true;
        let state = derive_state(&inputs, RenderConditions::TRANSLUCENT).resolve();
        assert!(state.depth_write);
    }

    #[test]
    fn test_reflect_flips_cull_unless_double_sided() {
        let mut inputs = inputs();
        let state = derive_state(&inputs, RenderConditions::REFLECT).resolve();
        assert_eq!(state.cull, CullMode::Front);

        inputs.double_sided = true;
        let state = derive_state(&inputs, RenderConditions::REFLECT).resolve();
        assert_eq!(state.cull, CullMode::None);
    }

    #[test]
    fn test_wireframe_is_last() {
        let mut inputs = inputs();
        inputs.alpha_test = true;
        inputs.alpha_ref = 128;
        let state = derive_state(&inputs, RenderConditions::all()).resolve();
        assert_eq!(state.fill_mode, PolygonMode::Line);
        assert!(state.alpha_test_enable);
        assert_eq!(state.alpha_test_ref, 128);
        assert_eq!(state.cull, CullMode::Front);
        assert!(!state.depth_write);
    }

    #[test]
    fn test_later_passes_blend() {
        let mut inputs = inputs();
        inputs.pass_blend_op = BlendOp::LerpAlpha;
        let state = derive_state(&inputs, RenderConditions::empty()).resolve();
        assert!(state.blend_enable);
        assert_eq!(state.blend, BlendDesc::ALPHA);
        assert_eq!(state.depth_compare, CompareFunction::LessEqual);
        assert!(!state.depth_write);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        for op in [BlendOp::None, BlendOp::Mul, BlendOp::Add, BlendOp::LerpAlpha] {
            for alpha_test in [false, true] {
                let mut inputs = inputs();
                inputs.translucent_blend_op = op;
                inputs.alpha_test = alpha_test;
                let first = derive_all(&inputs);
                let second = derive_all(&inputs.clone());
                assert_eq!(first.len(), STATE_COUNT);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn test_samplers_per_slot() {
        let mut inputs = inputs();
        inputs.samplers = vec![SamplerState::WRAP_LINEAR, SamplerState::CLAMP_LINEAR];
        let state = derive_state(&inputs, RenderConditions::empty()).resolve();
        assert_eq!(state.samplers[1], SamplerState::CLAMP_LINEAR);
    }
}
