//! Program assembly from feature sets.

use lumen_core::profiling::profile_function;
use lumen_gfx::{ShaderDesc, VertexFormat};

use crate::features::{EmitContext, FeatureRegistry, FeatureSet, Resources, ShaderCode, TexBindings};

/// Drives the registered generators over a feature set.
///
/// Every traversal follows registry order, so resource measurement, code
/// emission and texture binding see the features in the same sequence.
pub struct ShaderAssembler<'a> {
    registry: &'a FeatureRegistry,
    vertex_format: &'a VertexFormat,
}

impl<'a> ShaderAssembler<'a> {
    pub fn new(registry: &'a FeatureRegistry, vertex_format: &'a VertexFormat) -> Self {
        Self {
            registry,
            vertex_format,
        }
    }

    /// Total resource cost of `set`.
    pub fn measure(&self, set: &FeatureSet) -> Resources {
        let mut total = Resources::NONE;
        self.registry.for_each_in_order(|ty, generator| {
            for index in set.indices_of(ty.id) {
                total += generator.resources(set, index);
            }
        });
        total
    }

    /// Emit vertex and pixel code for `set` into a program description.
    pub fn assemble(&self, label: &str, set: &FeatureSet) -> ShaderDesc {
        profile_function!();
        let mut code = ShaderCode::new();

        self.registry.for_each_in_order(|ty, generator| {
            for index in set.indices_of(ty.id) {
                let mut ctx = EmitContext::new(set, index, self.vertex_format, &mut code);
                generator.emit_vertex(&mut ctx);
            }
        });
        self.registry.for_each_in_order(|ty, generator| {
            for index in set.indices_of(ty.id) {
                let mut ctx = EmitContext::new(set, index, self.vertex_format, &mut code);
                generator.emit_pixel(&mut ctx);
            }
        });

        code.finish(label, set)
    }

    /// Texture slot assignments for `set`.
    pub fn tex_bindings(&self, set: &FeatureSet) -> TexBindings {
        let mut bindings = TexBindings::new();
        self.registry.for_each_in_order(|ty, generator| {
            for index in set.indices_of(ty.id) {
                generator.set_tex_data(index, &mut bindings);
            }
        });
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::builtin;

    fn detail_normal_set(stages: u8) -> FeatureSet {
        let mut set = FeatureSet::new();
        set.add_feature(builtin::VERT_TRANSFORM);
        set.add_feature(builtin::HDR_OUT);
        set.add_feature(builtin::RT_LIGHTING);
        for stage in 0..stages {
            set.add(builtin::DETAIL_MAP, Some(stage));
            set.add(builtin::NORMAL_MAP, Some(stage));
        }
        set
    }

    #[test]
    fn test_measure_detail_normal_stages() {
        let registry = FeatureRegistry::with_builtin();
        let format = VertexFormat::position_normal_tangent_uv();
        let assembler = ShaderAssembler::new(&registry, &format);

        assert_eq!(assembler.measure(&detail_normal_set(5)).tex_slots, 10);
        assert_eq!(assembler.measure(&detail_normal_set(3)).tex_slots, 6);
        assert_eq!(assembler.measure(&detail_normal_set(2)).tex_slots, 4);
    }

    #[test]
    fn test_samplers_match_bindings() {
        let registry = FeatureRegistry::with_builtin();
        let format = VertexFormat::position_normal_tangent_uv();
        let assembler = ShaderAssembler::new(&registry, &format);
        let set = detail_normal_set(2);

        let desc = assembler.assemble("rock:0", &set);
        let bindings = assembler.tex_bindings(&set);
        assert_eq!(desc.samplers.len(), bindings.len());
        for (sampler, binding) in desc.samplers.iter().zip(bindings.iter()) {
            assert_eq!(sampler.name, binding.name);
            assert_eq!(sampler.slot, binding.slot);
        }
        assert_eq!(desc.label, "rock:0");
        assert_eq!(desc.features.first().map(String::as_str), Some("Vert Transform"));
        assert!(desc.has_uniform("modelview"));
    }

    #[test]
    fn test_measure_matches_emitted_tone_maps() {
        let registry = FeatureRegistry::with_builtin();
        let format = VertexFormat::position_normal_tangent_uv();
        let assembler = ShaderAssembler::new(&registry, &format);
        let mut set = FeatureSet::new();
        set.add_feature(builtin::VERT_TRANSFORM);
        set.add_feature(builtin::HDR_OUT);
        set.add(builtin::TONE_MAP, Some(0));
        set.add(builtin::TONE_MAP, Some(1));

        let measured = assembler.measure(&set);
        let desc = assembler.assemble("lava:0", &set);
        assert_eq!(measured.interpolators, desc.interpolators);
        assert_eq!(measured.tex_slots as usize, desc.samplers.len());
    }

    #[test]
    fn test_unregistered_features_are_skipped() {
        let mut registry = FeatureRegistry::with_builtin();
        registry.unregister(builtin::DETAIL_MAP.id);
        let format = VertexFormat::position_normal_tangent_uv();
        let assembler = ShaderAssembler::new(&registry, &format);
        assert_eq!(assembler.measure(&detail_normal_set(1)).tex_slots, 1);
    }
}
