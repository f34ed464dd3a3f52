//! Expands authored stages into feature sets.
//!
//! Resolution is pure: it reads the material, the global config and the
//! vertex format, and only ever produces [`FeatureSet`]s.

use glam::Vec4;
use lumen_gfx::{SamplerState, VertexFormat};

use super::{Material, MaterialStage};
use crate::config::MaterialConfig;
use crate::error::MaterialResult;
use crate::features::{FeatureId, FeatureSet, FeatureType, builtin};

/// Replacement rules for passes that are not the regular colour pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageOverride {
    /// Depth only, for shadow maps.
    Shadow,
    /// Depth and normals into the pre-pass target.
    PrePass,
    /// Emissive colour into the glow target.
    Glow,
}

impl StageOverride {
    /// Feature types that survive the override.
    fn keeps(self) -> &'static [FeatureId] {
        match self {
            StageOverride::Shadow => &[
                builtin::VERT_TRANSFORM.id,
                builtin::TEX_ANIM.id,
                builtin::DIFFUSE_MAP.id,
                builtin::ALPHA_TEST.id,
            ],
            StageOverride::PrePass => &[
                builtin::VERT_TRANSFORM.id,
                builtin::TEX_ANIM.id,
                builtin::PARALLAX.id,
                builtin::DIFFUSE_MAP.id,
                builtin::NORMAL_MAP.id,
                builtin::ALPHA_TEST.id,
            ],
            StageOverride::Glow => &[
                builtin::VERT_TRANSFORM.id,
                builtin::TEX_ANIM.id,
                builtin::DIFFUSE_MAP.id,
                builtin::DIFFUSE_COLOR.id,
                builtin::ALPHA_TEST.id,
                builtin::HDR_OUT.id,
            ],
        }
    }

    /// Feature the override adds.
    fn output(self) -> FeatureType {
        match self {
            StageOverride::Shadow => builtin::DEPTH_OUT,
            StageOverride::PrePass => builtin::PREPASS_CONDITIONER,
            StageOverride::Glow => builtin::GLOW_MASK,
        }
    }

    /// Rewrite `set` for this override.
    pub fn apply(self, material: &Material, set: &mut FeatureSet) {
        let keeps = self.keeps();
        set.filter(|info| keeps.contains(&info.ty.id));
        // Diffuse sampling only survives where alpha test needs it.
        if self != StageOverride::Glow && !material.alpha_test {
            set.remove(builtin::DIFFUSE_MAP);
            set.remove(builtin::TEX_ANIM);
        }
        set.add_feature(self.output());
    }

    /// The single stage processed under this override.
    pub fn stage(self, material: &Material) -> usize {
        match self {
            StageOverride::Glow => material.glow_stage().unwrap_or(0),
            StageOverride::Shadow | StageOverride::PrePass => 0,
        }
    }
}

/// The resolved features of one stage, ready for the pass builder.
#[derive(Debug, Clone, PartialEq)]
pub struct StageFeatures {
    pub stage: usize,
    pub features: FeatureSet,
    /// Sampler state for textures of this stage.
    pub sampler: SamplerState,
}

/// Turns material stages into feature sets.
pub struct FeatureResolver<'a> {
    config: &'a MaterialConfig,
    vertex_format: &'a VertexFormat,
}

impl<'a> FeatureResolver<'a> {
    pub fn new(config: &'a MaterialConfig, vertex_format: &'a VertexFormat) -> Self {
        Self { config, vertex_format }
    }

    /// Features for every stage the material renders with.
    ///
    /// Overrides force single-stage processing.
    pub fn resolve_material(
        &self,
        material: &Material,
        stage_override: Option<StageOverride>,
    ) -> MaterialResult<Vec<StageFeatures>> {
        material.validate()?;

        let stages: Vec<usize> = match stage_override {
            Some(ov) => vec![ov.stage(material)],
            None => (0..material.stages.len()).collect(),
        };

        Ok(stages
            .into_iter()
            .map(|stage| StageFeatures {
                stage,
                features: self.resolve_stage(material, stage, stage_override),
                sampler: material.stages[stage].sampler(),
            })
            .collect())
    }

    /// Features for a single stage.
    pub fn resolve_stage(
        &self,
        material: &Material,
        stage_index: usize,
        stage_override: Option<StageOverride>,
    ) -> FeatureSet {
        let stage = &material.stages[stage_index];
        let index = Some(stage_index as u8);
        let mut set = FeatureSet::new();

        set.add_feature(builtin::VERT_TRANSFORM);
        set.add_feature(builtin::HDR_OUT);

        self.add_texture_features(stage, index, &mut set);
        self.add_lighting_features(stage, index, &mut set);

        if material.alpha_test {
            set.add_feature(builtin::ALPHA_TEST);
        }
        if material.fog && !stage.emissive {
            set.add_feature(builtin::FOG);
        }
        if material.translucent {
            set.add_feature(builtin::IS_TRANSLUCENT);
            set.add_feature(builtin::VISIBILITY);
            if material.translucent_z_write {
                set.add_feature(builtin::IS_TRANSLUCENT_ZWRITE);
            }
        }

        set.exclude(&self.config.exclusions());

        if let Some(ov) = stage_override {
            ov.apply(material, &mut set);
        }

        set
    }

    fn add_texture_features(&self, stage: &MaterialStage, index: Option<u8>, set: &mut FeatureSet) {
        let tangents = self.vertex_format.has_tangent();

        if stage.diffuse_map.is_some() {
            set.add(builtin::DIFFUSE_MAP, index);
        }
        if stage.overlay_map.is_some() {
            set.add(builtin::OVERLAY_MAP, index);
        }
        if stage.detail_map.is_some() {
            set.add(builtin::DETAIL_MAP, index);
        }
        if stage.normal_map.is_some() {
            if tangents {
                set.add(builtin::NORMAL_MAP, index);
                if stage.parallax_scale > 0.0 {
                    set.add(builtin::PARALLAX, index);
                }
            } else {
                tracing::trace!("Vertex format has no tangents; dropping normal map");
            }
        }
        if stage.specular_map.is_some() {
            set.add(builtin::SPECULAR_MAP, index);
        }
        if stage.cube_map.is_some() {
            set.add(builtin::CUBE_MAP, index);
        }

        if stage.diffuse_map.is_none() || stage.diffuse_color != Vec4::ONE {
            set.add(builtin::DIFFUSE_COLOR, index);
        }

        let samples_maps = [builtin::DIFFUSE_MAP, builtin::OVERLAY_MAP, builtin::DETAIL_MAP, builtin::NORMAL_MAP]
            .iter()
            .any(|ty| set.has_at(ty.id, index));
        if stage.anim.is_active() && samples_maps {
            set.add(builtin::TEX_ANIM, index);
        }
    }

    /// Exactly one lighting path per stage, chosen by precedence.
    fn add_lighting_features(&self, stage: &MaterialStage, index: Option<u8>, set: &mut FeatureSet) {
        let second_uv = self.vertex_format.texcoord_count() >= 2;

        if stage.emissive {
            return;
        }
        if stage.vert_lit {
            set.add_feature(builtin::VERT_LIT);
            return;
        }
        if stage.light_map && second_uv {
            set.add_feature(builtin::LIGHT_MAP);
            return;
        }
        if stage.tone_map.is_some() && second_uv {
            set.add(builtin::TONE_MAP, index);
            return;
        }

        set.add_feature(builtin::RT_LIGHTING);
        if stage.pixel_specular {
            set.add_feature(builtin::PIX_SPECULAR);
        }
    }
}

/// Number of dynamic-lighting paths active in `set` for `index`.
pub fn lighting_paths(set: &FeatureSet, index: Option<u8>) -> usize {
    builtin::LIGHTING_PATHS
        .iter()
        .filter(|ty| set.has_at(ty.id, None) || set.has_at(ty.id, index))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(material: &Material, format: &VertexFormat, config: &MaterialConfig) -> FeatureSet {
        FeatureResolver::new(config, format).resolve_stage(material, 0, None)
    }

    #[test]
    fn test_baseline_and_textures() {
        let material = Material::new("rock").with_stage(
            MaterialStage::diffuse("rock_d.png")
                .with_normal("rock_n.png")
                .with_detail("rock_det.png"),
        );
        let format = VertexFormat::position_normal_tangent_uv();
        let set = resolve(&material, &format, &MaterialConfig::default());

        assert!(set.has(builtin::VERT_TRANSFORM.id));
        assert!(set.has(builtin::HDR_OUT.id));
        assert!(set.has_at(builtin::DIFFUSE_MAP.id, Some(0)));
        assert!(set.has_at(builtin::DETAIL_MAP.id, Some(0)));
        assert!(set.has_at(builtin::NORMAL_MAP.id, Some(0)));
        assert!(set.has(builtin::RT_LIGHTING.id));
        assert!(!set.has(builtin::DIFFUSE_COLOR.id));
    }

    #[test]
    fn test_missing_tangents_drop_normal_map() {
        let mut stage = MaterialStage::diffuse("a.png").with_normal("a_n.png");
        stage.parallax_scale = 0.05;
        let material = Material::new("a").with_stage(stage);
        let format = VertexFormat::position_normal_uv();
        let set = resolve(&material, &format, &MaterialConfig::default());
        assert!(!set.has(builtin::NORMAL_MAP.id));
        assert!(!set.has(builtin::PARALLAX.id));
    }

    #[test]
    fn test_lighting_precedence() {
        let format = VertexFormat::position_normal_tangent_uv2();
        let config = MaterialConfig::default();

        let mut stage = MaterialStage::diffuse("a.png");
        stage.light_map = true;
        stage.tone_map = Some("tone.png".into());
        stage.vert_lit = true;
        let set = resolve(&Material::new("a").with_stage(stage.clone()), &format, &config);
        assert!(set.has(builtin::VERT_LIT.id));
        assert_eq!(lighting_paths(&set, Some(0)), 1);

        stage.vert_lit = false;
        let set = resolve(&Material::new("a").with_stage(stage.clone()), &format, &config);
        assert!(set.has(builtin::LIGHT_MAP.id));
        assert_eq!(lighting_paths(&set, Some(0)), 1);

        stage.light_map = false;
        let set = resolve(&Material::new("a").with_stage(stage.clone()), &format, &config);
        assert!(set.has_at(builtin::TONE_MAP.id, Some(0)));
        assert_eq!(lighting_paths(&set, Some(0)), 1);

        stage.emissive = true;
        let set = resolve(&Material::new("a").with_stage(stage), &format, &config);
        assert_eq!(lighting_paths(&set, Some(0)), 0);
    }

    #[test]
    fn test_light_map_needs_second_uv() {
        let mut stage = MaterialStage::diffuse("a.png");
        stage.light_map = true;
        let material = Material::new("a").with_stage(stage);
        let set = resolve(
            &material,
            &VertexFormat::position_normal_uv(),
            &MaterialConfig::default(),
        );
        assert!(!set.has(builtin::LIGHT_MAP.id));
        assert!(set.has(builtin::RT_LIGHTING.id));
    }

    #[test]
    fn test_global_exclusions() {
        let mut stage = MaterialStage::diffuse("a.png")
            .with_normal("n.png")
            .with_specular("s.png");
        stage.pixel_specular = true;
        stage.cube_map = Some("sky.dds".into());
        let material = Material::new("a").with_stage(stage);
        let format = VertexFormat::position_normal_tangent_uv();

        let set = resolve(&material, &format, &MaterialConfig::default());
        assert!(set.has(builtin::PIX_SPECULAR.id));
        assert!(set.has(builtin::CUBE_MAP.id));

        let config = MaterialConfig {
            disable_normal_mapping: true,
            disable_specular: true,
            disable_cubemapping: true,
            ..Default::default()
        };
        let set = resolve(&material, &format, &config);
        assert!(!set.has(builtin::NORMAL_MAP.id));
        assert!(!set.has(builtin::PIX_SPECULAR.id));
        assert!(!set.has(builtin::SPECULAR_MAP.id));
        assert!(!set.has(builtin::CUBE_MAP.id));
        assert!(set.has(builtin::DIFFUSE_MAP.id));
    }

    #[test]
    fn test_shadow_override() {
        let mut material = Material::new("fence")
            .with_stage(MaterialStage::diffuse("fence.png").with_normal("fence_n.png"))
            .with_stage(MaterialStage::diffuse("moss.png"));
        material.translucent = true;
        let format = VertexFormat::position_normal_tangent_uv();
        let config = MaterialConfig::default();
        let resolver = FeatureResolver::new(&config, &format);

        let stages = resolver
            .resolve_material(&material, Some(StageOverride::Shadow))
            .unwrap();
        assert_eq!(stages.len(), 1);
        let set = &stages[0].features;
        assert!(set.has(builtin::DEPTH_OUT.id));
        assert!(!set.has(builtin::IS_TRANSLUCENT.id));
        assert!(!set.has(builtin::RT_LIGHTING.id));
        assert!(!set.has(builtin::DIFFUSE_MAP.id));

        material.alpha_test = true;
        let stages = resolver
            .resolve_material(&material, Some(StageOverride::Shadow))
            .unwrap();
        assert!(stages[0].features.has(builtin::DIFFUSE_MAP.id));
        assert!(stages[0].features.has(builtin::ALPHA_TEST.id));
    }

    #[test]
    fn test_prepass_and_glow_overrides() {
        let mut glow = MaterialStage::diffuse("lamp_glow.png");
        glow.glow = true;
        let material = Material::new("lamp")
            .with_stage(MaterialStage::diffuse("lamp.png").with_normal("lamp_n.png"))
            .with_stage(glow);
        let format = VertexFormat::position_normal_tangent_uv();
        let config = MaterialConfig::default();
        let resolver = FeatureResolver::new(&config, &format);

        let prepass = resolver
            .resolve_material(&material, Some(StageOverride::PrePass))
            .unwrap();
        assert_eq!(prepass[0].stage, 0);
        assert!(prepass[0].features.has(builtin::NORMAL_MAP.id));
        assert!(prepass[0].features.has(builtin::PREPASS_CONDITIONER.id));
        assert!(!prepass[0].features.has(builtin::HDR_OUT.id));

        let glow = resolver
            .resolve_material(&material, Some(StageOverride::Glow))
            .unwrap();
        assert_eq!(glow[0].stage, 1);
        assert!(glow[0].features.has(builtin::GLOW_MASK.id));
        assert!(glow[0].features.has_at(builtin::DIFFUSE_MAP.id, Some(1)));
        assert!(!glow[0].features.has(builtin::FOG.id));
    }

    #[test]
    fn test_resolution_is_pure() {
        let material = Material::new("a").with_stage(MaterialStage::diffuse("a.png"));
        let format = VertexFormat::position_normal_uv();
        let config = MaterialConfig::default();
        let resolver = FeatureResolver::new(&config, &format);
        assert_eq!(
            resolver.resolve_stage(&material, 0, None),
            resolver.resolve_stage(&material, 0, None)
        );
    }
}
