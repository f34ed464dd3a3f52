//! Device-side realization of a material.

use std::sync::Arc;

use glam::{Vec3, Vec4};
use indexmap::IndexMap;
use lumen_gfx::{BufferHandle, GfxDevice, TextureHandle, VertexFormat};

use crate::config::MaterialConfig;
use crate::error::{MaterialError, MaterialResult};
use crate::features::{FeatureRegistry, FeatureSet, TexSource};
use crate::material::{FeatureResolver, Material, StageOverride};
use crate::pass::{ConstantValue, Pass, PassBuilder, PassStateInputs, RenderConditions};
use crate::scene::{BinKind, SceneData, SceneRenderState};

/// The passes, programs and textures built for one material.
///
/// Passes are never patched: any change to the material or the global
/// config discards the whole `ProcessedMaterial` and builds a new one.
///
/// Callers draw with it as follows:
///
/// ```ignore
/// let mut pass = 0;
/// while processed.setup_pass(&scene, &sg, pass) {
///     processed.set_transforms(&scene, world, pass);
///     processed.set_scene_info(&scene, &sg, pass);
///     processed.set_texture_stages(&sg, pass);
///     processed.set_buffers(vb, ib);
///     device.draw(&range);
///     processed.cleanup(pass);
///     pass += 1;
/// }
/// ```
pub struct ProcessedMaterial {
    device: Arc<dyn GfxDevice>,
    material: Arc<Material>,
    stage_override: Option<StageOverride>,
    passes: Vec<Pass>,
    textures: IndexMap<String, TextureHandle>,
}

impl ProcessedMaterial {
    /// Resolve, build and load everything the material needs.
    pub fn init(
        device: Arc<dyn GfxDevice>,
        registry: &FeatureRegistry,
        config: &MaterialConfig,
        material: Arc<Material>,
        vertex_format: &VertexFormat,
        stage_override: Option<StageOverride>,
    ) -> MaterialResult<Self> {
        let layers = FeatureResolver::new(config, vertex_format).resolve_material(&material, stage_override)?;
        let limits = config.effective_limits(device.limits());
        let label = match stage_override {
            Some(ov) => format!("{}/{:?}", material.name, ov),
            None => material.name.clone(),
        };

        let mut processed = Self {
            device: device.clone(),
            material: material.clone(),
            stage_override,
            passes: Vec::new(),
            textures: IndexMap::new(),
        };

        let builder = PassBuilder::new(
            device.as_ref(),
            registry,
            vertex_format,
            limits,
            &label,
            PassStateInputs::from_material(&material),
        );
        processed.passes = builder.build_passes(&layers)?;
        processed.load_textures()?;

        tracing::trace!(
            "Built '{}' with {} passes and {} textures",
            label,
            processed.passes.len(),
            processed.textures.len()
        );
        Ok(processed)
    }

    fn load_textures(&mut self) -> MaterialResult<()> {
        for pass in &self.passes {
            for binding in pass.tex_bindings.iter() {
                let TexSource::Map { stage, kind } = binding.source else {
                    continue;
                };
                let Some(path) = self.material.stages.get(stage as usize).and_then(|s| s.map(kind)) else {
                    continue;
                };
                if self.textures.contains_key(path) {
                    continue;
                }
                let texture = self
                    .device
                    .load_texture(path)
                    .map_err(|source| MaterialError::TextureLoad {
                        stage: stage as usize,
                        path: path.to_string(),
                        source,
                    })?;
                self.textures.insert(path.to_string(), texture);
            }
        }
        Ok(())
    }

    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    pub fn pass(&self, index: usize) -> Option<&Pass> {
        self.passes.get(index)
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn stage_override(&self) -> Option<StageOverride> {
        self.stage_override
    }

    /// Union of the features of every pass.
    pub fn features(&self) -> FeatureSet {
        let mut set = FeatureSet::new();
        for pass in &self.passes {
            set.merge(&pass.features);
        }
        set
    }

    pub fn texture(&self, path: &str) -> Option<TextureHandle> {
        self.textures.get(path).copied()
    }

    /// Render conditions of a draw.
    pub fn conditions(&self, scene: &SceneRenderState, sg: &SceneData) -> RenderConditions {
        let mut conditions = RenderConditions::empty();
        if sg.bin == BinKind::Glow {
            conditions |= RenderConditions::GLOW;
        }
        if scene.is_reflect_pass() {
            conditions |= RenderConditions::REFLECT;
        }
        if self.material.translucent && sg.bin != BinKind::PrePass {
            conditions |= RenderConditions::TRANSLUCENT;
        }
        if (sg.wireframe || scene.wireframe) && self.device.limits().supports_wireframe {
            conditions |= RenderConditions::WIREFRAME;
        }
        conditions
    }

    /// Bind the program and state of `pass`. Returns false once every pass
    /// has been set up.
    pub fn setup_pass(&self, scene: &SceneRenderState, sg: &SceneData, pass: usize) -> bool {
        let Some(p) = self.passes.get(pass) else {
            return false;
        };

        self.device.set_shader(p.shader);
        self.device.set_state_block(p.state(self.conditions(scene, sg)));

        for &stage in &p.stages {
            let anim = &self.material.stages[stage].anim;
            if anim.is_active() {
                let name = format!("texMat{}", stage);
                let matrix = anim.matrix(scene.accumulated_time);
                p.constants
                    .set(self.device.as_ref(), p.shader, &name, ConstantValue::Mat4(matrix));
            }
        }
        true
    }

    pub fn set_transforms(&self, scene: &SceneRenderState, world: glam::Mat4, pass: usize) {
        let Some(p) = self.passes.get(pass) else {
            return;
        };
        let device = self.device.as_ref();
        let modelview = scene.view_projection() * world;
        p.constants.set(device, p.shader, "modelview", ConstantValue::Mat4(modelview));
        p.constants.set(device, p.shader, "objTrans", ConstantValue::Mat4(world));
        if p.constants.has("eyePosObj") {
            let eye = world.inverse().transform_point3(scene.camera_position);
            p.constants.set(device, p.shader, "eyePosObj", ConstantValue::Vec3(eye));
        }
    }

    pub fn set_scene_info(&self, scene: &SceneRenderState, sg: &SceneData, pass: usize) {
        let Some(p) = self.passes.get(pass) else {
            return;
        };
        let device = self.device.as_ref();
        let constants = &p.constants;
        let shader = p.shader;

        constants.set(device, shader, "eyePosWorld", ConstantValue::Vec3(scene.camera_position));
        constants.set(
            device,
            shader,
            "fogData",
            ConstantValue::Vec3(Vec3::new(scene.fog.start, scene.fog.density, scene.fog.height_falloff)),
        );
        constants.set(device, shader, "fogColor", ConstantValue::Vec4(scene.fog.color));
        constants.set(device, shader, "visibility", ConstantValue::Float(sg.visibility));
        constants.set(device, shader, "inLightPos", ConstantValue::Vec4(scene.light.position.extend(1.0)));
        constants.set(device, shader, "inLightColor", ConstantValue::Vec4(scene.light.color));
        constants.set(device, shader, "ambient", ConstantValue::Vec4(scene.light.ambient));
        constants.set(
            device,
            shader,
            "alphaTestValue",
            ConstantValue::Float(f32::from(self.material.alpha_ref) / 255.0),
        );

        for &index in &p.stages {
            let stage = &self.material.stages[index];
            constants.set(
                device,
                shader,
                &format!("diffuseMaterialColor{}", index),
                ConstantValue::Vec4(stage.diffuse_color),
            );
            constants.set(
                device,
                shader,
                &format!("detailScale{}", index),
                ConstantValue::Vec2(stage.detail_scale),
            );
            constants.set(
                device,
                shader,
                &format!("parallaxInfo{}", index),
                ConstantValue::Float(stage.parallax_scale),
            );
        }

        if let Some(&first) = p.stages.first() {
            let stage = &self.material.stages[first];
            constants.set(device, shader, "specularColor", ConstantValue::Vec4(stage.specular_color));
            constants.set(device, shader, "specularPower", ConstantValue::Float(stage.specular_power));
            let glow = if stage.glow { 1.0 } else { 0.0 };
            constants.set(device, shader, "glowMul", ConstantValue::Float(glow));
        }
    }

    pub fn set_texture_stages(&self, sg: &SceneData, pass: usize) {
        let Some(p) = self.passes.get(pass) else {
            return;
        };
        for binding in p.tex_bindings.iter() {
            let texture = match binding.source {
                TexSource::Map { stage, kind } => self
                    .material
                    .stages
                    .get(stage as usize)
                    .and_then(|s| s.map(kind))
                    .and_then(|path| self.texture(path)),
                TexSource::LightMap => sg.light_map,
            };
            self.device.set_texture(binding.slot, texture);
        }
    }

    pub fn set_buffers(&self, vertex_buffer: BufferHandle, index_buffer: Option<BufferHandle>) {
        self.device.set_vertex_buffer(vertex_buffer);
        self.device.set_index_buffer(index_buffer);
    }

    /// Unbind the textures of `pass`.
    pub fn cleanup(&self, pass: usize) {
        if let Some(p) = self.passes.get(pass) {
            for binding in p.tex_bindings.iter() {
                self.device.set_texture(binding.slot, None);
            }
        }
    }

    /// Diffuse colour used by the instance when it stands in as a fallback.
    pub fn base_color(&self) -> Vec4 {
        self.material
            .stages
            .first()
            .map(|stage| stage.diffuse_color)
            .unwrap_or(Vec4::ONE)
    }
}

impl Drop for ProcessedMaterial {
    fn drop(&mut self) {
        for pass in &self.passes {
            pass.destroy(self.device.as_ref());
        }
        for texture in self.textures.values() {
            self.device.release_texture(*texture);
        }
    }
}

impl std::fmt::Debug for ProcessedMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessedMaterial")
            .field("material", &self.material.name)
            .field("stage_override", &self.stage_override)
            .field("passes", &self.passes.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}
