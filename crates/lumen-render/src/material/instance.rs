//! Per-object material instances.

use std::sync::Arc;

use glam::Mat4;
use lumen_gfx::{BufferHandle, GfxDevice, VertexFormat};

use super::hooks::{HookKind, HookTable};
use super::resolver::StageOverride;
use super::Material;
use crate::config::MaterialConfig;
use crate::error::{MaterialError, MaterialResult};
use crate::features::FeatureRegistry;
use crate::processed::ProcessedMaterial;
use crate::scene::{SceneData, SceneRenderState};

/// What an instance needs to build its passes.
#[derive(Clone)]
pub struct MaterialContext {
    pub device: Arc<dyn GfxDevice>,
    pub registry: Arc<FeatureRegistry>,
    pub config: MaterialConfig,
}

impl std::fmt::Debug for MaterialContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialContext")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A material bound to a vertex format, plus the passes built for it.
///
/// Building is lazy: a fresh or reinitialized instance holds no device
/// objects until the first [`MatInstance::ensure_built`]. A failed build is
/// remembered so the failure is reported once, not every frame.
#[derive(Debug)]
pub struct MatInstance {
    material: Arc<Material>,
    vertex_format: VertexFormat,
    stage_override: Option<StageOverride>,
    processed: Option<ProcessedMaterial>,
    error: Option<MaterialError>,
    cur_pass: Option<usize>,
    hooks: HookTable,
    is_hook: bool,
}

impl MatInstance {
    pub fn new(material: Arc<Material>, vertex_format: VertexFormat) -> Self {
        Self {
            material,
            vertex_format,
            stage_override: None,
            processed: None,
            error: None,
            cur_pass: None,
            hooks: HookTable::new(),
            is_hook: false,
        }
    }

    fn new_hook(material: Arc<Material>, vertex_format: VertexFormat, kind: HookKind) -> Self {
        Self {
            stage_override: Some(kind.stage_override()),
            is_hook: true,
            ..Self::new(material, vertex_format)
        }
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    pub fn vertex_format(&self) -> &VertexFormat {
        &self.vertex_format
    }

    pub fn stage_override(&self) -> Option<StageOverride> {
        self.stage_override
    }

    pub fn processed(&self) -> Option<&ProcessedMaterial> {
        self.processed.as_ref()
    }

    pub fn is_hook(&self) -> bool {
        self.is_hook
    }

    pub fn is_built(&self) -> bool {
        self.processed.is_some()
    }

    /// False once a build has failed; stays false until [`MatInstance::reinit`].
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&MaterialError> {
        self.error.as_ref()
    }

    /// Tear down and build the passes now.
    pub fn build(&mut self, ctx: &MaterialContext) -> MaterialResult<()> {
        self.processed = None;
        self.cur_pass = None;
        let result = self.material.validate().and_then(|()| {
            ProcessedMaterial::init(
                ctx.device.clone(),
                &ctx.registry,
                &ctx.config,
                self.material.clone(),
                &self.vertex_format,
                self.stage_override,
            )
        });
        match result {
            Ok(processed) => {
                self.processed = Some(processed);
                self.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::error!("Material '{}' failed to initialize: {}", self.material.name, err);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Build on first use. Returns whether the instance can render.
    pub fn ensure_built(&mut self, ctx: &MaterialContext) -> bool {
        if self.processed.is_some() {
            return true;
        }
        if self.error.is_some() {
            return false;
        }
        self.build(ctx).is_ok()
    }

    /// Drop every built pass here and in the hooks. The next
    /// [`MatInstance::ensure_built`] rebuilds from scratch.
    pub fn reinit(&mut self) {
        self.processed = None;
        self.error = None;
        self.cur_pass = None;
        for (_, hook) in self.hooks.iter_mut() {
            hook.reinit();
        }
    }

    /// Attach a variant built with the override matching `kind`.
    pub fn add_hook(&mut self, kind: HookKind) -> MaterialResult<()> {
        if self.is_hook {
            return Err(MaterialError::HookOnHook);
        }
        let hook = Self::new_hook(self.material.clone(), self.vertex_format.clone(), kind);
        self.hooks.insert(kind, hook);
        Ok(())
    }

    pub fn remove_hook(&mut self, kind: HookKind) -> Option<MatInstance> {
        self.hooks.remove(kind)
    }

    pub fn hook(&self, kind: HookKind) -> Option<&MatInstance> {
        self.hooks.get(kind)
    }

    pub fn hook_mut(&mut self, kind: HookKind) -> Option<&mut MatInstance> {
        self.hooks.get_mut(kind)
    }

    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookTable {
        &mut self.hooks
    }

    /// This instance for `None`, else the hook of that kind.
    pub fn resolve_mut(&mut self, hook: Option<HookKind>) -> Option<&mut MatInstance> {
        match hook {
            None => Some(self),
            Some(kind) => self.hooks.get_mut(kind),
        }
    }

    pub fn num_passes(&self) -> usize {
        self.processed.as_ref().map_or(0, |p| p.num_passes())
    }

    pub fn cur_pass(&self) -> Option<usize> {
        self.cur_pass
    }

    /// Advance to the next pass and bind it, cleaning up the previous one.
    ///
    /// Returns false when every pass has been drawn; the instance is then
    /// ready for the next draw sequence.
    pub fn setup_pass(&mut self, scene: &SceneRenderState, sg: &SceneData) -> bool {
        let Some(processed) = self.processed.as_ref() else {
            self.cur_pass = None;
            return false;
        };

        let next = match self.cur_pass {
            Some(prev) => {
                processed.cleanup(prev);
                prev + 1
            }
            None => 0,
        };

        if processed.setup_pass(scene, sg, next) {
            self.cur_pass = Some(next);
            true
        } else {
            self.cur_pass = None;
            false
        }
    }

    pub fn set_transforms(&self, scene: &SceneRenderState, world: Mat4) {
        if let (Some(processed), Some(pass)) = (&self.processed, self.cur_pass) {
            processed.set_transforms(scene, world, pass);
        }
    }

    pub fn set_scene_info(&self, scene: &SceneRenderState, sg: &SceneData) {
        if let (Some(processed), Some(pass)) = (&self.processed, self.cur_pass) {
            processed.set_scene_info(scene, sg, pass);
        }
    }

    pub fn set_texture_stages(&self, sg: &SceneData) {
        if let (Some(processed), Some(pass)) = (&self.processed, self.cur_pass) {
            processed.set_texture_stages(sg, pass);
        }
    }

    pub fn set_buffers(&self, vertex_buffer: BufferHandle, index_buffer: Option<BufferHandle>) {
        if let Some(processed) = &self.processed {
            processed.set_buffers(vertex_buffer, index_buffer);
        }
    }
}
