//! Ownership of every live material instance.

use std::sync::Arc;

use bitflags::bitflags;
use lumen_core::alloc::{IndexSlot, SparseSet};
use lumen_gfx::{GfxDevice, VertexFormat};

use super::hooks::HookKind;
use super::instance::{MatInstance, MaterialContext};
use super::Material;
use crate::config::MaterialConfig;
use crate::error::{MaterialError, MaterialResult};
use crate::features::FeatureRegistry;

/// Handle to an instance owned by a [`MaterialManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatInstanceId(IndexSlot);

impl MatInstanceId {
    pub fn from_slot(slot: IndexSlot) -> Self {
        Self(slot)
    }

    pub fn slot(&self) -> IndexSlot {
        self.0
    }
}

/// An instance, or one of its hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatRef {
    pub id: MatInstanceId,
    pub hook: Option<HookKind>,
}

impl MatRef {
    pub fn base(id: MatInstanceId) -> Self {
        Self { id, hook: None }
    }

    pub fn hook(id: MatInstanceId, kind: HookKind) -> Self {
        Self { id, hook: Some(kind) }
    }
}

bitflags! {
    /// Summary of an instance used by bins to decide claims.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatFlags: u8 {
        const TRANSLUCENT = 1 << 0;
        const GLOW = 1 << 1;
        const PREPASS_HOOK = 1 << 2;
        const SHADOW_HOOK = 1 << 3;
        const GLOW_HOOK = 1 << 4;
        /// Unknown handle or a failed build.
        const INVALID = 1 << 5;

        const HOOKS = Self::PREPASS_HOOK.bits() | Self::SHADOW_HOOK.bits() | Self::GLOW_HOOK.bits();
    }
}

impl MatFlags {
    pub fn hook_flag(kind: HookKind) -> MatFlags {
        match kind {
            HookKind::PrePass => MatFlags::PREPASS_HOOK,
            HookKind::Shadow => MatFlags::SHADOW_HOOK,
            HookKind::Glow => MatFlags::GLOW_HOOK,
        }
    }
}

/// Owns the instances, the build context and the fallback material.
pub struct MaterialManager {
    ctx: MaterialContext,
    instances: SparseSet<MatInstance>,
    warning: MatInstance,
}

impl MaterialManager {
    pub fn new(device: Arc<dyn GfxDevice>, registry: Arc<FeatureRegistry>, config: MaterialConfig) -> Self {
        let ctx = MaterialContext {
            device,
            registry,
            config,
        };
        let mut warning = MatInstance::new(Arc::new(Material::warning()), VertexFormat::position_normal_uv());
        if let Err(err) = warning.build(&ctx) {
            tracing::error!("Warning material could not be built, invalid materials will not render: {}", err);
        }
        Self {
            ctx,
            instances: SparseSet::new(),
            warning,
        }
    }

    pub fn device(&self) -> &Arc<dyn GfxDevice> {
        &self.ctx.device
    }

    pub fn registry(&self) -> &Arc<FeatureRegistry> {
        &self.ctx.registry
    }

    pub fn config(&self) -> &MaterialConfig {
        &self.ctx.config
    }

    pub fn context(&self) -> &MaterialContext {
        &self.ctx
    }

    /// Register an instance. Nothing touches the device until first use.
    ///
    /// Hooks are attached from the material and the current config: glow
    /// for glowing materials, pre-pass for opaque ones when the pre-pass is
    /// enabled, shadow for shadow casters.
    pub fn create_instance(&mut self, material: Arc<Material>, vertex_format: VertexFormat) -> MatInstanceId {
        let mut instance = MatInstance::new(material, vertex_format);
        attach_default_hooks(&self.ctx.config, &mut instance);
        MatInstanceId(self.instances.push(instance))
    }

    pub fn destroy_instance(&mut self, id: MatInstanceId) -> MaterialResult<()> {
        self.instances
            .remove(id.0)
            .map(drop)
            .ok_or(MaterialError::UnknownInstance)
    }

    pub fn contains(&self, id: MatInstanceId) -> bool {
        self.instances.contains(id.0)
    }

    pub fn instance(&self, id: MatInstanceId) -> Option<&MatInstance> {
        self.instances.try_get(id.0)
    }

    pub fn instance_mut(&mut self, id: MatInstanceId) -> Option<&mut MatInstance> {
        self.instances.try_get_mut(id.0)
    }

    pub fn add_hook(&mut self, id: MatInstanceId, kind: HookKind) -> MaterialResult<()> {
        self.instances
            .try_get_mut(id.0)
            .ok_or(MaterialError::UnknownInstance)?
            .add_hook(kind)
    }

    /// Build an instance and its hooks now instead of on first use.
    pub fn build(&mut self, id: MatInstanceId) -> MaterialResult<()> {
        let ctx = &self.ctx;
        let instance = self.instances.try_get_mut(id.0).ok_or(MaterialError::UnknownInstance)?;
        instance.build(ctx)?;
        for (_, hook) in instance.hooks_mut().iter_mut() {
            hook.build(ctx)?;
        }
        Ok(())
    }

    pub fn flags(&self, id: MatInstanceId) -> MatFlags {
        let Some(instance) = self.instances.try_get(id.0) else {
            return MatFlags::INVALID;
        };
        let mut flags = MatFlags::empty();
        if instance.material().translucent {
            flags |= MatFlags::TRANSLUCENT;
        }
        if instance.material().has_glow() {
            flags |= MatFlags::GLOW;
        }
        for kind in instance.hooks().kinds() {
            flags |= MatFlags::hook_flag(kind);
        }
        if !instance.is_valid() {
            flags |= MatFlags::INVALID;
        }
        flags
    }

    /// The instance to draw `mat` with, built if needed.
    ///
    /// Falls back to the warning material when the instance cannot be
    /// built. `None` only when the handle is stale, the hook does not exist,
    /// or the warning material itself is broken.
    pub fn renderable(&mut self, mat: MatRef) -> Option<&mut MatInstance> {
        let ctx = &self.ctx;
        let built = self.instances.try_get_mut(mat.id.0)?.resolve_mut(mat.hook)?.ensure_built(ctx);
        if built {
            return self.instances.try_get_mut(mat.id.0)?.resolve_mut(mat.hook);
        }
        if self.warning.ensure_built(&self.ctx) {
            Some(&mut self.warning)
        } else {
            None
        }
    }

    pub fn warning_instance(&self) -> &MatInstance {
        &self.warning
    }

    /// Replace the global toggles and flush every instance.
    pub fn set_config(&mut self, config: MaterialConfig) {
        if self.ctx.config == config {
            return;
        }
        self.ctx.config = config;

        let config = &self.ctx.config;
        for (_, instance) in self.instances.iter_mut() {
            attach_default_hooks(config, instance);
        }
        self.flush_instances();
    }

    /// Tear down every built pass. Instances rebuild lazily on next use.
    pub fn flush_instances(&mut self) {
        let mut flushed = 0;
        for (_, instance) in self.instances.iter_mut() {
            if instance.is_built() || !instance.is_valid() {
                flushed += 1;
            }
            instance.reinit();
        }
        self.warning.reinit();
        tracing::info!(
            "Flushed {} of {} material instances",
            flushed,
            self.instances.len()
        );
    }

    /// Drop every device object; the warning material and all instances
    /// rebuild on next use.
    pub fn on_device_lost(&mut self) {
        tracing::info!(
            "Device lost, tearing down {} material instances",
            self.instances.len()
        );
        for (_, instance) in self.instances.iter_mut() {
            instance.reinit();
        }
        self.warning.reinit();
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = MatInstanceId> + '_ {
        self.instances.iter().map(|(slot, _)| MatInstanceId(slot))
    }
}

fn attach_default_hooks(config: &MaterialConfig, instance: &mut MatInstance) {
    let material = instance.material().clone();
    let wanted = [
        (HookKind::Glow, material.has_glow()),
        (HookKind::PrePass, config.prepass_enabled && !material.translucent),
        (HookKind::Shadow, material.cast_shadows),
    ];
    for (kind, enabled) in wanted {
        if !enabled {
            instance.remove_hook(kind);
        } else if instance.hook(kind).is_none() {
            if let Err(err) = instance.add_hook(kind) {
                tracing::warn!("Cannot attach {:?} hook to '{}': {}", kind, material.name, err);
            }
        }
    }
}

impl std::fmt::Debug for MaterialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialManager")
            .field("config", &self.ctx.config)
            .field("instances", &self.instances.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialStage;
    use lumen_test_utils::MockGfxDevice;

    fn manager(mock: &Arc<MockGfxDevice>) -> MaterialManager {
        MaterialManager::new(
            mock.clone(),
            Arc::new(FeatureRegistry::with_builtin()),
            MaterialConfig::default(),
        )
    }

    fn rock() -> Arc<Material> {
        Arc::new(Material::new("rock").with_stage(MaterialStage::diffuse("rock.png")))
    }

    #[test]
    fn test_warning_built_at_startup() {
        let mock = Arc::new(MockGfxDevice::new());
        let manager = manager(&mock);
        assert!(manager.warning_instance().is_built());
        assert_eq!(mock.compiled_labels(), vec!["WarningMaterial:0".to_string()]);
    }

    #[test]
    fn test_destroy_unknown_instance() {
        let mock = Arc::new(MockGfxDevice::new());
        let mut manager = manager(&mock);
        let id = manager.create_instance(rock(), VertexFormat::position_normal_uv());
        assert!(manager.destroy_instance(id).is_ok());
        assert_eq!(manager.destroy_instance(id), Err(MaterialError::UnknownInstance));
        assert_eq!(manager.flags(id), MatFlags::INVALID);
    }

    #[test]
    fn test_default_hooks() {
        let mock = Arc::new(MockGfxDevice::new());
        let mut manager = manager(&mock);

        let mut stage = MaterialStage::diffuse("lava.png");
        stage.glow = true;
        let mut material = Material::new("lava").with_stage(stage);
        material.cast_shadows = true;
        let id = manager.create_instance(Arc::new(material), VertexFormat::position_normal_uv());

        let flags = manager.flags(id);
        assert!(flags.contains(MatFlags::GLOW | MatFlags::GLOW_HOOK | MatFlags::SHADOW_HOOK));
        assert!(!flags.contains(MatFlags::PREPASS_HOOK));

        manager.set_config(MaterialConfig {
            prepass_enabled: true,
            ..MaterialConfig::default()
        });
        assert!(manager.flags(id).contains(MatFlags::PREPASS_HOOK));
    }

    #[test]
    fn test_renderable_falls_back_to_warning() {
        let mock = Arc::new(MockGfxDevice::new());
        mock.mark_missing("rock.png");
        let mut manager = manager(&mock);
        let id = manager.create_instance(rock(), VertexFormat::position_normal_uv());

        let inst = manager.renderable(MatRef::base(id)).unwrap();
        assert_eq!(inst.material().name, "WarningMaterial");
        assert!(manager.flags(id).contains(MatFlags::INVALID));
    }

    #[test]
    fn test_renderable_missing_hook() {
        let mock = Arc::new(MockGfxDevice::new());
        let mut manager = manager(&mock);
        let id = manager.create_instance(rock(), VertexFormat::position_normal_uv());
        assert!(manager.renderable(MatRef::hook(id, HookKind::Glow)).is_none());
    }

    #[test]
    fn test_flush_defers_rebuild() {
        let mock = Arc::new(MockGfxDevice::new());
        let mut manager = manager(&mock);
        let id = manager.create_instance(rock(), VertexFormat::position_normal_uv());
        manager.build(id).unwrap();
        assert_eq!(mock.count_shader_creates(), 2);

        manager.flush_instances();
        assert_eq!(mock.live_shader_count(), 0);
        assert_eq!(mock.count_shader_creates(), 2);

        assert!(manager.renderable(MatRef::base(id)).unwrap().is_built());
        assert_eq!(mock.count_shader_creates(), 3);
    }
}
