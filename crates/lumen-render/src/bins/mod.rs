//! Render bins: per-frame collectors that claim, sort and draw instances.
//!
//! Every bin wraps a [`BinCore`] holding its orders, its claim restrictions,
//! an optional [`MaterialOverride`] and the frame's elements. The
//! [`RenderPassManager`](crate::RenderPassManager) routes each submitted
//! [`RenderInst`] through the bins in process-add order and then drives
//! `sort`, `render` and `clear` once per frame.

use std::sync::Arc;

use lumen_core::alloc::{FrameArena, FrameHandle};
use lumen_core::profiling::profile_scope;
use lumen_gfx::GfxDevice;

use crate::material::{HookKind, MatFlags, MatRef, MaterialManager};
use crate::pass_manager::FrameStats;
use crate::render_inst::{RenderInst, RenderInstType};
use crate::scene::{BinKind, SceneData, SceneRenderState};

pub mod glow;
pub mod mesh;
pub mod object;
pub mod particle;
pub mod prepass;
pub mod target;
pub mod terrain;
pub mod translucent;

pub use glow::GlowBin;
pub use mesh::MeshBin;
pub use object::ObjectBin;
pub use particle::ParticleBin;
pub use prepass::PrePassBin;
pub use target::{OffscreenTarget, TargetScope};
pub use terrain::TerrainBin;
pub use translucent::TranslucentBin;

/// Outcome of offering an instance to a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddInstResult {
    /// Claimed; routing continues to the next bin.
    Added,
    /// Claimed; no later bin sees the instance this frame.
    Stopped,
    /// Not claimed.
    Skipped,
}

impl AddInstResult {
    pub fn is_claimed(self) -> bool {
        self != AddInstResult::Skipped
    }
}

/// Everything a bin needs while drawing.
pub struct RenderContext<'a> {
    pub device: &'a dyn GfxDevice,
    pub materials: &'a mut MaterialManager,
    pub scene: &'a SceneRenderState,
    pub stats: &'a mut FrameStats,
}

/// Lets an outside system draw a bin's instances with its own material.
pub trait MaterialOverride: Send + Sync {
    /// Material to use for `inst`, or `None` to keep the instance's own.
    fn override_material(&self, inst: &RenderInst) -> Option<MatRef>;
}

/// One claimed instance and its sort keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinElement {
    pub inst: FrameHandle,
    pub key: u32,
    pub key2: u32,
    pub distance_sq: f32,
}

/// State shared by every bin.
pub struct BinCore {
    name: String,
    render_order: f32,
    process_add_order: f32,
    allowed_types: Vec<RenderInstType>,
    basic_only: bool,
    material_override: Option<Arc<dyn MaterialOverride>>,
    elements: Vec<BinElement>,
}

impl BinCore {
    pub fn new(
        name: impl Into<String>,
        render_order: f32,
        process_add_order: f32,
        allowed_types: &[RenderInstType],
    ) -> Self {
        Self {
            name: name.into(),
            render_order,
            process_add_order,
            allowed_types: allowed_types.to_vec(),
            basic_only: false,
            material_override: None,
            elements: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render_order(&self) -> f32 {
        self.render_order
    }

    pub fn process_add_order(&self) -> f32 {
        self.process_add_order
    }

    pub fn set_orders(&mut self, render_order: f32, process_add_order: f32) {
        self.render_order = render_order;
        self.process_add_order = process_add_order;
    }

    /// Restrict claims to these instance types. Empty accepts every type.
    pub fn set_allowed_types(&mut self, types: &[RenderInstType]) {
        self.allowed_types = types.to_vec();
    }

    pub fn allowed_types(&self) -> &[RenderInstType] {
        &self.allowed_types
    }

    /// Only claim instances whose material carries no hooks.
    pub fn set_basic_only(&mut self, basic_only: bool) {
        self.basic_only = basic_only;
    }

    pub fn basic_only(&self) -> bool {
        self.basic_only
    }

    pub fn set_material_override(&mut self, material_override: Option<Arc<dyn MaterialOverride>>) {
        self.material_override = material_override;
    }

    pub fn has_material_override(&self) -> bool {
        self.material_override.is_some()
    }

    /// Type and hook restrictions shared by every claim predicate.
    pub fn accepts(&self, inst: &RenderInst) -> bool {
        if !self.allowed_types.is_empty() && !self.allowed_types.contains(&inst.ty) {
            return false;
        }
        !(self.basic_only && inst.mat_flags.intersects(MatFlags::HOOKS))
    }

    pub fn push(&mut self, handle: FrameHandle, inst: &RenderInst) {
        self.elements.push(BinElement {
            inst: handle,
            key: inst.sort_key,
            key2: inst.secondary_key,
            distance_sq: inst.sort_distance_sq,
        });
    }

    pub fn elements(&self) -> &[BinElement] {
        &self.elements
    }

    /// Ascending by primary then secondary key; equal keys keep claim order.
    pub fn sort_by_keys(&mut self) {
        self.elements.sort_by_key(|e| (e.key, e.key2));
    }

    /// Farthest first.
    pub fn sort_back_to_front(&mut self) {
        self.elements
            .sort_by(|a, b| b.distance_sq.total_cmp(&a.distance_sq));
    }

    /// Nearest first.
    pub fn sort_front_to_back(&mut self) {
        self.elements
            .sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Material an instance is drawn with in this bin.
    pub fn material_for(&self, inst: &RenderInst, hook: Option<HookKind>) -> Option<MatRef> {
        if let Some(ov) = &self.material_override {
            if let Some(mat) = ov.override_material(inst) {
                return Some(mat);
            }
        }
        inst.material.map(|id| MatRef { id, hook })
    }

    /// Draw every element through its material's passes.
    ///
    /// With `batch` set, consecutive elements drawn with the same material
    /// share one pass setup per pass.
    pub fn render_elements(
        &self,
        ctx: &mut RenderContext<'_>,
        arena: &FrameArena<RenderInst>,
        hook: Option<HookKind>,
        bin: BinKind,
        batch: bool,
    ) {
        let elements = &self.elements;
        let mut start = 0;
        while start < elements.len() {
            let first = arena.get(elements[start].inst);
            let Some(mat) = self.material_for(first, hook) else {
                start += 1;
                continue;
            };

            let mut end = start + 1;
            if batch {
                while end < elements.len() && self.material_for(arena.get(elements[end].inst), hook) == Some(mat) {
                    end += 1;
                }
            }

            draw_batch(ctx, arena, mat, &elements[start..end], bin);
            start = end;
        }
    }

    /// Draw elements one by one, handing delegated instances to their
    /// delegate.
    pub fn render_each(
        &self,
        ctx: &mut RenderContext<'_>,
        arena: &FrameArena<RenderInst>,
        hook: Option<HookKind>,
        bin: BinKind,
    ) {
        for element in &self.elements {
            let inst = arena.get(element.inst);
            if let Some(delegate) = &inst.delegate {
                delegate.render(ctx, inst);
                continue;
            }
            if let Some(mat) = self.material_for(inst, hook) {
                draw_batch(ctx, arena, mat, std::slice::from_ref(element), bin);
            }
        }
    }
}

impl std::fmt::Debug for BinCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinCore")
            .field("name", &self.name)
            .field("render_order", &self.render_order)
            .field("process_add_order", &self.process_add_order)
            .field("allowed_types", &self.allowed_types)
            .field("basic_only", &self.basic_only)
            .field("elements", &self.elements.len())
            .finish()
    }
}

/// Draw `batch` with one material, one pass setup per pass.
pub(crate) fn draw_batch(
    ctx: &mut RenderContext<'_>,
    arena: &FrameArena<RenderInst>,
    mat: MatRef,
    batch: &[BinElement],
    bin: BinKind,
) {
    profile_scope!("draw_batch");
    let scene = ctx.scene;
    let device = ctx.device;
    let Some(instance) = ctx.materials.renderable(mat) else {
        tracing::trace!("No renderable material for {:?}, dropping {} elements", mat, batch.len());
        return;
    };

    let mut sg = SceneData {
        bin,
        ..SceneData::default()
    };
    while instance.setup_pass(scene, &sg) {
        ctx.stats.passes_setup += 1;
        for element in batch {
            let inst = arena.get(element.inst);
            sg.object_transform = inst.world;
            sg.light_map = inst.light_map;
            sg.visibility = inst.visibility;

            instance.set_transforms(scene, inst.world);
            instance.set_scene_info(scene, &sg);
            instance.set_texture_stages(&sg);
            if let Some(vertex_buffer) = inst.vertex_buffer {
                instance.set_buffers(vertex_buffer, inst.index_buffer);
            }
            device.draw(&inst.prim);
            ctx.stats.draw_calls += 1;
        }
    }
}

/// A per-frame collector and renderer for one category of drawable.
///
/// Implementors provide the claim predicate, the sort and the draw; the
/// bookkeeping defaults go through [`RenderBinManager::core`].
pub trait RenderBinManager {
    fn core(&self) -> &BinCore;

    fn core_mut(&mut self) -> &mut BinCore;

    /// Offer an instance. Claimed instances are remembered until `clear`.
    fn add_element(&mut self, handle: FrameHandle, inst: &RenderInst) -> AddInstResult;

    fn sort(&mut self, arena: &FrameArena<RenderInst>);

    fn render(&mut self, ctx: &mut RenderContext<'_>, arena: &FrameArena<RenderInst>);

    fn name(&self) -> &str {
        self.core().name()
    }

    fn render_order(&self) -> f32 {
        self.core().render_order()
    }

    fn process_add_order(&self) -> f32 {
        self.core().process_add_order()
    }

    fn clear(&mut self) {
        self.core_mut().clear();
    }

    fn element_count(&self) -> usize {
        self.core().len()
    }

    fn set_material_override(&mut self, material_override: Option<Arc<dyn MaterialOverride>>) {
        self.core_mut().set_material_override(material_override);
    }

    /// Drop device objects owned by the bin; they are recreated on next use.
    fn on_device_reset(&mut self, _device: &dyn GfxDevice) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MatInstanceId;
    use lumen_core::alloc::IndexSlot;
    use lumen_gfx::{BufferHandle, PrimitiveRange};

    fn mesh(key: u32, key2: u32) -> RenderInst {
        let id = MatInstanceId::from_slot(IndexSlot::new(0, key));
        RenderInst::mesh(id, BufferHandle::from_raw(key2), None, PrimitiveRange::triangles(0, 3))
    }

    #[test]
    fn test_accepts_types_and_basic_only() {
        let mut core = BinCore::new("test", 1.0, 1.0, &[RenderInstType::Mesh]);
        let mut inst = mesh(0, 0);
        assert!(core.accepts(&inst));

        inst.ty = RenderInstType::Terrain;
        assert!(!core.accepts(&inst));

        inst.ty = RenderInstType::Mesh;
        inst.mat_flags = MatFlags::SHADOW_HOOK;
        core.set_basic_only(true);
        assert!(!core.accepts(&inst));

        core.set_allowed_types(&[]);
        inst.mat_flags = MatFlags::empty();
        inst.ty = RenderInstType::Particle;
        assert!(core.accepts(&inst));
    }

    #[test]
    fn test_sort_by_keys_is_stable() {
        let mut arena = FrameArena::new();
        let mut core = BinCore::new("test", 1.0, 1.0, &[]);
        for (k, k2) in [(2, 0), (1, 5), (1, 2), (2, 0)] {
            let inst = mesh(k, k2);
            let handle = arena.alloc(inst.clone());
            core.push(handle, &inst);
        }
        core.sort_by_keys();
        let order: Vec<_> = core.elements().iter().map(|e| (e.key, e.key2, e.inst.index())).collect();
        assert_eq!(order, vec![(1, 2, 2), (1, 5, 1), (2, 0, 0), (2, 0, 3)]);
    }

    #[test]
    fn test_material_override_wins() {
        struct Fixed(MatRef);
        impl MaterialOverride for Fixed {
            fn override_material(&self, _inst: &RenderInst) -> Option<MatRef> {
                Some(self.0)
            }
        }

        let mut core = BinCore::new("test", 1.0, 1.0, &[]);
        let inst = mesh(1, 0);
        let own = core.material_for(&inst, None).unwrap();
        assert_eq!(own.id, inst.material.unwrap());

        let other = MatRef::base(MatInstanceId::from_slot(IndexSlot::new(0, 9)));
        core.set_material_override(Some(Arc::new(Fixed(other))));
        assert_eq!(core.material_for(&inst, Some(HookKind::Shadow)), Some(other));
    }
}
