//! Per-frame draw submissions.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use lumen_gfx::{BufferHandle, PrimitiveRange, TextureHandle};

use crate::bins::RenderContext;
use crate::material::{MatFlags, MatInstanceId};

/// What kind of object submitted an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderInstType {
    Mesh,
    Terrain,
    Particle,
    /// Drawn by its own [`ObjectRenderDelegate`].
    Object,
    ObjectTranslucent,
}

/// Custom drawing for objects that do not fit the mesh path.
pub trait ObjectRenderDelegate: Send + Sync {
    fn render(&self, ctx: &mut RenderContext<'_>, inst: &RenderInst);
}

/// One drawable submission, valid for a single frame.
///
/// Instances are copied into the pass manager's frame arena on submission and
/// dropped when the frame ends; bins only ever hold frame handles to them.
#[derive(Clone)]
pub struct RenderInst {
    pub ty: RenderInstType,
    pub material: Option<MatInstanceId>,
    /// Filled in by the pass manager when the instance is submitted.
    pub mat_flags: MatFlags,
    pub vertex_buffer: Option<BufferHandle>,
    pub index_buffer: Option<BufferHandle>,
    pub prim: PrimitiveRange,
    pub world: Mat4,
    pub sort_key: u32,
    pub secondary_key: u32,
    /// Squared distance to the camera, used by back-to-front bins.
    pub sort_distance_sq: f32,
    pub light_map: Option<TextureHandle>,
    pub visibility: f32,
    pub delegate: Option<Arc<dyn ObjectRenderDelegate>>,
}

impl RenderInst {
    fn base(ty: RenderInstType) -> Self {
        Self {
            ty,
            material: None,
            mat_flags: MatFlags::empty(),
            vertex_buffer: None,
            index_buffer: None,
            prim: PrimitiveRange::triangles(0, 0),
            world: Mat4::IDENTITY,
            sort_key: 0,
            secondary_key: 0,
            sort_distance_sq: 0.0,
            light_map: None,
            visibility: 1.0,
            delegate: None,
        }
    }

    fn geometry(
        ty: RenderInstType,
        material: MatInstanceId,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        prim: PrimitiveRange,
    ) -> Self {
        Self {
            material: Some(material),
            vertex_buffer: Some(vertex_buffer),
            index_buffer,
            prim,
            sort_key: material.slot().index(),
            secondary_key: vertex_buffer.raw(),
            ..Self::base(ty)
        }
    }

    pub fn mesh(
        material: MatInstanceId,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        prim: PrimitiveRange,
    ) -> Self {
        Self::geometry(RenderInstType::Mesh, material, vertex_buffer, index_buffer, prim)
    }

    pub fn terrain(
        material: MatInstanceId,
        vertex_buffer: BufferHandle,
        index_buffer: Option<BufferHandle>,
        prim: PrimitiveRange,
    ) -> Self {
        Self::geometry(RenderInstType::Terrain, material, vertex_buffer, index_buffer, prim)
    }

    pub fn particle(material: MatInstanceId, vertex_buffer: BufferHandle, prim: PrimitiveRange) -> Self {
        Self::geometry(RenderInstType::Particle, material, vertex_buffer, None, prim)
    }

    pub fn object(delegate: Arc<dyn ObjectRenderDelegate>, translucent: bool) -> Self {
        let ty = if translucent {
            RenderInstType::ObjectTranslucent
        } else {
            RenderInstType::Object
        };
        Self {
            delegate: Some(delegate),
            ..Self::base(ty)
        }
    }

    pub fn with_world(mut self, world: Mat4) -> Self {
        self.world = world;
        self
    }

    pub fn with_sort_key(mut self, sort_key: u32, secondary_key: u32) -> Self {
        self.sort_key = sort_key;
        self.secondary_key = secondary_key;
        self
    }

    pub fn with_light_map(mut self, light_map: TextureHandle) -> Self {
        self.light_map = Some(light_map);
        self
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = visibility;
        self
    }

    /// Compute the sort distance from the translation of `world`.
    pub fn with_camera(mut self, camera_position: Vec3) -> Self {
        self.sort_distance_sq = self.world.w_axis.truncate().distance_squared(camera_position);
        self
    }

    pub fn is_translucent(&self) -> bool {
        self.ty == RenderInstType::ObjectTranslucent || self.mat_flags.contains(MatFlags::TRANSLUCENT)
    }
}

impl std::fmt::Debug for RenderInst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderInst")
            .field("ty", &self.ty)
            .field("material", &self.material)
            .field("mat_flags", &self.mat_flags)
            .field("sort_key", &self.sort_key)
            .field("secondary_key", &self.secondary_key)
            .field("sort_distance_sq", &self.sort_distance_sq)
            .field("delegate", &self.delegate.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::alloc::IndexSlot;

    #[test]
    fn test_translucency_from_flags_or_type() {
        let id = crate::material::MatInstanceId::from_slot(IndexSlot::new(0, 3));
        let mut inst = RenderInst::mesh(id, BufferHandle::from_raw(7), None, PrimitiveRange::triangles(0, 3));
        assert_eq!(inst.sort_key, 3);
        assert_eq!(inst.secondary_key, 7);
        assert!(!inst.is_translucent());
        inst.mat_flags = MatFlags::TRANSLUCENT;
        assert!(inst.is_translucent());
    }

    #[test]
    fn test_camera_distance() {
        struct Noop;
        impl ObjectRenderDelegate for Noop {
            fn render(&self, _ctx: &mut RenderContext<'_>, _inst: &RenderInst) {}
        }

        let inst = RenderInst::object(Arc::new(Noop), true)
            .with_world(Mat4::from_translation(Vec3::new(0.0, 3.0, 4.0)))
            .with_camera(Vec3::ZERO);
        assert_eq!(inst.ty, RenderInstType::ObjectTranslucent);
        assert_eq!(inst.sort_distance_sq, 25.0);
    }
}
