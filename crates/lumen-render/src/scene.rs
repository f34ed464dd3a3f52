//! Per-frame and per-draw context handed to processed materials.

use glam::{Mat4, Vec3, Vec4};
use lumen_gfx::TextureHandle;

/// What the scene is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScenePassType {
    #[default]
    Diffuse,
    /// Rendering a reflection; culling is flipped.
    Reflect,
    Shadow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogData {
    pub color: Vec4,
    pub start: f32,
    pub density: f32,
    pub height_falloff: f32,
}

impl Default for FogData {
    fn default() -> Self {
        Self {
            color: Vec4::new(0.5, 0.5, 0.5, 1.0),
            start: 0.0,
            density: 0.0,
            height_falloff: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightInfo {
    pub position: Vec3,
    pub color: Vec4,
    pub ambient: Vec4,
}

impl Default for LightInfo {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 100.0, 0.0),
            color: Vec4::ONE,
            ambient: Vec4::new(0.2, 0.2, 0.2, 1.0),
        }
    }
}

/// State shared by every draw of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRenderState {
    pub pass_type: ScenePassType,
    pub camera_position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    /// Seconds since start, drives texture animation.
    pub accumulated_time: f32,
    pub fog: FogData,
    pub light: LightInfo,
    /// Draw everything as wireframe.
    pub wireframe: bool,
}

impl Default for SceneRenderState {
    fn default() -> Self {
        Self {
            pass_type: ScenePassType::Diffuse,
            camera_position: Vec3::ZERO,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            accumulated_time: 0.0,
            fog: FogData::default(),
            light: LightInfo::default(),
            wireframe: false,
        }
    }
}

impl SceneRenderState {
    pub fn is_reflect_pass(&self) -> bool {
        self.pass_type == ScenePassType::Reflect
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Which bin is drawing; decides the render conditions of the draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BinKind {
    #[default]
    Regular,
    Translucent,
    Glow,
    PrePass,
}

/// Per-draw context.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneData {
    pub bin: BinKind,
    pub object_transform: Mat4,
    pub light_map: Option<TextureHandle>,
    /// Fade factor of the object, 1.0 when fully visible.
    pub visibility: f32,
    pub wireframe: bool,
}

impl Default for SceneData {
    fn default() -> Self {
        Self {
            bin: BinKind::Regular,
            object_transform: Mat4::IDENTITY,
            light_map: None,
            visibility: 1.0,
            wireframe: false,
        }
    }
}
