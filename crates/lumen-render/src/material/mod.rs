//! Authored material descriptions and their runtime instances.
//!
//! A [`Material`] is the persisted, author-facing description: an ordered list
//! of [`MaterialStage`]s plus material-wide flags. Everything derived from it
//! (feature sets, passes, programs, state blocks) is runtime-only and lives in
//! [`ProcessedMaterial`](crate::ProcessedMaterial), owned by a [`MatInstance`].

use bitflags::bitflags;
use glam::{Mat4, Vec2, Vec3, Vec4};
use lumen_gfx::{BlendDesc, SamplerState};
use wgpu::{BlendFactor, BlendOperation};

use crate::error::{MaterialError, MaterialResult};
use crate::features::MapKind;

pub mod hooks;
pub mod instance;
pub mod manager;
pub mod resolver;

pub use hooks::{HookKind, HookTable};
pub use instance::{MatInstance, MaterialContext};
pub use manager::{MatFlags, MatInstanceId, MatRef, MaterialManager};
pub use resolver::{FeatureResolver, StageFeatures, StageOverride};

/// Maximum number of stages a material may declare.
pub const MAX_STAGES: usize = 8;

/// How a pass combines with what is already in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendOp {
    #[default]
    None,
    Mul,
    Add,
    AddAlpha,
    Sub,
    LerpAlpha,
}

impl BlendOp {
    /// Blend equation, `None` for opaque replacement.
    pub fn blend_desc(self) -> Option<BlendDesc> {
        let (src, dst, op) = match self {
            BlendOp::None => return None,
            BlendOp::Mul => (BlendFactor::Dst, BlendFactor::Zero, BlendOperation::Add),
            BlendOp::Add => (BlendFactor::One, BlendFactor::One, BlendOperation::Add),
            BlendOp::AddAlpha => (BlendFactor::SrcAlpha, BlendFactor::One, BlendOperation::Add),
            BlendOp::Sub => (BlendFactor::One, BlendFactor::One, BlendOperation::ReverseSubtract),
            BlendOp::LerpAlpha => (
                BlendFactor::SrcAlpha,
                BlendFactor::OneMinusSrcAlpha,
                BlendOperation::Add,
            ),
        };
        Some(BlendDesc { src, dst, op })
    }
}

bitflags! {
    /// Texture coordinate animations applied per stage.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TexAnimFlags: u8 {
        const SCROLL = 1 << 0;
        const ROTATE = 1 << 1;
        const WAVE = 1 << 2;
        const SCALE = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WaveType {
    #[default]
    Sin,
    Triangle,
    Square,
}

impl WaveType {
    /// Value of the wave at `phase` (in cycles), in -1..=1.
    pub fn eval(self, phase: f32) -> f32 {
        let t = phase.rem_euclid(1.0);
        match self {
            WaveType::Sin => (t * std::f32::consts::TAU).sin(),
            WaveType::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
            WaveType::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// Texture coordinate animation of one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureAnim {
    pub flags: TexAnimFlags,
    pub scroll_dir: Vec2,
    pub scroll_speed: f32,
    /// Degrees per second.
    pub rot_speed: f32,
    pub rot_pivot: Vec2,
    pub wave_type: WaveType,
    pub wave_freq: f32,
    pub wave_amp: f32,
}

impl Default for TextureAnim {
    fn default() -> Self {
        Self {
            flags: TexAnimFlags::empty(),
            scroll_dir: Vec2::ZERO,
            scroll_speed: 0.0,
            rot_speed: 0.0,
            rot_pivot: Vec2::splat(0.5),
            wave_type: WaveType::Sin,
            wave_freq: 0.0,
            wave_amp: 0.0,
        }
    }
}

impl TextureAnim {
    pub fn is_active(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Texture matrix at `time` seconds.
    pub fn matrix(&self, time: f32) -> Mat4 {
        let mut mat = Mat4::IDENTITY;

        if self.flags.contains(TexAnimFlags::SCALE) {
            let wave = self.wave_type.eval(time * self.wave_freq);
            let scale = 1.0 + wave * self.wave_amp;
            let pivot = self.rot_pivot.extend(0.0);
            mat = Mat4::from_translation(pivot)
                * Mat4::from_scale(Vec3::new(scale, scale, 1.0))
                * Mat4::from_translation(-pivot)
                * mat;
        }

        if self.flags.contains(TexAnimFlags::ROTATE) {
            let angle = (self.rot_speed * time).to_radians();
            let pivot = self.rot_pivot.extend(0.0);
            mat = Mat4::from_translation(pivot) * Mat4::from_rotation_z(angle) * Mat4::from_translation(-pivot) * mat;
        }

        if self.flags.contains(TexAnimFlags::SCROLL) {
            let offset = self.scroll_dir * self.scroll_speed * time;
            mat = Mat4::from_translation(offset.extend(0.0)) * mat;
        }

        if self.flags.contains(TexAnimFlags::WAVE) {
            let offset = self.wave_type.eval(time * self.wave_freq) * self.wave_amp;
            mat = Mat4::from_translation(Vec3::new(offset, 0.0, 0.0)) * mat;
        }

        mat
    }
}

/// One texture layer of a material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialStage {
    pub diffuse_map: Option<String>,
    pub overlay_map: Option<String>,
    pub detail_map: Option<String>,
    pub normal_map: Option<String>,
    pub specular_map: Option<String>,
    pub cube_map: Option<String>,
    pub tone_map: Option<String>,

    pub diffuse_color: Vec4,
    pub detail_scale: Vec2,
    /// Parallax strength; zero disables parallax.
    pub parallax_scale: f32,
    pub specular_color: Vec4,
    pub specular_power: f32,
    pub pixel_specular: bool,

    pub emissive: bool,
    pub vert_lit: bool,
    /// Light with the scene-provided light map.
    pub light_map: bool,
    pub glow: bool,
    /// Clamp texture addressing instead of wrapping.
    pub clamp: bool,
    pub anim: TextureAnim,
}

impl Default for MaterialStage {
    fn default() -> Self {
        Self {
            diffuse_map: None,
            overlay_map: None,
            detail_map: None,
            normal_map: None,
            specular_map: None,
            cube_map: None,
            tone_map: None,
            diffuse_color: Vec4::ONE,
            detail_scale: Vec2::splat(2.0),
            parallax_scale: 0.0,
            specular_color: Vec4::ONE,
            specular_power: 8.0,
            pixel_specular: false,
            emissive: false,
            vert_lit: false,
            light_map: false,
            glow: false,
            clamp: false,
            anim: TextureAnim::default(),
        }
    }
}

impl MaterialStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stage with only a diffuse map.
    pub fn diffuse(path: impl Into<String>) -> Self {
        Self {
            diffuse_map: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_normal(mut self, path: impl Into<String>) -> Self {
        self.normal_map = Some(path.into());
        self
    }

    pub fn with_detail(mut self, path: impl Into<String>) -> Self {
        self.detail_map = Some(path.into());
        self
    }

    pub fn with_specular(mut self, path: impl Into<String>) -> Self {
        self.specular_map = Some(path.into());
        self
    }

    /// Path of the map of the given kind, if authored.
    pub fn map(&self, kind: MapKind) -> Option<&str> {
        match kind {
            MapKind::Diffuse => self.diffuse_map.as_deref(),
            MapKind::Overlay => self.overlay_map.as_deref(),
            MapKind::Detail => self.detail_map.as_deref(),
            MapKind::Normal => self.normal_map.as_deref(),
            MapKind::Specular => self.specular_map.as_deref(),
            MapKind::Cube => self.cube_map.as_deref(),
            MapKind::ToneMap => self.tone_map.as_deref(),
        }
    }

    pub fn sampler(&self) -> SamplerState {
        if self.clamp {
            SamplerState::CLAMP_LINEAR
        } else {
            SamplerState::WRAP_LINEAR
        }
    }
}

/// An authored material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub stages: Vec<MaterialStage>,
    pub translucent: bool,
    pub translucent_blend_op: BlendOp,
    pub translucent_z_write: bool,
    pub alpha_test: bool,
    pub alpha_ref: u8,
    pub double_sided: bool,
    pub cast_shadows: bool,
    pub fog: bool,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            translucent: false,
            translucent_blend_op: BlendOp::LerpAlpha,
            translucent_z_write: false,
            alpha_test: false,
            alpha_ref: 1,
            double_sided: false,
            cast_shadows: false,
            fog: true,
        }
    }

    pub fn with_stage(mut self, stage: MaterialStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// The material used in place of anything that failed to build: a single
    /// unlit magenta stage, impossible to mistake for real content.
    pub fn warning() -> Self {
        let stage = MaterialStage {
            diffuse_color: Vec4::new(1.0, 0.0, 1.0, 1.0),
            emissive: true,
            ..MaterialStage::default()
        };
        Material {
            fog: false,
            ..Material::new("WarningMaterial")
        }
        .with_stage(stage)
    }

    pub fn validate(&self) -> MaterialResult<()> {
        if self.stages.is_empty() {
            return Err(MaterialError::NoStages);
        }
        if self.stages.len() > MAX_STAGES {
            return Err(MaterialError::TooManyStages {
                count: self.stages.len(),
                max: MAX_STAGES,
            });
        }
        Ok(())
    }

    pub fn has_glow(&self) -> bool {
        self.stages.iter().any(|stage| stage.glow)
    }

    /// First stage flagged as glowing.
    pub fn glow_stage(&self) -> Option<usize> {
        self.stages.iter().position(|stage| stage.glow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert_eq!(Material::new("empty").validate(), Err(MaterialError::NoStages));

        let mut material = Material::new("big");
        for _ in 0..=MAX_STAGES {
            material.stages.push(MaterialStage::diffuse("a.png"));
        }
        assert!(matches!(material.validate(), Err(MaterialError::TooManyStages { .. })));

        assert!(Material::warning().validate().is_ok());
    }

    #[test]
    fn test_blend_op() {
        assert_eq!(BlendOp::None.blend_desc(), None);
        assert_eq!(BlendOp::LerpAlpha.blend_desc(), Some(BlendDesc::ALPHA));
        assert_eq!(BlendOp::Add.blend_desc(), Some(BlendDesc::ADDITIVE));
    }

    #[test]
    fn test_scroll_matrix() {
        let anim = TextureAnim {
            flags: TexAnimFlags::SCROLL,
            scroll_dir: Vec2::new(1.0, 0.0),
            scroll_speed: 0.5,
            ..Default::default()
        };
        let mat = anim.matrix(2.0);
        let uv = mat.transform_point3(Vec3::ZERO);
        assert!((uv.x - 1.0).abs() < 1e-5);
        assert!(uv.y.abs() < 1e-5);
    }

    #[test]
    fn test_rotation_about_pivot() {
        let anim = TextureAnim {
            flags: TexAnimFlags::ROTATE,
            rot_speed: 90.0,
            ..Default::default()
        };
        // The pivot is a fixed point of the rotation.
        let pivot = anim.matrix(1.0).transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((pivot - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-5);
        assert!(!anim.matrix(1.0).abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_wave_shapes() {
        assert!((WaveType::Triangle.eval(0.25)).abs() < 1e-5);
        assert_eq!(WaveType::Square.eval(0.75), -1.0);
        assert!((WaveType::Sin.eval(0.25) - 1.0).abs() < 1e-5);
    }
}
