//! The built-in feature catalogue.

use super::{FeatureGroup, FeatureType};

pub const VERT_TRANSFORM: FeatureType = FeatureType::new(0, "Vert Transform", FeatureGroup::Transform, 1.0, false);
pub const TEX_ANIM: FeatureType = FeatureType::new(1, "Texture Animation", FeatureGroup::PreTexture, 1.0, true);
pub const PARALLAX: FeatureType = FeatureType::new(2, "Parallax", FeatureGroup::PreTexture, 2.0, true);
pub const DIFFUSE_MAP: FeatureType = FeatureType::new(3, "Diffuse Map", FeatureGroup::Texture, 1.0, true);
pub const OVERLAY_MAP: FeatureType = FeatureType::new(4, "Overlay Map", FeatureGroup::Texture, 2.0, true);
pub const DETAIL_MAP: FeatureType = FeatureType::new(5, "Detail Map", FeatureGroup::Texture, 3.0, true);
pub const DIFFUSE_COLOR: FeatureType = FeatureType::new(6, "Diffuse Color", FeatureGroup::Texture, 4.0, true);
pub const NORMAL_MAP: FeatureType = FeatureType::new(7, "Normal Map", FeatureGroup::Texture, 5.0, true);
pub const SPECULAR_MAP: FeatureType = FeatureType::new(8, "Specular Map", FeatureGroup::Texture, 6.0, true);
pub const ALPHA_TEST: FeatureType = FeatureType::new(9, "Alpha Test", FeatureGroup::PreLighting, 1.0, true);
pub const VERT_LIT: FeatureType = FeatureType::new(10, "Vert Lit", FeatureGroup::Lighting, 1.0, true);
pub const LIGHT_MAP: FeatureType = FeatureType::new(11, "Light Map", FeatureGroup::Lighting, 2.0, true);
pub const TONE_MAP: FeatureType = FeatureType::new(12, "Tone Map", FeatureGroup::Lighting, 3.0, true);
pub const RT_LIGHTING: FeatureType = FeatureType::new(13, "RT Lighting", FeatureGroup::Lighting, 4.0, false);
pub const PIX_SPECULAR: FeatureType = FeatureType::new(14, "Pixel Specular", FeatureGroup::PostLighting, 1.0, true);
pub const CUBE_MAP: FeatureType = FeatureType::new(15, "Cube Map", FeatureGroup::PostLighting, 2.0, true);
pub const FOG: FeatureType = FeatureType::new(16, "Fog", FeatureGroup::PostProcess, 1.0, true);
pub const VISIBILITY: FeatureType = FeatureType::new(17, "Visibility", FeatureGroup::PostProcess, 2.0, false);
pub const GLOW_MASK: FeatureType = FeatureType::new(18, "Glow Mask", FeatureGroup::PostProcess, 3.0, true);
pub const PREPASS_CONDITIONER: FeatureType =
    FeatureType::new(19, "PrePass Conditioner", FeatureGroup::PostProcess, 997.0, false);
pub const DEPTH_OUT: FeatureType = FeatureType::new(20, "Depth Out", FeatureGroup::PostProcess, 998.0, false);
pub const HDR_OUT: FeatureType = FeatureType::new(21, "HDR Out", FeatureGroup::PostProcess, 999.0, false);
pub const IS_TRANSLUCENT: FeatureType = FeatureType::new(22, "Translucent", FeatureGroup::Misc, 1.0, true);
pub const IS_TRANSLUCENT_ZWRITE: FeatureType =
    FeatureType::new(23, "Translucent ZWrite", FeatureGroup::Misc, 2.0, true);

/// Every built-in type, in id order.
pub const ALL: &[FeatureType] = &[
    VERT_TRANSFORM,
    TEX_ANIM,
    PARALLAX,
    DIFFUSE_MAP,
    OVERLAY_MAP,
    DETAIL_MAP,
    DIFFUSE_COLOR,
    NORMAL_MAP,
    SPECULAR_MAP,
    ALPHA_TEST,
    VERT_LIT,
    LIGHT_MAP,
    TONE_MAP,
    RT_LIGHTING,
    PIX_SPECULAR,
    CUBE_MAP,
    FOG,
    VISIBILITY,
    GLOW_MASK,
    PREPASS_CONDITIONER,
    DEPTH_OUT,
    HDR_OUT,
    IS_TRANSLUCENT,
    IS_TRANSLUCENT_ZWRITE,
];

/// The mutually exclusive dynamic-lighting features.
pub const LIGHTING_PATHS: &[FeatureType] = &[VERT_LIT, LIGHT_MAP, TONE_MAP, RT_LIGHTING];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureId;

    #[test]
    fn test_ids_are_dense_and_unique() {
        for (i, ty) in ALL.iter().enumerate() {
            assert_eq!(ty.id.index(), i, "{} is out of place", ty.name);
        }
        assert!(ALL.len() < FeatureId::FIRST_CUSTOM.index());
    }
}
