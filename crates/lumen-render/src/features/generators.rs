//! Generators for the built-in feature catalogue.
//!
//! Per-stage texture features share one texture coordinate interpolator per
//! stage, charged to whichever map feature of that stage comes first in
//! pipeline order. Normal maps share one tangent frame per set, charged to
//! the lowest-indexed normal map.

use lumen_gfx::UniformType;

use super::{
    EmitContext, FeatureGenerator, FeatureId, FeatureRegistry, FeatureSet, MapKind, Resources, TexBindings, TexSource,
    builtin,
};

/// Interpolators used by the shared tangent frame.
pub const TANGENT_FRAME_INTERPOLATORS: u32 = 3;

/// Features that sample with the stage's base texture coordinate, in pipeline order.
const COORD_FEATURES: &[FeatureId] = &[
    builtin::PARALLAX.id,
    builtin::DIFFUSE_MAP.id,
    builtin::OVERLAY_MAP.id,
    builtin::DETAIL_MAP.id,
    builtin::NORMAL_MAP.id,
    builtin::SPECULAR_MAP.id,
];

fn claims_texcoord(set: &FeatureSet, index: Option<u8>, id: FeatureId) -> bool {
    COORD_FEATURES.iter().find(|candidate| set.has_at(**candidate, index)) == Some(&id)
}

fn coord_cost(set: &FeatureSet, index: Option<u8>, id: FeatureId) -> u32 {
    u32::from(claims_texcoord(set, index, id))
}

fn is_first(set: &FeatureSet, id: FeatureId, index: Option<u8>) -> bool {
    set.indices_of(id).next() == Some(index)
}

fn stage(index: Option<u8>) -> u8 {
    index.unwrap_or(0)
}

fn tex_coord(ctx: &mut EmitContext<'_>) -> String {
    let name = ctx.indexed("texCoord");
    ctx.varying(name, UniformType::Float2)
}

/// Emit the vertex side of the stage texture coordinate once per stage.
fn emit_tex_coord_vertex(ctx: &mut EmitContext<'_>, id: FeatureId) {
    if !claims_texcoord(ctx.features, ctx.index, id) {
        return;
    }
    let coord = tex_coord(ctx);
    if ctx.features.has_at(builtin::TEX_ANIM.id, ctx.index) {
        let mat = ctx.indexed("texMat");
        ctx.vertex(format!("{} = (({} * vec4<f32>(uv0, 0.0, 1.0))).xy;", coord, mat));
    } else {
        ctx.vertex(format!("{} = uv0;", coord));
    }
}

fn sample_map(ctx: &mut EmitContext<'_>, sampler_base: &str) -> String {
    let name = ctx.indexed(sampler_base);
    let coord = tex_coord(ctx);
    ctx.sampler(name.clone());
    format!("textureSample({}, {})", name, coord)
}

fn bind_map(index: Option<u8>, bindings: &mut TexBindings, base: &str, kind: MapKind) {
    let stage = stage(index);
    bindings.bind(format!("{}{}", base, stage), TexSource::Map { stage, kind });
}

pub struct VertTransform;

impl FeatureGenerator for VertTransform {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        ctx.uniform("modelview", UniformType::Float4x4);
        ctx.vertex("out_position = modelview * vec4<f32>(position, 1.0);");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

/// Declares the per-stage texture matrix; the coordinate feature applies it.
pub struct TexAnim;

impl FeatureGenerator for TexAnim {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        let name = ctx.indexed("texMat");
        ctx.uniform(name, UniformType::Float4x4);
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

/// Offsets the stage coordinate by the height stored in the normal map alpha.
pub struct Parallax;

impl FeatureGenerator for Parallax {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        emit_tex_coord_vertex(ctx, builtin::PARALLAX.id);
        ctx.uniform("eyePosObj", UniformType::Float3);
        let eye = ctx.varying("eyeTangent", UniformType::Float3);
        ctx.vertex(format!("{} = tangentToObj * (eyePosObj - position);", eye));
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let scale = ctx.indexed("parallaxInfo");
        ctx.uniform(scale.clone(), UniformType::Float);
        let height = sample_map(ctx, "bumpMap");
        let coord = tex_coord(ctx);
        ctx.pixel(format!(
            "{} += normalize(eyeTangent).xy * ({}.a * {});",
            coord, height, scale
        ));
    }

    fn resources(&self, set: &FeatureSet, index: Option<u8>) -> Resources {
        let eye = u32::from(is_first(set, builtin::PARALLAX.id, index));
        Resources::new(1, coord_cost(set, index, builtin::PARALLAX.id) + eye)
    }

    fn set_tex_data(&self, index: Option<u8>, bindings: &mut TexBindings) {
        bind_map(index, bindings, "bumpMap", MapKind::Normal);
    }
}

pub struct DiffuseMap;

impl FeatureGenerator for DiffuseMap {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        emit_tex_coord_vertex(ctx, builtin::DIFFUSE_MAP.id);
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let sample = sample_map(ctx, "diffuseMap");
        ctx.pixel(format!("col = {};", sample));
    }

    fn resources(&self, set: &FeatureSet, index: Option<u8>) -> Resources {
        Resources::new(1, coord_cost(set, index, builtin::DIFFUSE_MAP.id))
    }

    fn set_tex_data(&self, index: Option<u8>, bindings: &mut TexBindings) {
        bind_map(index, bindings, "diffuseMap", MapKind::Diffuse);
    }
}

pub struct OverlayMap;

impl FeatureGenerator for OverlayMap {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        emit_tex_coord_vertex(ctx, builtin::OVERLAY_MAP.id);
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let sample = sample_map(ctx, "overlayMap");
        ctx.pixel(format!("let overlay = {};", sample));
        ctx.pixel("col = mix(col, overlay, overlay.a);");
    }

    fn resources(&self, set: &FeatureSet, index: Option<u8>) -> Resources {
        Resources::new(1, coord_cost(set, index, builtin::OVERLAY_MAP.id))
    }

    fn set_tex_data(&self, index: Option<u8>, bindings: &mut TexBindings) {
        bind_map(index, bindings, "overlayMap", MapKind::Overlay);
    }
}

pub struct DetailMap;

impl FeatureGenerator for DetailMap {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        emit_tex_coord_vertex(ctx, builtin::DETAIL_MAP.id);
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let scale = ctx.indexed("detailScale");
        ctx.uniform(scale.clone(), UniformType::Float2);
        let name = ctx.indexed("detailMap");
        ctx.sampler(name.clone());
        let coord = tex_coord(ctx);
        ctx.pixel(format!(
            "col += textureSample({}, {} * {}) * 2.0 - 1.0;",
            name, coord, scale
        ));
    }

    fn resources(&self, set: &FeatureSet, index: Option<u8>) -> Resources {
        Resources::new(1, coord_cost(set, index, builtin::DETAIL_MAP.id))
    }

    fn set_tex_data(&self, index: Option<u8>, bindings: &mut TexBindings) {
        bind_map(index, bindings, "detailMap", MapKind::Detail);
    }
}

pub struct DiffuseColor;

impl FeatureGenerator for DiffuseColor {
    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let color = ctx.indexed("diffuseMaterialColor");
        ctx.uniform(color.clone(), UniformType::Float4);
        if ctx.features.has_at(builtin::DIFFUSE_MAP.id, ctx.index) {
            ctx.pixel(format!("col *= {};", color));
        } else {
            ctx.pixel(format!("col = {};", color));
        }
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

/// Tangent-space normal mapping.
///
/// Shares its sampler with parallax on the same stage, and shares the tangent
/// frame interpolators with every other normal map in the set.
pub struct NormalMap;

impl FeatureGenerator for NormalMap {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        emit_tex_coord_vertex(ctx, builtin::NORMAL_MAP.id);
        if is_first(ctx.features, builtin::NORMAL_MAP.id, ctx.index) {
            for (i, source) in ["tangent.xyz", "cross(normal, tangent.xyz) * tangent.w", "normal"]
                .iter()
                .enumerate()
            {
                let row = ctx.varying(format!("tangentFrame{}", i), UniformType::Float3);
                ctx.vertex(format!("{} = (objTrans * vec4<f32>({}, 0.0)).xyz;", row, source));
            }
        }
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let sample = sample_map(ctx, "bumpMap");
        ctx.pixel(format!(
            "bumpNormal = normalize(mat3x3<f32>(tangentFrame0, tangentFrame1, tangentFrame2) * ({}.xyz * 2.0 - 1.0));",
            sample
        ));
    }

    fn resources(&self, set: &FeatureSet, index: Option<u8>) -> Resources {
        let tex = if set.has_at(builtin::PARALLAX.id, index) { 0 } else { 1 };
        let frame = if is_first(set, builtin::NORMAL_MAP.id, index) {
            TANGENT_FRAME_INTERPOLATORS
        } else {
            0
        };
        Resources::new(tex, coord_cost(set, index, builtin::NORMAL_MAP.id) + frame)
    }

    fn set_tex_data(&self, index: Option<u8>, bindings: &mut TexBindings) {
        bind_map(index, bindings, "bumpMap", MapKind::Normal);
    }
}

pub struct SpecularMap;

impl FeatureGenerator for SpecularMap {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        emit_tex_coord_vertex(ctx, builtin::SPECULAR_MAP.id);
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let sample = sample_map(ctx, "specularMap");
        ctx.pixel(format!("specularMask = {};", sample));
    }

    fn resources(&self, set: &FeatureSet, index: Option<u8>) -> Resources {
        Resources::new(1, coord_cost(set, index, builtin::SPECULAR_MAP.id))
    }

    fn set_tex_data(&self, index: Option<u8>, bindings: &mut TexBindings) {
        bind_map(index, bindings, "specularMap", MapKind::Specular);
    }
}

pub struct AlphaTest;

impl FeatureGenerator for AlphaTest {
    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.uniform("alphaTestValue", UniformType::Float);
        ctx.pixel("if (col.a < alphaTestValue) { discard; }");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

pub struct VertLit;

impl FeatureGenerator for VertLit {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        let color = ctx.varying("vertColor", UniformType::Float4);
        ctx.vertex(format!("{} = diffuse;", color));
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.pixel("col *= vertColor;");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::new(0, 1)
    }
}

pub struct LightMap;

impl FeatureGenerator for LightMap {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        let coord = ctx.varying("lmCoord", UniformType::Float2);
        ctx.vertex(format!("{} = uv1;", coord));
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.sampler("lightMap");
        ctx.pixel("col *= textureSample(lightMap, lmCoord);");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::new(1, 1)
    }

    fn set_tex_data(&self, _index: Option<u8>, bindings: &mut TexBindings) {
        bindings.bind("lightMap", TexSource::LightMap);
    }
}

pub struct ToneMap;

impl FeatureGenerator for ToneMap {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        let coord = ctx.varying("lmCoord", UniformType::Float2);
        ctx.vertex(format!("{} = uv1;", coord));
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let name = ctx.indexed("toneMap");
        ctx.sampler(name.clone());
        ctx.pixel(format!("col *= textureSample({}, lmCoord);", name));
    }

    fn resources(&self, set: &FeatureSet, index: Option<u8>) -> Resources {
        // One lmCoord for every tone map, shared with the light map when present.
        let coord = !set.has(builtin::LIGHT_MAP.id) && is_first(set, builtin::TONE_MAP.id, index);
        Resources::new(1, u32::from(coord))
    }

    fn set_tex_data(&self, index: Option<u8>, bindings: &mut TexBindings) {
        bind_map(index, bindings, "toneMap", MapKind::ToneMap);
    }
}

pub struct RtLighting;

impl FeatureGenerator for RtLighting {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        let pos = ctx.varying("wsPosition", UniformType::Float3);
        ctx.vertex(format!("{} = (objTrans * vec4<f32>(position, 1.0)).xyz;", pos));
        if !ctx.features.has(builtin::NORMAL_MAP.id) {
            ctx.vertex("bumpNormal = normalize((objTrans * vec4<f32>(normal, 0.0)).xyz);");
        }
        let normal = ctx.varying("wsNormal", UniformType::Float3);
        ctx.vertex(format!("{} = bumpNormal;", normal));
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.uniform("inLightPos", UniformType::Float4);
        ctx.uniform("inLightColor", UniformType::Float4);
        ctx.uniform("ambient", UniformType::Float4);
        ctx.pixel("let lightDir = normalize(inLightPos.xyz - wsPosition);");
        ctx.pixel("col *= ambient + inLightColor * saturate(dot(wsNormal, lightDir));");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::new(0, 2)
    }
}

pub struct PixSpecular;

impl FeatureGenerator for PixSpecular {
    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.uniform("specularColor", UniformType::Float4);
        ctx.uniform("specularPower", UniformType::Float);
        ctx.uniform("eyePosWorld", UniformType::Float3);
        ctx.pixel("let halfVec = normalize(lightDir + normalize(eyePosWorld - wsPosition));");
        ctx.pixel("col += specularColor * pow(saturate(dot(wsNormal, halfVec)), specularPower);");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

pub struct CubeMap;

impl FeatureGenerator for CubeMap {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        let reflect = ctx.varying(ctx.indexed("reflectVec"), UniformType::Float3);
        ctx.uniform("eyePosWorld", UniformType::Float3);
        ctx.vertex(format!(
            "{} = reflect(position - eyePosWorld, normal);",
            reflect
        ));
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        let name = ctx.indexed("cubeMap");
        let reflect = ctx.indexed("reflectVec");
        ctx.sampler(name.clone());
        ctx.pixel(format!("col = mix(col, textureSample({}, {}), col.a);", name, reflect));
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::new(1, 1)
    }

    fn set_tex_data(&self, index: Option<u8>, bindings: &mut TexBindings) {
        bind_map(index, bindings, "cubeMap", MapKind::Cube);
    }
}

pub struct Fog;

impl FeatureGenerator for Fog {
    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.uniform("fogData", UniformType::Float3);
        ctx.uniform("fogColor", UniformType::Float4);
        ctx.pixel("let fogAmount = saturate(exp(-fogData.y * (out_depth - fogData.x)));");
        ctx.pixel("col = vec4<f32>(mix(fogColor.rgb, col.rgb, fogAmount), col.a);");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

pub struct Visibility;

impl FeatureGenerator for Visibility {
    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.uniform("visibility", UniformType::Float);
        ctx.pixel("col.a *= visibility;");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

/// Blacks out stages that do not glow when rendering into the glow target.
pub struct GlowMask;

impl FeatureGenerator for GlowMask {
    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.uniform("glowMul", UniformType::Float);
        ctx.pixel("col = vec4<f32>(col.rgb * glowMul, col.a);");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

/// Packs view-space normal and depth into the pre-pass target.
pub struct PrePassConditioner;

impl FeatureGenerator for PrePassConditioner {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        let normal = ctx.varying("vsNormalDepth", UniformType::Float4);
        ctx.vertex(format!(
            "{} = vec4<f32>((modelview * vec4<f32>(normal, 0.0)).xyz, out_position.z);",
            normal
        ));
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.pixel("col = vec4<f32>(normalize(vsNormalDepth.xyz) * 0.5 + 0.5, vsNormalDepth.w);");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::new(0, 1)
    }
}

pub struct DepthOut;

impl FeatureGenerator for DepthOut {
    fn emit_vertex(&self, ctx: &mut EmitContext<'_>) {
        let depth = ctx.varying("depth", UniformType::Float);
        ctx.vertex(format!("{} = out_position.z / out_position.w;", depth));
    }

    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.pixel("col = vec4<f32>(depth, depth, depth, col.a);");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::new(0, 1)
    }
}

pub struct HdrOut;

impl FeatureGenerator for HdrOut {
    fn emit_pixel(&self, ctx: &mut EmitContext<'_>) {
        ctx.pixel("col = hdrEncode(col);");
    }

    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

/// Generator for marker features that only influence state derivation.
pub struct Marker;

impl FeatureGenerator for Marker {
    fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
        Resources::NONE
    }
}

/// Register a generator for every built-in feature type.
pub fn register_builtin(registry: &mut FeatureRegistry) {
    registry.register(builtin::VERT_TRANSFORM, VertTransform);
    registry.register(builtin::TEX_ANIM, TexAnim);
    registry.register(builtin::PARALLAX, Parallax);
    registry.register(builtin::DIFFUSE_MAP, DiffuseMap);
    registry.register(builtin::OVERLAY_MAP, OverlayMap);
    registry.register(builtin::DETAIL_MAP, DetailMap);
    registry.register(builtin::DIFFUSE_COLOR, DiffuseColor);
    registry.register(builtin::NORMAL_MAP, NormalMap);
    registry.register(builtin::SPECULAR_MAP, SpecularMap);
    registry.register(builtin::ALPHA_TEST, AlphaTest);
    registry.register(builtin::VERT_LIT, VertLit);
    registry.register(builtin::LIGHT_MAP, LightMap);
    registry.register(builtin::TONE_MAP, ToneMap);
    registry.register(builtin::RT_LIGHTING, RtLighting);
    registry.register(builtin::PIX_SPECULAR, PixSpecular);
    registry.register(builtin::CUBE_MAP, CubeMap);
    registry.register(builtin::FOG, Fog);
    registry.register(builtin::VISIBILITY, Visibility);
    registry.register(builtin::GLOW_MASK, GlowMask);
    registry.register(builtin::PREPASS_CONDITIONER, PrePassConditioner);
    registry.register(builtin::DEPTH_OUT, DepthOut);
    registry.register(builtin::HDR_OUT, HdrOut);
    registry.register(builtin::IS_TRANSLUCENT, Marker);
    registry.register(builtin::IS_TRANSLUCENT_ZWRITE, Marker);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(set: &FeatureSet, registry: &FeatureRegistry) -> Resources {
        let mut total = Resources::NONE;
        for info in set {
            if let Some(generator) = registry.lookup(info.ty.id) {
                total += generator.resources(set, info.index);
            }
        }
        total
    }

    #[test]
    fn test_stage_coordinate_charged_once() {
        let registry = FeatureRegistry::with_builtin();
        let mut set = FeatureSet::new();
        set.add(builtin::DIFFUSE_MAP, Some(0));
        set.add(builtin::DETAIL_MAP, Some(0));
        set.add(builtin::SPECULAR_MAP, Some(0));
        assert_eq!(measure(&set, &registry), Resources::new(3, 1));
    }

    #[test]
    fn test_normal_map_shares_with_parallax() {
        let registry = FeatureRegistry::with_builtin();
        let mut set = FeatureSet::new();
        set.add(builtin::NORMAL_MAP, Some(0));
        let alone = measure(&set, &registry);
        assert_eq!(alone, Resources::new(1, 1 + TANGENT_FRAME_INTERPOLATORS));

        set.add(builtin::PARALLAX, Some(0));
        // Parallax takes the sampler and the coordinate, plus its eye vector.
        assert_eq!(measure(&set, &registry), Resources::new(1, 2 + TANGENT_FRAME_INTERPOLATORS));
    }

    #[test]
    fn test_tangent_frame_shared_between_stages() {
        let registry = FeatureRegistry::with_builtin();
        let mut set = FeatureSet::new();
        for stage in 0..3 {
            set.add(builtin::DETAIL_MAP, Some(stage));
            set.add(builtin::NORMAL_MAP, Some(stage));
        }
        assert_eq!(measure(&set, &registry), Resources::new(6, 3 + TANGENT_FRAME_INTERPOLATORS));
    }

    #[test]
    fn test_tone_maps_share_one_coordinate() {
        let registry = FeatureRegistry::with_builtin();
        let mut set = FeatureSet::new();
        set.add(builtin::TONE_MAP, Some(0));
        set.add(builtin::TONE_MAP, Some(1));
        assert_eq!(measure(&set, &registry), Resources::new(2, 1));

        set.add(builtin::LIGHT_MAP, None);
        assert_eq!(measure(&set, &registry), Resources::new(3, 1));
    }

    #[test]
    fn test_parallax_binds_normal_map_sampler() {
        let registry = FeatureRegistry::with_builtin();
        let mut bindings = TexBindings::new();
        for ty in [builtin::PARALLAX, builtin::NORMAL_MAP] {
            registry
                .lookup(ty.id)
                .unwrap()
                .set_tex_data(Some(1), &mut bindings);
        }
        assert_eq!(bindings.len(), 1);
        let binding = bindings.iter().next().unwrap();
        assert_eq!(binding.name, "bumpMap1");
        assert_eq!(
            binding.source,
            TexSource::Map {
                stage: 1,
                kind: MapKind::Normal
            }
        );
    }
}
