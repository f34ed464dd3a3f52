//! The feature generator interface and the code accumulator it writes into.

use std::ops::AddAssign;

use lumen_gfx::{SamplerDecl, ShaderDesc, UniformDecl, UniformType, VertexFormat};

use super::FeatureSet;

/// Resource cost declared by one feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resources {
    pub tex_slots: u32,
    pub interpolators: u32,
}

impl Resources {
    pub const NONE: Resources = Resources {
        tex_slots: 0,
        interpolators: 0,
    };

    pub const fn new(tex_slots: u32, interpolators: u32) -> Self {
        Self {
            tex_slots,
            interpolators,
        }
    }
}

impl AddAssign for Resources {
    fn add_assign(&mut self, rhs: Self) {
        self.tex_slots += rhs.tex_slots;
        self.interpolators += rhs.interpolators;
    }
}

/// Which authored map of a stage a texture slot samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    Diffuse,
    Overlay,
    Detail,
    Normal,
    Specular,
    Cube,
    ToneMap,
}

/// Where the texture bound to a slot comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexSource {
    /// A map authored on a material stage.
    Map { stage: u8, kind: MapKind },
    /// The light map supplied per draw by the scene.
    LightMap,
}

/// A texture slot of a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TexBinding {
    pub slot: u32,
    /// Sampler name in the generated program.
    pub name: String,
    pub source: TexSource,
}

/// Texture slot assignments collected from generators.
///
/// Slots are handed out in call order and keyed by sampler name, mirroring
/// [`EmitContext::sampler`], so emission and binding agree on slot numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TexBindings {
    bindings: Vec<TexBinding>,
}

impl TexBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `source` to the sampler `name`, returning its slot.
    pub fn bind(&mut self, name: impl Into<String>, source: TexSource) -> u32 {
        let name = name.into();
        if let Some(existing) = self.bindings.iter().find(|b| b.name == name) {
            return existing.slot;
        }
        let slot = self.bindings.len() as u32;
        self.bindings.push(TexBinding { slot, name, source });
        slot
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TexBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Generated code being accumulated for one program.
#[derive(Debug, Clone, Default)]
pub struct ShaderCode {
    uniforms: Vec<UniformDecl>,
    samplers: Vec<SamplerDecl>,
    varyings: Vec<(String, UniformType)>,
    vertex: Vec<String>,
    pixel: Vec<String>,
}

impl ShaderCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the final program description.
    pub fn finish(self, label: &str, features: &FeatureSet) -> ShaderDesc {
        let mut vertex = String::new();
        let mut pixel = String::new();

        for uniform in &self.uniforms {
            let line = format!("uniform {}: {};\n", uniform.name, uniform.ty.shader_type());
            vertex.push_str(&line);
            pixel.push_str(&line);
        }
        for sampler in &self.samplers {
            pixel.push_str(&format!(
                "@binding({}) var {}: texture_2d<f32>;\n",
                sampler.slot, sampler.name
            ));
        }
        for (name, ty) in &self.varyings {
            let line = format!("varying {}: {};\n", name, ty.shader_type());
            vertex.push_str(&line);
            pixel.push_str(&line);
        }

        vertex.push_str("fn vs_main() {\n");
        for line in &self.vertex {
            vertex.push_str("    ");
            vertex.push_str(line);
            vertex.push('\n');
        }
        vertex.push_str("}\n");

        pixel.push_str("fn fs_main() -> vec4<f32> {\n    var col = vec4<f32>(1.0);\n");
        for line in &self.pixel {
            pixel.push_str("    ");
            pixel.push_str(line);
            pixel.push('\n');
        }
        pixel.push_str("    return col;\n}\n");

        ShaderDesc {
            label: label.to_string(),
            vertex_source: vertex,
            pixel_source: pixel,
            interpolators: self.varyings.len() as u32,
            uniforms: self.uniforms,
            samplers: self.samplers,
            features: features.names(),
        }
    }
}

/// What a generator sees while emitting code for one feature entry.
pub struct EmitContext<'a> {
    /// The complete set being assembled.
    pub features: &'a FeatureSet,
    /// Stage index of the entry being emitted.
    pub index: Option<u8>,
    pub vertex_format: &'a VertexFormat,
    code: &'a mut ShaderCode,
}

impl<'a> EmitContext<'a> {
    pub fn new(
        features: &'a FeatureSet,
        index: Option<u8>,
        vertex_format: &'a VertexFormat,
        code: &'a mut ShaderCode,
    ) -> Self {
        Self {
            features,
            index,
            vertex_format,
            code,
        }
    }

    /// `base` suffixed with the stage index, e.g. `diffuseMap2`.
    pub fn indexed(&self, base: &str) -> String {
        match self.index {
            Some(index) => format!("{}{}", base, index),
            None => base.to_string(),
        }
    }

    /// Declare a shader constant. Repeated declarations are merged.
    pub fn uniform(&mut self, name: impl Into<String>, ty: UniformType) -> String {
        let name = name.into();
        if !self.code.uniforms.iter().any(|u| u.name == name) {
            self.code.uniforms.push(UniformDecl {
                name: name.clone(),
                ty,
            });
        }
        name
    }

    /// Declare a sampler, returning its slot. Repeated names share a slot.
    pub fn sampler(&mut self, name: impl Into<String>) -> u32 {
        let name = name.into();
        if let Some(existing) = self.code.samplers.iter().find(|s| s.name == name) {
            return existing.slot;
        }
        let slot = self.code.samplers.len() as u32;
        self.code.samplers.push(SamplerDecl { name, slot });
        slot
    }

    /// Declare a vertex-to-pixel interpolator. Repeated names are merged.
    pub fn varying(&mut self, name: impl Into<String>, ty: UniformType) -> String {
        let name = name.into();
        if !self.code.varyings.iter().any(|(n, _)| *n == name) {
            self.code.varyings.push((name.clone(), ty));
        }
        name
    }

    pub fn vertex(&mut self, line: impl Into<String>) {
        self.code.vertex.push(line.into());
    }

    pub fn pixel(&mut self, line: impl Into<String>) {
        self.code.pixel.push(line.into());
    }
}

/// Emits the code for one feature type and declares what it costs.
///
/// One generator is registered per [`FeatureType`](super::FeatureType). The
/// same generator serves every stage index of its type; the index arrives
/// through [`EmitContext::index`] and the `index` arguments.
pub trait FeatureGenerator: Send + Sync {
    fn emit_vertex(&self, _ctx: &mut EmitContext<'_>) {}

    fn emit_pixel(&self, _ctx: &mut EmitContext<'_>) {}

    /// Texture slots and interpolators this entry consumes within `set`.
    fn resources(&self, set: &FeatureSet, index: Option<u8>) -> Resources;

    /// Record the textures this entry samples.
    fn set_tex_data(&self, _index: Option<u8>, _bindings: &mut TexBindings) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_share_slots_by_name() {
        let mut bindings = TexBindings::new();
        let source = TexSource::Map {
            stage: 0,
            kind: MapKind::Normal,
        };
        assert_eq!(bindings.bind("bumpMap0", source), 0);
        assert_eq!(bindings.bind("diffuseMap0", source), 1);
        assert_eq!(bindings.bind("bumpMap0", source), 0);
        assert_eq!(bindings.len(), 2);
    }

    #[test]
    fn test_code_finish() {
        let set = FeatureSet::new();
        let format = VertexFormat::position_normal_uv();
        let mut code = ShaderCode::new();
        {
            let mut ctx = EmitContext::new(&set, Some(1), &format, &mut code);
            let name = ctx.indexed("diffuseMap");
            assert_eq!(ctx.sampler(name.clone()), 0);
            assert_eq!(ctx.sampler(name), 0);
            ctx.uniform("visibility", UniformType::Float);
            ctx.varying("texCoord", UniformType::Float2);
            ctx.pixel("col *= visibility;");
        }
        let desc = code.finish("test", &set);
        assert_eq!(desc.samplers.len(), 1);
        assert_eq!(desc.interpolators, 1);
        assert!(desc.has_uniform("visibility"));
        assert!(desc.pixel_source.contains("col *= visibility;"));
    }
}
