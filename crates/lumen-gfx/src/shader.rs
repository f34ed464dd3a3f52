//! Program descriptors handed to the device for compilation.

/// Type of a shader constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformType {
    Float,
    Float2,
    Float3,
    Float4,
    Float4x4,
}

impl UniformType {
    /// Size of the constant in bytes, as uploaded.
    pub fn size(&self) -> usize {
        match self {
            UniformType::Float => 4,
            UniformType::Float2 => 8,
            UniformType::Float3 => 12,
            UniformType::Float4 => 16,
            UniformType::Float4x4 => 64,
        }
    }

    /// Type name in generated source.
    pub fn shader_type(&self) -> &'static str {
        match self {
            UniformType::Float => "f32",
            UniformType::Float2 => "vec2<f32>",
            UniformType::Float3 => "vec3<f32>",
            UniformType::Float4 => "vec4<f32>",
            UniformType::Float4x4 => "mat4x4<f32>",
        }
    }
}

/// A shader constant declared by generated code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniformDecl {
    pub name: String,
    pub ty: UniformType,
}

/// A texture sampler declared by generated code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SamplerDecl {
    pub name: String,
    pub slot: u32,
}

/// Everything the device needs to compile one program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderDesc {
    /// Debug label, usually the material name plus pass index.
    pub label: String,
    pub vertex_source: String,
    pub pixel_source: String,
    pub uniforms: Vec<UniformDecl>,
    pub samplers: Vec<SamplerDecl>,
    /// Names of the features the program was generated from, in emission order.
    pub features: Vec<String>,
    /// Interpolator registers the program uses.
    pub interpolators: u32,
}

impl ShaderDesc {
    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.iter().any(|u| u.name == name)
    }
}
