//! Vertex layouts.
//!
//! Feature generators inspect the vertex format of the geometry a material is
//! built for: normal mapping needs tangents, light maps need a second set of
//! texture coordinates, and so on.

/// What a vertex element carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexSemantic {
    Position,
    Normal,
    Tangent,
    Binormal,
    Color,
    /// Texture coordinate set `n`.
    TexCoord(u8),
}

impl VertexSemantic {
    /// Name used for the element in generated shader inputs.
    pub fn shader_name(&self) -> String {
        match self {
            VertexSemantic::Position => "position".to_string(),
            VertexSemantic::Normal => "normal".to_string(),
            VertexSemantic::Tangent => "tangent".to_string(),
            VertexSemantic::Binormal => "binormal".to_string(),
            VertexSemantic::Color => "color".to_string(),
            VertexSemantic::TexCoord(n) => format!("texcoord{}", n),
        }
    }
}

/// A single element of a vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    pub semantic: VertexSemantic,
    pub format: wgpu::VertexFormat,
}

/// An ordered vertex layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexFormat {
    elements: Vec<VertexElement>,
}

impl VertexFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element, builder style.
    pub fn with(mut self, semantic: VertexSemantic, format: wgpu::VertexFormat) -> Self {
        self.elements.push(VertexElement { semantic, format });
        self
    }

    /// Position, normal and one texcoord set.
    pub fn position_normal_uv() -> Self {
        Self::new()
            .with(VertexSemantic::Position, wgpu::VertexFormat::Float32x3)
            .with(VertexSemantic::Normal, wgpu::VertexFormat::Float32x3)
            .with(VertexSemantic::TexCoord(0), wgpu::VertexFormat::Float32x2)
    }

    /// Position, normal, tangent and one texcoord set.
    pub fn position_normal_tangent_uv() -> Self {
        Self::position_normal_uv().with(VertexSemantic::Tangent, wgpu::VertexFormat::Float32x4)
    }

    /// Position, normal, tangent and two texcoord sets (the second for light maps).
    pub fn position_normal_tangent_uv2() -> Self {
        Self::position_normal_tangent_uv()
            .with(VertexSemantic::TexCoord(1), wgpu::VertexFormat::Float32x2)
    }

    /// Position and colour only, as used by debug geometry.
    pub fn position_color() -> Self {
        Self::new()
            .with(VertexSemantic::Position, wgpu::VertexFormat::Float32x3)
            .with(VertexSemantic::Color, wgpu::VertexFormat::Unorm8x4)
    }

    pub fn elements(&self) -> &[VertexElement] {
        &self.elements
    }

    pub fn has(&self, semantic: VertexSemantic) -> bool {
        self.elements.iter().any(|e| e.semantic == semantic)
    }

    pub fn has_normal(&self) -> bool {
        self.has(VertexSemantic::Normal)
    }

    pub fn has_tangent(&self) -> bool {
        self.has(VertexSemantic::Tangent)
    }

    pub fn has_color(&self) -> bool {
        self.has(VertexSemantic::Color)
    }

    pub fn texcoord_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e.semantic, VertexSemantic::TexCoord(_)))
            .count()
    }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> u64 {
        self.elements.iter().map(|e| e.format.size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let basic = VertexFormat::position_normal_uv();
        assert!(basic.has_normal());
        assert!(!basic.has_tangent());
        assert_eq!(basic.texcoord_count(), 1);
        assert_eq!(basic.stride(), 12 + 12 + 8);

        let lightmapped = VertexFormat::position_normal_tangent_uv2();
        assert!(lightmapped.has_tangent());
        assert_eq!(lightmapped.texcoord_count(), 2);
    }

    #[test]
    fn test_shader_names() {
        assert_eq!(VertexSemantic::TexCoord(1).shader_name(), "texcoord1");
        assert_eq!(VertexSemantic::Position.shader_name(), "position");
    }
}
