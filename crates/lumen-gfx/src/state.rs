//! Fixed-function state descriptions.
//!
//! A [`StateBlockDesc`] is sparse: every field is optional, and layering one
//! description over another with [`StateBlockDesc::add_desc`] lets later layers
//! override only what they set. Materials build their per-pass state by stacking
//! a base layer, a layer per render condition and a pass-specific layer, then
//! resolve the result into a dense [`StateBlockData`] for the device.

use wgpu::{AddressMode, BlendFactor, BlendOperation, ColorWrites, CompareFunction, FilterMode, PolygonMode, StencilOperation};

/// Number of sampler slots a state block can describe.
pub const MAX_SAMPLER_SLOTS: usize = 16;

/// Colour blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendDesc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
    pub op: BlendOperation,
}

impl BlendDesc {
    pub const REPLACE: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::Zero,
        op: BlendOperation::Add,
    };

    pub const ALPHA: Self = Self {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::OneMinusSrcAlpha,
        op: BlendOperation::Add,
    };

    pub const ADDITIVE: Self = Self {
        src: BlendFactor::One,
        dst: BlendFactor::One,
        op: BlendOperation::Add,
    };

    pub const MULTIPLY: Self = Self {
        src: BlendFactor::Dst,
        dst: BlendFactor::Zero,
        op: BlendOperation::Add,
    };

    pub fn to_wgpu(self) -> wgpu::BlendComponent {
        wgpu::BlendComponent {
            src_factor: self.src,
            dst_factor: self.dst,
            operation: self.op,
        }
    }
}

/// Face culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    None,
    Front,
    #[default]
    Back,
}

impl CullMode {
    pub fn to_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        }
    }

    /// The mode that culls the opposite faces; `None` stays `None`.
    pub fn flipped(self) -> Self {
        match self {
            CullMode::None => CullMode::None,
            CullMode::Front => CullMode::Back,
            CullMode::Back => CullMode::Front,
        }
    }
}

/// Sampler configuration for one texture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerState {
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
}

impl SamplerState {
    pub const WRAP_LINEAR: Self = Self {
        address_u: AddressMode::Repeat,
        address_v: AddressMode::Repeat,
        min_filter: FilterMode::Linear,
        mag_filter: FilterMode::Linear,
    };

    pub const CLAMP_LINEAR: Self = Self {
        address_u: AddressMode::ClampToEdge,
        address_v: AddressMode::ClampToEdge,
        min_filter: FilterMode::Linear,
        mag_filter: FilterMode::Linear,
    };

    pub const CLAMP_POINT: Self = Self {
        address_u: AddressMode::ClampToEdge,
        address_v: AddressMode::ClampToEdge,
        min_filter: FilterMode::Nearest,
        mag_filter: FilterMode::Nearest,
    };
}

impl Default for SamplerState {
    fn default() -> Self {
        Self::WRAP_LINEAR
    }
}

/// Stencil test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilState {
    pub compare: CompareFunction,
    pub fail_op: StencilOperation,
    pub depth_fail_op: StencilOperation,
    pub pass_op: StencilOperation,
    pub reference: u32,
    pub read_mask: u32,
    pub write_mask: u32,
}

impl Default for StencilState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
            reference: 0,
            read_mask: 0xff,
            write_mask: 0xff,
        }
    }
}

/// Sparse state description. `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateBlockDesc {
    pub blend_enable: Option<bool>,
    pub blend: Option<BlendDesc>,
    pub alpha_test_enable: Option<bool>,
    /// Alpha test reference in 0..=255.
    pub alpha_test_ref: Option<u8>,
    pub alpha_test_func: Option<CompareFunction>,
    pub cull: Option<CullMode>,
    pub depth_enable: Option<bool>,
    pub depth_write: Option<bool>,
    pub depth_compare: Option<CompareFunction>,
    pub fill_mode: Option<PolygonMode>,
    pub color_writes: Option<ColorWrites>,
    pub stencil_enable: Option<bool>,
    pub stencil: Option<StencilState>,
    /// Per-slot sampler overrides; shorter than [`MAX_SAMPLER_SLOTS`] is fine.
    pub samplers: Vec<Option<SamplerState>>,
}

impl StateBlockDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer `other` over `self`: every field `other` sets wins.
    pub fn add_desc(&mut self, other: &StateBlockDesc) {
        fn take<T: Copy>(dst: &mut Option<T>, src: Option<T>) {
            if src.is_some() {
                *dst = src;
            }
        }

        take(&mut self.blend_enable, other.blend_enable);
        take(&mut self.blend, other.blend);
        take(&mut self.alpha_test_enable, other.alpha_test_enable);
        take(&mut self.alpha_test_ref, other.alpha_test_ref);
        take(&mut self.alpha_test_func, other.alpha_test_func);
        take(&mut self.cull, other.cull);
        take(&mut self.depth_enable, other.depth_enable);
        take(&mut self.depth_write, other.depth_write);
        take(&mut self.depth_compare, other.depth_compare);
        take(&mut self.fill_mode, other.fill_mode);
        take(&mut self.color_writes, other.color_writes);
        take(&mut self.stencil_enable, other.stencil_enable);
        take(&mut self.stencil, other.stencil);

        if self.samplers.len() < other.samplers.len() {
            self.samplers.resize(other.samplers.len(), None);
        }
        for (slot, sampler) in other.samplers.iter().enumerate() {
            if sampler.is_some() {
                self.samplers[slot] = *sampler;
            }
        }
    }

    /// Enable blending with the given equation.
    pub fn set_blend(&mut self, blend: BlendDesc) -> &mut Self {
        self.blend_enable = Some(true);
        self.blend = Some(blend);
        self
    }

    pub fn set_alpha_test(&mut self, reference: u8, func: CompareFunction) -> &mut Self {
        self.alpha_test_enable = Some(true);
        self.alpha_test_ref = Some(reference);
        self.alpha_test_func = Some(func);
        self
    }

    pub fn set_cull(&mut self, cull: CullMode) -> &mut Self {
        self.cull = Some(cull);
        self
    }

    pub fn set_z_read_write(&mut self, enable: bool, write: bool) -> &mut Self {
        self.depth_enable = Some(enable);
        self.depth_write = Some(write);
        self
    }

    pub fn set_sampler(&mut self, slot: usize, sampler: SamplerState) -> &mut Self {
        if self.samplers.len() <= slot {
            self.samplers.resize(slot + 1, None);
        }
        self.samplers[slot] = Some(sampler);
        self
    }

    /// Fill every unset field with the device default.
    pub fn resolve(&self) -> StateBlockData {
        if self.samplers.len() > MAX_SAMPLER_SLOTS {
            tracing::warn!(
                "State block sets {} samplers, only the first {} are kept",
                self.samplers.len(),
                MAX_SAMPLER_SLOTS
            );
        }
        let mut samplers = [SamplerState::default(); MAX_SAMPLER_SLOTS];
        for (slot, sampler) in self.samplers.iter().enumerate().take(MAX_SAMPLER_SLOTS) {
            if let Some(sampler) = sampler {
                samplers[slot] = *sampler;
            }
        }

        StateBlockData {
            blend_enable: self.blend_enable.unwrap_or(false),
            blend: self.blend.unwrap_or(BlendDesc::REPLACE),
            alpha_test_enable: self.alpha_test_enable.unwrap_or(false),
            alpha_test_ref: self.alpha_test_ref.unwrap_or(0),
            alpha_test_func: self.alpha_test_func.unwrap_or(CompareFunction::GreaterEqual),
            cull: self.cull.unwrap_or_default(),
            depth_enable: self.depth_enable.unwrap_or(true),
            depth_write: self.depth_write.unwrap_or(true),
            depth_compare: self.depth_compare.unwrap_or(CompareFunction::LessEqual),
            fill_mode: self.fill_mode.unwrap_or(PolygonMode::Fill),
            color_writes: self.color_writes.unwrap_or(ColorWrites::ALL),
            stencil_enable: self.stencil_enable.unwrap_or(false),
            stencil: self.stencil.unwrap_or_default(),
            samplers,
        }
    }
}

/// Dense, fully resolved state handed to [`crate::GfxDevice::create_state_block`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateBlockData {
    pub blend_enable: bool,
    pub blend: BlendDesc,
    pub alpha_test_enable: bool,
    pub alpha_test_ref: u8,
    pub alpha_test_func: CompareFunction,
    pub cull: CullMode,
    pub depth_enable: bool,
    pub depth_write: bool,
    pub depth_compare: CompareFunction,
    pub fill_mode: PolygonMode,
    pub color_writes: ColorWrites,
    pub stencil_enable: bool,
    pub stencil: StencilState,
    pub samplers: [SamplerState; MAX_SAMPLER_SLOTS],
}

impl Default for StateBlockData {
    fn default() -> Self {
        StateBlockDesc::default().resolve()
    }
}

impl StateBlockData {
    /// Blend state for a wgpu colour target, `None` when blending is off.
    pub fn blend_state(&self) -> Option<wgpu::BlendState> {
        self.blend_enable.then(|| wgpu::BlendState {
            color: self.blend.to_wgpu(),
            alpha: self.blend.to_wgpu(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_desc_overrides_only_set_fields() {
        let mut base = StateBlockDesc::new();
        base.set_cull(CullMode::Back).set_z_read_write(true, true);

        let mut translucent = StateBlockDesc::new();
        translucent.set_blend(BlendDesc::ALPHA);
        translucent.depth_write = Some(false);

        base.add_desc(&translucent);
        assert_eq!(base.cull, Some(CullMode::Back));
        assert_eq!(base.depth_enable, Some(true));
        assert_eq!(base.depth_write, Some(false));
        assert_eq!(base.blend, Some(BlendDesc::ALPHA));
    }

    #[test]
    fn test_add_desc_merges_samplers() {
        let mut a = StateBlockDesc::new();
        a.set_sampler(0, SamplerState::CLAMP_LINEAR);
        let mut b = StateBlockDesc::new();
        b.set_sampler(2, SamplerState::CLAMP_POINT);

        a.add_desc(&b);
        assert_eq!(a.samplers.len(), 3);
        assert_eq!(a.samplers[0], Some(SamplerState::CLAMP_LINEAR));
        assert_eq!(a.samplers[1], None);
        assert_eq!(a.samplers[2], Some(SamplerState::CLAMP_POINT));
    }

    #[test]
    fn test_resolve_defaults() {
        let data = StateBlockDesc::new().resolve();
        assert!(!data.blend_enable);
        assert!(data.depth_enable);
        assert!(data.depth_write);
        assert_eq!(data.cull, CullMode::Back);
        assert_eq!(data.fill_mode, PolygonMode::Fill);
        assert_eq!(data.samplers[5], SamplerState::WRAP_LINEAR);
        assert!(data.blend_state().is_none());
    }

    #[test]
    fn test_cull_flip() {
        assert_eq!(CullMode::Back.flipped(), CullMode::Front);
        assert_eq!(CullMode::None.flipped(), CullMode::None);
        assert_eq!(CullMode::Front.to_wgpu(), Some(wgpu::Face::Front));
    }
}
