//! Pass construction with resource-aware retry.
//!
//! Layers (resolved stages) are packed into as few passes as the hardware
//! budget allows. When the layers still eligible for a pass overflow the
//! texture or interpolator budget, or fail to compile, the eligible count is
//! reduced with `count -= count / 2` and the pass is retried. The layers a
//! pass could not take become the input of the next pass. Only a single layer
//! that still fails is fatal.

use lumen_core::profiling::{profile_function, profile_scope};
use lumen_gfx::{GfxDevice, HardwareLimits, SamplerState, ShaderDesc, ShaderHandle, VertexFormat};

use super::state::{self, PassStateInputs};
use super::{ConstantTable, Pass, STATE_COUNT};
use crate::error::PassBuildError;
use crate::features::{FeatureRegistry, FeatureSet, Resources, TexSource};
use crate::material::{BlendOp, StageFeatures};
use crate::shader::ShaderAssembler;

/// The eligible-count sequence of one pass: `n`, then `n - n / 2`, down to 1.
///
/// Yields at most `ceil(log2(n)) + 1` values.
#[derive(Debug, Clone)]
pub struct HalvingRetry {
    next: usize,
}

impl HalvingRetry {
    pub fn new(count: usize) -> Self {
        Self { next: count }
    }
}

impl Iterator for HalvingRetry {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.next;
        if current == 0 {
            return None;
        }
        self.next = if current == 1 { 0 } else { current - current / 2 };
        Some(current)
    }
}

/// Builds the passes of one material.
pub struct PassBuilder<'a> {
    device: &'a dyn GfxDevice,
    assembler: ShaderAssembler<'a>,
    limits: HardwareLimits,
    label: &'a str,
    state_inputs: PassStateInputs,
}

impl<'a> PassBuilder<'a> {
    pub fn new(
        device: &'a dyn GfxDevice,
        registry: &'a FeatureRegistry,
        vertex_format: &'a VertexFormat,
        limits: HardwareLimits,
        label: &'a str,
        state_inputs: PassStateInputs,
    ) -> Self {
        Self {
            device,
            assembler: ShaderAssembler::new(registry, vertex_format),
            limits,
            label,
            state_inputs,
        }
    }

    /// Whether `resources` fit the hardware budget.
    pub fn fits(&self, resources: Resources) -> bool {
        resources.tex_slots < self.limits.max_texture_slots
            && resources.interpolators <= self.limits.max_interpolators
    }

    /// Pack every layer into passes, in order.
    ///
    /// On error, passes built so far are destroyed before returning.
    pub fn build_passes(&self, layers: &[StageFeatures]) -> Result<Vec<Pass>, PassBuildError> {
        profile_function!();
        if layers.is_empty() {
            return Err(PassBuildError::NoLayers);
        }

        let mut passes: Vec<Pass> = Vec::new();
        let mut start = 0;
        while start < layers.len() {
            match self.build_pass(&layers[start..], passes.len()) {
                Ok((pass, consumed)) => {
                    start += consumed;
                    passes.push(pass);
                }
                Err(err) => {
                    for pass in &passes {
                        pass.destroy(self.device);
                    }
                    return Err(err);
                }
            }
        }
        Ok(passes)
    }

    /// Build one pass from a prefix of `layers`, returning it with the number
    /// of layers it consumed.
    pub fn build_pass(&self, layers: &[StageFeatures], pass_index: usize) -> Result<(Pass, usize), PassBuildError> {
        profile_scope!("build_pass");
        let Some(first) = layers.first() else {
            return Err(PassBuildError::NoLayers);
        };

        for count in HalvingRetry::new(layers.len()) {
            let subset = &layers[..count];
            let mut set = FeatureSet::new();
            for layer in subset {
                set.merge(&layer.features);
            }
            if set.is_empty() {
                return Err(PassBuildError::EmptyFeatureSet { stage: first.stage });
            }

            let resources = self.assembler.measure(&set);
            if !self.fits(resources) {
                if count == 1 {
                    tracing::warn!(
                        "'{}' stage {} alone needs {} texture slots and {} interpolators (limits {} / {})",
                        self.label,
                        first.stage,
                        resources.tex_slots,
                        resources.interpolators,
                        self.limits.max_texture_slots,
                        self.limits.max_interpolators
                    );
                    return Err(PassBuildError::SingleLayerOverflow {
                        stage: first.stage,
                        textures: resources.tex_slots,
                        interpolators: resources.interpolators,
                    });
                }
                tracing::debug!(
                    "'{}' pass {}: {} layers need {} texture slots and {} interpolators, retrying with fewer",
                    self.label,
                    pass_index,
                    count,
                    resources.tex_slots,
                    resources.interpolators
                );
                continue;
            }

            let desc = self
                .assembler
                .assemble(&format!("{}:{}", self.label, pass_index), &set);
            match self.device.create_shader(&desc) {
                Ok(shader) => {
                    let pass = self.finish_pass(shader, &desc, set, subset, pass_index, resources);
                    return Ok((pass, count));
                }
                Err(err) if count == 1 => {
                    tracing::warn!("'{}' stage {} failed to compile: {}", self.label, first.stage, err);
                    return Err(PassBuildError::SingleLayerCompile {
                        stage: first.stage,
                        source: err,
                    });
                }
                Err(err) => {
                    tracing::debug!(
                        "'{}' pass {}: compile failed with {} layers ({}), retrying with fewer",
                        self.label,
                        pass_index,
                        count,
                        err
                    );
                }
            }
        }

        // HalvingRetry always ends with a single-layer attempt, which returns.
        Err(PassBuildError::NoLayers)
    }

    fn finish_pass(
        &self,
        shader: ShaderHandle,
        desc: &ShaderDesc,
        features: FeatureSet,
        layers: &[StageFeatures],
        pass_index: usize,
        resources: Resources,
    ) -> Pass {
        let tex_bindings = self.assembler.tex_bindings(&features);
        let samplers: Vec<SamplerState> = tex_bindings
            .iter()
            .map(|binding| match binding.source {
                TexSource::Map { stage, .. } => layers
                    .iter()
                    .find(|layer| layer.stage == stage as usize)
                    .map(|layer| layer.sampler)
                    .unwrap_or_default(),
                TexSource::LightMap => SamplerState::CLAMP_LINEAR,
            })
            .collect();

        let blend_op = if pass_index == 0 {
            BlendOp::None
        } else {
            BlendOp::LerpAlpha
        };
        let inputs = PassStateInputs {
            pass_blend_op: blend_op,
            samplers: samplers.clone(),
            ..self.state_inputs.clone()
        };
        let states: [_; STATE_COUNT] = std::array::from_fn(|bits| {
            let data = state::derive_state(&inputs, state::RenderConditions::from_bits_truncate(bits as u8)).resolve();
            self.device.create_state_block(&data)
        });

        Pass {
            shader,
            constants: ConstantTable::from_desc(desc),
            states,
            stages: layers.iter().map(|layer| layer.stage).collect(),
            features,
            tex_bindings,
            samplers,
            resources,
            blend_op,
        }
    }
}
