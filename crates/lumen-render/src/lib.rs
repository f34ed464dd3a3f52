//! Lumen Render
//!
//! Turns authored materials into shader passes and dispatches per-frame
//! draw submissions through render bins.
//!
//! The material side runs in three steps. The [`FeatureResolver`] expands
//! each [`MaterialStage`] into a [`FeatureSet`]; the [`PassBuilder`] packs
//! stages into as few passes as the hardware budget allows, halving the
//! number of stages per pass whenever a pass overflows or fails to compile;
//! the resulting [`ProcessedMaterial`] exposes the per-draw contract
//! (`setup_pass`, `set_transforms`, `set_scene_info`, `set_texture_stages`,
//! `set_buffers`, `cleanup`).
//!
//! The frame side is the [`RenderPassManager`]: every [`RenderInst`] is
//! offered to the bins in process-add order, then each bin sorts and draws
//! its claims in render order.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lumen_render::*;
//!
//! let registry = Arc::new(FeatureRegistry::with_builtin());
//! let mut materials = MaterialManager::new(device.clone(), registry, MaterialConfig::default());
//! let rock = materials.create_instance(
//!     Arc::new(Material::new("rock").with_stage(MaterialStage::diffuse("rock.png"))),
//!     lumen_gfx::VertexFormat::position_normal_uv(),
//! );
//!
//! let mut passes = RenderPassManager::new();
//! passes.add_manager(Box::new(MeshBin::new()));
//! passes.add_manager(Box::new(TranslucentBin::new()));
//!
//! passes.add_inst(&materials, RenderInst::mesh(rock, vb, Some(ib), range));
//! let stats = passes.render_pass(device.as_ref(), &mut materials, &scene);
//! ```

pub mod bins;
pub mod config;
pub mod error;
pub mod features;
pub mod material;
pub mod pass;
pub mod pass_manager;
pub mod processed;
pub mod render_inst;
pub mod scene;
pub mod shader;

pub use bins::{
    AddInstResult, BinCore, GlowBin, MaterialOverride, MeshBin, ObjectBin, ParticleBin, PrePassBin,
    RenderBinManager, RenderContext, TerrainBin, TranslucentBin,
};
pub use config::MaterialConfig;
pub use error::{MaterialError, MaterialResult, PassBuildError};
pub use features::{FeatureGroup, FeatureId, FeatureRegistry, FeatureSet, FeatureType};
pub use material::{
    FeatureResolver, HookKind, MatFlags, MatInstance, MatInstanceId, MatRef, Material, MaterialContext,
    MaterialManager, MaterialStage, StageOverride,
};
pub use pass::{Pass, PassBuilder, RenderConditions};
pub use pass_manager::{FrameStats, RenderPassManager};
pub use processed::ProcessedMaterial;
pub use render_inst::{ObjectRenderDelegate, RenderInst, RenderInstType};
pub use scene::{BinKind, SceneData, SceneRenderState, ScenePassType};
pub use shader::ShaderAssembler;
