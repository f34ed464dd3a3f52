use std::sync::Arc;

use lumen_gfx::{CullMode, VertexFormat};
use lumen_render::material::BlendOp;
use lumen_render::pass::STATE_COUNT;
use lumen_render::{FeatureRegistry, Material, MaterialConfig, MaterialStage, ProcessedMaterial, RenderConditions};
use lumen_test_utils::MockGfxDevice;

fn build(mock: &Arc<MockGfxDevice>, material: &Arc<Material>) -> ProcessedMaterial {
    ProcessedMaterial::init(
        mock.clone(),
        &FeatureRegistry::with_builtin(),
        &MaterialConfig::default(),
        material.clone(),
        &VertexFormat::position_normal_uv(),
        None,
    )
    .unwrap()
}

fn decal() -> Arc<Material> {
    let mut material = Material::new("decal")
        .with_stage(MaterialStage::diffuse("decal.png"))
        .with_stage(MaterialStage::diffuse("grime.png"));
    material.alpha_test = true;
    material.alpha_ref = 128;
    material.translucent_blend_op = BlendOp::Add;
    Arc::new(material)
}

#[test]
fn test_all_sixteen_states_are_reproducible() {
    let mock = Arc::new(MockGfxDevice::new());
    let material = decal();
    let first = build(&mock, &material);
    let second = build(&mock, &material);

    for bits in 0..STATE_COUNT as u8 {
        let conditions = RenderConditions::from_bits_truncate(bits);
        for pass in 0..first.num_passes() {
            let a = mock.state_block(first.pass(pass).unwrap().state(conditions)).unwrap();
            let b = mock.state_block(second.pass(pass).unwrap().state(conditions)).unwrap();
            assert_eq!(a, b, "pass {} conditions {:?}", pass, conditions);
        }
    }
}

#[test]
fn test_layered_states_compose() {
    let mock = Arc::new(MockGfxDevice::new());
    let processed = build(&mock, &decal());
    let pass = processed.pass(0).unwrap();

    let opaque = mock.state_block(pass.state(RenderConditions::empty())).unwrap();
    assert!(opaque.depth_write);
    assert!(opaque.alpha_test_enable);
    assert_eq!(opaque.alpha_test_ref, 128);
    assert_eq!(opaque.cull, CullMode::Back);

    let translucent_reflect =
        mock.state_block(pass.state(RenderConditions::TRANSLUCENT | RenderConditions::REFLECT)).unwrap();
    assert!(translucent_reflect.blend_enable);
    assert!(!translucent_reflect.depth_write);
    assert_eq!(translucent_reflect.cull, CullMode::Front);

    let wire = mock.state_block(pass.state(RenderConditions::all())).unwrap();
    assert_eq!(wire.fill_mode, wgpu::PolygonMode::Line);
}
