//! Mock implementation of [`GfxDevice`] for testing.
//!
//! The mock records every operation and keeps just enough state (compiled
//! program descriptions, resolved state blocks, the render target stack) for
//! tests to assert on what the pipeline asked the device to do.

use lumen_gfx::{
    BufferDesc, BufferHandle, ClearFlags, GfxDevice, GfxError, GfxResult, HardwareLimits,
    PrimitiveRange, RenderTargetDesc, RenderTargetHandle, ShaderDesc, ShaderHandle,
    StateBlockData, StateBlockHandle, TextureHandle,
};
use lumen_core::alloc::HashSet;
use parking_lot::Mutex;

/// Records a device call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum GfxCall {
    CreateShader { label: String, features: Vec<String> },
    DestroyShader(ShaderHandle),
    CreateStateBlock(StateBlockHandle),
    DestroyStateBlock(StateBlockHandle),
    LoadTexture { path: String },
    ReleaseTexture(TextureHandle),
    CreateBuffer { label: String, size: u64 },
    DestroyBuffer(BufferHandle),
    CreateRenderTarget { label: String, width: u32, height: u32 },
    DestroyRenderTarget(RenderTargetHandle),
    PushRenderTarget(RenderTargetHandle),
    PopRenderTarget,
    ResolveRenderTarget(RenderTargetHandle),
    Clear(ClearFlags),
    SetShader(ShaderHandle),
    SetShaderConstant { shader: ShaderHandle, name: String, size: usize },
    SetStateBlock(StateBlockHandle),
    SetTexture { slot: u32, texture: Option<TextureHandle> },
    SetVertexBuffer(BufferHandle),
    SetIndexBuffer(Option<BufferHandle>),
    Draw { count: u32, indexed: bool },
}

type CompileFailure = Box<dyn Fn(&ShaderDesc) -> bool + Send + Sync>;

/// Mock implementation of [`GfxDevice`].
///
/// # Example
///
/// ```rust
/// use lumen_gfx::{GfxDevice, HardwareLimits, ShaderDesc};
/// use lumen_test_utils::MockGfxDevice;
///
/// let mock = MockGfxDevice::with_limits(HardwareLimits::with_texture_slots(4));
/// assert_eq!(mock.limits().max_texture_slots, 4);
///
/// mock.fail_compile_when(|desc| desc.samplers.len() > 2);
/// assert!(mock.create_shader(&ShaderDesc::default()).is_ok());
/// ```
pub struct MockGfxDevice {
    calls: Mutex<Vec<GfxCall>>,
    limits: Mutex<HardwareLimits>,

    shaders: Mutex<Vec<Option<ShaderDesc>>>,
    state_blocks: Mutex<Vec<StateBlockData>>,
    textures: Mutex<Vec<String>>,
    next_buffer_id: Mutex<u32>,
    targets: Mutex<Vec<RenderTargetDesc>>,
    target_stack: Mutex<Vec<RenderTargetHandle>>,

    fail_compile: Mutex<Option<CompileFailure>>,
    missing_textures: Mutex<HashSet<String>>,
    fail_targets: Mutex<bool>,
    lost: Mutex<bool>,
}

impl MockGfxDevice {
    /// Create a mock with [`HardwareLimits::default`].
    pub fn new() -> Self {
        Self::with_limits(HardwareLimits::default())
    }

    pub fn with_limits(limits: HardwareLimits) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            limits: Mutex::new(limits),
            shaders: Mutex::new(Vec::new()),
            state_blocks: Mutex::new(Vec::new()),
            textures: Mutex::new(Vec::new()),
            next_buffer_id: Mutex::new(0),
            targets: Mutex::new(Vec::new()),
            target_stack: Mutex::new(Vec::new()),
            fail_compile: Mutex::new(None),
            missing_textures: Mutex::new(HashSet::new()),
            fail_targets: Mutex::new(false),
            lost: Mutex::new(false),
        }
    }

    pub fn set_limits(&self, limits: HardwareLimits) {
        *self.limits.lock() = limits;
    }

    /// Reject every program for which `predicate` returns true.
    pub fn fail_compile_when(&self, predicate: impl Fn(&ShaderDesc) -> bool + Send + Sync + 'static) {
        *self.fail_compile.lock() = Some(Box::new(predicate));
    }

    /// Stop injecting compile failures.
    pub fn clear_compile_failures(&self) {
        *self.fail_compile.lock() = None;
    }

    /// Make [`GfxDevice::load_texture`] fail for `path`.
    pub fn mark_missing(&self, path: impl Into<String>) {
        self.missing_textures.lock().insert(path.into());
    }

    /// Make every render target creation fail.
    pub fn fail_render_targets(&self, fail: bool) {
        *self.fail_targets.lock() = fail;
    }

    /// Simulate device loss: creation calls fail until [`MockGfxDevice::restore`].
    pub fn lose_device(&self) {
        *self.lost.lock() = true;
    }

    pub fn restore(&self) {
        *self.lost.lock() = false;
    }

    pub fn is_lost(&self) -> bool {
        *self.lost.lock()
    }

    /// Get a copy of all recorded calls (for test assertions).
    pub fn calls(&self) -> Vec<GfxCall> {
        self.calls.lock().clone()
    }

    /// Count recorded calls matching `filter`.
    pub fn count(&self, filter: impl Fn(&GfxCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| filter(call)).count()
    }

    pub fn count_shader_creates(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::CreateShader { .. }))
    }

    pub fn count_shader_destroys(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::DestroyShader(_)))
    }

    pub fn count_state_block_creates(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::CreateStateBlock(_)))
    }

    pub fn count_texture_loads(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::LoadTexture { .. }))
    }

    pub fn count_draws(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::Draw { .. }))
    }

    pub fn count_target_pushes(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::PushRenderTarget(_)))
    }

    pub fn count_target_pops(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::PopRenderTarget))
    }

    pub fn count_target_resolves(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::ResolveRenderTarget(_)))
    }

    pub fn count_clears(&self) -> usize {
        self.count(|call| matches!(call, GfxCall::Clear(_)))
    }

    /// Labels of every program the pipeline tried to compile, in order.
    pub fn compiled_labels(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                GfxCall::CreateShader { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    /// Description of a live program.
    pub fn shader_desc(&self, shader: ShaderHandle) -> Option<ShaderDesc> {
        self.shaders.lock().get(shader.raw() as usize).cloned().flatten()
    }

    pub fn live_shader_count(&self) -> usize {
        self.shaders.lock().iter().filter(|s| s.is_some()).count()
    }

    /// Resolved data behind a state block.
    pub fn state_block(&self, block: StateBlockHandle) -> Option<StateBlockData> {
        self.state_blocks.lock().get(block.raw() as usize).cloned()
    }

    pub fn texture_path(&self, texture: TextureHandle) -> Option<String> {
        self.textures.lock().get(texture.raw() as usize).cloned()
    }

    /// Current depth of the render target stack.
    pub fn target_depth(&self) -> usize {
        self.target_stack.lock().len()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, call: GfxCall) {
        self.calls.lock().push(call);
    }
}

impl Default for MockGfxDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GfxDevice for MockGfxDevice {
    fn limits(&self) -> HardwareLimits {
        *self.limits.lock()
    }

    fn create_shader(&self, desc: &ShaderDesc) -> GfxResult<ShaderHandle> {
        self.record(GfxCall::CreateShader {
            label: desc.label.clone(),
            features: desc.features.clone(),
        });

        if self.is_lost() {
            return Err(GfxError::DeviceLost);
        }
        if let Some(predicate) = self.fail_compile.lock().as_ref() {
            if predicate(desc) {
                return Err(GfxError::ShaderCompile {
                    label: desc.label.clone(),
                    message: "mock compile failure".to_string(),
                });
            }
        }

        let mut shaders = self.shaders.lock();
        let id = shaders.len() as u32;
        shaders.push(Some(desc.clone()));
        Ok(ShaderHandle::from_raw(id))
    }

    fn destroy_shader(&self, shader: ShaderHandle) {
        self.record(GfxCall::DestroyShader(shader));
        if let Some(slot) = self.shaders.lock().get_mut(shader.raw() as usize) {
            *slot = None;
        }
    }

    fn create_state_block(&self, data: &StateBlockData) -> StateBlockHandle {
        let mut blocks = self.state_blocks.lock();
        let id = blocks.len() as u32;
        blocks.push(data.clone());
        let handle = StateBlockHandle::from_raw(id);
        drop(blocks);
        self.record(GfxCall::CreateStateBlock(handle));
        handle
    }

    fn destroy_state_block(&self, block: StateBlockHandle) {
        self.record(GfxCall::DestroyStateBlock(block));
    }

    fn load_texture(&self, path: &str) -> GfxResult<TextureHandle> {
        self.record(GfxCall::LoadTexture {
            path: path.to_string(),
        });

        if self.is_lost() {
            return Err(GfxError::DeviceLost);
        }
        if self.missing_textures.lock().contains(path) {
            return Err(GfxError::TextureNotFound {
                path: path.to_string(),
            });
        }

        let mut textures = self.textures.lock();
        let id = textures.len() as u32;
        textures.push(path.to_string());
        Ok(TextureHandle::from_raw(id))
    }

    fn release_texture(&self, texture: TextureHandle) {
        self.record(GfxCall::ReleaseTexture(texture));
    }

    fn create_buffer(&self, desc: &BufferDesc) -> BufferHandle {
        let mut next = self.next_buffer_id.lock();
        let handle = BufferHandle::from_raw(*next);
        *next += 1;
        drop(next);
        self.record(GfxCall::CreateBuffer {
            label: desc.label.clone(),
            size: desc.size,
        });
        handle
    }

    fn destroy_buffer(&self, buffer: BufferHandle) {
        self.record(GfxCall::DestroyBuffer(buffer));
    }

    fn create_render_target(&self, desc: &RenderTargetDesc) -> GfxResult<RenderTargetHandle> {
        self.record(GfxCall::CreateRenderTarget {
            label: desc.label.clone(),
            width: desc.width,
            height: desc.height,
        });

        if self.is_lost() {
            return Err(GfxError::DeviceLost);
        }
        if *self.fail_targets.lock() {
            return Err(GfxError::TargetCreation {
                message: format!("mock refused target '{}'", desc.label),
            });
        }

        let mut targets = self.targets.lock();
        let id = targets.len() as u32;
        targets.push(desc.clone());
        Ok(RenderTargetHandle::from_raw(id))
    }

    fn destroy_render_target(&self, target: RenderTargetHandle) {
        self.record(GfxCall::DestroyRenderTarget(target));
    }

    fn push_render_target(&self, target: RenderTargetHandle) {
        self.record(GfxCall::PushRenderTarget(target));
        self.target_stack.lock().push(target);
    }

    fn pop_render_target(&self) {
        self.record(GfxCall::PopRenderTarget);
        self.target_stack.lock().pop();
    }

    fn resolve_render_target(&self, target: RenderTargetHandle) {
        self.record(GfxCall::ResolveRenderTarget(target));
    }

    fn clear(&self, flags: ClearFlags, _color: [f32; 4], _depth: f32, _stencil: u32) {
        self.record(GfxCall::Clear(flags));
    }

    fn set_shader(&self, shader: ShaderHandle) {
        self.record(GfxCall::SetShader(shader));
    }

    fn set_shader_constant(&self, shader: ShaderHandle, name: &str, data: &[u8]) {
        self.record(GfxCall::SetShaderConstant {
            shader,
            name: name.to_string(),
            size: data.len(),
        });
    }

    fn set_state_block(&self, block: StateBlockHandle) {
        self.record(GfxCall::SetStateBlock(block));
    }

    fn set_texture(&self, slot: u32, texture: Option<TextureHandle>) {
        self.record(GfxCall::SetTexture { slot, texture });
    }

    fn set_vertex_buffer(&self, buffer: BufferHandle) {
        self.record(GfxCall::SetVertexBuffer(buffer));
    }

    fn set_index_buffer(&self, buffer: Option<BufferHandle>) {
        self.record(GfxCall::SetIndexBuffer(buffer));
    }

    fn draw(&self, range: &PrimitiveRange) {
        self.record(GfxCall::Draw {
            count: range.count,
            indexed: range.indexed,
        });
    }
}
