//! Frame-level routing of render instances through the bins.

use indexmap::IndexMap;
use lumen_core::alloc::FrameArena;
use lumen_core::profiling::{self, profile_function, profile_scope};
use lumen_gfx::GfxDevice;

use crate::bins::{AddInstResult, RenderBinManager, RenderContext};
use crate::material::MaterialManager;
use crate::render_inst::RenderInst;
use crate::scene::SceneRenderState;

/// Counters for one `render_pass`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub instances_submitted: usize,
    /// Instances no bin claimed.
    pub unclaimed: usize,
    /// Claims per bin name, in process-add order.
    pub claims: IndexMap<String, usize>,
    pub draw_calls: usize,
    pub passes_setup: usize,
}

impl FrameStats {
    pub fn claims_for(&self, bin: &str) -> usize {
        self.claims.get(bin).copied().unwrap_or(0)
    }
}

/// Owns the bins and the frame arena.
///
/// ```ignore
/// pass_manager.add_manager(Box::new(MeshBin::new()));
/// pass_manager.add_manager(Box::new(TranslucentBin::new()));
///
/// for inst in visible {
///     pass_manager.add_inst(&materials, inst);
/// }
/// let stats = pass_manager.render_pass(device, &mut materials, &scene);
/// ```
pub struct RenderPassManager {
    bins: Vec<Box<dyn RenderBinManager>>,
    render_order: Vec<usize>,
    add_order: Vec<usize>,
    arena: FrameArena<RenderInst>,
    stats: FrameStats,
    last_stats: FrameStats,
}

impl RenderPassManager {
    pub fn new() -> Self {
        Self {
            bins: Vec::new(),
            render_order: Vec::new(),
            add_order: Vec::new(),
            arena: FrameArena::new(),
            stats: FrameStats::default(),
            last_stats: FrameStats::default(),
        }
    }

    /// Add a bin. Both orders are re-sorted; equal orders keep insertion order.
    pub fn add_manager(&mut self, bin: Box<dyn RenderBinManager>) {
        tracing::debug!(
            "Adding render bin '{}' (render {}, add {})",
            bin.name(),
            bin.render_order(),
            bin.process_add_order()
        );
        self.bins.push(bin);
        self.resort();
    }

    /// Remove the first bin named `name`.
    pub fn remove_manager(&mut self, name: &str) -> Option<Box<dyn RenderBinManager>> {
        let pos = self.bins.iter().position(|bin| bin.name() == name)?;
        let bin = self.bins.remove(pos);
        self.resort();
        Some(bin)
    }

    fn resort(&mut self) {
        let bins = &self.bins;
        self.render_order = (0..bins.len()).collect();
        self.render_order
            .sort_by(|&a, &b| bins[a].render_order().total_cmp(&bins[b].render_order()));
        self.add_order = (0..bins.len()).collect();
        self.add_order
            .sort_by(|&a, &b| bins[a].process_add_order().total_cmp(&bins[b].process_add_order()));
    }

    pub fn manager(&self, name: &str) -> Option<&dyn RenderBinManager> {
        self.bins.iter().find(|bin| bin.name() == name).map(|bin| bin.as_ref())
    }

    pub fn manager_mut(&mut self, name: &str) -> Option<&mut (dyn RenderBinManager + 'static)> {
        self.bins
            .iter_mut()
            .find(|bin| bin.name() == name)
            .map(|bin| bin.as_mut())
    }

    pub fn num_managers(&self) -> usize {
        self.bins.len()
    }

    /// Bin names in render order.
    pub fn render_order(&self) -> Vec<&str> {
        self.render_order.iter().map(|&i| self.bins[i].name()).collect()
    }

    /// Bin names in process-add order.
    pub fn process_add_order(&self) -> Vec<&str> {
        self.add_order.iter().map(|&i| self.bins[i].name()).collect()
    }

    /// Submit an instance for this frame and route it through the bins.
    ///
    /// Returns the names of the bins that claimed it.
    pub fn add_inst(&mut self, materials: &MaterialManager, mut inst: RenderInst) -> Vec<&str> {
        profile_function!();
        if let Some(id) = inst.material {
            inst.mat_flags = materials.flags(id);
        }

        let handle = self.arena.alloc(inst);
        let inst = self.arena.get(handle);
        self.stats.instances_submitted += 1;

        let mut claimed_by = Vec::new();
        for &index in &self.add_order {
            let bin = &mut self.bins[index];
            let result = bin.add_element(handle, inst);
            if result.is_claimed() {
                *self.stats.claims.entry(bin.name().to_string()).or_insert(0) += 1;
                claimed_by.push(index);
            }
            if result == AddInstResult::Stopped {
                break;
            }
        }

        if claimed_by.is_empty() {
            self.stats.unclaimed += 1;
            tracing::trace!("Render instance {:?} was not claimed by any bin", inst.ty);
        }
        claimed_by.into_iter().map(|i| self.bins[i].name()).collect()
    }

    /// Sort, render and clear every bin, then start a new frame.
    pub fn render_pass(
        &mut self,
        device: &dyn GfxDevice,
        materials: &mut MaterialManager,
        scene: &SceneRenderState,
    ) -> FrameStats {
        profile_function!();

        {
            profile_scope!("sort");
            for bin in &mut self.bins {
                bin.sort(&self.arena);
            }
        }

        {
            profile_scope!("render");
            let mut ctx = RenderContext {
                device,
                materials,
                scene,
                stats: &mut self.stats,
            };
            for &index in &self.render_order {
                self.bins[index].render(&mut ctx, &self.arena);
            }
        }

        self.end_frame()
    }

    /// Drop this frame's submissions without drawing them.
    pub fn clear(&mut self) -> FrameStats {
        self.end_frame()
    }

    fn end_frame(&mut self) -> FrameStats {
        for bin in &mut self.bins {
            bin.clear();
        }
        self.arena.reset();
        profiling::new_frame();

        self.last_stats = std::mem::take(&mut self.stats);
        self.last_stats.clone()
    }

    pub fn last_stats(&self) -> &FrameStats {
        &self.last_stats
    }

    /// Instances submitted since the last frame ended.
    pub fn pending(&self) -> usize {
        self.arena.len()
    }

    pub fn arena(&self) -> &FrameArena<RenderInst> {
        &self.arena
    }

    /// Drop pending submissions and every device object the bins own.
    pub fn on_device_reset(&mut self, device: &dyn GfxDevice) {
        tracing::info!("Device reset, releasing targets of {} render bins", self.bins.len());
        for bin in &mut self.bins {
            bin.clear();
            bin.on_device_reset(device);
        }
        self.arena.reset();
        self.stats = FrameStats::default();
    }
}

impl Default for RenderPassManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderPassManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPassManager")
            .field("render_order", &self.render_order())
            .field("process_add_order", &self.process_add_order())
            .field("pending", &self.arena.len())
            .finish()
    }
}
