//! Hardware limits queried at pass-build time.

use crate::state::MAX_SAMPLER_SLOTS;

/// Texture sampler budget used when a device does not report one.
pub const DEFAULT_TEXTURE_SLOT_LIMIT: u32 = 8;

/// Interpolator register budget shared by every supported platform.
pub const DEFAULT_INTERPOLATOR_LIMIT: u32 = 10;

/// Fixed resource budget of the target hardware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareLimits {
    /// Number of texture samplers a single pass may bind.
    pub max_texture_slots: u32,
    /// Number of vertex-to-pixel interpolator registers.
    pub max_interpolators: u32,
    /// Whether wireframe fill is supported.
    pub supports_wireframe: bool,
}

impl HardwareLimits {
    /// Limits with a custom texture budget and the default interpolator budget.
    pub fn with_texture_slots(max_texture_slots: u32) -> Self {
        Self {
            max_texture_slots,
            ..Self::default()
        }
    }

    /// Limits a state block can describe: one sampler state per texture slot.
    pub fn clamped(self) -> Self {
        let max_slots = MAX_SAMPLER_SLOTS as u32;
        if self.max_texture_slots <= max_slots {
            return self;
        }
        tracing::warn!(
            "Device reports {} texture slots, clamping to {}",
            self.max_texture_slots,
            max_slots
        );
        Self {
            max_texture_slots: max_slots,
            ..self
        }
    }
}

impl Default for HardwareLimits {
    fn default() -> Self {
        Self {
            max_texture_slots: DEFAULT_TEXTURE_SLOT_LIMIT,
            max_interpolators: DEFAULT_INTERPOLATOR_LIMIT,
            supports_wireframe: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_to_sampler_slots() {
        let wide = HardwareLimits::with_texture_slots(32).clamped();
        assert_eq!(wide.max_texture_slots, MAX_SAMPLER_SLOTS as u32);
        assert_eq!(wide.max_interpolators, DEFAULT_INTERPOLATOR_LIMIT);

        let narrow = HardwareLimits::with_texture_slots(4);
        assert_eq!(narrow.clamped(), narrow);
    }
}
