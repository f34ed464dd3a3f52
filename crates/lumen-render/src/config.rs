//! Global material toggles consumed at pass-build time.

use lumen_gfx::HardwareLimits;

use crate::features::{FeatureSet, builtin};

/// Process-wide feature exclusions.
///
/// Owned by [`MaterialManager`](crate::MaterialManager). Changing any field only
/// takes effect through [`MaterialManager::set_config`](crate::MaterialManager::set_config),
/// which flushes and reinitializes every live instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialConfig {
    pub disable_normal_mapping: bool,
    pub disable_specular: bool,
    pub disable_cubemapping: bool,
    /// Render a depth/normal pre-pass; opaque materials get a pre-pass hook.
    pub prepass_enabled: bool,
    /// Replace the device's texture slot budget, for testing.
    pub max_texture_slots_override: Option<u32>,
}

impl MaterialConfig {
    /// Features subtracted from every resolved set.
    pub fn exclusions(&self) -> FeatureSet {
        let mut set = FeatureSet::new();
        if self.disable_normal_mapping {
            set.add_feature(builtin::NORMAL_MAP);
            set.add_feature(builtin::PARALLAX);
        }
        if self.disable_specular {
            set.add_feature(builtin::PIX_SPECULAR);
            set.add_feature(builtin::SPECULAR_MAP);
        }
        if self.disable_cubemapping {
            set.add_feature(builtin::CUBE_MAP);
        }
        set
    }

    /// Device limits with the configured override applied, clamped to what a
    /// state block can describe.
    pub fn effective_limits(&self, device: HardwareLimits) -> HardwareLimits {
        let limits = match self.max_texture_slots_override {
            Some(slots) => HardwareLimits {
                max_texture_slots: slots,
                ..device
            },
            None => device,
        };
        limits.clamped()
    }
}
