//! Shader features: composable units of generated shader code.
//!
//! A [`FeatureType`] names a feature and places it in the pipeline through a
//! [`FeatureGroup`] and an intra-group order. A [`FeatureGenerator`] emits the
//! code for one feature type and declares its resource cost. The
//! [`FeatureRegistry`] maps types to generators, and a [`FeatureSet`] is the
//! collection of features resolved for one material stage or pass.

use std::cmp::Ordering;
use std::fmt;

pub mod builtin;
pub mod generator;
pub mod generators;
pub mod registry;
pub mod set;

pub use generator::{EmitContext, FeatureGenerator, MapKind, Resources, ShaderCode, TexBinding, TexBindings, TexSource};
pub use registry::FeatureRegistry;
pub use set::{FeatureInfo, FeatureSet};

/// Ordering bucket of a feature. Declaration order is pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureGroup {
    PreTransform,
    Transform,
    PostTransform,
    PreTexture,
    Texture,
    PreLighting,
    Lighting,
    PostLighting,
    PostProcess,
    Misc,
}

/// Small integer identity of a feature type.
///
/// Ids index the registry directly. Built-in types use ids below
/// [`FeatureId::FIRST_CUSTOM`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(u16);

impl FeatureId {
    /// First id available to feature types defined outside this crate.
    pub const FIRST_CUSTOM: FeatureId = FeatureId(64);

    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity and pipeline placement of a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureType {
    pub id: FeatureId,
    pub name: &'static str,
    pub group: FeatureGroup,
    /// Sequencing inside the group, ascending.
    pub order: f32,
    /// Whether material authors can switch the feature on directly, as opposed
    /// to it being synthesized by the resolver.
    pub togglable: bool,
}

impl FeatureType {
    pub const fn new(id: u16, name: &'static str, group: FeatureGroup, order: f32, togglable: bool) -> Self {
        Self {
            id: FeatureId(id),
            name,
            group,
            order,
            togglable,
        }
    }

    /// Pipeline ordering: group, then order, then id to break ties.
    pub fn pipeline_cmp(&self, other: &FeatureType) -> Ordering {
        self.group
            .cmp(&other.group)
            .then_with(|| self.order.total_cmp(&other.order))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_order() {
        assert!(FeatureGroup::PreTransform < FeatureGroup::Transform);
        assert!(FeatureGroup::Texture < FeatureGroup::Lighting);
        assert!(FeatureGroup::PostProcess < FeatureGroup::Misc);
    }

    #[test]
    fn test_pipeline_cmp() {
        let a = FeatureType::new(70, "a", FeatureGroup::Texture, 2.0, true);
        let b = FeatureType::new(71, "b", FeatureGroup::Texture, 1.0, true);
        let c = FeatureType::new(72, "c", FeatureGroup::Transform, 50.0, true);
        assert_eq!(b.pipeline_cmp(&a), Ordering::Less);
        assert_eq!(c.pipeline_cmp(&b), Ordering::Less);

        let a2 = FeatureType::new(73, "a2", FeatureGroup::Texture, 2.0, true);
        assert_eq!(a.pipeline_cmp(&a2), Ordering::Less);
    }
}
