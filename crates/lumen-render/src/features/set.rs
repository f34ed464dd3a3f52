//! Ordered, deduplicated feature collections.

use std::fmt;
use std::sync::OnceLock;

use super::{FeatureId, FeatureType};

/// One entry of a [`FeatureSet`]: a feature type plus an optional stage index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureInfo {
    pub ty: FeatureType,
    /// Which stage the feature serves, for per-stage features such as texture maps.
    pub index: Option<u8>,
}

/// The features resolved for one stage or pass.
///
/// Entries are kept in insertion order and sorted lazily: the first read after
/// a mutation sorts by (group, order, id, index) and caches the result, so the
/// iteration order never depends on how the set was assembled.
///
/// # Example
///
/// ```
/// use lumen_render::features::{FeatureSet, builtin};
///
/// let mut set = FeatureSet::new();
/// set.add_feature(builtin::HDR_OUT);
/// set.add(builtin::DIFFUSE_MAP, Some(0));
/// set.add_feature(builtin::VERT_TRANSFORM);
///
/// let names: Vec<_> = set.iter().map(|f| f.ty.name).collect();
/// assert_eq!(names, ["Vert Transform", "Diffuse Map", "HDR Out"]);
/// ```
#[derive(Clone, Default)]
pub struct FeatureSet {
    features: Vec<FeatureInfo>,
    sorted: OnceLock<Vec<FeatureInfo>>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature for `index`. Returns false if it was already present.
    pub fn add(&mut self, ty: FeatureType, index: Option<u8>) -> bool {
        if self.has_at(ty.id, index) {
            return false;
        }
        self.features.push(FeatureInfo { ty, index });
        self.sorted = OnceLock::new();
        true
    }

    /// Add a feature that is not tied to a stage.
    pub fn add_feature(&mut self, ty: FeatureType) -> bool {
        self.add(ty, None)
    }

    /// Remove every entry of the given type, whatever its index.
    pub fn remove(&mut self, ty: FeatureType) -> bool {
        self.retain(|info| info.ty.id != ty.id)
    }

    /// Remove the entry of the given type and index only.
    pub fn remove_at(&mut self, ty: FeatureType, index: Option<u8>) -> bool {
        self.retain(|info| !(info.ty.id == ty.id && info.index == index))
    }

    pub fn has(&self, id: FeatureId) -> bool {
        self.features.iter().any(|info| info.ty.id == id)
    }

    pub fn has_at(&self, id: FeatureId, index: Option<u8>) -> bool {
        self.features
            .iter()
            .any(|info| info.ty.id == id && info.index == index)
    }

    /// Number of entries of the given type.
    pub fn count(&self, id: FeatureId) -> usize {
        self.features.iter().filter(|info| info.ty.id == id).count()
    }

    /// Indices of every entry of the given type, ascending.
    pub fn indices_of(&self, id: FeatureId) -> impl Iterator<Item = Option<u8>> + '_ {
        self.sorted()
            .iter()
            .filter(move |info| info.ty.id == id)
            .map(|info| info.index)
    }

    /// Union with `other`.
    pub fn merge(&mut self, other: &FeatureSet) {
        for info in &other.features {
            self.add(info.ty, info.index);
        }
    }

    /// Remove every feature type that appears in `other`, at any index.
    pub fn exclude(&mut self, other: &FeatureSet) {
        if other.is_empty() {
            return;
        }
        self.retain(|info| !other.has(info.ty.id));
    }

    /// Keep only entries for which `keep` returns true.
    pub fn filter(&mut self, keep: impl Fn(&FeatureInfo) -> bool) {
        self.retain(keep);
    }

    /// Entries in pipeline order.
    pub fn iter(&self) -> std::slice::Iter<'_, FeatureInfo> {
        self.sorted().iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear(&mut self) {
        self.features.clear();
        self.sorted = OnceLock::new();
    }

    /// Feature names in pipeline order, with stage indices.
    pub fn names(&self) -> Vec<String> {
        self.iter()
            .map(|info| match info.index {
                Some(index) => format!("{}[{}]", info.ty.name, index),
                None => info.ty.name.to_string(),
            })
            .collect()
    }

    fn retain(&mut self, keep: impl Fn(&FeatureInfo) -> bool) -> bool {
        let before = self.features.len();
        self.features.retain(|info| keep(info));
        let changed = self.features.len() != before;
        if changed {
            self.sorted = OnceLock::new();
        }
        changed
    }

    fn sorted(&self) -> &[FeatureInfo] {
        self.sorted.get_or_init(|| {
            let mut sorted = self.features.clone();
            sorted.sort_by(|a, b| a.ty.pipeline_cmp(&b.ty).then_with(|| a.index.cmp(&b.index)));
            sorted
        })
    }
}

impl PartialEq for FeatureSet {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a FeatureInfo;
    type IntoIter = std::slice::Iter<'a, FeatureInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::builtin;

    #[test]
    fn test_add_dedupes() {
        let mut set = FeatureSet::new();
        assert!(set.add(builtin::DIFFUSE_MAP, Some(0)));
        assert!(!set.add(builtin::DIFFUSE_MAP, Some(0)));
        assert!(set.add(builtin::DIFFUSE_MAP, Some(1)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.count(builtin::DIFFUSE_MAP.id), 2);
    }

    #[test]
    fn test_remove() {
        let mut set = FeatureSet::new();
        set.add(builtin::DETAIL_MAP, Some(0));
        set.add(builtin::DETAIL_MAP, Some(1));
        set.add_feature(builtin::FOG);

        assert!(set.remove_at(builtin::DETAIL_MAP, Some(0)));
        assert!(set.has_at(builtin::DETAIL_MAP.id, Some(1)));
        assert!(set.remove(builtin::DETAIL_MAP));
        assert!(!set.has(builtin::DETAIL_MAP.id));
        assert!(!set.remove(builtin::DETAIL_MAP));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_sort_is_lazy_and_refreshed() {
        let mut set = FeatureSet::new();
        set.add_feature(builtin::FOG);
        assert_eq!(set.iter().next().map(|f| f.ty.id), Some(builtin::FOG.id));

        // Mutation after a read must invalidate the cached order.
        set.add_feature(builtin::VERT_TRANSFORM);
        assert_eq!(
            set.iter().next().map(|f| f.ty.id),
            Some(builtin::VERT_TRANSFORM.id)
        );
    }

    #[test]
    fn test_indices_sorted_within_type() {
        let mut set = FeatureSet::new();
        set.add(builtin::NORMAL_MAP, Some(2));
        set.add(builtin::NORMAL_MAP, Some(0));
        set.add(builtin::NORMAL_MAP, Some(1));
        let indices: Vec<_> = set.indices_of(builtin::NORMAL_MAP.id).collect();
        assert_eq!(indices, [Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_merge_and_exclude() {
        let mut a = FeatureSet::new();
        a.add(builtin::DIFFUSE_MAP, Some(0));
        a.add(builtin::NORMAL_MAP, Some(0));

        let mut b = FeatureSet::new();
        b.add(builtin::NORMAL_MAP, Some(0));
        b.add(builtin::NORMAL_MAP, Some(1));
        b.add_feature(builtin::RT_LIGHTING);

        a.merge(&b);
        assert_eq!(a.len(), 4);

        let mut exclusions = FeatureSet::new();
        exclusions.add_feature(builtin::NORMAL_MAP);
        a.exclude(&exclusions);
        assert!(!a.has(builtin::NORMAL_MAP.id));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let mut a = FeatureSet::new();
        a.add_feature(builtin::FOG);
        a.add(builtin::DIFFUSE_MAP, Some(0));

        let mut b = FeatureSet::new();
        b.add(builtin::DIFFUSE_MAP, Some(0));
        b.add_feature(builtin::FOG);

        assert_eq!(a, b);
        assert_eq!(a.names(), ["Diffuse Map[0]", "Fog"]);
    }
}
