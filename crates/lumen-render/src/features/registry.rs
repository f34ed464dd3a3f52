//! Feature type to generator table.

use std::fmt;
use std::sync::OnceLock;

use super::{FeatureGenerator, FeatureId, FeatureType, builtin, generators};

struct Entry {
    ty: FeatureType,
    generator: Box<dyn FeatureGenerator>,
}

/// Maps feature types to their generators.
///
/// The table is a vector indexed by [`FeatureId`]. It is populated once at
/// startup, shared read-only (usually as `Arc<FeatureRegistry>`) while passes
/// are built, and cleared at shutdown. Traversal order is computed lazily on
/// the first read after a mutation.
#[derive(Default)]
pub struct FeatureRegistry {
    entries: Vec<Option<Entry>>,
    order: OnceLock<Vec<FeatureId>>,
}

impl FeatureRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in catalogue.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        generators::register_builtin(&mut registry);
        registry
    }

    /// Register `generator` for `ty`, returning the generator it replaced.
    pub fn register(
        &mut self,
        ty: FeatureType,
        generator: impl FeatureGenerator + 'static,
    ) -> Option<Box<dyn FeatureGenerator>> {
        let index = ty.id.index();
        if self.entries.len() <= index {
            self.entries.resize_with(index + 1, || None);
        }
        let previous = self.entries[index].replace(Entry {
            ty,
            generator: Box::new(generator),
        });
        if previous.is_some() {
            tracing::debug!("Replaced generator for feature '{}'", ty.name);
        }
        self.order = OnceLock::new();
        previous.map(|entry| entry.generator)
    }

    pub fn unregister(&mut self, id: FeatureId) -> Option<Box<dyn FeatureGenerator>> {
        let entry = self.entries.get_mut(id.index())?.take()?;
        self.order = OnceLock::new();
        Some(entry.generator)
    }

    pub fn lookup(&self, id: FeatureId) -> Option<&dyn FeatureGenerator> {
        self.entry(id).map(|entry| entry.generator.as_ref())
    }

    pub fn feature_type(&self, id: FeatureId) -> Option<&FeatureType> {
        self.entry(id).map(|entry| &entry.ty)
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.entry(id).is_some()
    }

    /// Visit every registered feature in ascending (group, order).
    pub fn for_each_in_order(&self, mut visitor: impl FnMut(&FeatureType, &dyn FeatureGenerator)) {
        for id in self.order() {
            if let Some(entry) = self.entry(*id) {
                visitor(&entry.ty, entry.generator.as_ref());
            }
        }
    }

    /// Registered ids in traversal order.
    pub fn order(&self) -> &[FeatureId] {
        self.order.get_or_init(|| {
            let mut types: Vec<&FeatureType> = self.entries.iter().flatten().map(|entry| &entry.ty).collect();
            types.sort_by(|a, b| a.pipeline_cmp(b));
            types.into_iter().map(|ty| ty.id).collect()
        })
    }

    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every generator.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order = OnceLock::new();
    }

    /// Whether every built-in type has a generator.
    pub fn has_builtin(&self) -> bool {
        builtin::ALL.iter().all(|ty| self.contains(ty.id))
    }

    fn entry(&self, id: FeatureId) -> Option<&Entry> {
        self.entries.get(id.index())?.as_ref()
    }
}

impl fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self
            .order()
            .iter()
            .filter_map(|id| self.feature_type(*id))
            .map(|ty| ty.name)
            .collect();
        f.debug_struct("FeatureRegistry").field("features", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureGroup, FeatureSet, Resources};

    struct Fixed(u32);

    impl FeatureGenerator for Fixed {
        fn resources(&self, _set: &FeatureSet, _index: Option<u8>) -> Resources {
            Resources::new(self.0, 0)
        }
    }

    const LATE: FeatureType = FeatureType::new(64, "Late", FeatureGroup::PostProcess, 5.0, true);
    const EARLY: FeatureType = FeatureType::new(65, "Early", FeatureGroup::PreTransform, 5.0, true);

    #[test]
    fn test_register_and_lookup() {
        let mut registry = FeatureRegistry::new();
        assert!(registry.register(LATE, Fixed(1)).is_none());
        assert!(registry.contains(LATE.id));
        assert!(!registry.contains(EARLY.id));

        let set = FeatureSet::new();
        let generator = registry.lookup(LATE.id).unwrap();
        assert_eq!(generator.resources(&set, None).tex_slots, 1);
    }

    #[test]
    fn test_last_writer_wins() {
        let mut registry = FeatureRegistry::new();
        registry.register(LATE, Fixed(1));
        assert!(registry.register(LATE, Fixed(2)).is_some());

        let set = FeatureSet::new();
        assert_eq!(registry.lookup(LATE.id).unwrap().resources(&set, None).tex_slots, 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_order_refreshes_after_mutation() {
        let mut registry = FeatureRegistry::new();
        registry.register(LATE, Fixed(0));
        assert_eq!(registry.order(), &[LATE.id]);

        registry.register(EARLY, Fixed(0));
        assert_eq!(registry.order(), &[EARLY.id, LATE.id]);

        registry.unregister(EARLY.id);
        assert_eq!(registry.order(), &[LATE.id]);
        assert!(registry.lookup(EARLY.id).is_none());
    }

    #[test]
    fn test_for_each_in_order() {
        let registry = FeatureRegistry::with_builtin();
        assert!(registry.has_builtin());

        let mut seen = Vec::new();
        registry.for_each_in_order(|ty, _| seen.push(*ty));
        assert_eq!(seen.len(), builtin::ALL.len());
        for pair in seen.windows(2) {
            assert!(pair[0].pipeline_cmp(&pair[1]).is_lt());
        }
        assert_eq!(seen.first().map(|ty| ty.id), Some(builtin::VERT_TRANSFORM.id));
    }

    #[test]
    fn test_clear() {
        let mut registry = FeatureRegistry::with_builtin();
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.order().is_empty());
    }
}
