//! Auxiliary material variants attached to an instance.

use super::instance::MatInstance;
use super::resolver::StageOverride;

/// Kind of variant a hook renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookKind {
    PrePass,
    Shadow,
    Glow,
}

impl HookKind {
    pub const ALL: [HookKind; 3] = [HookKind::PrePass, HookKind::Shadow, HookKind::Glow];

    /// Override applied when building the hooked instance.
    pub fn stage_override(self) -> StageOverride {
        match self {
            HookKind::PrePass => StageOverride::PrePass,
            HookKind::Shadow => StageOverride::Shadow,
            HookKind::Glow => StageOverride::Glow,
        }
    }
}

/// Hooks owned by one instance, at most one per kind.
///
/// Dropping the table drops every hooked instance along with the device
/// objects it built.
#[derive(Debug, Default)]
pub struct HookTable {
    hooks: Vec<(HookKind, Box<MatInstance>)>,
}

impl HookTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a hook, returning the one it replaces.
    pub fn insert(&mut self, kind: HookKind, instance: MatInstance) -> Option<MatInstance> {
        let boxed = Box::new(instance);
        match self.hooks.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, slot)) => Some(*std::mem::replace(slot, boxed)),
            None => {
                self.hooks.push((kind, boxed));
                self.hooks.sort_by_key(|(k, _)| *k);
                None
            }
        }
    }

    pub fn remove(&mut self, kind: HookKind) -> Option<MatInstance> {
        let pos = self.hooks.iter().position(|(k, _)| *k == kind)?;
        Some(*self.hooks.remove(pos).1)
    }

    pub fn get(&self, kind: HookKind) -> Option<&MatInstance> {
        self.hooks.iter().find(|(k, _)| *k == kind).map(|(_, inst)| inst.as_ref())
    }

    pub fn get_mut(&mut self, kind: HookKind) -> Option<&mut MatInstance> {
        self.hooks
            .iter_mut()
            .find(|(k, _)| *k == kind)
            .map(|(_, inst)| inst.as_mut())
    }

    pub fn contains(&self, kind: HookKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn kinds(&self) -> impl Iterator<Item = HookKind> + '_ {
        self.hooks.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HookKind, &MatInstance)> {
        self.hooks.iter().map(|(k, inst)| (*k, inst.as_ref()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (HookKind, &mut MatInstance)> {
        self.hooks.iter_mut().map(|(k, inst)| (*k, inst.as_mut()))
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn clear(&mut self) {
        self.hooks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Material, MaterialStage};
    use lumen_gfx::VertexFormat;
    use std::sync::Arc;

    fn instance(name: &str) -> MatInstance {
        let material = Material::new(name).with_stage(MaterialStage::diffuse("a.png"));
        MatInstance::new(Arc::new(material), VertexFormat::position_normal_uv())
    }

    #[test]
    fn test_insert_replaces_same_kind() {
        let mut table = HookTable::new();
        assert!(table.insert(HookKind::Glow, instance("first")).is_none());
        let old = table.insert(HookKind::Glow, instance("second")).unwrap();
        assert_eq!(old.material().name, "first");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(HookKind::Glow).unwrap().material().name, "second");
    }

    #[test]
    fn test_kinds_are_ordered() {
        let mut table = HookTable::new();
        table.insert(HookKind::Glow, instance("g"));
        table.insert(HookKind::PrePass, instance("p"));
        table.insert(HookKind::Shadow, instance("s"));
        let kinds: Vec<_> = table.kinds().collect();
        assert_eq!(kinds, HookKind::ALL.to_vec());

        assert!(table.remove(HookKind::Shadow).is_some());
        assert!(!table.contains(HookKind::Shadow));
        assert_eq!(table.len(), 2);
    }
}
