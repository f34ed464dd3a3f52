use lumen_render::features::{FeatureRegistry, FeatureSet, builtin};

fn permutations(n: usize) -> Vec<Vec<usize>> {
    // Rotations of the forward and reversed sequences, plus an interleave.
    let forward: Vec<usize> = (0..n).collect();
    let mut out = Vec::new();
    for shift in 0..n {
        let mut rotated = forward.clone();
        rotated.rotate_left(shift);
        out.push(rotated.clone());
        rotated.reverse();
        out.push(rotated);
    }
    let (evens, odds): (Vec<usize>, Vec<usize>) = forward.iter().partition(|i| *i % 2 == 0);
    out.push(odds.into_iter().chain(evens).collect());
    out
}

#[test]
fn test_iteration_order_ignores_insertion_order() {
    let types = builtin::ALL;
    let reference: Vec<_> = {
        let mut set = FeatureSet::new();
        for ty in types {
            set.add_feature(*ty);
        }
        set.iter().map(|info| info.ty.id).collect()
    };

    for order in permutations(types.len()) {
        let mut set = FeatureSet::new();
        for i in order {
            set.add_feature(types[i]);
        }
        let ids: Vec<_> = set.iter().map(|info| info.ty.id).collect();
        assert_eq!(ids, reference);
    }
}

#[test]
fn test_iteration_follows_group_then_order() {
    let mut set = FeatureSet::new();
    for ty in builtin::ALL.iter().rev() {
        set.add(*ty, Some(0));
    }
    let infos: Vec<_> = set.iter().collect();
    for pair in infos.windows(2) {
        let (a, b) = (pair[0].ty, pair[1].ty);
        assert!((a.group, a.order) <= (b.group, b.order), "{} before {}", a.name, b.name);
    }
}

#[test]
fn test_registry_traversal_matches_set_order() {
    let registry = FeatureRegistry::with_builtin();
    let mut registry_order = Vec::new();
    registry.for_each_in_order(|ty, _| registry_order.push(ty.id));

    let mut set = FeatureSet::new();
    for ty in builtin::ALL.iter().rev() {
        set.add_feature(*ty);
    }
    let set_order: Vec<_> = set.iter().map(|info| info.ty.id).collect();
    assert_eq!(registry_order, set_order);
}
