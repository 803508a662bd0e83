use crate::map::GeometryRef;
use std::collections::BTreeSet;

/// What each side must drop to agree on which polygons exist.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Registry entries whose backing feature vanished from the layer
    pub remove_from_registry: Vec<GeometryRef>,
    /// Layer features with no registry entry
    pub remove_from_layer: Vec<GeometryRef>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.remove_from_registry.is_empty() && self.remove_from_layer.is_empty()
    }
}

/// Compare the registry's geometry handles against the layer's live ones.
/// Output is sorted and free of duplicates.
pub fn diff(registry: &[GeometryRef], live: &[GeometryRef]) -> Reconciliation {
    let registry: BTreeSet<&GeometryRef> = registry.iter().collect();
    let live: BTreeSet<&GeometryRef> = live.iter().collect();
    Reconciliation {
        remove_from_registry: registry.difference(&live).map(|g| (*g).clone()).collect(),
        remove_from_layer: live.difference(&registry).map(|g| (*g).clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(names: &[&str]) -> Vec<GeometryRef> {
        names.iter().map(|n| GeometryRef(n.to_string())).collect()
    }

    #[test]
    fn test_diff_in_sync() {
        let both = refs(&["a", "b"]);
        assert!(diff(&both, &refs(&["b", "a"])).is_empty());
        assert!(diff(&[], &[]).is_empty());
    }

    #[test]
    fn test_diff_both_directions() {
        let reconciliation = diff(&refs(&["a", "b", "c"]), &refs(&["c", "d", "a"]));
        assert_eq!(reconciliation.remove_from_registry, refs(&["b"]));
        assert_eq!(reconciliation.remove_from_layer, refs(&["d"]));
    }

    #[test]
    fn test_diff_ignores_duplicates() {
        let reconciliation = diff(&refs(&["a", "a"]), &refs(&["b", "b"]));
        assert_eq!(reconciliation.remove_from_registry, refs(&["a"]));
        assert_eq!(reconciliation.remove_from_layer, refs(&["b"]));
    }
}
