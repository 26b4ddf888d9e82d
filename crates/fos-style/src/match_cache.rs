//! Selector Match Cache
//!
//! Memoizes (selector, element) membership queries between tree
//! mutations. Any change to ids, classes, pseudo-classes or parentage
//! invalidates the whole cache, since ancestor relations make results
//! depend on more than the element itself.

use std::collections::HashMap;

use fos_elements::ElementId;

use crate::selectors::SelectorId;

/// Which membership test was asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Selector matches the element itself
    Exact,
    /// Selector matches some ancestor
    Ancestor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MatchKey {
    selector: SelectorId,
    element: ElementId,
    kind: MatchKind,
}

/// Match memo with hit/miss counters
#[derive(Debug, Default)]
pub struct MatchCache {
    entries: HashMap<MatchKey, bool>,
    hits: u64,
    misses: u64,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result or compute and store it
    pub fn get_or_insert_with(
        &mut self,
        selector: SelectorId,
        element: ElementId,
        kind: MatchKind,
        compute: impl FnOnce() -> bool,
    ) -> bool {
        let key = MatchKey { selector, element, kind };
        if let Some(&hit) = self.entries.get(&key) {
            self.hits += 1;
            return hit;
        }
        self.misses += 1;
        let result = compute();
        self.entries.insert(key, result);
        result
    }

    /// Drop everything (tree or element data changed)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries for a destroyed element
    pub fn forget(&mut self, element: ElementId) {
        self.entries.retain(|key, _| key.element != element);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_elements::{Element, ElementTree};

    #[test]
    fn test_memoizes() {
        let mut tree = ElementTree::new();
        let el = tree.insert(Element::new("A"));
        let mut cache = MatchCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let hit = cache.get_or_insert_with(SelectorId(0), el, MatchKind::Exact, || {
                calls += 1;
                true
            });
            assert!(hit);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_kinds_are_separate() {
        let mut tree = ElementTree::new();
        let el = tree.insert(Element::new("A"));
        let mut cache = MatchCache::new();
        cache.get_or_insert_with(SelectorId(0), el, MatchKind::Exact, || true);
        let anc = cache.get_or_insert_with(SelectorId(0), el, MatchKind::Ancestor, || false);
        assert!(!anc);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_forget() {
        let mut tree = ElementTree::new();
        let a = tree.insert(Element::new("A"));
        let b = tree.insert(Element::new("B"));
        let mut cache = MatchCache::new();
        cache.get_or_insert_with(SelectorId(0), a, MatchKind::Exact, || true);
        cache.get_or_insert_with(SelectorId(0), b, MatchKind::Exact, || true);
        cache.forget(a);
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
