//! Element Tree (arena-based allocation)

use crate::{Element, ElementId, TreeError};

#[derive(Debug)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Arena-based element tree
///
/// Every live element sits in one slot. Roots are elements without a parent;
/// a tree may hold any number of them.
#[derive(Debug, Default)]
pub struct ElementTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ElementTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached element, returning its handle
    pub fn insert(&mut self, mut element: Element) -> ElementId {
        element.parent = None;
        element.children.clear();
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            return ElementId::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, element: Some(element) });
        ElementId::new(index, 0)
    }

    /// Get an element by handle
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.element.as_ref())
    }

    /// Get a mutable element by handle
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.element.as_mut())
    }

    /// Check that a handle refers to a live element
    #[inline]
    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn require(&self, id: ElementId) -> Result<&Element, TreeError> {
        self.get(id).ok_or(TreeError::StaleHandle(id))
    }

    /// Attach `child` as the last child of `parent`
    ///
    /// The child is detached from its current parent first. Attaching an
    /// element below one of its own descendants is rejected.
    pub fn attach(&mut self, child: ElementId, parent: ElementId) -> Result<(), TreeError> {
        self.require(child)?;
        self.require(parent)?;
        if child == parent {
            return Err(TreeError::SelfParent(child));
        }
        if self.ancestors(parent).any(|a| a == child) {
            return Err(TreeError::WouldCreateCycle { child, parent });
        }

        self.detach(child)?;
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
        tracing::trace!("attached {} under {}", child, parent);
        Ok(())
    }

    /// Detach `child` from its parent, returning the former parent
    pub fn detach(&mut self, child: ElementId) -> Result<Option<ElementId>, TreeError> {
        let old_parent = self.require(child)?.parent;
        if let Some(parent) = old_parent {
            if let Some(el) = self.get_mut(parent) {
                el.children.retain(|c| *c != child);
            }
            if let Some(el) = self.get_mut(child) {
                el.parent = None;
            }
        }
        Ok(old_parent)
    }

    /// Destroy an element and its whole subtree
    ///
    /// Returns the destroyed handles in pre-order; all of them are stale
    /// afterwards.
    pub fn destroy(&mut self, id: ElementId) -> Result<Vec<ElementId>, TreeError> {
        self.detach(id)?;
        let removed = self.subtree(id);
        for &handle in &removed {
            let slot = &mut self.slots[handle.index() as usize];
            slot.element = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(handle.index());
            self.live -= 1;
        }
        tracing::trace!("destroyed {} ({} elements)", id, removed.len());
        Ok(removed)
    }

    /// Iterate over the ancestors of `id`, nearest first
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.get(id).and_then(Element::parent),
        }
    }

    /// `id` and all of its descendants in pre-order (parents before children)
    pub fn subtree(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(el) = self.get(cur) else { continue };
            out.push(cur);
            stack.extend(el.children.iter().rev().copied());
        }
        out
    }

    /// All root elements, in slot order
    pub fn roots(&self) -> Vec<ElementId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let el = slot.element.as_ref()?;
                el.parent.is_none().then(|| ElementId::new(index as u32, slot.generation))
            })
            .collect()
    }

    /// Path from the root down to `id`, inclusive
    pub fn path_from_root(&self, id: ElementId) -> Vec<ElementId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut path: Vec<ElementId> = self.ancestors(id).collect();
        path.reverse();
        path.push(id);
        path
    }

    /// Number of ancestors above `id`
    pub fn depth(&self, id: ElementId) -> usize {
        self.ancestors(id).count()
    }
}

/// Iterator over ancestor handles
pub struct Ancestors<'a> {
    tree: &'a ElementTree,
    next: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let cur = self.next?;
        self.next = self.tree.get(cur).and_then(Element::parent);
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(tree: &mut ElementTree) -> (ElementId, ElementId, ElementId) {
        let a = tree.insert(Element::new("Root"));
        let b = tree.insert(Element::new("Panel"));
        let c = tree.insert(Element::new("Label"));
        tree.attach(b, a).unwrap();
        tree.attach(c, b).unwrap();
        (a, b, c)
    }

    #[test]
    fn test_attach_links_both_ways() {
        let mut tree = ElementTree::new();
        let (a, b, c) = chain(&mut tree);
        assert_eq!(tree.get(b).unwrap().parent(), Some(a));
        assert_eq!(tree.get(a).unwrap().children(), &[b]);
        assert_eq!(tree.ancestors(c).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(tree.depth(c), 2);
        assert_eq!(tree.path_from_root(c), vec![a, b, c]);
    }

    #[test]
    fn test_reattach_moves_child() {
        let mut tree = ElementTree::new();
        let (a, b, c) = chain(&mut tree);
        tree.attach(c, a).unwrap();
        assert!(tree.get(b).unwrap().children().is_empty());
        assert_eq!(tree.get(a).unwrap().children(), &[b, c]);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = ElementTree::new();
        let (a, _, c) = chain(&mut tree);
        assert_eq!(
            tree.attach(a, c),
            Err(TreeError::WouldCreateCycle { child: a, parent: c })
        );
        assert_eq!(tree.attach(a, a), Err(TreeError::SelfParent(a)));
    }

    #[test]
    fn test_destroy_subtree_invalidates_handles() {
        let mut tree = ElementTree::new();
        let (a, b, c) = chain(&mut tree);
        let removed = tree.destroy(b).unwrap();
        assert_eq!(removed, vec![b, c]);
        assert!(!tree.contains(b));
        assert!(!tree.contains(c));
        assert!(tree.get(a).unwrap().children().is_empty());
        assert_eq!(tree.len(), 1);

        // Slot reuse must not revive the old handle
        let d = tree.insert(Element::new("New"));
        assert_ne!(d, b);
        assert!(tree.get(b).is_none());
        assert_eq!(tree.detach(c), Err(TreeError::StaleHandle(c)));
    }

    #[test]
    fn test_subtree_preorder() {
        let mut tree = ElementTree::new();
        let (a, b, c) = chain(&mut tree);
        let d = tree.insert(Element::new("Icon"));
        tree.attach(d, a).unwrap();
        assert_eq!(tree.subtree(a), vec![a, b, c, d]);
        assert_eq!(tree.roots(), vec![a]);
    }
}
