//! Edge case tests for fos-elements

use fos_elements::{Element, ElementTree, TreeError};

#[test]
fn test_deep_chain() {
    let mut tree = ElementTree::new();
    let root = tree.insert(Element::new("Root"));
    let mut parent = root;
    for _ in 0..500 {
        let child = tree.insert(Element::new("Node"));
        tree.attach(child, parent).unwrap();
        parent = child;
    }
    assert_eq!(tree.depth(parent), 500);
    assert_eq!(tree.path_from_root(parent).first(), Some(&root));
    assert_eq!(tree.subtree(root).len(), 501);
}

#[test]
fn test_reparent_keeps_subtree() {
    let mut tree = ElementTree::new();
    let a = tree.insert(Element::new("A"));
    let b = tree.insert(Element::new("B"));
    let c = tree.insert(Element::new("C"));
    let d = tree.insert(Element::new("D"));
    tree.attach(c, a).unwrap();
    tree.attach(d, c).unwrap();

    tree.attach(c, b).unwrap();
    assert!(tree.get(a).unwrap().children().is_empty());
    assert_eq!(tree.subtree(b), vec![b, c, d]);
    assert_eq!(tree.roots(), vec![a, b]);
}

#[test]
fn test_cycles_rejected() {
    let mut tree = ElementTree::new();
    let a = tree.insert(Element::new("A"));
    let b = tree.insert(Element::new("B"));
    tree.attach(b, a).unwrap();

    assert_eq!(tree.attach(a, b), Err(TreeError::WouldCreateCycle { child: a, parent: b }));
    assert_eq!(tree.attach(a, a), Err(TreeError::SelfParent(a)));
    assert_eq!(tree.get(b).unwrap().parent(), Some(a));
}

#[test]
fn test_destroyed_handles_are_stale() {
    let mut tree = ElementTree::new();
    let a = tree.insert(Element::new("A"));
    let b = tree.insert(Element::new("B"));
    tree.attach(b, a).unwrap();

    assert_eq!(tree.destroy(a).unwrap(), vec![a, b]);
    assert!(tree.is_empty());
    assert_eq!(tree.detach(b), Err(TreeError::StaleHandle(b)));

    let reused = tree.insert(Element::new("C"));
    assert_ne!(reused, a);
    assert_ne!(reused, b);
    assert!(tree.get(a).is_none());
}

#[test]
fn test_element_sets() {
    let mut element = Element::new("Button").with_id("ok").with_class("primary");
    assert!(!element.add_class("primary"));
    assert!(element.add_class("wide"));
    assert_eq!(element.classes().collect::<Vec<_>>(), vec!["primary", "wide"]);
    assert!(element.set_pseudo_class("hover", true));
    assert!(!element.set_pseudo_class("hover", true));
    assert!(element.has_pseudo_class("hover"));
    element.set_id(None);
    assert_eq!(element.id(), None);
}
