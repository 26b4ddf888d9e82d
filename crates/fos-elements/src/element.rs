//! Element - styleable node data

use std::collections::BTreeSet;

use crate::ElementId;

/// A styleable element
///
/// Parent/children links are owned by [`crate::ElementTree`] and can only be
/// changed through it; the selector-facing data (type name, id, classes,
/// pseudo-classes) is freely mutable.
#[derive(Debug, Clone)]
pub struct Element {
    /// Type name matched by type selectors (e.g. `Button`)
    type_name: String,
    /// Element id (`#id`)
    id: Option<String>,
    /// Class list (`.class`)
    classes: BTreeSet<String>,
    /// Active pseudo-classes (`:hover`)
    pseudo_classes: BTreeSet<String>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
}

impl Element {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            classes: BTreeSet::new(),
            pseudo_classes: BTreeSet::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Builder: set the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder: add a class
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    #[inline]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Add a class, returns false if it was already present
    pub fn add_class(&mut self, class: impl Into<String>) -> bool {
        self.classes.insert(class.into())
    }

    /// Remove a class, returns false if it was not present
    pub fn remove_class(&mut self, class: &str) -> bool {
        self.classes.remove(class)
    }

    pub fn pseudo_classes(&self) -> impl Iterator<Item = &str> {
        self.pseudo_classes.iter().map(String::as_str)
    }

    #[inline]
    pub fn has_pseudo_class(&self, pseudo: &str) -> bool {
        self.pseudo_classes.contains(pseudo)
    }

    /// Toggle a pseudo-class, returns true if the set changed
    pub fn set_pseudo_class(&mut self, pseudo: &str, active: bool) -> bool {
        if active {
            self.pseudo_classes.insert(pseudo.to_string())
        } else {
            self.pseudo_classes.remove(pseudo)
        }
    }

    /// Parent handle (None for roots)
    #[inline]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children in insertion order
    #[inline]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}
