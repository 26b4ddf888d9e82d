//! fOS Elements - styleable element tree
//!
//! Arena-allocated hierarchy of styleable elements. Elements are addressed
//! by [`ElementId`] handles; parents are stored as handles and children as
//! an owned list of handles, so the tree never holds reference cycles.

mod element;
mod tree;

pub use element::Element;
pub use tree::{Ancestors, ElementTree};

use std::fmt;

/// Element identifier (slot index + generation)
///
/// Handles are stable for the lifetime of the element. Once an element is
/// destroyed its slot may be reused, but the generation changes, so old
/// handles are reported as stale instead of aliasing the new element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

impl ElementId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}v{}", self.index, self.generation)
    }
}

/// Tree mutation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("Stale or unknown element handle: {0}")]
    StaleHandle(ElementId),

    #[error("Attaching {child} under {parent} would create a cycle")]
    WouldCreateCycle { child: ElementId, parent: ElementId },

    #[error("Element {0} cannot be its own parent")]
    SelfParent(ElementId),
}
