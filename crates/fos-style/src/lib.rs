//! fOS Style - cascading property resolution
//!
//! Resolves typed property values for elements of an [`ElementTree`]:
//!
//! - Global sheets (factory, then developer) and per-element local sheets
//! - Selector matching with weight ordering and ancestor relations
//! - Inline declarations, inheritance and `initial` resets
//! - Variable indirection with cycle detection
//! - Named pseudo sub-styles blended on read
//!
//! [`StyleEngine`] is the entry point. Hosts create elements through it,
//! report tree and class changes, and read back resolved values.
//!
//! [`ElementTree`]: fos_elements::ElementTree

mod bindings;
mod config;
mod diagnostics;
mod engine;
mod match_cache;
mod pseudo;
mod resolve;
mod selectors;
mod sources;
mod stylesheet;
mod values;
mod weight;

pub use bindings::{BindingHandle, BindingRegistry, PropertyBinding};
pub use config::EngineConfig;
pub use diagnostics::StyleDiagnostic;
pub use engine::{StyleEngine, StyleState, StyleStats};
pub use match_cache::{MatchCache, MatchKind};
pub use pseudo::{PseudoStyle, blend_value, clamp_blend};
pub use resolve::{InheritedSnapshot, ResolvedStyle, Resolver};
pub use selectors::{
    CompiledSelector, MAX_ANCESTOR_DEPTH, MatchContext, Selector, SelectorCache, SelectorId,
};
pub use sources::{CascadeInput, PropertyReference, ReferenceOrigin, SourceData};
pub use stylesheet::{
    Declaration, DeclaredValue, Rule, SheetCategory, SheetId, SheetStore, StyleSheet, ValueType,
};
pub use values::{Color, PropertyKind, PropertyValue, Vec2};
pub use weight::Weight;

pub use fos_elements::{Element, ElementId, ElementTree, TreeError};

/// Style engine error
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Element tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Property already registered: {0}")]
    DuplicateBinding(String),

    #[error("Unknown global stylesheet: {0}")]
    UnknownSheet(SheetId),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
