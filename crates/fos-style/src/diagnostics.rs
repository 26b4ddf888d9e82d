//! Non-fatal resolution diagnostics

use std::fmt;

use fos_elements::ElementId;

use crate::values::PropertyKind;

/// Recovered problem found while resolving one property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleDiagnostic {
    /// Variable chain revisited a key; the property fell back to its default
    VariableCycle {
        element: ElementId,
        key: String,
        /// Keys in visit order, ending with the repeated one
        chain: Vec<String>,
    },
    /// Variable names a key missing from the registry
    UnknownVariable {
        element: ElementId,
        key: String,
        variable: String,
    },
    /// Variable chain produced a value of the wrong kind
    TypeMismatch {
        element: ElementId,
        key: String,
        expected: PropertyKind,
        found: PropertyKind,
    },
}

impl StyleDiagnostic {
    pub fn element(&self) -> ElementId {
        match self {
            StyleDiagnostic::VariableCycle { element, .. }
            | StyleDiagnostic::UnknownVariable { element, .. }
            | StyleDiagnostic::TypeMismatch { element, .. } => *element,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            StyleDiagnostic::VariableCycle { key, .. }
            | StyleDiagnostic::UnknownVariable { key, .. }
            | StyleDiagnostic::TypeMismatch { key, .. } => key,
        }
    }
}

impl fmt::Display for StyleDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleDiagnostic::VariableCycle { element, key, chain } => {
                write!(f, "{element}: variable cycle resolving {key}: {}", chain.join(" -> "))
            }
            StyleDiagnostic::UnknownVariable { element, key, variable } => {
                write!(f, "{element}: {key} references unknown variable {variable}")
            }
            StyleDiagnostic::TypeMismatch { element, key, expected, found } => {
                write!(f, "{element}: {key} expected {expected}, variable gave {found}")
            }
        }
    }
}
