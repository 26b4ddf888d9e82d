//! Style Resolution
//!
//! Turns an element's ranked sources into concrete values:
//! winning provider → variable indirection → inherited snapshot → default.

use std::collections::HashMap;

use fos_elements::ElementId;

use crate::bindings::{BindingRegistry, PropertyBinding};
use crate::diagnostics::StyleDiagnostic;
use crate::pseudo::PseudoStyle;
use crate::sources::SourceData;
use crate::stylesheet::{DeclaredValue, ValueType};
use crate::values::PropertyValue;

/// Values an element starts from before its own cascade runs
///
/// Seeded from the parent's resolved style for inheritable keys only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InheritedSnapshot {
    values: HashMap<String, PropertyValue>,
}

impl InheritedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with the parent's inheritable values
    pub fn inherit(&mut self, parent: &ResolvedStyle, registry: &BindingRegistry) {
        self.values.clear();
        for (key, value) in &parent.values {
            if registry.is_inheritable(key) {
                self.values.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolved property map of one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedStyle {
    pub(crate) values: HashMap<String, PropertyValue>,
    pub(crate) pseudo: Vec<PseudoStyle>,
}

impl ResolvedStyle {
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &HashMap<String, PropertyValue> {
        &self.values
    }

    /// Pseudo sub-styles in registration order
    pub fn pseudo_styles(&self) -> &[PseudoStyle] {
        &self.pseudo
    }

    pub fn pseudo_style(&self, name: &str) -> Option<&PseudoStyle> {
        self.pseudo.iter().find(|p| p.name == name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Keys visited by one top-level resolution
///
/// Allocated fresh for every top-level call, never shared.
#[derive(Debug, Default)]
struct VariableGuard {
    chain: Vec<String>,
}

impl VariableGuard {
    /// Returns false if `key` was already visited
    fn enter(&mut self, key: &str) -> bool {
        let seen = self.chain.iter().any(|k| k == key);
        self.chain.push(key.to_string());
        !seen
    }
}

enum ChainBreak {
    Cycle,
    UnknownVariable(String),
}

/// Resolution view over one element's cascade
pub struct Resolver<'a> {
    pub element: ElementId,
    pub registry: &'a BindingRegistry,
    pub sources: &'a SourceData,
    pub inherited: &'a InheritedSnapshot,
}

impl Resolver<'_> {
    /// Resolve `key`; `None` only when the key is not registered
    ///
    /// Problems are recovered locally: the binding default is returned and a
    /// diagnostic is pushed to `diagnostics`.
    pub fn resolve(
        &self,
        key: &str,
        diagnostics: &mut Vec<StyleDiagnostic>,
    ) -> Option<PropertyValue> {
        let binding = self.registry.lookup(key)?;
        let mut guard = VariableGuard::default();

        let value = match self.resolve_chain(binding, &mut guard) {
            Ok(value) if value.kind() == binding.kind => value,
            Ok(value) => {
                tracing::debug!(
                    "{}: {} expected {}, got {}",
                    self.element,
                    key,
                    binding.kind,
                    value.kind()
                );
                diagnostics.push(StyleDiagnostic::TypeMismatch {
                    element: self.element,
                    key: key.to_string(),
                    expected: binding.kind,
                    found: value.kind(),
                });
                binding.default_value.clone()
            }
            Err(ChainBreak::Cycle) => {
                tracing::warn!(
                    "{}: variable cycle resolving {}: {}",
                    self.element,
                    key,
                    guard.chain.join(" -> ")
                );
                diagnostics.push(StyleDiagnostic::VariableCycle {
                    element: self.element,
                    key: key.to_string(),
                    chain: guard.chain,
                });
                binding.default_value.clone()
            }
            Err(ChainBreak::UnknownVariable(variable)) => {
                tracing::debug!("{}: {} references unknown {}", self.element, key, variable);
                diagnostics.push(StyleDiagnostic::UnknownVariable {
                    element: self.element,
                    key: key.to_string(),
                    variable,
                });
                binding.default_value.clone()
            }
        };
        Some(value)
    }

    fn resolve_chain(
        &self,
        binding: &PropertyBinding,
        guard: &mut VariableGuard,
    ) -> Result<PropertyValue, ChainBreak> {
        if !guard.enter(&binding.key) {
            return Err(ChainBreak::Cycle);
        }

        let Some(provider) = self.sources.winning_provider(binding) else {
            return Ok(self.fallback(binding));
        };

        let declaration = &provider.declaration;
        if declaration.value_type == ValueType::Initial {
            return Ok(binding.default_value.clone());
        }

        match &declaration.value {
            Some(DeclaredValue::Literal(value)) => Ok(value.clone()),
            Some(DeclaredValue::Variable { variable_ref }) => {
                let target = self
                    .registry
                    .lookup(variable_ref)
                    .ok_or_else(|| ChainBreak::UnknownVariable(variable_ref.clone()))?;
                self.resolve_chain(target, guard)
            }
            None => Ok(self.fallback(binding)),
        }
    }

    /// No provider: inherited snapshot, then default
    fn fallback(&self, binding: &PropertyBinding) -> PropertyValue {
        if binding.inheritable {
            if let Some(value) = self.inherited.get(&binding.key) {
                return value.clone();
            }
        }
        binding.default_value.clone()
    }

    /// Resolve every registered key
    pub fn resolve_all(&self, diagnostics: &mut Vec<StyleDiagnostic>) -> HashMap<String, PropertyValue> {
        self.registry
            .iter()
            .filter_map(|binding| {
                self.resolve(&binding.key, diagnostics)
                    .map(|value| (binding.key.clone(), value))
            })
            .collect()
    }
}
