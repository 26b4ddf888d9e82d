//! Property Binding Registry
//!
//! The registered contract for each property key: its value kind, whether
//! it inherits, and its initial value. Keys missing from the registry are
//! ignored by every other stage.

use std::collections::HashMap;

use crate::values::{PropertyKind, PropertyValue};
use crate::StyleError;

/// Handle returned by registration (index into the registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingHandle(pub u32);

/// Registered property contract
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyBinding {
    pub key: String,
    pub kind: PropertyKind,
    pub inheritable: bool,
    pub default_value: PropertyValue,
}

#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<PropertyBinding>,
    by_key: HashMap<String, BindingHandle>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key`; the kind is taken from the default value
    pub fn register(
        &mut self,
        key: impl Into<String>,
        default_value: PropertyValue,
        inheritable: bool,
    ) -> Result<BindingHandle, StyleError> {
        let key = key.into();
        if self.by_key.contains_key(&key) {
            return Err(StyleError::DuplicateBinding(key));
        }

        let handle = BindingHandle(self.bindings.len() as u32);
        tracing::trace!("registered property {} ({})", key, default_value.kind());
        self.bindings.push(PropertyBinding {
            key: key.clone(),
            kind: default_value.kind(),
            inheritable,
            default_value,
        });
        self.by_key.insert(key, handle);
        Ok(handle)
    }

    pub fn lookup(&self, key: &str) -> Option<&PropertyBinding> {
        self.by_key.get(key).map(|h| &self.bindings[h.0 as usize])
    }

    pub fn get(&self, handle: BindingHandle) -> Option<&PropertyBinding> {
        self.bindings.get(handle.0 as usize)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn is_inheritable(&self, key: &str) -> bool {
        self.lookup(key).map(|b| b.inheritable).unwrap_or(false)
    }

    /// All bindings in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = BindingRegistry::new();
        let h = registry
            .register("font-size", PropertyValue::Float(14.0), true)
            .unwrap();
        let binding = registry.lookup("font-size").unwrap();
        assert_eq!(binding.kind, PropertyKind::Float);
        assert!(binding.inheritable);
        assert_eq!(registry.get(h), Some(binding));
        assert!(registry.lookup("unknown").is_none());
        assert!(!registry.is_inheritable("unknown"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = BindingRegistry::new();
        registry.register("width", PropertyValue::Float(0.0), false).unwrap();
        let err = registry
            .register("width", PropertyValue::Int(1), false)
            .unwrap_err();
        assert!(matches!(err, StyleError::DuplicateBinding(k) if k == "width"));
        assert_eq!(registry.len(), 1);
    }
}
