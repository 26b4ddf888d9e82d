//! Rules & Stylesheets
//!
//! Authoring shape (serde, camelCase):
//!
//! ```json
//! {
//!   "isReadOnly": false,
//!   "sortIndex": 0,
//!   "rules": [
//!     { "selector": ".title",
//!       "properties": [
//!         { "key": "font-size", "valueType": "value", "value": { "float": 18.0 } },
//!         { "key": "color", "valueType": "value", "value": { "variableRef": "--accent" } },
//!         { "key": "opacity", "valueType": "inherited" }
//!       ] }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::selectors::{CompiledSelector, SelectorCache};
use crate::values::PropertyValue;
use crate::StyleError;

/// How a declaration provides its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    /// The declaration carries a value (literal or variable reference)
    #[default]
    Value,
    /// Placeholder: defer to the next-ranked source for this key on the
    /// same element
    Inherited,
    /// Reset to the binding's default
    Initial,
}

/// Payload of a `Value` declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeclaredValue {
    /// Indirection to another property key
    Variable {
        #[serde(rename = "variableRef")]
        variable_ref: String,
    },
    Literal(PropertyValue),
}

/// A single `key: value` declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub key: String,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<DeclaredValue>,
}

impl Declaration {
    /// `key: <literal>`
    pub fn value(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self {
            key: key.into(),
            value_type: ValueType::Value,
            value: Some(DeclaredValue::Literal(value.into())),
        }
    }

    /// `key: var(variable)`
    pub fn variable(key: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_type: ValueType::Value,
            value: Some(DeclaredValue::Variable { variable_ref: variable.into() }),
        }
    }

    /// `key: inherited`
    pub fn inherited(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_type: ValueType::Inherited,
            value: None,
        }
    }

    /// `key: initial`
    pub fn initial(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value_type: ValueType::Initial,
            value: None,
        }
    }

    /// Variable name if this declaration is an indirection
    pub fn variable_ref(&self) -> Option<&str> {
        match &self.value {
            Some(DeclaredValue::Variable { variable_ref }) => Some(variable_ref),
            _ => None,
        }
    }

    /// Literal payload if present
    pub fn literal(&self) -> Option<&PropertyValue> {
        match &self.value {
            Some(DeclaredValue::Literal(v)) => Some(v),
            _ => None,
        }
    }
}

/// Selector text plus ordered declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub selector: String,
    #[serde(default)]
    pub properties: Vec<Declaration>,
}

impl Rule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            properties: Vec::new(),
        }
    }

    /// Builder: append a declaration
    pub fn with(mut self, declaration: Declaration) -> Self {
        self.properties.push(declaration);
        self
    }
}

/// Ordered rule list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSheet {
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// Factory sheets are read-only and ordered by `sort_index`
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub sort_index: i32,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only factory sheet
    pub fn factory(sort_index: i32) -> Self {
        Self {
            rules: Vec::new(),
            is_read_only: true,
            sort_index,
        }
    }

    /// Builder: append a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StyleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Compiled sheets
// ============================================================================

/// Stylesheet handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(pub u32);

impl std::fmt::Display for SheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sheet#{}", self.0)
    }
}

/// Where a sheet sits in the global precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetCategory {
    Factory,
    Developer,
    /// Attached to one element, applies to its subtree
    Local,
}

/// Rule with its selector resolved through the parse cache
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub selector: CompiledSelector,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone)]
pub struct CompiledSheet {
    pub id: SheetId,
    pub category: SheetCategory,
    pub sort_index: i32,
    pub rules: Vec<CompiledRule>,
}

/// Owner of every compiled stylesheet
#[derive(Debug, Default)]
pub struct SheetStore {
    sheets: HashMap<SheetId, CompiledSheet>,
    /// Sorted by ascending sort index, ties in registration order
    factory: Vec<SheetId>,
    developer: Vec<SheetId>,
    next_id: u32,
}

impl SheetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn compile(
        &mut self,
        sheet: StyleSheet,
        category: SheetCategory,
        selectors: &mut SelectorCache,
    ) -> SheetId {
        let id = SheetId(self.next_id);
        self.next_id += 1;

        let rules = sheet
            .rules
            .into_iter()
            .map(|rule| CompiledRule {
                selector: selectors.get_or_parse(&rule.selector),
                declarations: rule.properties,
            })
            .collect();

        self.sheets.insert(
            id,
            CompiledSheet {
                id,
                category,
                sort_index: sheet.sort_index,
                rules,
            },
        );
        id
    }

    /// Register a global sheet; read-only sheets become factory sheets
    pub fn insert_global(&mut self, sheet: StyleSheet, selectors: &mut SelectorCache) -> SheetId {
        if sheet.is_read_only {
            let sort_index = sheet.sort_index;
            let id = self.compile(sheet, SheetCategory::Factory, selectors);
            let pos = self
                .factory
                .partition_point(|f| self.sheets[f].sort_index <= sort_index);
            self.factory.insert(pos, id);
            id
        } else {
            let id = self.compile(sheet, SheetCategory::Developer, selectors);
            self.developer.push(id);
            id
        }
    }

    /// Register a sheet attached to a single element
    pub fn insert_local(&mut self, sheet: StyleSheet, selectors: &mut SelectorCache) -> SheetId {
        self.compile(sheet, SheetCategory::Local, selectors)
    }

    pub fn remove(&mut self, id: SheetId) -> Option<CompiledSheet> {
        let sheet = self.sheets.remove(&id)?;
        self.factory.retain(|s| *s != id);
        self.developer.retain(|s| *s != id);
        Some(sheet)
    }

    pub fn get(&self, id: SheetId) -> Option<&CompiledSheet> {
        self.sheets.get(&id)
    }

    /// Factory sheets by sort index, then developer sheets in discovery order
    pub fn global_order(&self) -> impl Iterator<Item = SheetId> + '_ {
        self.factory.iter().chain(self.developer.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
