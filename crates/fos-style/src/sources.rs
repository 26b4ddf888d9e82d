//! Property Source Tracker
//!
//! For one element, collects every declaration that reaches it and ranks
//! them per key. Ranking per key is `inline ++ matched ++ inherited`:
//!
//! - `inline`: the element's own inline declarations, always first
//! - `matched`: rules whose selector matches the element itself
//! - `inherited`: rules that only match an ancestor (inheritable keys only)
//!
//! Within a list references are sorted by descending weight; a reference
//! inserted with the same weight as existing ones goes in front of them,
//! so later declarations win ties.

use std::collections::HashMap;

use fos_elements::ElementId;

use crate::bindings::{BindingRegistry, PropertyBinding};
use crate::match_cache::{MatchCache, MatchKind};
use crate::selectors::{CompiledSelector, MatchContext, SelectorId};
use crate::stylesheet::{Declaration, DeclaredValue, SheetId, SheetStore, ValueType};
use crate::weight::Weight;

/// Where a reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceOrigin {
    Inline,
    Rule {
        sheet: SheetId,
        /// Index of the rule within its sheet
        rule: usize,
        selector: SelectorId,
    },
}

/// One candidate declaration for one key on one element
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyReference {
    pub key: String,
    pub origin: ReferenceOrigin,
    pub declaration: Declaration,
    pub weight: Weight,
    /// The owning selector matched the element itself, not an ancestor
    pub exact_match: bool,
}

#[derive(Debug, Clone, Default)]
struct KeySources {
    inline: Vec<PropertyReference>,
    matched: Vec<PropertyReference>,
    inherited: Vec<PropertyReference>,
}

impl KeySources {
    fn iter(&self) -> impl Iterator<Item = &PropertyReference> {
        self.inline
            .iter()
            .chain(self.matched.iter())
            .chain(self.inherited.iter())
    }
}

/// Insert keeping descending weight; equal weights go in front
fn insert_ranked(list: &mut Vec<PropertyReference>, reference: PropertyReference) {
    let pos = list.partition_point(|existing| existing.weight > reference.weight);
    list.insert(pos, reference);
}

/// Inputs of one cascade pass for one element
#[derive(Debug, Clone, Copy)]
pub struct CascadeInput<'a> {
    pub element: ElementId,
    pub matching: MatchContext<'a>,
    pub sheets: &'a SheetStore,
    /// Local sheets on the path from the root down to the element
    pub local_sheets: &'a [SheetId],
    pub inline: &'a [Declaration],
    pub registry: &'a BindingRegistry,
}

/// Ranked references per key for one element
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    keys: HashMap<String, KeySources>,
}

impl SourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Add a reference to the right list for its key
    pub fn add(&mut self, reference: PropertyReference) {
        let sources = self.keys.entry(reference.key.clone()).or_default();
        match (reference.origin, reference.exact_match) {
            (ReferenceOrigin::Inline, _) => insert_ranked(&mut sources.inline, reference),
            (_, true) => insert_ranked(&mut sources.matched, reference),
            (_, false) => insert_ranked(&mut sources.inherited, reference),
        }
    }

    /// Rebuild from scratch
    ///
    /// Walks global sheets, then local sheets root-first, then inline
    /// declarations. Pass `None` for `cache` to bypass memoization.
    pub fn recalculate(&mut self, input: &CascadeInput<'_>, mut cache: Option<&mut MatchCache>) {
        self.clear();

        let sheet_ids = input
            .sheets
            .global_order()
            .chain(input.local_sheets.iter().copied());

        for sheet_id in sheet_ids {
            let Some(sheet) = input.sheets.get(sheet_id) else {
                continue;
            };

            for (rule_index, rule) in sheet.rules.iter().enumerate() {
                let Some(exact) = rule_match(&rule.selector, input, cache.as_deref_mut()) else {
                    continue;
                };
                let weight = rule.selector.selector.weight();

                for declaration in &rule.declarations {
                    let Some(binding) = input.registry.lookup(&declaration.key) else {
                        continue;
                    };
                    if !exact && !binding.inheritable {
                        continue;
                    }
                    self.add(PropertyReference {
                        key: declaration.key.clone(),
                        origin: ReferenceOrigin::Rule {
                            sheet: sheet_id,
                            rule: rule_index,
                            selector: rule.selector.id,
                        },
                        declaration: declaration.clone(),
                        weight,
                        exact_match: exact,
                    });
                }
            }
        }

        for declaration in input.inline {
            if !input.registry.contains(&declaration.key) {
                continue;
            }
            self.add(PropertyReference {
                key: declaration.key.clone(),
                origin: ReferenceOrigin::Inline,
                declaration: declaration.clone(),
                weight: Weight::ZERO,
                exact_match: true,
            });
        }
    }

    /// Ranked candidates for `key`
    pub fn candidates<'s>(&'s self, key: &str) -> impl Iterator<Item = &'s PropertyReference> + 's {
        self.keys.get(key).into_iter().flat_map(KeySources::iter)
    }

    /// First candidate able to provide a value for `binding`
    ///
    /// `Inherited` placeholders are skipped in favour of the next-ranked
    /// candidate on this same element; literals of the wrong kind are
    /// skipped too.
    pub fn winning_provider(&self, binding: &PropertyBinding) -> Option<&PropertyReference> {
        self.candidates(&binding.key).find(|r| provides(r, binding))
    }

    /// Keys with at least one candidate
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn provides(reference: &PropertyReference, binding: &PropertyBinding) -> bool {
    let declaration = &reference.declaration;
    match declaration.value_type {
        ValueType::Inherited => false,
        ValueType::Initial => true,
        ValueType::Value => match &declaration.value {
            Some(DeclaredValue::Variable { .. }) => true,
            Some(DeclaredValue::Literal(value)) if value.kind() == binding.kind => true,
            Some(DeclaredValue::Literal(value)) => {
                tracing::debug!(
                    "skipping {} for {}: expected {}, found {}",
                    declaration.key,
                    binding.key,
                    binding.kind,
                    value.kind()
                );
                false
            }
            None => false,
        },
    }
}

/// `Some(true)` for an exact match, `Some(false)` for an ancestor-only
/// match, `None` when the rule does not reach the element
fn rule_match(
    selector: &CompiledSelector,
    input: &CascadeInput<'_>,
    cache: Option<&mut MatchCache>,
) -> Option<bool> {
    if selector.selector.is_nothing() {
        return None;
    }

    let ctx = &input.matching;
    let element = input.element;
    let exact = || selector.selector.matches(ctx, element);
    let ancestor = || selector.selector.matches_ancestor(ctx, element);

    match cache {
        Some(cache) => {
            if cache.get_or_insert_with(selector.id, element, MatchKind::Exact, exact) {
                Some(true)
            } else if cache.get_or_insert_with(selector.id, element, MatchKind::Ancestor, ancestor) {
                Some(false)
            } else {
                None
            }
        }
        None => {
            if exact() {
                Some(true)
            } else if ancestor() {
                Some(false)
            } else {
                None
            }
        }
    }
}
