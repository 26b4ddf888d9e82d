//! Style Engine
//!
//! One explicit style universe: binding registry, selector cache, sheets,
//! element tree and per-element resolved styles. Every mutation marks the
//! affected subtree dirty and recomputes it top-down before returning, so
//! readers never observe a partially stale subtree.

use std::collections::HashMap;

use fos_elements::{Element, ElementId, ElementTree, TreeError};

use crate::bindings::{BindingHandle, BindingRegistry, PropertyBinding};
use crate::config::EngineConfig;
use crate::diagnostics::StyleDiagnostic;
use crate::match_cache::MatchCache;
use crate::pseudo::{self, PseudoStyle};
use crate::resolve::{InheritedSnapshot, ResolvedStyle, Resolver};
use crate::selectors::{MatchContext, SelectorCache};
use crate::sources::{CascadeInput, PropertyReference, ReferenceOrigin, SourceData};
use crate::stylesheet::{Declaration, SheetCategory, SheetId, SheetStore, StyleSheet};
use crate::values::PropertyValue;
use crate::StyleError;

/// Per-element recompute state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleState {
    /// Resolved style is up to date
    Clean,
    /// Needs recompute
    #[default]
    Dirty,
}

/// Engine statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleStats {
    pub elements_recomputed: u64,
    pub recompute_passes: u64,
    pub diagnostics_emitted: u64,
    pub match_cache_hits: u64,
    pub match_cache_misses: u64,
    pub selector_cache_hits: u64,
    pub selector_cache_misses: u64,
}

impl StyleStats {
    /// Match cache hit rate in [0, 1]
    pub fn match_hit_rate(&self) -> f64 {
        let total = self.match_cache_hits + self.match_cache_misses;
        if total == 0 {
            0.0
        } else {
            self.match_cache_hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct ElementStyle {
    state: StyleState,
    sources: SourceData,
    inherited: InheritedSnapshot,
    resolved: ResolvedStyle,
    local_sheet: Option<SheetId>,
    inline: Vec<Declaration>,
    recompute_count: u64,
}

/// Cascading style engine
#[derive(Debug, Default)]
pub struct StyleEngine {
    config: EngineConfig,
    registry: BindingRegistry,
    selectors: SelectorCache,
    sheets: SheetStore,
    tree: ElementTree,
    styles: HashMap<ElementId, ElementStyle>,
    match_cache: MatchCache,
    /// Roots of dirty subtrees awaiting recompute
    pending: Vec<ElementId>,
    diagnostics: Vec<StyleDiagnostic>,
    stats: StyleStats,
}

impl StyleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, StyleError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register a property binding
    ///
    /// Registering after elements exist restyles every element.
    pub fn register_property(
        &mut self,
        key: impl Into<String>,
        default_value: PropertyValue,
        inheritable: bool,
    ) -> Result<BindingHandle, StyleError> {
        let handle = self.registry.register(key, default_value, inheritable)?;
        if !self.tree.is_empty() {
            self.mark_all_dirty();
            self.flush();
        }
        Ok(handle)
    }

    pub fn lookup_binding(&self, key: &str) -> Option<&PropertyBinding> {
        self.registry.lookup(key)
    }

    /// Binding behind a handle returned by [`StyleEngine::register_property`]
    pub fn binding(&self, handle: BindingHandle) -> Option<&PropertyBinding> {
        self.registry.get(handle)
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    // ========================================================================
    // Elements
    // ========================================================================

    /// Create a detached element of the given type
    pub fn create_element(&mut self, type_name: impl Into<String>) -> ElementId {
        self.insert_element(Element::new(type_name))
    }

    /// Insert a prepared element as a detached root
    pub fn insert_element(&mut self, element: Element) -> ElementId {
        let id = self.tree.insert(element);
        self.styles.insert(id, ElementStyle::default());
        self.pending.push(id);
        self.flush();
        id
    }

    /// Destroy an element and its subtree
    ///
    /// Every handle in the subtree becomes stale and is dropped from the
    /// style table, the local sheet store and the match cache.
    pub fn destroy_element(&mut self, id: ElementId) -> Result<(), StyleError> {
        let removed = self.tree.destroy(id)?;
        for element in &removed {
            if let Some(style) = self.styles.remove(element) {
                if let Some(sheet) = style.local_sheet {
                    self.sheets.remove(sheet);
                }
            }
            self.match_cache.forget(*element);
        }
        self.pending.retain(|p| self.tree.contains(*p));
        tracing::debug!("destroyed {} ({} elements)", id, removed.len());
        Ok(())
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.tree.get(id)
    }

    /// Direct access for hosts that mutate element data themselves; call
    /// [`StyleEngine::on_class_changed`] afterwards
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.tree.get_mut(id)
    }

    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    // ========================================================================
    // Host notifications
    // ========================================================================

    /// `child` was attached under `parent`
    pub fn on_attach(&mut self, child: ElementId, parent: ElementId) -> Result<(), StyleError> {
        self.tree.attach(child, parent)?;
        self.restyle_subtree(child, true);
        Ok(())
    }

    /// `child` was detached from its parent and is now a root
    pub fn on_detach(&mut self, child: ElementId) -> Result<(), StyleError> {
        self.tree.detach(child)?;
        self.restyle_subtree(child, true);
        Ok(())
    }

    /// Id, classes or pseudo-classes of `id` changed
    pub fn on_class_changed(&mut self, id: ElementId) -> Result<(), StyleError> {
        self.require(id)?;
        self.restyle_subtree(id, true);
        Ok(())
    }

    /// Attach, replace or clear (`None`) the local sheet of `id`
    pub fn on_stylesheet_assigned(
        &mut self,
        id: ElementId,
        sheet: Option<StyleSheet>,
    ) -> Result<Option<SheetId>, StyleError> {
        self.require(id)?;
        let new_sheet = sheet.map(|s| self.sheets.insert_local(s, &mut self.selectors));
        let old_sheet = self
            .styles
            .get_mut(&id)
            .and_then(|style| std::mem::replace(&mut style.local_sheet, new_sheet));
        if let Some(old) = old_sheet {
            self.sheets.remove(old);
            self.match_cache.clear();
        }
        self.restyle_subtree(id, false);
        Ok(new_sheet)
    }

    /// Replace the inline declaration list of `id`
    pub fn set_inline_style(
        &mut self,
        id: ElementId,
        declarations: Vec<Declaration>,
    ) -> Result<(), StyleError> {
        self.require(id)?;
        if let Some(style) = self.styles.get_mut(&id) {
            style.inline = declarations;
        }
        self.restyle_subtree(id, false);
        Ok(())
    }

    pub fn set_element_id(&mut self, id: ElementId, element_id: Option<String>) -> Result<(), StyleError> {
        let element = self.tree.get_mut(id).ok_or(TreeError::StaleHandle(id))?;
        if element.id() != element_id.as_deref() {
            element.set_id(element_id);
            self.on_class_changed(id)?;
        }
        Ok(())
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) -> Result<(), StyleError> {
        let element = self.tree.get_mut(id).ok_or(TreeError::StaleHandle(id))?;
        if element.add_class(class) {
            self.on_class_changed(id)?;
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) -> Result<(), StyleError> {
        let element = self.tree.get_mut(id).ok_or(TreeError::StaleHandle(id))?;
        if element.remove_class(class) {
            self.on_class_changed(id)?;
        }
        Ok(())
    }

    pub fn set_pseudo_class(&mut self, id: ElementId, pseudo: &str, active: bool) -> Result<(), StyleError> {
        let element = self.tree.get_mut(id).ok_or(TreeError::StaleHandle(id))?;
        if element.set_pseudo_class(pseudo, active) {
            self.on_class_changed(id)?;
        }
        Ok(())
    }

    // ========================================================================
    // Global sheets
    // ========================================================================

    /// Register a global sheet (factory if read-only, developer otherwise)
    pub fn add_stylesheet(&mut self, sheet: StyleSheet) -> SheetId {
        let id = self.sheets.insert_global(sheet, &mut self.selectors);
        tracing::debug!("added global {}", id);
        self.mark_all_dirty();
        self.flush();
        id
    }

    pub fn remove_stylesheet(&mut self, id: SheetId) -> Result<(), StyleError> {
        match self.sheets.get(id) {
            Some(sheet) if sheet.category != SheetCategory::Local => {
                self.sheets.remove(id);
                // Drop memoized results for the removed selectors
                self.match_cache.clear();
                self.mark_all_dirty();
                self.flush();
                Ok(())
            }
            _ => Err(StyleError::UnknownSheet(id)),
        }
    }

    // ========================================================================
    // Pseudo states
    // ========================================================================

    /// Register a named pseudo sub-style on `id` (disabled, blend 0)
    pub fn register_pseudo_state(&mut self, id: ElementId, name: &str) -> Result<(), StyleError> {
        self.require(id)?;
        let Some(style) = self.styles.get_mut(&id) else {
            return Ok(());
        };
        if style.resolved.pseudo_style(name).is_some() {
            return Ok(());
        }
        style.resolved.pseudo.push(PseudoStyle::new(name));
        // Base values are unchanged, so descendants stay clean
        style.state = StyleState::Dirty;
        self.pending.push(id);
        self.flush();
        Ok(())
    }

    /// Enable/disable a pseudo sub-style and set its blend factor
    ///
    /// Registers the sub-style first if needed. Does not restyle: the
    /// combined style is computed on read.
    pub fn set_pseudo_state(
        &mut self,
        id: ElementId,
        name: &str,
        enabled: bool,
        blend: f32,
    ) -> Result<(), StyleError> {
        self.register_pseudo_state(id, name)?;
        let state = self
            .styles
            .get_mut(&id)
            .and_then(|style| style.resolved.pseudo.iter_mut().find(|p| p.name == name));
        if let Some(state) = state {
            state.enabled = enabled;
            state.set_blend(blend);
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Effective value of `key`, pseudo blending applied
    ///
    /// `None` for unregistered keys and stale handles.
    pub fn resolved_value(&self, id: ElementId, key: &str) -> Option<PropertyValue> {
        let style = self.styles.get(&id)?;
        pseudo::combined_value(
            style.resolved.get(key),
            &style.resolved.pseudo,
            key,
            self.config.discrete_blend_threshold,
        )
    }

    /// Resolved value of `key` without pseudo blending
    pub fn base_value(&self, id: ElementId, key: &str) -> Option<&PropertyValue> {
        self.styles.get(&id)?.resolved.get(key)
    }

    pub fn resolved_style(&self, id: ElementId) -> Option<&ResolvedStyle> {
        self.styles.get(&id).map(|style| &style.resolved)
    }

    /// Full map with active pseudo sub-styles blended in registration order
    pub fn combined_style(&self, id: ElementId) -> Option<HashMap<String, PropertyValue>> {
        let style = self.styles.get(&id)?;
        Some(pseudo::combine(
            &style.resolved.values,
            &style.resolved.pseudo,
            self.config.discrete_blend_threshold,
        ))
    }

    /// Ranked providers of `key` on `id` (inline, matched, inherited)
    pub fn cascade_trace(&self, id: ElementId, key: &str) -> Vec<PropertyReference> {
        self.styles
            .get(&id)
            .map(|style| style.sources.candidates(key).cloned().collect())
            .unwrap_or_default()
    }

    pub fn inherited_snapshot(&self, id: ElementId) -> Option<&InheritedSnapshot> {
        self.styles.get(&id).map(|style| &style.inherited)
    }

    /// How many times `id` has been recomputed
    pub fn recompute_count(&self, id: ElementId) -> Option<u64> {
        self.styles.get(&id).map(|style| style.recompute_count)
    }

    pub fn style_state(&self, id: ElementId) -> Option<StyleState> {
        self.styles.get(&id).map(|style| style.state)
    }

    pub fn stats(&self) -> StyleStats {
        let (selector_cache_hits, selector_cache_misses) = self.selectors.counters();
        StyleStats {
            match_cache_hits: self.match_cache.hits(),
            match_cache_misses: self.match_cache.misses(),
            selector_cache_hits,
            selector_cache_misses,
            ..self.stats
        }
    }

    /// Drain diagnostics collected since the last call
    pub fn take_diagnostics(&mut self) -> Vec<StyleDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // ========================================================================
    // Dirty propagation
    // ========================================================================

    fn require(&self, id: ElementId) -> Result<(), StyleError> {
        if self.tree.contains(id) {
            Ok(())
        } else {
            Err(TreeError::StaleHandle(id).into())
        }
    }

    /// Mark `id` and its descendants dirty, then recompute them
    fn restyle_subtree(&mut self, id: ElementId, matching_changed: bool) {
        if matching_changed {
            self.match_cache.clear();
        }
        self.mark_subtree_dirty(id);
        self.flush();
    }

    fn mark_subtree_dirty(&mut self, id: ElementId) {
        for element in self.tree.subtree(id) {
            self.styles.entry(element).or_default().state = StyleState::Dirty;
        }
        self.pending.push(id);
    }

    fn mark_all_dirty(&mut self) {
        for root in self.tree.roots() {
            self.mark_subtree_dirty(root);
        }
    }

    /// Recompute every dirty element, parents before children
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let mut roots = std::mem::take(&mut self.pending);
        roots.retain(|id| self.tree.contains(*id));
        roots.sort_by_key(|id| (self.tree.depth(*id), *id));
        roots.dedup();
        self.stats.recompute_passes += 1;

        for root in roots {
            for id in self.tree.subtree(root) {
                let dirty = self
                    .styles
                    .get(&id)
                    .map(|style| style.state == StyleState::Dirty)
                    .unwrap_or(true);
                if dirty {
                    self.recompute(id);
                }
            }
        }
    }

    fn recompute(&mut self, id: ElementId) {
        let Some(element) = self.tree.get(id) else {
            return;
        };

        let mut inherited = InheritedSnapshot::new();
        if let Some(parent) = element.parent().and_then(|p| self.styles.get(&p)) {
            inherited.inherit(&parent.resolved, &self.registry);
        }

        let local_sheets: Vec<SheetId> = self
            .tree
            .path_from_root(id)
            .into_iter()
            .filter_map(|e| self.styles.get(&e)?.local_sheet)
            .collect();

        let Some(current) = self.styles.get(&id) else {
            return;
        };
        let input = CascadeInput {
            element: id,
            matching: MatchContext::new(&self.tree).with_max_depth(self.config.max_ancestor_depth),
            sheets: &self.sheets,
            local_sheets: &local_sheets,
            inline: &current.inline,
            registry: &self.registry,
        };

        let mut sources = SourceData::new();
        let cache = if self.config.memoize_matches {
            Some(&mut self.match_cache)
        } else {
            None
        };
        sources.recalculate(&input, cache);

        let before = self.diagnostics.len();
        let resolver = Resolver {
            element: id,
            registry: &self.registry,
            sources: &sources,
            inherited: &inherited,
        };
        let values = resolver.resolve_all(&mut self.diagnostics);
        let pseudo: Vec<PseudoStyle> = current
            .resolved
            .pseudo
            .iter()
            .map(|state| compute_pseudo(&input, state, &inherited, &mut self.diagnostics))
            .collect();
        self.stats.diagnostics_emitted += (self.diagnostics.len() - before) as u64;

        if let Some(style) = self.styles.get_mut(&id) {
            style.sources = sources;
            style.inherited = inherited;
            style.resolved = ResolvedStyle { values, pseudo };
            style.state = StyleState::Clean;
            style.recompute_count += 1;
        }
        self.stats.elements_recomputed += 1;
        tracing::trace!("recomputed {}", id);
    }
}

/// Evaluate one pseudo sub-style: cascade again with the pseudo-class
/// forced on the element, keep keys whose winner requires that pseudo-class
fn compute_pseudo(
    base: &CascadeInput<'_>,
    state: &PseudoStyle,
    inherited: &InheritedSnapshot,
    diagnostics: &mut Vec<StyleDiagnostic>,
) -> PseudoStyle {
    let input = CascadeInput {
        matching: base.matching.with_forced_pseudo(base.element, &state.name),
        ..*base
    };
    let mut sources = SourceData::new();
    sources.recalculate(&input, None);

    let resolver = Resolver {
        element: base.element,
        registry: base.registry,
        sources: &sources,
        inherited,
    };

    let mut values = HashMap::new();
    for binding in base.registry.iter() {
        let Some(provider) = sources.winning_provider(binding) else {
            continue;
        };
        let declared_by_state = match provider.origin {
            ReferenceOrigin::Rule { sheet, rule, .. } => base
                .sheets
                .get(sheet)
                .and_then(|s| s.rules.get(rule))
                .map(|r| r.selector.selector.mentions_pseudo(&state.name))
                .unwrap_or(false),
            ReferenceOrigin::Inline => false,
        };
        if !declared_by_state {
            continue;
        }
        if let Some(value) = resolver.resolve(&binding.key, diagnostics) {
            values.insert(binding.key.clone(), value);
        }
    }

    PseudoStyle {
        name: state.name.clone(),
        enabled: state.enabled,
        blend: state.blend,
        values,
    }
}
