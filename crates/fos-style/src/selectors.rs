//! Selector Parser & Matcher
//!
//! Grammar:
//!
//! ```text
//! selector := group (',' group)*
//! group    := compound (('>')? compound)*
//! compound := ('*' | typeName)? ('#' id)? ('.' class)* (':' pseudo)*
//! ```
//!
//! Malformed text never fails: it parses to [`Selector::Nothing`], which
//! matches no element.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use fos_elements::{ElementId, ElementTree};

use crate::weight::Weight;

/// Default bound for ancestor walks
pub const MAX_ANCESTOR_DEPTH: usize = 100;

/// A parsed selector term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `*`
    Universal,
    /// `Button`
    Type(String),
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `:pseudo`
    Pseudo(String),
    /// Every term must match (`Button.primary:hover`)
    Conjunction(Vec<Selector>),
    /// `ancestor base` or `ancestor > base`
    AncestorRelation {
        base: Box<Selector>,
        ancestor: Box<Selector>,
        direct_only: bool,
    },
    /// Comma-separated OR list
    Alternatives(Vec<Selector>),
    /// Result of malformed text; matches nothing
    Nothing,
}

/// Matching environment for one cascade pass
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub tree: &'a ElementTree,
    /// Upper bound on parent-chain walks
    pub max_depth: usize,
    /// Pseudo-class treated as active on one element, used when evaluating
    /// pseudo sub-styles
    pub forced_pseudo: Option<(ElementId, &'a str)>,
}

impl<'a> MatchContext<'a> {
    pub fn new(tree: &'a ElementTree) -> Self {
        Self {
            tree,
            max_depth: MAX_ANCESTOR_DEPTH,
            forced_pseudo: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_forced_pseudo(mut self, element: ElementId, pseudo: &'a str) -> Self {
        self.forced_pseudo = Some((element, pseudo));
        self
    }

    /// Ancestors of `element`, nearest first, bounded by `max_depth`
    fn ancestors(self, element: ElementId) -> impl Iterator<Item = ElementId> + 'a {
        self.tree.ancestors(element).take(self.max_depth)
    }
}

impl Selector {
    /// Parse selector text; malformed input yields `Selector::Nothing`
    pub fn parse(text: &str) -> Selector {
        parse_selector_list(text).unwrap_or(Selector::Nothing)
    }

    /// Specificity weight
    ///
    /// Conjunctions, relations and OR lists all sum their parts.
    pub fn weight(&self) -> Weight {
        match self {
            Selector::Universal | Selector::Nothing => Weight::ZERO,
            Selector::Type(_) => Weight::TYPE,
            Selector::Id(_) => Weight::ID,
            Selector::Class(_) | Selector::Pseudo(_) => Weight::CLASS,
            Selector::Conjunction(terms) | Selector::Alternatives(terms) => {
                terms.iter().map(Selector::weight).sum()
            }
            Selector::AncestorRelation { base, ancestor, .. } => base.weight() + ancestor.weight(),
        }
    }

    /// Does the selector match `element` itself
    pub fn matches(&self, ctx: &MatchContext<'_>, element: ElementId) -> bool {
        let Some(el) = ctx.tree.get(element) else {
            return false;
        };

        match self {
            Selector::Universal => true,
            Selector::Nothing => false,
            Selector::Type(name) => el.type_name() == name,
            Selector::Id(id) => el.id() == Some(id.as_str()),
            Selector::Class(class) => el.has_class(class),
            Selector::Pseudo(pseudo) => {
                el.has_pseudo_class(pseudo)
                    || ctx.forced_pseudo == Some((element, pseudo.as_str()))
            }
            Selector::Conjunction(terms) => terms.iter().all(|t| t.matches(ctx, element)),
            Selector::Alternatives(options) => options.iter().any(|o| o.matches(ctx, element)),
            Selector::AncestorRelation { base, ancestor, direct_only } => {
                if !base.matches(ctx, element) {
                    return false;
                }
                if *direct_only {
                    el.parent()
                        .map(|parent| ancestor.matches(ctx, parent))
                        .unwrap_or(false)
                } else {
                    ctx.ancestors(element).any(|a| ancestor.matches(ctx, a))
                }
            }
        }
    }

    /// Does the selector match some ancestor of `element`
    pub fn matches_ancestor(&self, ctx: &MatchContext<'_>, element: ElementId) -> bool {
        ctx.ancestors(element).any(|a| self.matches(ctx, a))
    }

    /// Whether the selector requires `:pseudo` on its subject element
    ///
    /// Pseudo-classes inside the ancestor part of a relation do not count.
    pub fn mentions_pseudo(&self, pseudo: &str) -> bool {
        match self {
            Selector::Pseudo(p) => p == pseudo,
            Selector::Conjunction(terms) | Selector::Alternatives(terms) => {
                terms.iter().any(|t| t.mentions_pseudo(pseudo))
            }
            Selector::AncestorRelation { base, .. } => base.mentions_pseudo(pseudo),
            _ => false,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Selector::Nothing)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Universal => f.write_str("*"),
            Selector::Type(name) => f.write_str(name),
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Class(class) => write!(f, ".{class}"),
            Selector::Pseudo(pseudo) => write!(f, ":{pseudo}"),
            Selector::Conjunction(terms) => terms.iter().try_for_each(|t| write!(f, "{t}")),
            Selector::AncestorRelation { base, ancestor, direct_only } => {
                let sep = if *direct_only { " > " } else { " " };
                write!(f, "{ancestor}{sep}{base}")
            }
            Selector::Alternatives(options) => {
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{option}")?;
                }
                Ok(())
            }
            Selector::Nothing => f.write_str("<invalid>"),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

#[derive(Debug, PartialEq)]
enum GroupToken<'a> {
    Compound(&'a str),
    Child,
}

fn parse_selector_list(text: &str) -> Option<Selector> {
    let mut groups = text
        .split(',')
        .map(parse_group)
        .collect::<Option<Vec<_>>>()?;

    if groups.len() == 1 {
        groups.pop()
    } else {
        Some(Selector::Alternatives(groups))
    }
}

fn tokenize_group(group: &str) -> Vec<GroupToken<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in group.char_indices() {
        if c.is_whitespace() || c == '>' {
            if let Some(s) = start.take() {
                tokens.push(GroupToken::Compound(&group[s..i]));
            }
            if c == '>' {
                tokens.push(GroupToken::Child);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(GroupToken::Compound(&group[s..]));
    }
    tokens
}

fn parse_group(group: &str) -> Option<Selector> {
    let mut iter = tokenize_group(group).into_iter();

    let mut acc = match iter.next()? {
        GroupToken::Compound(text) => parse_compound(text)?,
        GroupToken::Child => return None,
    };

    let mut pending_child = false;
    for token in iter {
        match token {
            GroupToken::Child if pending_child => return None,
            GroupToken::Child => pending_child = true,
            GroupToken::Compound(text) => {
                acc = Selector::AncestorRelation {
                    base: Box::new(parse_compound(text)?),
                    ancestor: Box::new(acc),
                    direct_only: pending_child,
                };
                pending_child = false;
            }
        }
    }

    // Dangling '>'
    if pending_child {
        return None;
    }
    Some(acc)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some((&s[..end], &s[end..]))
}

fn parse_compound(text: &str) -> Option<Selector> {
    let mut terms = Vec::new();
    let mut rest = text;

    if let Some(after) = rest.strip_prefix('*') {
        terms.push(Selector::Universal);
        rest = after;
    } else if rest.starts_with(is_ident_char) {
        let (name, after) = take_ident(rest)?;
        terms.push(Selector::Type(name.to_string()));
        rest = after;
    }

    while let Some(marker) = rest.chars().next() {
        let (name, after) = take_ident(&rest[marker.len_utf8()..])?;
        let term = match marker {
            '#' => Selector::Id(name.to_string()),
            '.' => Selector::Class(name.to_string()),
            ':' => Selector::Pseudo(name.to_string()),
            _ => return None,
        };
        terms.push(term);
        rest = after;
    }

    match terms.len() {
        0 => None,
        1 => terms.pop(),
        _ => Some(Selector::Conjunction(terms)),
    }
}

// ============================================================================
// Parse cache
// ============================================================================

/// Stable identifier of a cached selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorId(pub u32);

/// A parsed selector shared between rules with identical text
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    pub id: SelectorId,
    pub selector: Arc<Selector>,
}

/// Selector parse cache keyed by input text
#[derive(Debug, Default)]
pub struct SelectorCache {
    entries: HashMap<String, CompiledSelector>,
    hits: u64,
    misses: u64,
}

impl SelectorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text`, reusing an earlier parse of the same string
    pub fn get_or_parse(&mut self, text: &str) -> CompiledSelector {
        if let Some(entry) = self.entries.get(text) {
            self.hits += 1;
            return entry.clone();
        }

        self.misses += 1;
        let selector = Selector::parse(text);
        if selector.is_nothing() {
            tracing::debug!("malformed selector {:?} matches nothing", text);
        }
        let entry = CompiledSelector {
            id: SelectorId(self.entries.len() as u32),
            selector: Arc::new(selector),
        };
        self.entries.insert(text.to_string(), entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses)
    pub fn counters(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
