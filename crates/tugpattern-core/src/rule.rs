//! Pattern tables and match rules.
//!
//! A rule set is a [`PatternTable`]: a map from [`Kind`] to a [`Rule`]. A
//! rule is either another table (keep descending) or a terminal
//! [`MatchRule`] carrying up to three callbacks plus its own nested table,
//! which is how path patterns such as "inside a class, inside its
//! constructor, match a parameter" are written.
//!
//! Rule sets are written against kind *names* and resolved through a
//! [`KindTable`] when the builder finishes:
//!
//! ```ignore
//! let table = PatternTable::builder(kinds)
//!     .rule(
//!         "ClassDeclaration",
//!         MatchRule::new()
//!             .leave(|class, ctx: &mut Members| Ok(add_members(class, ctx)))
//!             .nested(
//!                 "Constructor",
//!                 PatternTable::builder(kinds)
//!                     .rule("Parameter", MatchRule::new().visit(rename_param))
//!                     .build()?,
//!             ),
//!     )
//!     .build()?;
//! ```
//!
//! # Key resolution
//!
//! - Names missing from the kind table are ignored (they can never match)
//! - Reserved names (`visit`, `leave`, `filter`, `_private`) are rejected
//! - Two keys resolving to the same kind are rejected

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{PatternError, RuleError};
use crate::kind::{is_reserved, Kind, KindTable};
use crate::node::{Node, NodeRef};

// ============================================================================
// Rewrite
// ============================================================================

/// Outcome of a rewrite step.
#[derive(Debug, Clone, PartialEq)]
pub enum Rewrite {
    /// Keep the node that was handed in.
    Unchanged,
    /// Use this node instead.
    Replaced(NodeRef),
}

impl Rewrite {
    /// Replace with a freshly built node.
    pub fn with(node: Node) -> Self {
        Rewrite::Replaced(Rc::new(node))
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Rewrite::Unchanged)
    }

    pub fn is_replaced(&self) -> bool {
        matches!(self, Rewrite::Replaced(_))
    }

    /// The resulting node, given the node the step was applied to.
    pub fn resolve(self, original: &NodeRef) -> NodeRef {
        match self {
            Rewrite::Unchanged => Rc::clone(original),
            Rewrite::Replaced(node) => node,
        }
    }
}

impl From<Node> for Rewrite {
    fn from(node: Node) -> Self {
        Rewrite::with(node)
    }
}

impl From<NodeRef> for Rewrite {
    fn from(node: NodeRef) -> Self {
        Rewrite::Replaced(node)
    }
}

// ============================================================================
// Callbacks
// ============================================================================

/// Gate deciding whether a matched node is handled by its rule.
pub type FilterFn<C, E> = Box<dyn Fn(&Node, &mut C) -> Result<bool, E>>;

/// Pre-order (`visit`) or post-order (`leave`) transform.
pub type RewriteFn<C, E> = Box<dyn Fn(&NodeRef, &mut C) -> Result<Rewrite, E>>;

// ============================================================================
// MatchRule
// ============================================================================

/// Terminal rule attached to one matched kind.
///
/// - `filter(node, ctx)`: when false, the node is treated as unmatched
/// - `visit(node, ctx)`: runs on the original node before descent
/// - `leave(node, ctx)`: runs on the node after its children were descended
///
/// The nested table is applied to the matched node's descendants.
pub struct MatchRule<C, E = RuleError> {
    pub(crate) filter: Option<FilterFn<C, E>>,
    pub(crate) visit: Option<RewriteFn<C, E>>,
    pub(crate) leave: Option<RewriteFn<C, E>>,
    pub(crate) table: PatternTable<C, E>,
    pending: Vec<(String, Rule<C, E>)>,
}

impl<C, E> MatchRule<C, E> {
    pub fn new() -> Self {
        MatchRule {
            filter: None,
            visit: None,
            leave: None,
            table: PatternTable::empty(),
            pending: Vec::new(),
        }
    }

    pub fn filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Node, &mut C) -> Result<bool, E> + 'static,
    {
        self.filter = Some(Box::new(f));
        self
    }

    pub fn visit<F>(mut self, f: F) -> Self
    where
        F: Fn(&NodeRef, &mut C) -> Result<Rewrite, E> + 'static,
    {
        self.visit = Some(Box::new(f));
        self
    }

    pub fn leave<F>(mut self, f: F) -> Self
    where
        F: Fn(&NodeRef, &mut C) -> Result<Rewrite, E> + 'static,
    {
        self.leave = Some(Box::new(f));
        self
    }

    /// Match `name` among this node's descendants with another rule.
    pub fn rule(mut self, name: impl Into<String>, rule: MatchRule<C, E>) -> Self {
        self.pending.push((name.into(), Rule::Terminal(rule)));
        self
    }

    /// Match `name` among this node's descendants and keep descending with `table`.
    pub fn nested(mut self, name: impl Into<String>, table: PatternTable<C, E>) -> Self {
        self.pending.push((name.into(), Rule::Nested(table)));
        self
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn has_visit(&self) -> bool {
        self.visit.is_some()
    }

    pub fn has_leave(&self) -> bool {
        self.leave.is_some()
    }

    /// Table applied to the matched node's descendants.
    pub fn table(&self) -> &PatternTable<C, E> {
        &self.table
    }
}

impl<C, E> Default for MatchRule<C, E> {
    fn default() -> Self {
        MatchRule::new()
    }
}

impl<C, E> fmt::Debug for MatchRule<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchRule")
            .field("filter", &self.has_filter())
            .field("visit", &self.has_visit())
            .field("leave", &self.has_leave())
            .field("table", &self.table)
            .finish()
    }
}

// ============================================================================
// Rule
// ============================================================================

/// Value stored under a kind in a pattern table.
pub enum Rule<C, E = RuleError> {
    /// Matching continues into the node's descendants with this table.
    Nested(PatternTable<C, E>),
    /// Callbacks fire for the node.
    Terminal(MatchRule<C, E>),
}

impl<C, E> Rule<C, E> {
    /// Table applied to the matched node's descendants.
    pub fn table(&self) -> &PatternTable<C, E> {
        match self {
            Rule::Nested(table) => table,
            Rule::Terminal(rule) => &rule.table,
        }
    }

    /// Callbacks, if this is a terminal rule.
    pub fn callbacks(&self) -> Option<&MatchRule<C, E>> {
        match self {
            Rule::Nested(_) => None,
            Rule::Terminal(rule) => Some(rule),
        }
    }
}

impl<C, E> fmt::Debug for Rule<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Nested(table) => f.debug_tuple("Nested").field(table).finish(),
            Rule::Terminal(rule) => f.debug_tuple("Terminal").field(rule).finish(),
        }
    }
}

// ============================================================================
// PatternTable
// ============================================================================

/// A resolved table entry.
pub struct Entry<C, E> {
    label: String,
    rule: Rule<C, E>,
}

impl<C, E> Entry<C, E> {
    /// The name the entry was registered under.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rule(&self) -> &Rule<C, E> {
        &self.rule
    }
}

/// Rule set: kinds mapped to rules.
pub struct PatternTable<C, E = RuleError> {
    entries: HashMap<Kind, Entry<C, E>>,
    ignored: Vec<String>,
}

impl<C, E> PatternTable<C, E> {
    /// A table that matches nothing.
    pub fn empty() -> Self {
        PatternTable {
            entries: HashMap::new(),
            ignored: Vec::new(),
        }
    }

    /// Start a table whose keys resolve through `kinds`.
    pub fn builder(kinds: &KindTable) -> PatternTableBuilder<'_, C, E> {
        PatternTableBuilder {
            kinds,
            pending: Vec::new(),
        }
    }

    pub fn get(&self, kind: Kind) -> Option<&Entry<C, E>> {
        self.entries.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that named no known kind.
    pub fn ignored_keys(&self) -> &[String] {
        &self.ignored
    }

    fn resolve(kinds: &KindTable, pending: Vec<(String, Rule<C, E>)>) -> Result<Self, PatternError> {
        let mut table = PatternTable::empty();
        for (name, mut rule) in pending {
            if is_reserved(&name) {
                return Err(PatternError::ReservedName { name });
            }
            if let Rule::Terminal(terminal) = &mut rule {
                let nested = std::mem::take(&mut terminal.pending);
                if !nested.is_empty() {
                    terminal.table = PatternTable::resolve(kinds, nested)?;
                }
            }
            let Some(kind) = kinds.kind_of(&name) else {
                debug!(key = %name, "ignoring pattern key with no matching kind");
                table.ignored.push(name);
                continue;
            };
            if let Some(existing) = table.entries.get(&kind) {
                return Err(PatternError::DuplicateKind {
                    kind,
                    first: existing.label.clone(),
                    second: name,
                });
            }
            table.entries.insert(kind, Entry { label: name, rule });
        }
        Ok(table)
    }
}

impl<C, E> Default for PatternTable<C, E> {
    fn default() -> Self {
        PatternTable::empty()
    }
}

impl<C, E> fmt::Debug for PatternTable<C, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<(&Kind, &str)> = self
            .entries
            .iter()
            .map(|(kind, entry)| (kind, entry.label.as_str()))
            .collect();
        keys.sort();
        f.debug_struct("PatternTable")
            .field("keys", &keys)
            .field("ignored", &self.ignored)
            .finish()
    }
}

/// Builder collecting named keys until they can be resolved.
pub struct PatternTableBuilder<'k, C, E = RuleError> {
    kinds: &'k KindTable,
    pending: Vec<(String, Rule<C, E>)>,
}

impl<C, E> PatternTableBuilder<'_, C, E> {
    pub fn rule(mut self, name: impl Into<String>, rule: MatchRule<C, E>) -> Self {
        self.pending.push((name.into(), Rule::Terminal(rule)));
        self
    }

    pub fn nested(mut self, name: impl Into<String>, table: PatternTable<C, E>) -> Self {
        self.pending.push((name.into(), Rule::Nested(table)));
        self
    }

    /// Resolve every key, including keys nested inside match rules.
    ///
    /// # Errors
    ///
    /// - `PatternError::ReservedName` for a reserved key at any depth
    /// - `PatternError::DuplicateKind` when two keys of one table share a kind
    pub fn build(self) -> Result<PatternTable<C, E>, PatternError> {
        PatternTable::resolve(self.kinds, self.pending)
    }
}
