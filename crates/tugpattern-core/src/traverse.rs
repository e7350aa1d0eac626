//! The traversal engine.
//!
//! [`traverse`] walks a tree depth-first, matching each node's kind against
//! a [`PatternTable`] and applying the matched rule's callbacks. The result
//! is a new tree that shares every untouched subtree with the input.
//!
//! # Matching
//!
//! For each node:
//!
//! 1. Look the node's kind up in the current table.
//! 2. No entry, or the entry's `filter` says no: rebuild the node from its
//!    children, each matched against the *same* table. A key therefore
//!    matches at any depth below the point where its table applies.
//! 3. Otherwise apply the rule: `visit` on the original node, then descend
//!    into the original node's children with the rule's nested table, then
//!    `leave` on the descended node.
//!
//! # Composing visit and leave
//!
//! | visit      | leave      | result                                  |
//! |------------|------------|-----------------------------------------|
//! | -          | -          | descended node                          |
//! | replaced x | -          | `x` (descended children are discarded)  |
//! | any        | replaced y | `y`                                     |
//! | any        | unchanged  | descended node                          |
//!
//! A visit-only replacement is returned as is: rewrites made below the
//! original node are dropped, and nested rules never see the replacement's
//! children. Rule sets rely on this.
//!
//! # Context
//!
//! Each call owns one context value, passed as `&mut C` to every callback.
//! [`traverse`] starts from `C::default()`; [`traverse_with`] takes a
//! caller-built context and returns it with the result.
//!
//! # Errors
//!
//! The engine raises no errors. The first callback error aborts the walk and
//! is returned unchanged.

use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, debug_span, trace};

use crate::node::NodeRef;
use crate::rule::{PatternTable, Rewrite, Rule};

/// Rewrite `root` with `table`, using a fresh default context.
pub fn traverse<C, E>(root: &NodeRef, table: &PatternTable<C, E>) -> Result<NodeRef, E>
where
    C: Default,
{
    traverse_with(root, table, C::default()).map(|(node, _)| node)
}

/// Rewrite `root` with `table`, threading `context` through every callback.
pub fn traverse_with<C, E>(
    root: &NodeRef,
    table: &PatternTable<C, E>,
    context: C,
) -> Result<(NodeRef, C), E> {
    let mut traversal = Traversal::new(table, context);
    let node = traversal.run(root)?;
    Ok((node, traversal.into_context()))
}

/// Counters collected during one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraversalStats {
    /// Nodes examined against a table.
    pub nodes_visited: usize,
    /// Nodes whose rule was applied.
    pub rules_matched: usize,
    /// Nodes whose kind matched but whose filter declined.
    pub filter_rejections: usize,
    /// Replacements produced by `visit` or `leave`.
    pub replacements: usize,
}

/// One traversal: a rule set plus the context its callbacks share.
pub struct Traversal<'t, C, E> {
    table: &'t PatternTable<C, E>,
    context: C,
    stats: TraversalStats,
}

impl<'t, C, E> Traversal<'t, C, E> {
    pub fn new(table: &'t PatternTable<C, E>, context: C) -> Self {
        Traversal {
            table,
            context,
            stats: TraversalStats::default(),
        }
    }

    /// Rewrite `root`. Returns `root` itself when nothing changed.
    pub fn run(&mut self, root: &NodeRef) -> Result<NodeRef, E> {
        let span = debug_span!("traverse", root = %root.kind());
        let _guard = span.enter();

        let table = self.table;
        let rewrite = self.match_and_descend(root, table)?;
        debug!(
            nodes = self.stats.nodes_visited,
            matched = self.stats.rules_matched,
            rejected = self.stats.filter_rejections,
            replaced = self.stats.replacements,
            "traversal complete"
        );
        Ok(rewrite.resolve(root))
    }

    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    fn match_and_descend(
        &mut self,
        node: &NodeRef,
        table: &'t PatternTable<C, E>,
    ) -> Result<Rewrite, E> {
        self.stats.nodes_visited += 1;

        if let Some(entry) = table.get(node.kind()) {
            let accepted = match entry.rule().callbacks().and_then(|rule| rule.filter.as_ref()) {
                Some(filter) => filter(node, &mut self.context)?,
                None => true,
            };
            if accepted {
                trace!(kind = %node.kind(), key = entry.label(), "matched");
                self.stats.rules_matched += 1;
                return self.apply_rule(node, entry.rule());
            }
            trace!(kind = %node.kind(), key = entry.label(), "filtered out");
            self.stats.filter_rejections += 1;
        }

        self.descend(node, table)
    }

    fn apply_rule(&mut self, node: &NodeRef, rule: &'t Rule<C, E>) -> Result<Rewrite, E> {
        let callbacks = rule.callbacks();

        let visited = match callbacks.and_then(|rule| rule.visit.as_ref()) {
            Some(visit) => visit(node, &mut self.context)?,
            None => Rewrite::Unchanged,
        };

        let descended = self.descend(node, rule.table())?;

        if let Some(leave) = callbacks.and_then(|rule| rule.leave.as_ref()) {
            let subject = descended.clone().resolve(node);
            return match leave(&subject, &mut self.context)? {
                Rewrite::Unchanged => Ok(descended),
                replaced => {
                    self.stats.replacements += 1;
                    Ok(replaced)
                }
            };
        }

        match visited {
            Rewrite::Unchanged => Ok(descended),
            replaced => {
                if descended.is_replaced() {
                    debug!(kind = %node.kind(), "descent discarded by visit replacement");
                }
                self.stats.replacements += 1;
                Ok(replaced)
            }
        }
    }

    /// Rebuild `node` from its children matched against `table`.
    fn descend(&mut self, node: &NodeRef, table: &'t PatternTable<C, E>) -> Result<Rewrite, E> {
        let mut rebuilt: Option<Vec<NodeRef>> = None;

        for (index, child) in node.children().iter().enumerate() {
            match self.match_and_descend(child, table)? {
                Rewrite::Unchanged => {
                    if let Some(children) = rebuilt.as_mut() {
                        children.push(Rc::clone(child));
                    }
                }
                Rewrite::Replaced(replacement) => {
                    rebuilt
                        .get_or_insert_with(|| node.children()[..index].to_vec())
                        .push(replacement);
                }
            }
        }

        Ok(match rebuilt {
            Some(children) => Rewrite::with(node.rebuilt(children)),
            None => Rewrite::Unchanged,
        })
    }
}
