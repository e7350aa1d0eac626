//! Chaining rule sets over one input tree.
//!
//! A [`Pipeline`] runs an ordered list of passes, feeding each pass's output
//! tree to the next. Every [`Stage`] traverses with a fresh context, so no
//! state leaks from one stage (or one run) into another.
//!
//! When a stage produces a bundle node, [`BundleFeed`] decides what the next
//! stage sees.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info_span};

use crate::bundle::Bundle;
use crate::error::RuleError;
use crate::kind::{Kind, KindTable};
use crate::node::NodeRef;
use crate::rule::PatternTable;
use crate::traverse::traverse;

// ============================================================================
// Pass
// ============================================================================

/// One step of a pipeline.
pub trait Pass<E> {
    /// Name used in logs and responses.
    fn name(&self) -> &str;

    /// Rewrite `root`.
    fn run(&self, root: &NodeRef) -> Result<NodeRef, E>;
}

impl<E, P> Pass<E> for Box<P>
where
    P: Pass<E> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, root: &NodeRef) -> Result<NodeRef, E> {
        (**self).run(root)
    }
}

/// A named rule set run with a fresh `C::default()` context.
pub struct Stage<C, E = RuleError> {
    name: String,
    table: PatternTable<C, E>,
}

impl<C, E> Stage<C, E> {
    pub fn new(name: impl Into<String>, table: PatternTable<C, E>) -> Self {
        Stage {
            name: name.into(),
            table,
        }
    }

    pub fn table(&self) -> &PatternTable<C, E> {
        &self.table
    }
}

impl<C: Default, E> Pass<E> for Stage<C, E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, root: &NodeRef) -> Result<NodeRef, E> {
        traverse(root, &self.table)
    }
}

// ============================================================================
// BundleFeed
// ============================================================================

/// What the next stage receives when a stage outputs a bundle node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleFeed {
    /// The bundle node itself.
    #[default]
    Whole,
    /// The bundle's first tree; the other trees are dropped.
    Primary,
    /// Stop and return the bundle; remaining stages do not run.
    Halt,
}

impl BundleFeed {
    pub fn as_str(self) -> &'static str {
        match self {
            BundleFeed::Whole => "whole",
            BundleFeed::Primary => "primary",
            BundleFeed::Halt => "halt",
        }
    }
}

impl fmt::Display for BundleFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BundleFeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whole" => Ok(BundleFeed::Whole),
            "primary" => Ok(BundleFeed::Primary),
            "halt" => Ok(BundleFeed::Halt),
            other => Err(format!(
                "invalid bundle feed '{}', expected one of: whole, primary, halt",
                other
            )),
        }
    }
}

// ============================================================================
// PipelineOutput
// ============================================================================

/// Final result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutput {
    Tree(NodeRef),
    Bundle(Bundle),
}

impl PipelineOutput {
    /// Every output tree as a bundle.
    pub fn into_bundle(self) -> Bundle {
        match self {
            PipelineOutput::Tree(tree) => Bundle::single(tree),
            PipelineOutput::Bundle(bundle) => bundle,
        }
    }

    pub fn tree(&self) -> Option<&NodeRef> {
        match self {
            PipelineOutput::Tree(tree) => Some(tree),
            PipelineOutput::Bundle(_) => None,
        }
    }

    pub fn bundle(&self) -> Option<&Bundle> {
        match self {
            PipelineOutput::Tree(_) => None,
            PipelineOutput::Bundle(bundle) => Some(bundle),
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Ordered passes over one tree.
pub struct Pipeline<E = RuleError> {
    stages: Vec<Box<dyn Pass<E>>>,
    bundle_kind: Option<Kind>,
    feed: BundleFeed,
}

impl<E> Pipeline<E> {
    /// A pipeline that never treats its output as a bundle.
    pub fn new() -> Self {
        Pipeline {
            stages: Vec::new(),
            bundle_kind: None,
            feed: BundleFeed::default(),
        }
    }

    /// A pipeline recognizing the `Bundle` kind of `kinds`, if it has one.
    pub fn for_kinds(kinds: &KindTable) -> Self {
        Pipeline {
            bundle_kind: kinds.kind_of("Bundle"),
            ..Pipeline::new()
        }
    }

    pub fn with_bundle_kind(mut self, kind: Kind) -> Self {
        self.bundle_kind = Some(kind);
        self
    }

    pub fn with_feed(mut self, feed: BundleFeed) -> Self {
        self.feed = feed;
        self
    }

    pub fn push<P>(&mut self, pass: P)
    where
        P: Pass<E> + 'static,
    {
        self.stages.push(Box::new(pass));
    }

    pub fn with_stage<P>(mut self, pass: P) -> Self
    where
        P: Pass<E> + 'static,
    {
        self.push(pass);
        self
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn feed(&self) -> BundleFeed {
        self.feed
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order, feeding each output to the next stage.
    ///
    /// # Errors
    ///
    /// The first stage error, unchanged. Later stages do not run.
    pub fn run(&self, tree: NodeRef) -> Result<PipelineOutput, E> {
        let mut current = tree;
        let last = self.stages.len().saturating_sub(1);

        for (index, stage) in self.stages.iter().enumerate() {
            let span = info_span!("stage", index, name = stage.name());
            let _guard = span.enter();

            current = stage.run(&current)?;

            if index == last || !self.is_bundle(&current) {
                continue;
            }
            match self.feed {
                BundleFeed::Whole => {}
                BundleFeed::Primary => {
                    let primary = Bundle::from_node(&current).primary().map(Rc::clone);
                    match primary {
                        Some(tree) => current = tree,
                        None => debug!("empty bundle fed whole"),
                    }
                }
                BundleFeed::Halt => {
                    debug!(remaining = last - index, "halting at bundle");
                    return Ok(PipelineOutput::Bundle(Bundle::from_node(&current)));
                }
            }
        }

        Ok(self.classify(current))
    }

    fn is_bundle(&self, node: &NodeRef) -> bool {
        self.bundle_kind.is_some_and(|kind| node.is(kind))
    }

    fn classify(&self, node: NodeRef) -> PipelineOutput {
        if self.is_bundle(&node) {
            PipelineOutput::Bundle(Bundle::from_node(&node))
        } else {
            PipelineOutput::Tree(node)
        }
    }
}

impl<E> Default for Pipeline<E> {
    fn default() -> Self {
        Pipeline::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::FILE_NAME_ATTR;
    use crate::node::{same, Node};
    use crate::rule::{MatchRule, Rewrite};

    fn kinds() -> &'static KindTable {
        KindTable::typescript()
    }

    fn kind(name: &str) -> Kind {
        kinds().kind_of(name).unwrap()
    }

    fn source_file(name: &str) -> NodeRef {
        Node::new(kind("SourceFile"))
            .with_attr(FILE_NAME_ATTR, name)
            .into_ref()
    }

    /// Stage turning every source file into a bundle of itself plus a companion.
    fn split_stage() -> Stage<(), RuleError> {
        let table = PatternTable::builder(kinds())
            .rule(
                "SourceFile",
                MatchRule::new().leave(|file: &NodeRef, _: &mut ()| {
                    let name = file.attr_str(FILE_NAME_ATTR).unwrap_or("file.ts");
                    Ok(Rewrite::with(
                        Node::new(kind("Bundle"))
                            .with_child(file.clone())
                            .with_child(source_file(&format!("{}.extra", name))),
                    ))
                }),
            )
            .build()
            .unwrap();
        Stage::new("split", table)
    }

    /// Stage counting source files by renaming them.
    fn mark_stage() -> Stage<(), RuleError> {
        let table = PatternTable::builder(kinds())
            .rule(
                "SourceFile",
                MatchRule::new().visit(|file: &NodeRef, _: &mut ()| {
                    let name = file.attr_str(FILE_NAME_ATTR).unwrap_or_default();
                    Ok(Rewrite::with(
                        Node::new(kind("SourceFile")).with_attr(FILE_NAME_ATTR, format!("marked-{}", name)),
                    ))
                }),
            )
            .build()
            .unwrap();
        Stage::new("mark", table)
    }

    #[test]
    fn empty_pipeline_returns_input() {
        let tree = source_file("a.ts");
        let output = Pipeline::<RuleError>::for_kinds(kinds())
            .run(tree.clone())
            .unwrap();
        assert!(same(output.tree().unwrap(), &tree));
    }

    #[test]
    fn final_bundle_is_classified() {
        let pipeline = Pipeline::for_kinds(kinds()).with_stage(split_stage());
        let output = pipeline.run(source_file("a.ts")).unwrap();
        let bundle = output.bundle().unwrap();
        assert_eq!(bundle.names().collect::<Vec<_>>(), ["a.ts", "a.ts.extra"]);
    }

    #[test]
    fn whole_feed_passes_bundle_node_on() {
        let pipeline = Pipeline::for_kinds(kinds())
            .with_stage(split_stage())
            .with_stage(mark_stage());
        let output = pipeline.run(source_file("a.ts")).unwrap();
        let names: Vec<String> = output
            .into_bundle()
            .names()
            .map(str::to_string)
            .collect();
        assert_eq!(names, ["marked-a.ts", "marked-a.ts.extra"]);
    }

    #[test]
    fn primary_feed_keeps_first_tree() {
        let pipeline = Pipeline::for_kinds(kinds())
            .with_feed(BundleFeed::Primary)
            .with_stage(split_stage())
            .with_stage(mark_stage());
        let output = pipeline.run(source_file("a.ts")).unwrap();
        let tree = output.tree().unwrap();
        assert_eq!(tree.attr_str(FILE_NAME_ATTR), Some("marked-a.ts"));
    }

    #[test]
    fn halt_feed_stops_early() {
        let pipeline = Pipeline::for_kinds(kinds())
            .with_feed(BundleFeed::Halt)
            .with_stage(split_stage())
            .with_stage(mark_stage());
        let output = pipeline.run(source_file("a.ts")).unwrap();
        let bundle = output.bundle().unwrap();
        assert_eq!(bundle.names().collect::<Vec<_>>(), ["a.ts", "a.ts.extra"]);
    }

    #[test]
    fn bundle_kind_must_be_known_to_classify() {
        let plain = Pipeline::new().with_stage(split_stage());
        assert!(plain.run(source_file("a.ts")).unwrap().tree().is_some());

        let explicit = Pipeline::new()
            .with_bundle_kind(kind("Bundle"))
            .with_stage(split_stage());
        let output = explicit.run(source_file("a.ts")).unwrap();
        assert_eq!(output.bundle().unwrap().len(), 2);
    }

    #[test]
    fn stage_names_in_order() {
        let pipeline = Pipeline::for_kinds(kinds())
            .with_stage(split_stage())
            .with_stage(mark_stage());
        assert_eq!(pipeline.stage_names(), ["split", "mark"]);
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn bundle_feed_parses() {
        assert_eq!("Primary".parse::<BundleFeed>(), Ok(BundleFeed::Primary));
        assert_eq!(BundleFeed::Halt.to_string(), "halt");
        assert!("sometimes".parse::<BundleFeed>().is_err());
    }
}
