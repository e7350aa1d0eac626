//! Core infrastructure for tugpattern.
//!
//! A declarative tree pattern-matching and rewrite engine:
//! - Kind tables mapping symbolic kind names to discriminators
//! - Immutable, structurally shared tree nodes
//! - Pattern tables and match rules (`filter` / `visit` / `leave`)
//! - The traversal engine with per-call context
//! - Pipelines chaining rule sets, and bundles of output trees
//! - JSON encoding of trees
//! - Error types

pub mod bundle;
pub mod codec;
pub mod error;
pub mod kind;
pub mod node;
pub mod pipeline;
pub mod rule;
pub mod traverse;

pub use bundle::Bundle;
pub use error::{CodecError, PatternError, RuleError};
pub use kind::{Kind, KindTable};
pub use node::{Node, NodeRef};
pub use pipeline::{BundleFeed, Pass, Pipeline, PipelineOutput, Stage};
pub use rule::{MatchRule, PatternTable, Rewrite, Rule};
pub use traverse::{traverse, traverse_with, Traversal, TraversalStats};
