//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -p tugpattern -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Engine Types
// ============================================================================

use tugpattern_core::codec::{decode, decode_value, encode, encode_value};
use tugpattern_core::node::{same, Attrs};
use tugpattern_core::rule::{Entry, FilterFn, PatternTableBuilder, RewriteFn};
use tugpattern_core::{
    traverse, traverse_with, Bundle, BundleFeed, CodecError, Kind, KindTable, MatchRule, Node,
    NodeRef, Pass, PatternError, PatternTable, Pipeline, PipelineOutput, Rewrite, Rule, RuleError,
    Stage, Traversal, TraversalStats,
};

// ============================================================================
// CLI Crate Types
// ============================================================================

// error module - error types and codes
use tugpattern::error::{OutputErrorCode, TugPatternError};

// output module - JSON output types
use tugpattern::output::{
    emit_response, ErrorInfo, ErrorResponse, KindInfo, KindsResponse, OutputTree,
    RecipesResponse, RunResponse, SCHEMA_VERSION,
};

// config module - layered settings
use tugpattern::config::{
    CliOverrides, ConfigSource, ConfigValue, ResolvedConfig, ENV_BUNDLE_FEED, ENV_INJECT_TOKEN,
    ENV_RENAMED_PARAM, ENV_SCOPE_PARAM,
};

// recipes module - bundled rule sets
use tugpattern::recipes::factory::{
    declared_name, decorator_callee, lower_first, Factory, NAME_ATTR, TEXT_ATTR, TOKEN_ATTR,
};
use tugpattern::recipes::scope::ScopeContext;
use tugpattern::recipes::service_mocks::MockContext;
use tugpattern::recipes::{catalog, lookup, pipeline, RecipeError, RecipeInfo, RecipeOptions};

// cli module - command implementations
use tugpattern::cli::{list_kinds, list_recipes, run_recipes, RunRequest};

// crate root re-exports
use tugpattern::{
    Bundle as RootBundle, BundleFeed as RootBundleFeed, KindTable as RootKindTable,
    Node as RootNode, NodeRef as RootNodeRef, Pipeline as RootPipeline,
};

#[test]
fn api_surface_compiles() {
    // Recipe contexts are fresh per pass
    let _ = ScopeContext::default();
    let _ = MockContext::default();
    assert_eq!(catalog().len(), 2);
}
