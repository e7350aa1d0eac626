//! Tugpattern - declarative tree rewrites for syntax-tree migrations.
//!
//! This crate provides the bundled recipes and the `tugpattern` CLI on top
//! of the engine in `tugpattern-core`.
//!
//! ## Modules
//!
//! - `cli` - CLI command implementations
//! - `config` - Layered configuration (defaults, environment, flags)
//! - `error` - Unified error type and exit codes
//! - `output` - JSON response types
//! - `recipes` - Bundled rule sets and the tree factory they share

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod recipes;

// Re-export core types for convenience
pub use error::{OutputErrorCode, TugPatternError};
pub use output::{emit_response, ErrorInfo, ErrorResponse, RunResponse, SCHEMA_VERSION};
pub use tugpattern_core::{Bundle, BundleFeed, KindTable, Node, NodeRef, Pipeline};
