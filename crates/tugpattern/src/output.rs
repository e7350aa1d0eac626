//! JSON output types for CLI responses.
//!
//! Every command prints exactly one JSON document to stdout: a command
//! response on success or an [`ErrorResponse`] on failure.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{OutputErrorCode, TugPatternError};
use crate::recipes;

/// Version of the JSON response schema.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Errors
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (also the process exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a TugPatternError.
    pub fn from_error(err: &TugPatternError) -> Self {
        let details = match err {
            TugPatternError::UnknownRecipe { .. } => {
                let available: Vec<&str> = recipes::catalog().iter().map(|r| r.name).collect();
                Some(serde_json::json!({ "available": available }))
            }
            TugPatternError::FileNotFound { path } | TugPatternError::WriteFailed { path, .. } => {
                Some(serde_json::json!({ "path": path }))
            }
            _ => None,
        };

        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a TugPatternError.
    pub fn from_error(err: &TugPatternError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// One tree produced by a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputTree {
    /// Bundle name (the tree's file name, or `output-<i>`).
    pub name: String,
    /// Number of nodes in the tree.
    pub nodes: usize,
    /// Where the tree was written, with `--output-dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// The encoded tree, without `--output-dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<serde_json::Value>,
}

/// Response for the run command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Recipe names in the order they ran.
    pub stages: Vec<String>,
    /// Bundle feed policy in effect.
    pub bundle_feed: String,
    /// Output trees, primary first.
    pub outputs: Vec<OutputTree>,
}

impl RunResponse {
    pub fn new(
        stages: Vec<String>,
        bundle_feed: impl Into<String>,
        outputs: Vec<OutputTree>,
    ) -> Self {
        RunResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            stages,
            bundle_feed: bundle_feed.into(),
            outputs,
        }
    }
}

/// One entry of the kind table listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindInfo {
    pub name: String,
    pub code: u16,
}

/// Response for the kinds command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindsResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Canonical kinds in code order.
    pub kinds: Vec<KindInfo>,
}

impl KindsResponse {
    pub fn new(kinds: Vec<KindInfo>) -> Self {
        KindsResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            kinds,
        }
    }
}

/// Response for the recipes command.
#[derive(Debug, Clone, Serialize)]
pub struct RecipesResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Bundled recipes.
    pub recipes: Vec<recipes::RecipeInfo>,
}

impl RecipesResponse {
    pub fn new(recipes: Vec<recipes::RecipeInfo>) -> Self {
        RecipesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            recipes,
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// This is the single output path for the CLI.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
