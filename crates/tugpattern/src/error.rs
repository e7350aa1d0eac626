//! Error types and error code constants for tugpattern.
//!
//! [`TugPatternError`] is the single error type rendered by the CLI. Errors
//! from the engine (pattern tables, tree codec, rule callbacks) and from the
//! recipe catalog are bridged into it with `From` impls.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad flags, bad config values, malformed trees)
//! - `3`: Resolution errors (input file not found, unknown recipe)
//! - `4`: Apply errors (a rule failed, an output could not be written)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;
use tugpattern_core::{CodecError, PatternError, RuleError};

use crate::recipes::RecipeError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (file not found, unknown recipe).
    ResolutionError = 3,
    /// Apply errors (rule failure, failed to write outputs).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum TugPatternError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Input tree could not be decoded.
    #[error("invalid tree: {message}")]
    InvalidTree { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// No recipe with that name.
    #[error("unknown recipe '{name}'")]
    UnknownRecipe { name: String },

    /// A rule callback failed during a pipeline run.
    #[error("rule failed: {message}")]
    RuleFailed { message: String },

    /// An output could not be written.
    #[error("failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl TugPatternError {
    pub fn invalid_args(message: impl Into<String>) -> Self {
        TugPatternError::InvalidArguments {
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        TugPatternError::FileNotFound { path: path.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TugPatternError::InternalError {
            message: message.into(),
        }
    }

    /// Get the output error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&TugPatternError> for OutputErrorCode {
    fn from(err: &TugPatternError) -> Self {
        match err {
            TugPatternError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            TugPatternError::InvalidTree { .. } => OutputErrorCode::InvalidArguments,
            TugPatternError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            TugPatternError::UnknownRecipe { .. } => OutputErrorCode::ResolutionError,
            TugPatternError::RuleFailed { .. } => OutputErrorCode::ApplyError,
            TugPatternError::WriteFailed { .. } => OutputErrorCode::ApplyError,
            TugPatternError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<RuleError> for TugPatternError {
    fn from(err: RuleError) -> Self {
        TugPatternError::RuleFailed {
            message: err.to_string(),
        }
    }
}

impl From<CodecError> for TugPatternError {
    fn from(err: CodecError) -> Self {
        TugPatternError::InvalidTree {
            message: err.to_string(),
        }
    }
}

impl From<PatternError> for TugPatternError {
    fn from(err: PatternError) -> Self {
        // Bundled rule sets are fixed, so a rejected table is a bug.
        TugPatternError::internal(err.to_string())
    }
}

impl From<RecipeError> for TugPatternError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::Unknown { name } => TugPatternError::UnknownRecipe { name },
            RecipeError::Pattern(pattern) => TugPatternError::from(pattern),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod code_mapping {
        use super::*;

        #[test]
        fn code_values() {
            assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
            assert_eq!(OutputErrorCode::ResolutionError.code(), 3);
            assert_eq!(OutputErrorCode::ApplyError.code(), 4);
            assert_eq!(OutputErrorCode::InternalError.code(), 10);
        }

        #[test]
        fn display_shows_code() {
            assert_eq!(OutputErrorCode::ApplyError.to_string(), "4");
        }

        #[test]
        fn rule_error_maps_to_apply_error() {
            let err = TugPatternError::from(RuleError::failed("service-mocks", "no name"));
            assert_eq!(err.error_code(), OutputErrorCode::ApplyError);
            assert_eq!(
                err.to_string(),
                "rule failed: rule 'service-mocks' failed: no name"
            );
        }

        #[test]
        fn codec_error_maps_to_invalid_arguments() {
            let err = TugPatternError::from(CodecError::UnknownKind {
                name: "JsxElement".to_string(),
            });
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn unknown_recipe_maps_to_resolution_error() {
            let err = TugPatternError::from(RecipeError::Unknown {
                name: "nope".to_string(),
            });
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
            assert_eq!(err.to_string(), "unknown recipe 'nope'");
        }

        #[test]
        fn pattern_error_is_internal() {
            let err = TugPatternError::from(PatternError::MissingKind {
                name: "Bundle".to_string(),
            });
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
        }

        #[test]
        fn file_not_found_maps_to_resolution_error() {
            let err = TugPatternError::file_not_found("tree.json");
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
        }
    }
}
