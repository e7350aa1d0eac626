//! Error types for the pattern engine.
//!
//! The engine itself never fails during traversal: errors raised by rule
//! callbacks pass through `traverse` and `Pipeline::run` untouched. The types
//! here cover the other boundaries:
//!
//! - [`PatternError`]: kind tables and pattern tables rejected at build time
//! - [`RuleError`]: the default error type for rule callbacks
//! - [`CodecError`]: JSON trees that cannot be decoded or encoded

use thiserror::Error;

use crate::kind::Kind;

// ============================================================================
// Build-time validation
// ============================================================================

/// A kind table or pattern table failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The name collides with a callback slot or the private-field marker.
    #[error("'{name}' is reserved and cannot be used as a kind name")]
    ReservedName { name: String },

    /// The same kind name was registered twice in one kind table.
    #[error("kind name '{name}' is registered more than once")]
    DuplicateName { name: String },

    /// Two keys of one pattern table resolve to the same kind.
    #[error("keys '{first}' and '{second}' both resolve to kind {kind}")]
    DuplicateKind {
        kind: Kind,
        first: String,
        second: String,
    },

    /// A kind the caller requires is absent from the kind table.
    #[error("kind '{name}' is not in the kind table")]
    MissingKind { name: String },
}

// ============================================================================
// Rule callbacks
// ============================================================================

/// Default error type for `filter`, `visit` and `leave` callbacks.
///
/// Rule sets may use any error type; this one covers the common cases of a
/// matched node not having the shape a rule expects, or a rule giving up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The matched node does not have the structure the rule relies on.
    #[error("unexpected node shape: expected {expected}, found {found}")]
    Shape { expected: String, found: String },

    /// The rule could not produce a replacement.
    #[error("rule '{rule}' failed: {message}")]
    Failed { rule: String, message: String },
}

impl RuleError {
    /// Create a shape error.
    pub fn shape(expected: impl Into<String>, found: impl Into<String>) -> Self {
        RuleError::Shape {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a failure error for the named rule.
    pub fn failed(rule: impl Into<String>, message: impl Into<String>) -> Self {
        RuleError::Failed {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// JSON tree codec
// ============================================================================

/// A JSON tree could not be decoded or encoded.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed JSON or wrong document shape.
    #[error("invalid tree JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A node names a kind the kind table does not know.
    #[error("unknown kind '{name}'")]
    UnknownKind { name: String },

    /// A node carries a kind code the kind table does not know.
    #[error("unknown kind code {code}")]
    UnknownCode { code: u16 },
}
