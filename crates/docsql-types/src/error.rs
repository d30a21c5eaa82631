//! Error types shared by the DocSQL expression engine
//!
//! Two failure channels are deliberately kept distinct:
//!
//! - `SemanticCheck` aborts evaluation of the enclosing expression and is
//!   surfaced to the user with the offending value in the message.
//! - "no such value" conditions never produce an error at all; they produce
//!   `ExprValue::Null`, which propagates through enclosing expressions.
//!
//! `TypeMismatch` marks an engine-internal contract violation (a typed
//! accessor called on the wrong variant, or the dispatcher resolving an
//! incompatible signature) and should be treated as a defect.

use thiserror::Error;

/// Result type for expression operations
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors that can occur while constructing or evaluating expression values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// User-facing semantic failure: malformed literal, invalid calendar
    /// date, out-of-range function argument
    #[error("semantic check failed: {message}")]
    SemanticCheck { message: String },

    /// Typed accessor called on an incompatible variant
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Checked integer arithmetic overflowed
    #[error("arithmetic overflow in {operation}")]
    Overflow { operation: String },

    /// No registered overload matches the argument types
    #[error("unresolved function: {name}({arg_types})")]
    UnresolvedFunction { name: String, arg_types: String },
}

impl ExprError {
    /// Create a semantic check failure
    pub fn semantic_check(message: impl Into<String>) -> Self {
        Self::SemanticCheck {
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    /// Create an unresolved function error
    pub fn unresolved_function(name: impl Into<String>, arg_types: impl Into<String>) -> Self {
        Self::UnresolvedFunction {
            name: name.into(),
            arg_types: arg_types.into(),
        }
    }
}
