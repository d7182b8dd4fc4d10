// ABOUTME: Error types for macro expansion and evaluation failures

use crate::value::Value;
use thiserror::Error;

// ===== Arity constant strings shared by call sites that report a fixed count =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";

/// The error kinds an embedder needs to distinguish: unbound names, a
/// symbol used somewhere a bindable symbol is required, an unsupported
/// place shape, an arity mismatch at application, a malformed special
/// form, and a catch-all for states that should be unreachable.
#[allow(dead_code)]
#[derive(Error, Debug, Clone)]
pub enum EvalError {
    #[error("unbound variable: {0}")]
    UnboundVariable(String),

    #[error("unbound function or operator: {0}")]
    UnboundFunctionOrOperator(String),

    #[error("not a bindable symbol: {0}")]
    NotBindable(String),

    #[error("bad place form: {0}")]
    BadPlace(String),

    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("syntax error: {0}")]
    SyntaxError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl EvalError {
    pub fn unbound_variable(name: impl Into<String>) -> Self {
        EvalError::UnboundVariable(name.into())
    }

    pub fn unbound_function(name: impl Into<String>) -> Self {
        EvalError::UnboundFunctionOrOperator(name.into())
    }

    pub fn not_bindable(value: &Value) -> Self {
        EvalError::NotBindable(value.to_string())
    }

    pub fn bad_place(form: &Value) -> Self {
        EvalError::BadPlace(form.to_string())
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        EvalError::ArityMismatch {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    /// Builtin-library argument-shape complaint (e.g. `car` of a
    /// non-cons). The core's error taxonomy has no dedicated type-error
    /// variant, so the builtin layer reports these as syntax errors
    /// carrying a descriptive message, reserving `ArityMismatch` for
    /// argument-count mismatches specifically.
    pub fn type_error(function: &str, expected: &str, actual: &Value) -> Self {
        EvalError::SyntaxError(format!(
            "{}: expected {}, got {}",
            function,
            expected,
            actual.type_name()
        ))
    }

    pub fn syntax_error(message: impl Into<String>) -> Self {
        EvalError::SyntaxError(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        EvalError::InternalError(message.into())
    }
}
