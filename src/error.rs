//! Error types for the interpreter

use thiserror::Error;

use crate::value::JsValue;

/// Main error type for the interpreter
#[derive(Debug, Error)]
pub enum JsError {
    #[error("TypeError: {message}")]
    TypeError { message: String },

    /// Malformed or unsupported program shape. These are programmer errors
    /// of the AST producer (or of the interpreter itself) and are never
    /// catchable from script code.
    #[error("malformed program: {message}")]
    Structural { message: String },

    /// A value raised by a `throw` statement or a failing host call.
    /// Only `try` statements unwrap this variant.
    #[error("uncaught exception: {value:?}")]
    Thrown { value: JsValue },
}

impl JsError {
    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        JsError::Structural {
            message: message.into(),
        }
    }

    pub fn thrown(value: JsValue) -> Self {
        JsError::Thrown { value }
    }

    /// Check whether this error carries a script-thrown value
    pub fn is_thrown(&self) -> bool {
        matches!(self, JsError::Thrown { .. })
    }
}
