//! Formula errors

use metron_core::{ErrorDetails, NumberError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("Forbidden character '{ch}' at position {position}")]
    ForbiddenCharacter { ch: char, position: usize },

    #[error("Empty formula")]
    Empty,

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("{func}() expects {expected} arguments, got {got}")]
    ArgCount { func: &'static str, expected: String, got: usize },

    #[error("Formula nested too deeply")]
    TooDeep,

    #[error(transparent)]
    Number(#[from] NumberError),
}

impl From<ExprError> for ErrorDetails {
    fn from(err: ExprError) -> Self {
        ErrorDetails::calculation(err.to_string())
    }
}
