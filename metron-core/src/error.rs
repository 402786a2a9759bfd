//! Structured conversion errors
//!
//! Errors never cross the engine boundary as panics. They are plain values
//! carrying a machine-readable kind, a message, and optional context and
//! suggestions, rendered the same way for every caller.

use crate::NumberError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const CALCULATION_ERROR: &str = "CALCULATION_ERROR";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
}

/// Failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input has the wrong shape or an unreadable number
    InvalidFormat,
    /// A unit token did not resolve
    UnknownUnit,
    /// Arithmetic or evaluator fault
    CalculationError,
    /// Malformed category definition; never meant for end users
    ConfigurationError,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidFormat => codes::INVALID_FORMAT,
            ErrorKind::UnknownUnit => codes::UNKNOWN_UNIT,
            ErrorKind::CalculationError => codes::CALCULATION_ERROR,
            ErrorKind::ConfigurationError => codes::CONFIGURATION_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Which side of a conversion a unit token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitRole {
    Source,
    Target,
}

impl std::fmt::Display for UnitRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitRole::Source => f.write_str("source"),
            UnitRole::Target => f.write_str("target"),
        }
    }
}

/// Structured error returned by every fallible engine operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub kind: ErrorKind,

    /// Human-readable message
    pub message: String,

    /// Extra detail, e.g. the offending token or formula
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Ordered suggestions, best first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ErrorDetails {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
            suggestions: None,
        }
    }

    /// Builder: add context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Builder: replace the suggestion list
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = suggestions.into_iter().map(Into::into).collect();
        self.suggestions = if list.is_empty() { None } else { Some(list) };
        self
    }

    /// Builder: append one suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.get_or_insert_with(Vec::new).push(suggestion.into());
        self
    }

    pub fn suggestions(&self) -> &[String] {
        self.suggestions.as_deref().unwrap_or(&[])
    }

    // ========== Common Error Constructors ==========

    pub fn invalid_format(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidFormat, details)
    }

    pub fn unknown_unit(token: &str, role: UnitRole) -> Self {
        Self::new(ErrorKind::UnknownUnit, format!("Unknown {} unit: '{}'", role, token))
            .with_context(format!("{} unit", role))
    }

    pub fn calculation(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::CalculationError, details)
    }

    pub fn configuration(details: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationError, details)
    }

    pub fn not_initialized() -> Self {
        Self::configuration("Conversion system not initialized")
            .with_suggestion("Load the unit configuration before converting")
    }

    pub fn category_mismatch(source_category: &str, target_category: &str) -> Self {
        Self::invalid_format(format!(
            "Cannot convert between different categories: {} and {}",
            source_category, target_category
        ))
        .with_context(format!("{} -> {}", source_category, target_category))
    }

    /// Caught panic or other fault that should never happen
    pub fn internal(details: impl Into<String>) -> Self {
        Self::calculation(format!("Internal error: {}", details.into()))
    }

    /// Message, optional context line, optional bulleted suggestions
    pub fn render(&self) -> String {
        let mut out = self.message.clone();
        if let Some(ref context) = self.context {
            out.push_str(&format!("\n({})", context));
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:");
            for s in suggestions {
                out.push_str(&format!("\n  - {}", s));
            }
        }
        out
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " ({})", context)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorDetails {}

impl From<NumberError> for ErrorDetails {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::ParseError(s) => Self::invalid_format(format!("Invalid number: {}", s)),
            other => Self::calculation(other.to_string()),
        }
    }
}
