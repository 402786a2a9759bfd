//! Conversion engine
//!
//! Every call is a pure function of the registry and its arguments.
//! Failures come back inside the `ConversionResult`, never as panics.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use serde::Serialize;
use metron_core::{ErrorDetails, Number};

use crate::definition::UnitRef;
use crate::format::{format_value, FormatOptions};
use crate::parse::{parse_input, parse_lines, resolve_pair, LineParse};
use crate::registry::{self, Registry};

/// Outcome of one conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_value: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

impl ConversionResult {
    pub fn failure(error: ErrorDetails) -> Self {
        Self {
            success: false,
            value: None,
            formatted: None,
            input_value: None,
            source_unit: None,
            target_unit: None,
            target_symbol: None,
            category: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Converted value as f64, when successful
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_ref().and_then(|v| v.to_f64())
    }

    /// Formatted value followed by the target symbol, e.g. "3.28084 ft"
    pub fn display(&self) -> Option<String> {
        let formatted = self.formatted.as_ref()?;
        Some(match &self.target_symbol {
            Some(symbol) => format!("{} {}", formatted, symbol),
            None => formatted.clone(),
        })
    }

    /// History entry for a successful conversion
    pub fn to_record(&self, input: &str) -> Option<ConversionRecord> {
        if !self.success {
            return None;
        }
        Some(ConversionRecord {
            input: input.to_string(),
            output: self.display()?,
            source_unit: self.source_unit.clone()?,
            target_unit: self.target_unit.clone()?,
            input_value: self.input_value.clone()?,
            output_value: self.value.clone()?,
        })
    }
}

/// What an external history store would keep for one conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    pub input: String,
    pub output: String,
    pub source_unit: String,
    pub target_unit: String,
    pub input_value: Number,
    pub output_value: Number,
}

/// One line of multi-line conversion output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LineResult {
    Empty { empty: bool },
    Converted(ConversionResult),
}

impl LineResult {
    pub fn empty() -> Self {
        LineResult::Empty { empty: true }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LineResult::Empty { .. })
    }
}

/// Converts values against one registry snapshot
#[derive(Debug, Clone)]
pub struct Converter {
    registry: Arc<Registry>,
    format: FormatOptions,
}

impl Converter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            format: FormatOptions::default(),
        }
    }

    /// Converter over the process-wide published registry
    pub fn published() -> Result<Self, ErrorDetails> {
        registry::published().map(Self::new)
    }

    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Convert a native number
    pub fn convert(&self, value: f64, source: &str, target: &str) -> ConversionResult {
        if !value.is_finite() {
            return ConversionResult::failure(
                ErrorDetails::calculation("Value must be a finite number").with_context(value.to_string()),
            );
        }
        match Number::from_f64(value) {
            Ok(n) => self.convert_number(&n, source, target),
            Err(e) => ConversionResult::failure(e.into()),
        }
    }

    /// Convert an exact decimal value
    pub fn convert_number(&self, value: &Number, source: &str, target: &str) -> ConversionResult {
        guarded(|| self.convert_inner(value, source, target))
    }

    /// Parse a request line and convert it
    pub fn convert_from_input(&self, text: &str) -> ConversionResult {
        guarded(|| match parse_input(text) {
            Ok(parsed) => self.convert_inner(&parsed.value, &parsed.source_unit, &parsed.target_unit),
            Err(e) => ConversionResult::failure(e),
        })
    }

    /// One result per input line; blank lines stay blank
    pub fn convert_lines(&self, text: &str) -> Vec<LineResult> {
        parse_lines(text)
            .into_iter()
            .map(|line| match line {
                LineParse::Empty => LineResult::empty(),
                LineParse::Failed(e) => LineResult::Converted(ConversionResult::failure(e)),
                LineParse::Parsed(p) => LineResult::Converted(guarded(|| {
                    self.convert_inner(&p.value, &p.source_unit, &p.target_unit)
                })),
            })
            .collect()
    }

    /// Resolution and category check only, no arithmetic
    pub fn validate_conversion(&self, source: &str, target: &str) -> Result<(UnitRef, UnitRef), ErrorDetails> {
        resolve_pair(source, target, self.registry.alias_index())
    }

    fn convert_inner(&self, value: &Number, source: &str, target: &str) -> ConversionResult {
        match self.try_convert(value, source, target) {
            Ok(result) => result,
            Err(e) => ConversionResult::failure(e),
        }
    }

    fn try_convert(&self, value: &Number, source: &str, target: &str) -> Result<ConversionResult, ErrorDetails> {
        let (from_ref, to_ref) = self.validate_conversion(source, target)?;

        let missing = |r: &UnitRef| ErrorDetails::internal(format!("alias points at missing unit {}", r));
        let from = self.registry.unit(&from_ref).ok_or_else(|| missing(&from_ref))?;
        let to = self.registry.unit(&to_ref).ok_or_else(|| missing(&to_ref))?;

        let result = if from_ref == to_ref {
            value.clone()
        } else {
            let base = from.to_base(value)?;
            to.from_base(&base)?
        };

        Ok(ConversionResult {
            success: true,
            formatted: Some(format_value(&result, &self.format)),
            value: Some(result),
            input_value: Some(value.clone()),
            source_unit: Some(from.key.clone()),
            target_unit: Some(to.key.clone()),
            target_symbol: Some(to.symbol.clone()),
            category: Some(from_ref.category),
            error: None,
        })
    }
}

fn guarded<F: FnOnce() -> ConversionResult>(f: F) -> ConversionResult {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|panic| {
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unexpected fault during conversion".to_string());
        ConversionResult::failure(ErrorDetails::internal(detail))
    })
}

// ============ Published-registry entry points ============

/// Convert against the published registry
pub fn convert(value: f64, source: &str, target: &str) -> ConversionResult {
    match Converter::published() {
        Ok(c) => c.convert(value, source, target),
        Err(e) => ConversionResult::failure(e),
    }
}

pub fn convert_from_input(text: &str) -> ConversionResult {
    match Converter::published() {
        Ok(c) => c.convert_from_input(text),
        Err(e) => ConversionResult::failure(e),
    }
}

pub fn validate_conversion(source: &str, target: &str) -> Result<(UnitRef, UnitRef), ErrorDetails> {
    Converter::published()?.validate_conversion(source, target)
}
