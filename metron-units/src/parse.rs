//! Natural-language conversion requests: `<number> <unit> (to|as) <unit>`
//!
//! Accepted number forms, tried in order:
//! - decimal or scientific: `5`, `-2.5`, `.5`, `1e-3`
//! - simple fraction: `3/4`
//! - mixed number: `1 1/2` (the sign of the whole part applies to all of it)

use std::sync::OnceLock;
use regex::{Captures, Regex};
use serde::Serialize;
use metron_core::{ErrorDetails, Number, UnitRole};

use crate::alias::{normalize_unit_text, AliasIndex};
use crate::definition::UnitRef;
use crate::suggest::unknown_unit_error;

/// Shown when a line matches none of the accepted forms
pub const FORMAT_EXAMPLES: [&str; 3] = [
    "5 meters to feet",
    "20 degC as degF",
    "1 1/2 gallons to liters",
];

/// A successfully parsed request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInput {
    pub value: Number,
    /// Source unit text as typed (trimmed)
    pub source_unit: String,
    /// Target unit text as typed (trimmed)
    pub target_unit: String,
    /// The whole input line
    pub input: String,
}

/// One line of multi-line input
#[derive(Debug, Clone, PartialEq)]
pub enum LineParse {
    Empty,
    Parsed(ParsedInput),
    Failed(ErrorDetails),
}

// ============ Compiled regex patterns ============

fn get_decimal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:e[+-]?\d+)?)\s*([^\d\s/.].*?)\s+(?:to|as)\s+(.+?)\s*$").unwrap()
    })
}

fn get_fraction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([+-]?\d+)\s*/\s*(\d+)\s*([^\d\s/.].*?)\s+(?:to|as)\s+(.+?)\s*$").unwrap()
    })
}

fn get_mixed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*([+-]?\d+)\s+(\d+)\s*/\s*(\d+)\s*([^\d\s/.].*?)\s+(?:to|as)\s+(.+?)\s*$").unwrap()
    })
}

fn group<'h>(caps: &Captures<'h>, i: usize) -> &'h str {
    caps.get(i).map(|m| m.as_str()).unwrap_or("")
}

fn number(text: &str) -> Result<Number, ErrorDetails> {
    Number::from_str(text).map_err(ErrorDetails::from)
}

fn fraction(numerator: &str, denominator: &str) -> Result<Number, ErrorDetails> {
    let d = number(denominator)?;
    if d.is_zero() {
        return Err(ErrorDetails::invalid_format("Division by zero in fraction")
            .with_context(format!("{}/{}", numerator, denominator)));
    }
    number(numerator)?
        .checked_div(&d)
        .map_err(ErrorDetails::from)
}

/// Parse one request line
pub fn parse_input(line: &str) -> Result<ParsedInput, ErrorDetails> {
    let (value, source, target) = if let Some(caps) = get_decimal_regex().captures(line) {
        (number(group(&caps, 1))?, group(&caps, 2), group(&caps, 3))
    } else if let Some(caps) = get_fraction_regex().captures(line) {
        (fraction(group(&caps, 1), group(&caps, 2))?, group(&caps, 3), group(&caps, 4))
    } else if let Some(caps) = get_mixed_regex().captures(line) {
        let whole_text = group(&caps, 1);
        let whole = number(whole_text)?.abs();
        let part = fraction(group(&caps, 2), group(&caps, 3))?;
        let magnitude = whole.add(&part);
        let value = if whole_text.starts_with('-') { magnitude.neg() } else { magnitude };
        (value, group(&caps, 4), group(&caps, 5))
    } else {
        return Err(ErrorDetails::invalid_format("Could not understand the conversion request")
            .with_context(line.trim().to_string())
            .with_suggestions(FORMAT_EXAMPLES));
    };

    let source = source.trim();
    let target = target.trim();
    if normalize_unit_text(source) == normalize_unit_text(target) {
        return Err(ErrorDetails::invalid_format(format!(
            "Source and target units are the same: '{}'",
            source
        )));
    }

    Ok(ParsedInput {
        value,
        source_unit: source.to_string(),
        target_unit: target.to_string(),
        input: line.to_string(),
    })
}

/// Both units must resolve and share a category
pub fn validate_parsed(parsed: &ParsedInput, index: &AliasIndex) -> Result<(UnitRef, UnitRef), ErrorDetails> {
    resolve_pair(&parsed.source_unit, &parsed.target_unit, index)
}

pub(crate) fn resolve_pair(source: &str, target: &str, index: &AliasIndex) -> Result<(UnitRef, UnitRef), ErrorDetails> {
    let from = index
        .resolve(source)
        .ok_or_else(|| unknown_unit_error(source, UnitRole::Source, index))?;
    let to = index
        .resolve(target)
        .ok_or_else(|| unknown_unit_error(target, UnitRole::Target, index))?;

    if from.category != to.category {
        return Err(ErrorDetails::category_mismatch(&from.category, &to.category));
    }
    Ok((from.clone(), to.clone()))
}

/// Parse each line independently, one entry per input line
pub fn parse_lines(text: &str) -> Vec<LineParse> {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                LineParse::Empty
            } else {
                match parse_input(line) {
                    Ok(parsed) => LineParse::Parsed(parsed),
                    Err(e) => LineParse::Failed(e),
                }
            }
        })
        .collect()
}
