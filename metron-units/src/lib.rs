//! Metron Units - Configuration-driven unit conversion
//!
//! Categories are declared in JSON (one document per category) and loaded
//! into an immutable `Registry`. Conversions always go through the
//! category's base unit, either by a linear factor or by a sandboxed
//! formula pair for offset and reciprocal units.
//!
//! Bundled categories:
//! - Length (m, ft, in, mi, Å, etc.)
//! - Area (m², ft², acre, ha, etc.)
//! - Volume (L, mL, gal, cup, ft³, etc.)
//! - Mass (kg, g, lb, oz, etc.)
//! - Temperature (K, °C, °F, °R)
//! - Pressure (Pa, bar, psi, inH2O, etc.)
//! - Energy (J, cal, kWh, BTU, etc.)
//! - Power (W, kW, hp, BTU/h, TR)
//! - Airflow (m³/h, cfm, L/s)
//! - Thermal resistance (RSI, R-value, U-value)
//!
//! ```ignore
//! use metron_units::{load_all, Converter};
//! use std::sync::Arc;
//!
//! let converter = Converter::new(Arc::new(load_all()?));
//! let result = converter.convert_from_input("20 degC to degF");
//! assert_eq!(result.formatted.as_deref(), Some("68"));
//! ```

mod alias;
mod convert;
mod definition;
mod format;
mod loader;
mod parse;
mod registry;
mod suggest;

pub use alias::{build_alias_index, normalize_unit_text, AliasCollision, AliasIndex};
pub use convert::{
    convert, convert_from_input, validate_conversion, ConversionRecord, ConversionResult, Converter,
    LineResult,
};
pub use definition::{Conversion, Transform, UnitCategory, UnitDefinition, UnitRef};
pub use format::{format_value, FormatOptions};
pub use loader::{check_inverse_pairs, load_all, load_category, load_sources, validate, ValidationResult, BUNDLED};
pub use parse::{parse_input, parse_lines, validate_parsed, LineParse, ParsedInput, FORMAT_EXAMPLES};
pub use registry::{initialize, initialize_with, published, reset, Registry};
pub use suggest::{
    levenshtein, similarity, suggest_aliases, unknown_unit_error, Suggestion, GENERIC_GUIDANCE,
    MAX_SUGGESTIONS, MIN_SIMILARITY,
};

pub use metron_core::{ErrorDetails, ErrorKind, Number, UnitRole};
