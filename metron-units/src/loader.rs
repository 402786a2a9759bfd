//! Configuration loader
//!
//! Each category arrives as one JSON document:
//!
//! ```json
//! {
//!   "category": "length",
//!   "baseUnit": "meter",
//!   "units": {
//!     "meter": { "name": "Meter", "symbol": "m", "aliases": ["metre"], "factor": 1 },
//!     "foot":  { "name": "Foot",  "symbol": "ft", "aliases": ["feet"], "factor": 0.3048 }
//!   }
//! }
//! ```
//!
//! Loading fails closed: one bad category and nothing is returned.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use metron_core::{ErrorDetails, Number};
use metron_expr::{evaluate_at_one, Formula};

use crate::definition::{Conversion, Transform, UnitCategory, UnitDefinition};
use crate::registry::Registry;

/// Bundled category documents, in load order
pub const BUNDLED: &[(&str, &str)] = &[
    ("length", include_str!("../config/length.json")),
    ("area", include_str!("../config/area.json")),
    ("volume", include_str!("../config/volume.json")),
    ("mass", include_str!("../config/mass.json")),
    ("temperature", include_str!("../config/temperature.json")),
    ("pressure", include_str!("../config/pressure.json")),
    ("energy", include_str!("../config/energy.json")),
    ("power", include_str!("../config/power.json")),
    ("airflow", include_str!("../config/airflow.json")),
    ("thermal_resistance", include_str!("../config/thermal_resistance.json")),
];

/// Probe points for the base identity check, in base units
const IDENTITY_PROBES: [&str; 4] = ["0.5", "1", "2", "10"];
/// Probe points for the transform round-trip check, in the unit itself
const INVERSE_PROBES: [&str; 3] = ["1", "10", "100"];
const PROBE_TOLERANCE: &str = "1e-20";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryDocument {
    category: String,
    base_unit: String,
    units: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UnitDocument {
    name: String,
    symbol: String,
    aliases: Vec<String>,
    factor: Option<f64>,
    transform: Option<TransformDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransformDocument {
    to_base: String,
    from_base: String,
}

/// Outcome of a shape check: every error found, plus non-fatal warnings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check the shape of a raw category document without building anything
pub fn validate(doc: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Some(root) = doc.as_object() else {
        return ValidationResult {
            valid: false,
            errors: vec!["document must be a JSON object".to_string()],
            warnings,
        };
    };

    for field in ["category", "baseUnit"] {
        match root.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            Some(Value::String(_)) => errors.push(format!("'{}' must not be empty", field)),
            Some(_) => errors.push(format!("'{}' must be a string", field)),
            None => errors.push(format!("missing required field '{}'", field)),
        }
    }

    match root.get("units") {
        Some(Value::Object(units)) if units.is_empty() => {
            errors.push("'units' must define at least one unit".to_string());
        }
        Some(Value::Object(units)) => {
            for (key, unit) in units {
                validate_unit(key, unit, &mut errors, &mut warnings);
            }
        }
        Some(_) => errors.push("'units' must be an object".to_string()),
        None => errors.push("missing required field 'units'".to_string()),
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn validate_unit(key: &str, unit: &Value, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let Some(fields) = unit.as_object() else {
        errors.push(format!("unit '{}' must be an object", key));
        return;
    };

    for field in ["name", "symbol"] {
        match fields.get(field) {
            Some(Value::String(_)) => {}
            Some(_) => errors.push(format!("unit '{}': '{}' must be a string", key, field)),
            None => errors.push(format!("unit '{}': missing required field '{}'", key, field)),
        }
    }

    match fields.get("aliases") {
        Some(Value::Array(aliases)) => {
            let mut seen = HashSet::new();
            for alias in aliases {
                match alias.as_str() {
                    Some(a) if !seen.insert(a.trim().to_lowercase()) => {
                        errors.push(format!("unit '{}': duplicate alias '{}'", key, a));
                    }
                    Some(_) => {}
                    None => errors.push(format!("unit '{}': aliases must be strings", key)),
                }
            }
        }
        Some(_) => errors.push(format!("unit '{}': 'aliases' must be an array", key)),
        None => errors.push(format!("unit '{}': missing required field 'aliases'", key)),
    }

    let factor = fields.get("factor");
    match factor {
        Some(Value::Number(n)) if n.as_f64().is_some_and(|f| f > 0.0) => {}
        Some(Value::Number(_)) => errors.push(format!("unit '{}': factor must be > 0", key)),
        Some(_) => errors.push(format!("unit '{}': factor must be a number", key)),
        None => {}
    }

    let transform = fields.get("transform");
    match transform {
        Some(Value::Object(t)) => {
            for field in ["toBase", "fromBase"] {
                match t.get(field) {
                    Some(Value::String(_)) => {}
                    Some(_) => errors.push(format!("unit '{}': transform.{} must be a string", key, field)),
                    None => errors.push(format!("unit '{}': transform is missing '{}'", key, field)),
                }
            }
        }
        Some(_) => errors.push(format!("unit '{}': 'transform' must be an object", key)),
        None => {}
    }

    match (factor, transform) {
        (None, None) => errors.push(format!("unit '{}': needs a factor or a transform", key)),
        (Some(_), Some(_)) => warnings.push(format!(
            "unit '{}': has both factor and transform; the transform drives conversion",
            key
        )),
        _ => {}
    }
}

/// Build one category from its document
pub fn load_category(doc: &Value, expected_name: &str) -> Result<UnitCategory, ErrorDetails> {
    let report = validate(doc);
    if !report.valid {
        return Err(ErrorDetails::configuration(format!(
            "Invalid configuration for category '{}'",
            expected_name
        ))
        .with_context(report.errors.join("; ")));
    }
    for w in &report.warnings {
        debug!(category = expected_name, "{}", w);
    }

    let parsed: CategoryDocument = serde_json::from_value(doc.clone()).map_err(|e| {
        ErrorDetails::configuration(format!("Invalid configuration for category '{}'", expected_name))
            .with_context(e.to_string())
    })?;

    if parsed.category != expected_name {
        return Err(ErrorDetails::configuration(format!(
            "Category name mismatch: expected '{}', found '{}'",
            expected_name, parsed.category
        )));
    }

    let mut units = Vec::with_capacity(parsed.units.len());
    for (key, raw) in &parsed.units {
        let unit_doc: UnitDocument = serde_json::from_value(raw.clone()).map_err(|e| {
            ErrorDetails::configuration(format!("Invalid unit '{}' in category '{}'", key, expected_name))
                .with_context(e.to_string())
        })?;
        units.push(build_unit(expected_name, key, unit_doc)?);
    }

    let category = UnitCategory::new(parsed.category, parsed.base_unit, units);
    check_base_identity(&category)?;

    for w in check_inverse_pairs(&category) {
        warn!(category = %category.name, "{}", w);
    }

    debug!(category = %category.name, units = category.units().len(), "Loaded category");
    Ok(category)
}

fn build_unit(category: &str, key: &str, doc: UnitDocument) -> Result<UnitDefinition, ErrorDetails> {
    let compile = |which: &str, source: &str| {
        Formula::compile(source).map_err(|e| {
            ErrorDetails::configuration(format!(
                "Invalid {} formula for unit '{}' in category '{}'",
                which, key, category
            ))
            .with_context(e.to_string())
        })
    };

    let explicit_factor = doc
        .factor
        .map(|f| {
            Number::from_f64(f).map_err(|e| {
                ErrorDetails::configuration(format!("Invalid factor for unit '{}'", key))
                    .with_context(e.to_string())
            })
        })
        .transpose()?;

    let (conversion, factor) = match (doc.transform, explicit_factor) {
        (Some(t), explicit) => {
            let transform = Transform {
                to_base: compile("toBase", &t.to_base)?,
                from_base: compile("fromBase", &t.from_base)?,
            };
            let factor = explicit.or_else(|| backfill_factor(category, key, &t.to_base));
            (Conversion::Transform(transform), factor)
        }
        (None, Some(f)) => (Conversion::Factor(f.clone()), Some(f)),
        (None, None) => {
            return Err(ErrorDetails::configuration(format!(
                "Unit '{}' in category '{}' needs a factor or a transform",
                key, category
            )))
        }
    };

    Ok(UnitDefinition {
        key: key.to_string(),
        name: doc.name,
        symbol: doc.symbol,
        aliases: doc.aliases,
        conversion,
        factor,
    })
}

/// `toBase(1)` as the unit's linear factor. Units whose formula is
/// undefined at 1 still convert through the transform, just without one.
fn backfill_factor(category: &str, key: &str, to_base: &str) -> Option<Number> {
    let factor = evaluate_at_one(to_base).and_then(|f| Number::from_f64(f).ok());
    if factor.is_none() {
        warn!(category, unit = key, to_base, "toBase(1) did not evaluate; unit has no linear factor");
    }
    factor
}

fn probe(s: &str) -> Number {
    Number::from_str(s).unwrap_or_else(|_| Number::from_i64(1))
}

/// The base unit must map every value to itself
fn check_base_identity(category: &UnitCategory) -> Result<(), ErrorDetails> {
    let base = category.base().ok_or_else(|| {
        ErrorDetails::configuration(format!(
            "Base unit '{}' is not defined in category '{}'",
            category.base_unit, category.name
        ))
    })?;

    let fail = |detail: String| {
        ErrorDetails::configuration(format!(
            "Base unit '{}' of category '{}' does not normalize to identity",
            base.key, category.name
        ))
        .with_context(detail)
    };

    let one = Number::from_i64(1);
    match &base.factor {
        Some(factor) if *factor != one => return Err(fail(format!("factor is {}", factor))),
        None if base.transform().is_none() => return Err(fail("no factor".to_string())),
        _ => {}
    }

    if base.transform().is_some() {
        let tolerance = probe(PROBE_TOLERANCE);
        for p in IDENTITY_PROBES.iter().map(|s| probe(s)) {
            let to = base.to_base(&p).map_err(|e| fail(e.to_string()))?;
            let from = base.from_base(&p).map_err(|e| fail(e.to_string()))?;
            if !to.is_close(&p, &tolerance) || !from.is_close(&p, &tolerance) {
                return Err(fail(format!("toBase({}) = {}, fromBase({}) = {}", p, to, p, from)));
            }
        }
    }

    Ok(())
}

/// Warn when a transform's `fromBase(toBase(p))` does not come back to `p`.
/// The pair is not required to be inverse in shape, only in effect.
pub fn check_inverse_pairs(category: &UnitCategory) -> Vec<String> {
    let tolerance = probe(PROBE_TOLERANCE);
    let mut warnings = Vec::new();

    for unit in category.units().iter().filter(|u| u.transform().is_some()) {
        for p in INVERSE_PROBES.iter().map(|s| probe(s)) {
            let back = unit.to_base(&p).and_then(|b| unit.from_base(&b));
            match back {
                Ok(v) if v.is_close(&p, &tolerance) => {}
                Ok(v) => {
                    warnings.push(format!(
                        "unit '{}': fromBase(toBase({})) = {}, transform pair does not round-trip",
                        unit.key, p, v
                    ));
                    break;
                }
                Err(e) => {
                    warnings.push(format!("unit '{}': round-trip probe at {} failed: {}", unit.key, p, e));
                    break;
                }
            }
        }
    }

    warnings
}

/// Load every bundled category
pub fn load_all() -> Result<Registry, ErrorDetails> {
    load_sources(BUNDLED.iter().copied())
}

/// Load caller-supplied `(category name, JSON text)` pairs. All or nothing.
pub fn load_sources<I, N, S>(sources: I) -> Result<Registry, ErrorDetails>
where
    I: IntoIterator<Item = (N, S)>,
    N: AsRef<str>,
    S: AsRef<str>,
{
    let mut categories: Vec<UnitCategory> = Vec::new();
    let mut warnings = Vec::new();

    for (name, text) in sources {
        let name = name.as_ref();
        let doc: Value = serde_json::from_str(text.as_ref()).map_err(|e| {
            ErrorDetails::configuration(format!("Category '{}' is not valid JSON", name))
                .with_context(e.to_string())
        })?;

        let category = load_category(&doc, name)?;
        if categories.iter().any(|c| c.name == category.name) {
            return Err(ErrorDetails::configuration(format!(
                "Category '{}' is defined more than once",
                name
            )));
        }

        warnings.extend(validate(&doc).warnings.into_iter().map(|w| format!("{}: {}", name, w)));
        warnings.extend(check_inverse_pairs(&category).into_iter().map(|w| format!("{}: {}", name, w)));
        categories.push(category);
    }

    if categories.is_empty() {
        return Err(ErrorDetails::configuration("No unit categories were loaded"));
    }

    let registry = Registry::new(categories).with_warnings(warnings);
    info!(
        categories = registry.categories().len(),
        aliases = registry.alias_index().len(),
        "Loaded unit configuration"
    );
    Ok(registry)
}
