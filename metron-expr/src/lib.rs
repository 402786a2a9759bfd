//! Metron Expr - sandboxed single-variable formulas
//!
//! Unit transforms are written in configuration as formulas over one
//! variable (`x`), e.g. `(x - 32) * 5 / 9 + 273.15` or `1 / x`. This crate
//! evaluates them without any general-purpose `eval`:
//!
//! - an allow-list gate rejects any character outside
//!   `[0-9a-zA-Z_\s+\-*/().,^%]` before parsing
//! - a fixed grammar: numbers, `x`, `+ - * / % ^`, unary `+ -`, parentheses
//! - a closed function whitelist: `abs`, `neg`, `sqrt`, `pow`, `min`, `max`
//! - decimal arithmetic throughout (see `metron_core::Number`)

mod ast;
mod error;
mod eval;
mod parser;

pub use ast::{BinOp, Expr, Function, UnaryOp};
pub use error::ExprError;
pub use parser::check_allowed;

use metron_core::Number;
use serde::{Serialize, Serializer};

/// A compiled formula: parsed once, evaluated many times
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    pub fn eval(&self, x: &Number) -> Result<Number, ExprError> {
        eval::eval(&self.expr, x)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Formula {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Compile and evaluate in one step
pub fn evaluate(source: &str, x: &Number) -> Result<Number, ExprError> {
    Formula::compile(source)?.eval(x)
}

/// Evaluate at `x = 1` and return a finite native number, or `None` on any
/// failure. Used to derive a linear factor from formula-only units.
pub fn evaluate_at_one(source: &str) -> Option<f64> {
    evaluate(source, &Number::from_i64(1))
        .ok()
        .and_then(|n| n.to_f64())
        .filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_once_eval_many() {
        let f = Formula::compile(" (x - 32) * 5 / 9 ").unwrap();
        assert_eq!(f.source(), "(x - 32) * 5 / 9");
        assert_eq!(f.eval(&Number::from_i64(212)).unwrap(), Number::from_i64(100));
        assert_eq!(f.eval(&Number::from_i64(32)).unwrap(), Number::from_i64(0));
    }

    #[test]
    fn test_evaluate_at_one() {
        assert_eq!(evaluate_at_one("x * 0.3048"), Some(0.3048));
        assert_eq!(evaluate_at_one("1 / x"), Some(1.0));
        assert_eq!(evaluate_at_one("x + 273.15"), Some(274.15));
    }

    #[test]
    fn test_evaluate_at_one_failures_are_none() {
        assert_eq!(evaluate_at_one("1 / (x - 1)"), None);
        assert_eq!(evaluate_at_one("x; drop"), None);
        assert_eq!(evaluate_at_one("foo(x)"), None);
    }

    #[test]
    fn test_sandbox_rejects_before_evaluation() {
        for formula in ["x;", "\"x\"", "`x`", "x.constructor", "process.exit(1)"] {
            let result = evaluate(formula, &Number::from_i64(1));
            assert!(result.is_err(), "{} must not evaluate", formula);
        }
    }

    #[test]
    fn test_errors_map_to_calculation_error() {
        let err = evaluate("1 / 0", &Number::from_i64(1)).unwrap_err();
        let details: metron_core::ErrorDetails = err.into();
        assert_eq!(details.kind, metron_core::ErrorKind::CalculationError);
    }

    #[test]
    fn test_formula_serializes_as_source() {
        let f = Formula::compile("1/x").unwrap();
        assert_eq!(serde_json::to_string(&f).unwrap(), "\"1/x\"");
    }
}
