//! Metron Core - Fundamental types
//!
//! This crate provides the core types used throughout Metron:
//! - `Number`: Arbitrary precision decimal numbers
//! - `ErrorDetails`: Structured conversion errors with suggestions

mod number;
mod error;

pub use number::{Number, NumberError, DEFAULT_PRECISION};
pub use error::{ErrorDetails, ErrorKind, UnitRole, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Number, NumberError, ErrorDetails, ErrorKind, UnitRole};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod number_tests {
        use super::*;

        #[test]
        fn test_from_i64() {
            let n = Number::from_i64(42);
            assert_eq!(n.to_i64(), Some(42));
        }

        #[test]
        fn test_from_str_decimal() {
            let n = Number::from_str("3.14").unwrap();
            assert!(!n.is_integer());
        }

        #[test]
        fn test_from_str_leading_plus() {
            let n = Number::from_str("+7").unwrap();
            assert_eq!(n.to_i64(), Some(7));
        }

        #[test]
        fn test_from_str_fraction() {
            let n = Number::from_str("3/4").unwrap();
            assert_eq!(n, Number::from_str("0.75").unwrap());
        }

        #[test]
        fn test_from_str_fraction_zero_denominator() {
            assert_eq!(Number::from_str("1/0"), Err(NumberError::DivisionByZero));
        }

        #[test]
        fn test_from_str_scientific() {
            let n = Number::from_str("1.5e2").unwrap();
            assert_eq!(n.to_i64(), Some(150));

            let n = Number::from_str("25e-1").unwrap();
            assert_eq!(n, Number::from_str("2.5").unwrap());
        }

        #[test]
        fn test_from_str_garbage() {
            assert!(Number::from_str("abc").is_err());
            assert!(Number::from_str("").is_err());
        }

        #[test]
        fn test_from_f64_exact_decimal() {
            let n = Number::from_f64(0.1).unwrap();
            assert_eq!(n, Number::from_str("0.1").unwrap());
        }

        #[test]
        fn test_from_f64_rejects_non_finite() {
            assert!(Number::from_f64(f64::NAN).is_err());
            assert!(Number::from_f64(f64::INFINITY).is_err());
            assert!(Number::from_f64(f64::NEG_INFINITY).is_err());
        }

        #[test]
        fn test_arithmetic() {
            let a = Number::from_i64(6);
            let b = Number::from_i64(7);
            assert_eq!(a.mul(&b).to_i64(), Some(42));
            assert_eq!(a.add(&b).to_i64(), Some(13));
            assert_eq!(a.sub(&b).to_i64(), Some(-1));
            assert_eq!(a.neg().to_i64(), Some(-6));
        }

        #[test]
        fn test_decimal_addition_has_no_drift() {
            let a = Number::from_str("0.1").unwrap();
            let b = Number::from_str("0.2").unwrap();
            assert_eq!(a.add(&b), Number::from_str("0.3").unwrap());
        }

        #[test]
        fn test_div_by_zero() {
            let a = Number::from_i64(42);
            let b = Number::from_i64(0);
            assert_eq!(a.checked_div(&b), Err(NumberError::DivisionByZero));
            assert_eq!(a.checked_rem(&b), Err(NumberError::DivisionByZero));
        }

        #[test]
        fn test_rem() {
            let a = Number::from_i64(7);
            let b = Number::from_i64(3);
            assert_eq!(a.checked_rem(&b).unwrap().to_i64(), Some(1));
            assert_eq!(a.neg().checked_rem(&b).unwrap().to_i64(), Some(-1));
        }

        #[test]
        fn test_pow() {
            let n = Number::from_i64(2);
            assert_eq!(n.pow(10).unwrap().to_i64(), Some(1024));
            assert_eq!(n.pow(-2).unwrap(), Number::from_str("0.25").unwrap());
            assert!(n.pow(1_000_000).is_err());
        }

        #[test]
        fn test_pow_real_fractional() {
            let four = Number::from_i64(4);
            let half = Number::from_str("0.5").unwrap();
            let result = four.pow_real(&half).unwrap();
            assert_eq!(result.to_fixed(10), "2");
        }

        #[test]
        fn test_pow_real_negative_base() {
            let base = Number::from_i64(-8);
            let third = Number::from_str("0.5").unwrap();
            assert!(base.pow_real(&third).is_err());
            assert_eq!(base.pow_real(&Number::from_i64(2)).unwrap().to_i64(), Some(64));
        }

        #[test]
        fn test_sqrt() {
            assert_eq!(Number::from_i64(16).sqrt().unwrap().to_i64(), Some(4));
            assert!(Number::from_i64(-4).sqrt().is_err());
            let root5 = Number::from_i64(5).sqrt().unwrap();
            assert!(root5.to_fixed(4).starts_with("2.236"));
        }

        #[test]
        fn test_round() {
            assert_eq!(Number::from_str("2.5").unwrap().round().to_i64(), Some(3));
            assert_eq!(Number::from_str("-2.5").unwrap().round().to_i64(), Some(-3));
            assert_eq!(Number::from_str("2.49").unwrap().round().to_i64(), Some(2));
        }

        #[test]
        fn test_magnitude() {
            assert_eq!(Number::from_i64(0).magnitude(), None);
            assert_eq!(Number::from_i64(1).magnitude(), Some(0));
            assert_eq!(Number::from_i64(999).magnitude(), Some(2));
            assert_eq!(Number::from_str("0.00123").unwrap().magnitude(), Some(-3));
            assert_eq!(Number::from_str("-45000").unwrap().magnitude(), Some(4));
        }

        #[test]
        fn test_to_fixed() {
            let n = Number::from_str("3.280839895013123").unwrap();
            assert_eq!(n.to_fixed(5), "3.28084");
            assert_eq!(Number::from_i64(68).to_fixed(5), "68");
            assert_eq!(Number::from_str("0.5").unwrap().to_fixed(0), "1");
            assert_eq!(Number::from_str("-0.0000001").unwrap().to_fixed(3), "0");
            assert_eq!(Number::from_str("-1.25").unwrap().to_fixed(1), "-1.3");
            assert_eq!(Number::from_str("0.012").unwrap().to_fixed(4), "0.012");
        }

        #[test]
        fn test_to_exponential() {
            let n = Number::from_str("1500000000000").unwrap();
            assert_eq!(n.to_exponential(6), "1.5e12");

            let n = Number::from_str("0.00000025").unwrap();
            assert_eq!(n.to_exponential(6), "2.5e-7");

            let n = Number::from_str("9.99999999e20").unwrap();
            assert_eq!(n.to_exponential(3), "1e21");

            assert_eq!(Number::from_i64(0).to_exponential(6), "0");
        }

        #[test]
        fn test_to_f64() {
            assert_eq!(Number::from_str("0.25").unwrap().to_f64(), Some(0.25));
            assert_eq!(Number::from_i64(-3).to_f64(), Some(-3.0));
        }

        #[test]
        fn test_is_close() {
            let a = Number::from_str("1.0000000000001").unwrap();
            let b = Number::from_i64(1);
            let tol = Number::from_str("1e-9").unwrap();
            assert!(a.is_close(&b, &tol));
            assert!(!Number::from_i64(2).is_close(&b, &tol));
        }

        #[test]
        fn test_serde_as_string() {
            let n = Number::from_str("12.5").unwrap();
            let json = serde_json::to_string(&n).unwrap();
            assert_eq!(json, "\"12.5\"");
            let back: Number = serde_json::from_str(&json).unwrap();
            assert_eq!(back, n);
        }

        #[test]
        fn test_display_is_exact_and_bounded() {
            let cases = [
                ("1e-30", "0.000000000000000000000000000001"),
                ("1e-31", "1e-31"),
                ("-2.5e-40", "-2.5e-40"),
                ("1e20000000", "1e20000000"),
                ("123456e31", "1.23456e36"),
                ("1.25e-20", "0.0000000000000000000125"),
                ("68", "68"),
                ("0", "0"),
            ];
            for (input, expected) in cases {
                let n = Number::from_str(input).unwrap();
                let text = n.to_string();
                assert_eq!(text, expected, "{}", input);
                assert_eq!(Number::from_str(&text).unwrap(), n, "{}", input);
            }

            let third = Number::from_i64(1).checked_div(&Number::from_i64(3)).unwrap();
            let small = third.checked_div(&Number::pow10(40)).unwrap();
            assert_eq!(Number::from_str(&small.to_string()).unwrap(), small);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_kind_codes() {
            assert_eq!(ErrorKind::InvalidFormat.code(), codes::INVALID_FORMAT);
            assert_eq!(ErrorKind::ConfigurationError.to_string(), "CONFIGURATION_ERROR");
        }

        #[test]
        fn test_unknown_unit_names_role() {
            let err = ErrorDetails::unknown_unit("mter", UnitRole::Source);
            assert_eq!(err.kind, ErrorKind::UnknownUnit);
            assert!(err.message.contains("source"));
            assert!(err.message.contains("mter"));
        }

        #[test]
        fn test_category_mismatch_names_both() {
            let err = ErrorDetails::category_mismatch("length", "volume");
            assert_eq!(err.kind, ErrorKind::InvalidFormat);
            assert!(err.message.contains("length"));
            assert!(err.message.contains("volume"));
        }

        #[test]
        fn test_empty_suggestions_collapse_to_none() {
            let err = ErrorDetails::invalid_format("bad").with_suggestions(Vec::<String>::new());
            assert!(err.suggestions.is_none());
            assert!(err.suggestions().is_empty());
        }

        #[test]
        fn test_render() {
            let err = ErrorDetails::unknown_unit("mter", UnitRole::Source)
                .with_suggestions(["meter", "meters"]);
            let rendered = err.render();
            assert_eq!(
                rendered,
                "Unknown source unit: 'mter'\n(source unit)\nSuggestions:\n  - meter\n  - meters"
            );
        }

        #[test]
        fn test_serialize_kind() {
            let err = ErrorDetails::calculation("Division by zero");
            let json = serde_json::to_value(&err).unwrap();
            assert_eq!(json["kind"], "CALCULATION_ERROR");
            assert!(json.get("context").is_none());
        }

        #[test]
        fn test_from_number_error() {
            let err: ErrorDetails = NumberError::DivisionByZero.into();
            assert_eq!(err.kind, ErrorKind::CalculationError);
            let err: ErrorDetails = NumberError::ParseError("x".into()).into();
            assert_eq!(err.kind, ErrorKind::InvalidFormat);
        }
    }
}
