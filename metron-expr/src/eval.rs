//! Expression evaluator
//!
//! Walks the tree recursively with decimal arithmetic. Every fault comes
//! back as an `ExprError`; there is no silent Infinity or NaN.

use crate::ast::{BinOp, Expr, Function, UnaryOp};
use crate::ExprError;
use metron_core::Number;

/// Evaluate an expression with the bound variable set to `x`
pub fn eval(expr: &Expr, x: &Number) -> Result<Number, ExprError> {
    match expr {
        Expr::Number(n) => Ok(n.clone()),

        Expr::Variable => Ok(x.clone()),

        Expr::BinaryOp(left, op, right) => {
            let l = eval(left, x)?;
            let r = eval(right, x)?;
            eval_binary_op(&l, *op, &r)
        }

        Expr::UnaryOp(op, inner) => {
            let v = eval(inner, x)?;
            Ok(eval_unary_op(*op, &v))
        }

        Expr::FunctionCall(func, args) => {
            let evaluated: Vec<Number> = args
                .iter()
                .map(|a| eval(a, x))
                .collect::<Result<_, _>>()?;
            eval_function(*func, &evaluated)
        }
    }
}

fn eval_binary_op(l: &Number, op: BinOp, r: &Number) -> Result<Number, ExprError> {
    let result = match op {
        BinOp::Add => l.add(r),
        BinOp::Sub => l.sub(r),
        BinOp::Mul => l.mul(r),
        BinOp::Div => l.checked_div(r)?,
        BinOp::Rem => l.checked_rem(r)?,
        BinOp::Pow => l.pow_real(r)?,
    };
    Ok(result)
}

fn eval_unary_op(op: UnaryOp, value: &Number) -> Number {
    match op {
        UnaryOp::Plus => value.clone(),
        UnaryOp::Neg => value.neg(),
    }
}

fn eval_function(func: Function, args: &[Number]) -> Result<Number, ExprError> {
    // Arity was checked at parse time; this guards hand-built trees
    let first = args.first().ok_or_else(|| ExprError::ArgCount {
        func: func.name(),
        expected: func.arity().0.to_string(),
        got: 0,
    })?;

    match func {
        Function::Abs => Ok(first.abs()),
        Function::Neg => Ok(first.neg()),
        Function::Sqrt => Ok(first.sqrt()?),
        Function::Pow => {
            let exponent = args.get(1).ok_or_else(|| ExprError::ArgCount {
                func: func.name(),
                expected: "2".to_string(),
                got: args.len(),
            })?;
            Ok(first.pow_real(exponent)?)
        }
        Function::Min => Ok(args.iter().min().unwrap_or(first).clone()),
        Function::Max => Ok(args.iter().max().unwrap_or(first).clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use metron_core::NumberError;

    fn eval_str(formula: &str, x: &str) -> Result<Number, ExprError> {
        let expr = parse(formula)?;
        eval(&expr, &Number::from_str(x).unwrap())
    }

    fn n(s: &str) -> Number {
        Number::from_str(s).unwrap()
    }

    #[test]
    fn test_linear_offset() {
        assert_eq!(eval_str("x + 273.15", "20").unwrap(), n("293.15"));
        assert_eq!(eval_str("(x - 273.15) * 9 / 5 + 32", "293.15").unwrap(), n("68"));
    }

    #[test]
    fn test_reciprocal() {
        assert_eq!(eval_str("1 / x", "4").unwrap(), n("0.25"));
        assert_eq!(eval_str("1/X", "0.5").unwrap(), n("2"));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval_str("1 / x", "0"),
            Err(ExprError::Number(NumberError::DivisionByZero))
        );
        assert_eq!(
            eval_str("x % 0", "5"),
            Err(ExprError::Number(NumberError::DivisionByZero))
        );
    }

    #[test]
    fn test_modulo() {
        assert_eq!(eval_str("x % 4", "10").unwrap(), n("2"));
    }

    #[test]
    fn test_power() {
        assert_eq!(eval_str("x ^ 2", "3").unwrap(), n("9"));
        assert_eq!(eval_str("2 ^ 3 ^ 2", "0").unwrap(), n("512"));
        assert_eq!(eval_str("-x ^ 2", "3").unwrap(), n("-9"));
        assert_eq!(eval_str("x ^ -1", "4").unwrap(), n("0.25"));
        assert_eq!(eval_str("pow(x, 0.5)", "9").unwrap().to_fixed(20), "3");
    }

    #[test]
    fn test_power_with_out_of_range_integer_exponent() {
        for formula in [
            "x ^ -9223372036854775808",
            "x ^ 9223372036854775807",
            "pow(x, -2147483649)",
        ] {
            assert_eq!(
                eval_str(formula, "2"),
                Err(ExprError::Number(NumberError::Overflow)),
                "{}",
                formula
            );
        }
    }

    #[test]
    fn test_power_domain_errors() {
        assert!(matches!(
            eval_str("x ^ 0.5", "-4"),
            Err(ExprError::Number(NumberError::DomainError(_)))
        ));
        assert!(matches!(
            eval_str("0 ^ -1", "0"),
            Err(ExprError::Number(NumberError::DivisionByZero))
        ));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval_str("abs(x)", "-3.5").unwrap(), n("3.5"));
        assert_eq!(eval_str("neg(x)", "2").unwrap(), n("-2"));
        assert_eq!(eval_str("sqrt(x)", "144").unwrap(), n("12"));
        assert_eq!(eval_str("min(x, 3, 7)", "5").unwrap(), n("3"));
        assert_eq!(eval_str("max(x, 3, 7)", "5").unwrap(), n("7"));
        assert!(matches!(
            eval_str("sqrt(x)", "-1"),
            Err(ExprError::Number(NumberError::DomainError(_)))
        ));
    }

    #[test]
    fn test_unary_plus() {
        assert_eq!(eval_str("+x", "5").unwrap(), n("5"));
        assert_eq!(eval_str("--x", "5").unwrap(), n("5"));
    }

    #[test]
    fn test_decimal_precision_survives_chaining() {
        // 0.1 * 3 is exactly 0.3 in decimal arithmetic
        assert_eq!(eval_str("x * 3", "0.1").unwrap(), n("0.3"));
        assert_eq!(eval_str("x * 0.3048 / 0.3048", "1").unwrap(), n("1"));
    }
}
