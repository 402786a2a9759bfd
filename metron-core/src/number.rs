//! Arbitrary precision numbers using dashu
//!
//! Uses dashu-float (DBig) for decimal arithmetic so chained unit
//! conversions do not pick up binary floating-point drift. Every fallible
//! operation returns a `Result`; nothing here panics on bad input.

use dashu_float::DBig;
use dashu_float::ops::{SquareRoot, Abs};
use dashu_int::IBig;
use dashu_int::ops::{BitTest, UnsignedAbs};
use serde::{Deserialize, Serialize, Serializer, Deserializer};
use thiserror::Error;

/// Error type for number operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumberError {
    #[error("Invalid number format: {0}")]
    ParseError(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Value is not finite: {0}")]
    NotFinite(f64),

    #[error("Overflow: result too large")]
    Overflow,
}

/// Working precision for calculations (significant decimal digits)
pub const DEFAULT_PRECISION: usize = 50;

/// Widest decimal exponent `to_exact_string` still writes in fixed-point
const FIXED_TEXT_LIMIT: isize = 30;

/// Largest integer exponent accepted by `pow`
const MAX_INTEGER_EXPONENT: u32 = 10_000;

/// Arbitrary precision decimal number
#[derive(Debug, Clone)]
pub struct Number {
    inner: DBig,
}

impl Number {
    // ========== Construction ==========

    fn with_work_precision(val: DBig) -> DBig {
        val.with_precision(DEFAULT_PRECISION).value()
    }

    /// Create from string representation
    /// Supports: "123", "3.14", "1/3", "1.5e10", "602214076e15", "-42", "+7"
    pub fn from_str(s: &str) -> Result<Self, NumberError> {
        let s = s.trim();
        let s = s.strip_prefix('+').unwrap_or(s);

        if s.is_empty() {
            return Err(NumberError::ParseError(s.to_string()));
        }

        // Rational format "a/b"
        if s.contains('/') && !s.contains('.') && !s.contains('e') && !s.contains('E') {
            let parts: Vec<&str> = s.split('/').collect();
            if parts.len() == 2 {
                let num: DBig = parts[0].trim().parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let den: DBig = parts[1].trim().parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;

                if den == DBig::ZERO {
                    return Err(NumberError::DivisionByZero);
                }

                let result = Self::with_work_precision(num) / Self::with_work_precision(den);
                return Ok(Self { inner: result });
            }
            return Err(NumberError::ParseError(s.to_string()));
        }

        // Scientific notation: "602214076e15", "2.5E+2", "1.5e-3"
        if s.contains('e') || s.contains('E') {
            let s_lower = s.to_lowercase();
            let parts: Vec<&str> = s_lower.split('e').collect();
            if parts.len() != 2 {
                return Err(NumberError::ParseError(s.to_string()));
            }
            let exp_str = parts[1].strip_prefix('+').unwrap_or(parts[1]);
            let exp: i32 = exp_str.parse()
                .map_err(|_| NumberError::ParseError(s.to_string()))?;

            if !parts[0].contains('.') {
                // Integer mantissa stays exact
                let mantissa: IBig = parts[0].parse()
                    .map_err(|_| NumberError::ParseError(s.to_string()))?;
                let result = DBig::from_parts(mantissa, exp as isize);
                return Ok(Self { inner: Self::with_work_precision(result) });
            }

            let mantissa = Self::from_str(parts[0])?;
            return Ok(mantissa.mul(&Self::pow10(exp as i64)));
        }

        // "5." and ".5" are fine for people, not for the DBig parser
        let normalized = match (s.strip_prefix('-'), s.starts_with('.')) {
            (Some(rest), _) if rest.starts_with('.') => format!("-0{}", rest),
            (_, true) => format!("0{}", s),
            _ => s.to_string(),
        };
        let normalized = normalized.strip_suffix('.').unwrap_or(&normalized);

        let inner: DBig = normalized.parse()
            .map_err(|_| NumberError::ParseError(s.to_string()))?;

        Ok(Self { inner: Self::with_work_precision(inner) })
    }

    /// Create from i64 with working precision
    pub fn from_i64(n: i64) -> Self {
        Self { inner: Self::with_work_precision(DBig::from(n)) }
    }

    /// Create from a native float. NaN and infinities are rejected.
    ///
    /// Goes through the shortest round-trip decimal representation, so
    /// `0.1` becomes exactly `0.1` rather than its binary expansion.
    pub fn from_f64(f: f64) -> Result<Self, NumberError> {
        if !f.is_finite() {
            return Err(NumberError::NotFinite(f));
        }
        Self::from_str(&format!("{}", f))
    }

    /// `10^exp`, exact
    pub fn pow10(exp: i64) -> Self {
        Self { inner: Self::with_work_precision(DBig::from_parts(IBig::ONE, exp as isize)) }
    }

    // ========== Predicates ==========

    pub fn is_zero(&self) -> bool {
        self.inner == DBig::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.inner < DBig::ZERO
    }

    pub fn is_integer(&self) -> bool {
        let floor_val = self.inner.clone().floor();
        self.inner == floor_val
    }

    /// Relative closeness: `|a - b| <= tolerance * max(|a|, |b|)`
    pub fn is_close(&self, other: &Self, tolerance: &Self) -> bool {
        if self == other {
            return true;
        }
        let diff = self.sub(other).abs();
        let scale = std::cmp::max(self.abs(), other.abs());
        diff <= scale.mul(tolerance)
    }

    // ========== Basic Arithmetic ==========

    pub fn add(&self, other: &Self) -> Self {
        Self { inner: &self.inner + &other.inner }
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self { inner: &self.inner - &other.inner }
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self { inner: &self.inner * &other.inner }
    }

    pub fn neg(&self) -> Self {
        Self { inner: -self.inner.clone() }
    }

    /// Safe division (returns Result, never panics)
    pub fn checked_div(&self, other: &Self) -> Result<Self, NumberError> {
        if other.is_zero() {
            Err(NumberError::DivisionByZero)
        } else {
            Ok(Self { inner: &self.inner / &other.inner })
        }
    }

    /// Truncated remainder, sign follows the dividend: `a - b * trunc(a / b)`
    pub fn checked_rem(&self, other: &Self) -> Result<Self, NumberError> {
        let quotient = self.checked_div(other)?;
        let truncated = Self { inner: quotient.inner.trunc() };
        Ok(self.sub(&other.mul(&truncated)))
    }

    /// Integer power by repeated squaring
    pub fn pow(&self, exp: i32) -> Result<Self, NumberError> {
        if exp == 0 {
            return Ok(Self::from_i64(1));
        }

        let mut remaining = exp.unsigned_abs();
        if remaining > MAX_INTEGER_EXPONENT {
            return Err(NumberError::Overflow);
        }

        let mut base = self.clone();
        let mut result = Self::from_i64(1);
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            remaining >>= 1;
        }

        if exp < 0 {
            Self::from_i64(1).checked_div(&result)
        } else {
            Ok(result)
        }
    }

    /// Real-valued power: exact for integer exponents, `exp(y * ln(x))` otherwise
    pub fn pow_real(&self, exp: &Self) -> Result<Self, NumberError> {
        if exp.is_zero() {
            return Ok(Self::from_i64(1));
        }

        if exp.is_integer() {
            let Some(e) = exp.to_i64().and_then(|e| i32::try_from(e).ok()) else {
                return Err(NumberError::Overflow);
            };
            if self.is_zero() && e < 0 {
                return Err(NumberError::DivisionByZero);
            }
            return self.pow(e);
        }

        if self.is_zero() {
            return if exp.is_negative() {
                Err(NumberError::DivisionByZero)
            } else {
                Ok(Self::from_i64(0))
            };
        }
        if self.is_negative() {
            return Err(NumberError::DomainError(
                "negative base with non-integer exponent".to_string()
            ));
        }

        let ln_x = self.ln()?;
        Ok(ln_x.mul(exp).exp())
    }

    // ========== Transcendental Functions ==========

    pub fn sqrt(&self) -> Result<Self, NumberError> {
        if self.is_negative() {
            return Err(NumberError::DomainError(
                "square root of negative number".to_string()
            ));
        }
        if self.is_zero() {
            return Ok(Self::from_i64(0));
        }

        Ok(Self { inner: self.inner.sqrt() })
    }

    /// Natural logarithm
    pub fn ln(&self) -> Result<Self, NumberError> {
        if self.inner <= DBig::ZERO {
            return Err(NumberError::DomainError(
                "logarithm of non-positive number".to_string()
            ));
        }

        Ok(Self { inner: self.inner.ln() })
    }

    /// Exponential function (e^x)
    pub fn exp(&self) -> Self {
        Self { inner: self.inner.exp() }
    }

    // ========== Other Operations ==========

    pub fn abs(&self) -> Self {
        Self { inner: Abs::abs(self.inner.clone()) }
    }

    /// Round half away from zero to an integer
    pub fn round(&self) -> Self {
        let half = Self::from_str("0.5").unwrap_or_else(|_| Self::from_i64(0));
        if self.is_negative() {
            Self { inner: self.abs().add(&half).inner.floor() }.neg()
        } else {
            Self { inner: self.add(&half).inner.floor() }
        }
    }

    /// Decimal exponent of the leading digit: `floor(log10(|x|))`.
    /// `None` for zero.
    pub fn magnitude(&self) -> Option<i64> {
        if self.is_zero() {
            return None;
        }
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        let digits = significand.unsigned_abs().to_string().len() as i64;
        Some(digits - 1 + exponent as i64)
    }

    /// Try to convert to i64
    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }

        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        let sig_i64: i64 = significand.try_into().ok()?;

        if exponent == 0 {
            Some(sig_i64)
        } else if exponent > 0 && exponent <= 18 {
            sig_i64.checked_mul(10_i64.checked_pow(exponent as u32)?)
        } else if exponent < 0 && exponent >= -18 {
            let divisor = 10_i64.checked_pow((-exponent) as u32)?;
            if sig_i64 % divisor == 0 {
                Some(sig_i64 / divisor)
            } else {
                None
            }
        } else {
            None
        }
    }

    /// Convert to f64 (may lose precision). `None` when out of f64 range.
    pub fn to_f64(&self) -> Option<f64> {
        let (significand, exponent) = self.inner.clone().into_repr().into_parts();

        let sig_f64: f64 = if significand.bit_len() <= 53 {
            let as_i64: i64 = significand.try_into().ok()?;
            as_i64 as f64
        } else {
            // Keep the top 53 bits and scale back up
            let extra_bits = significand.bit_len() - 53;
            let shifted = &significand >> extra_bits;
            let shifted_i64: i64 = shifted.try_into().ok()?;
            shifted_i64 as f64 * 2_f64.powi(extra_bits as i32)
        };

        let result = if exponent == 0 {
            sig_f64
        } else if exponent > 0 && exponent <= 308 {
            sig_f64 * 10_f64.powi(exponent as i32)
        } else if exponent < 0 && exponent >= -308 {
            sig_f64 / 10_f64.powi((-exponent) as i32)
        } else if exponent < 0 && exponent >= -(308 + 2 * 53) {
            // Subnormal territory: divide in two steps
            sig_f64 / 10_f64.powi(308) / 10_f64.powi((-exponent - 308) as i32)
        } else {
            return None;
        };

        if result.is_finite() {
            Some(result)
        } else {
            None
        }
    }

    // ========== Display ==========

    /// Fixed-point rendering rounded to `places` decimals, trailing zeros
    /// (and a dangling decimal point) stripped. Exact: no f64 round trip.
    pub fn to_fixed(&self, places: u32) -> String {
        let scaled = self.mul(&Self::pow10(places as i64)).round();
        let (significand, exponent) = scaled.inner.into_repr().into_parts();

        let ten = IBig::from(10);
        let integer = if exponent >= 0 {
            significand * ten.pow(exponent as usize)
        } else {
            significand / ten.pow((-exponent) as usize)
        };

        let negative = integer < IBig::ZERO;
        let mut digits = integer.unsigned_abs().to_string();

        let places = places as usize;
        if digits.len() <= places {
            digits = format!("{}{}", "0".repeat(places + 1 - digits.len()), digits);
        }

        let (int_part, frac_part) = digits.split_at(digits.len() - places);
        let frac_part = frac_part.trim_end_matches('0');

        let body = if frac_part.is_empty() {
            int_part.to_string()
        } else {
            format!("{}.{}", int_part, frac_part)
        };

        if negative && body.chars().any(|c| c != '0' && c != '.') {
            format!("-{}", body)
        } else {
            body
        }
    }

    /// Exact text that `from_str` reads back unchanged. Fixed-point while
    /// the value sits within `FIXED_TEXT_LIMIT` decimal places of the unit
    /// digit, otherwise `d.ddde±N` straight from the significand, so the
    /// length is bounded by the working precision whatever the magnitude.
    pub fn to_exact_string(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }

        let (significand, exponent) = self.inner.clone().into_repr().into_parts();
        let digits = significand.clone().unsigned_abs().to_string();
        let exp10 = exponent as i64 + digits.len() as i64 - 1;

        if (0..=FIXED_TEXT_LIMIT).contains(&exponent) {
            return self.to_fixed(0);
        }
        if exponent < 0 && exp10 >= -(FIXED_TEXT_LIMIT as i64) {
            return self.to_fixed(exponent.unsigned_abs() as u32);
        }

        let sign = if significand < IBig::ZERO { "-" } else { "" };
        let (lead, rest) = digits.split_at(1);
        let rest = rest.trim_end_matches('0');

        if rest.is_empty() {
            format!("{}{}e{}", sign, lead, exp10)
        } else {
            format!("{}{}.{}e{}", sign, lead, rest, exp10)
        }
    }

    /// Exponential rendering like `1.5e12` or `-2.25e-7`, mantissa rounded
    /// to `places` decimals with trailing zeros stripped.
    pub fn to_exponential(&self, places: u32) -> String {
        let Some(mut exp10) = self.magnitude() else {
            return "0".to_string();
        };

        let render = |e: i64| -> Option<String> {
            let mantissa = self.checked_div(&Self::pow10(e)).ok()?;
            Some(mantissa.to_fixed(places))
        };

        let mut mantissa = render(exp10).unwrap_or_else(|| "0".to_string());
        // 9.9999999 can round up to 10
        if mantissa.trim_start_matches('-').starts_with("10") {
            exp10 += 1;
            mantissa = render(exp10).unwrap_or_else(|| "0".to_string());
        }

        format!("{}e{}", mantissa, exp10)
    }
}

// ========== Trait Implementations ==========

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_exact_string())
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.inner.partial_cmp(&other.inner).unwrap_or(std::cmp::Ordering::Equal)
    }
}
