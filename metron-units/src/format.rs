//! Display formatting by magnitude band

use metron_core::Number;
use serde::Serialize;

/// Decimal places per magnitude band plus the exponential cut-offs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatOptions {
    /// At or above this magnitude, switch to exponential
    pub exponential_above: Number,
    /// Below this magnitude (and non-zero), switch to exponential
    pub exponential_below: Number,
    pub mantissa_places: u32,
    /// `(lower bound, places)`, checked from the largest bound down
    pub bands: Vec<(Number, u32)>,
    /// Places for anything under the smallest band
    pub fallback_places: u32,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            exponential_above: Number::pow10(12),
            exponential_below: Number::pow10(-6),
            mantissa_places: 6,
            bands: vec![
                (Number::pow10(6), 2),
                (Number::pow10(3), 3),
                (Number::pow10(2), 4),
                (Number::pow10(0), 5),
                (Number::pow10(-2), 6),
            ],
            fallback_places: 8,
        }
    }
}

impl FormatOptions {
    /// Decimal places used for a value of this absolute size
    pub fn places_for(&self, magnitude: &Number) -> u32 {
        self.bands
            .iter()
            .find(|(bound, _)| magnitude >= bound)
            .map(|(_, places)| *places)
            .unwrap_or(self.fallback_places)
    }
}

/// Render a conversion result for display
pub fn format_value(value: &Number, options: &FormatOptions) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= options.exponential_above || magnitude < options.exponential_below {
        return value.to_exponential(options.mantissa_places);
    }

    value.to_fixed(options.places_for(&magnitude))
}
