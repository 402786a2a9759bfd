//! Unit and category definitions as they live in a loaded registry

use std::fmt;
use serde::Serialize;
use metron_core::Number;
use metron_expr::{ExprError, Formula};

/// Points to one unit inside one category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnitRef {
    pub category: String,
    pub unit: String,
}

impl UnitRef {
    pub fn new(category: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            unit: unit.into(),
        }
    }
}

impl fmt::Display for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.unit)
    }
}

/// Formula pair mapping a unit to and from its category's base unit.
/// The two formulas need not be inverses of each other's shape; each must
/// be a correct mapping on its own (e.g. `1 / x` both ways for a
/// reciprocal quantity).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub to_base: Formula,
    pub from_base: Formula,
}

/// How a unit converts: a plain multiplier or a formula pair
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Conversion {
    Factor(Number),
    Transform(Transform),
}

/// A single unit inside a category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDefinition {
    /// Key in the category's unit map (e.g. "foot")
    pub key: String,
    /// Display name (e.g. "Foot")
    pub name: String,
    /// Display symbol (e.g. "ft")
    pub symbol: String,
    /// Extra case-insensitive aliases as authored
    pub aliases: Vec<String>,
    pub conversion: Conversion,
    /// Linear factor to the base unit. Backfilled from `toBase(1)` for
    /// transform-only units; `None` when that does not evaluate.
    pub factor: Option<Number>,
}

impl UnitDefinition {
    /// Convert a value in this unit to the base unit
    pub fn to_base(&self, value: &Number) -> Result<Number, ExprError> {
        match &self.conversion {
            Conversion::Factor(factor) => Ok(value.mul(factor)),
            Conversion::Transform(t) => t.to_base.eval(value),
        }
    }

    /// Convert a base-unit value into this unit
    pub fn from_base(&self, value: &Number) -> Result<Number, ExprError> {
        match &self.conversion {
            Conversion::Factor(factor) => Ok(value.checked_div(factor)?),
            Conversion::Transform(t) => t.from_base.eval(value),
        }
    }

    pub fn linear_factor(&self) -> Option<&Number> {
        self.factor.as_ref()
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.conversion, Conversion::Factor(_))
    }

    pub fn transform(&self) -> Option<&Transform> {
        match &self.conversion {
            Conversion::Transform(t) => Some(t),
            Conversion::Factor(_) => None,
        }
    }
}

impl fmt::Display for UnitDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// A measurement category: one base unit, units kept in configuration order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCategory {
    pub name: String,
    pub base_unit: String,
    units: Vec<UnitDefinition>,
}

impl UnitCategory {
    pub fn new(name: impl Into<String>, base_unit: impl Into<String>, units: Vec<UnitDefinition>) -> Self {
        Self {
            name: name.into(),
            base_unit: base_unit.into(),
            units,
        }
    }

    pub fn unit(&self, key: &str) -> Option<&UnitDefinition> {
        self.units.iter().find(|u| u.key == key)
    }

    pub fn base(&self) -> Option<&UnitDefinition> {
        self.unit(&self.base_unit)
    }

    pub fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    pub fn unit_ref(&self, unit: &UnitDefinition) -> UnitRef {
        UnitRef::new(&self.name, &unit.key)
    }
}
