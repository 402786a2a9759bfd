//! The loaded registry and its process-wide publication

use std::sync::{Arc, RwLock};
use metron_core::ErrorDetails;
use tracing::info;

use crate::alias::{build_alias_index, AliasIndex};
use crate::definition::{UnitCategory, UnitDefinition, UnitRef};
use crate::loader;

/// Immutable set of categories plus the alias index built over them
#[derive(Debug, Clone)]
pub struct Registry {
    categories: Vec<UnitCategory>,
    index: AliasIndex,
    warnings: Vec<String>,
}

impl Registry {
    pub fn new(categories: Vec<UnitCategory>) -> Self {
        let index = build_alias_index(&categories);
        let warnings = index
            .collisions()
            .iter()
            .map(|c| format!("alias '{}' kept by {}, ignored for {}", c.alias, c.kept, c.dropped))
            .collect();
        Self {
            categories,
            index,
            warnings,
        }
    }

    /// Append load-time warnings (non-inverse transforms and the like)
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn categories(&self) -> &[UnitCategory] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&UnitCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn alias_index(&self) -> &AliasIndex {
        &self.index
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.index.aliases()
    }

    /// Resolve a raw token to its category and unit
    pub fn resolve(&self, token: &str) -> Option<(&UnitCategory, &UnitDefinition)> {
        let r = self.index.resolve(token)?;
        let category = self.category(&r.category)?;
        Some((category, category.unit(&r.unit)?))
    }

    pub fn unit(&self, r: &UnitRef) -> Option<&UnitDefinition> {
        self.category(&r.category)?.unit(&r.unit)
    }

    /// Non-fatal findings from loading
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

static PUBLISHED: RwLock<Option<Arc<Registry>>> = RwLock::new(None);

/// Load the bundled configuration and publish it. On failure the
/// previously published registry (if any) stays in place.
pub fn initialize() -> Result<Arc<Registry>, ErrorDetails> {
    let registry = loader::load_all()?;
    Ok(initialize_with(registry))
}

/// Publish an already-loaded registry, replacing any previous one
pub fn initialize_with(registry: Registry) -> Arc<Registry> {
    let registry = Arc::new(registry);
    let mut slot = PUBLISHED.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(Arc::clone(&registry));
    info!(categories = registry.categories().len(), "Published unit registry");
    registry
}

/// The currently published registry
pub fn published() -> Result<Arc<Registry>, ErrorDetails> {
    PUBLISHED
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
        .ok_or_else(ErrorDetails::not_initialized)
}

/// Unpublish; later conversions report "not initialized"
pub fn reset() {
    *PUBLISHED.write().unwrap_or_else(|e| e.into_inner()) = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_and_lookup() {
        let registry = loader::load_all().unwrap();
        let (category, unit) = registry.resolve("Feet").unwrap();
        assert_eq!(category.name, "length");
        assert_eq!(unit.key, "foot");

        let r = UnitRef::new("volume", "gallon");
        assert_eq!(registry.unit(&r).map(|u| u.symbol.as_str()), Some("gal"));
        assert!(registry.category("length").is_some());
        assert!(registry.category("time").is_none());
        assert!(registry.resolve("parsec").is_none());
        assert!(registry.aliases().contains(&"meter"));
    }

    #[test]
    fn test_collisions_become_warnings() {
        use crate::definition::{Conversion, UnitDefinition};
        use metron_core::Number;

        let unit = |key: &str| UnitDefinition {
            key: key.to_string(),
            name: key.to_string(),
            symbol: "x".to_string(),
            aliases: vec![],
            conversion: Conversion::Factor(Number::from_i64(1)),
            factor: Some(Number::from_i64(1)),
        };
        let registry = Registry::new(vec![UnitCategory::new("c", "a", vec![unit("a"), unit("b")])]);
        assert_eq!(registry.warnings().len(), 1);
        assert!(registry.warnings()[0].contains("'x'"));
    }
}
