//! Flat alias index: every spelling of every unit, normalized

use std::collections::HashMap;
use serde::Serialize;
use tracing::warn;
use crate::definition::{UnitCategory, UnitRef};

/// Two units claimed the same normalized alias; the first one kept it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasCollision {
    pub alias: String,
    pub kept: UnitRef,
    pub dropped: UnitRef,
}

/// Normalized alias -> unit
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    entries: HashMap<String, UnitRef>,
    collisions: Vec<AliasCollision>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one alias. Returns false when the alias already points
    /// somewhere else (the existing entry wins).
    pub fn insert(&mut self, alias: &str, target: UnitRef) -> bool {
        let key = normalize_unit_text(alias);
        if key.is_empty() {
            return false;
        }
        match self.entries.get(&key) {
            Some(existing) if *existing == target => true,
            Some(existing) => {
                warn!(
                    alias = %key,
                    kept = %existing,
                    dropped = %target,
                    "Alias collision, keeping first registration"
                );
                self.collisions.push(AliasCollision {
                    alias: key,
                    kept: existing.clone(),
                    dropped: target,
                });
                false
            }
            None => {
                self.entries.insert(key, target);
                true
            }
        }
    }

    /// Look up a raw token (normalized here)
    pub fn resolve(&self, token: &str) -> Option<&UnitRef> {
        self.entries.get(&normalize_unit_text(token))
    }

    /// All normalized aliases, sorted
    pub fn aliases(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.entries.keys().map(|s| s.as_str()).collect();
        all.sort_unstable();
        all
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &UnitRef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn collisions(&self) -> &[AliasCollision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Index every unit under its key, display name, symbol and aliases,
/// in category and configuration order.
pub fn build_alias_index(categories: &[UnitCategory]) -> AliasIndex {
    let mut index = AliasIndex::new();
    for category in categories {
        for unit in category.units() {
            let target = category.unit_ref(unit);
            let implicit = [unit.key.as_str(), unit.name.as_str(), unit.symbol.as_str()];
            for alias in implicit.into_iter().chain(unit.aliases.iter().map(|a| a.as_str())) {
                index.insert(alias, target.clone());
            }
        }
    }
    index
}

/// Canonical form for unit text: lowercase, trimmed, single spaces, and
/// common glyphs mapped to ASCII.
pub fn normalize_unit_text(text: &str) -> String {
    let lowered = text.trim().to_lowercase();

    // A lone angstrom glyph (U+00C5 and U+212B both lowercase to U+00E5)
    if lowered == "\u{e5}" {
        return "angstrom".to_string();
    }

    let mut out = String::with_capacity(lowered.len());
    let mut after_degree = false;
    for c in lowered.chars() {
        if after_degree && c.is_whitespace() {
            continue;
        }
        after_degree = false;
        match c {
            '\u{b0}' | '\u{ba}' => {
                out.push_str("deg");
                after_degree = true;
            }
            '\u{b5}' | '\u{3bc}' => out.push('u'),
            '\u{e5}' => out.push('a'),
            '\u{2018}' | '\u{2019}' | '\u{2032}' | '\u{b4}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{2033}' => out.push('"'),
            '\u{b2}' => out.push('2'),
            '\u{b3}' => out.push('3'),
            other => out.push(other),
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
