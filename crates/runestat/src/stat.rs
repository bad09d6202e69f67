//! Stats: a base value plus an ordered modifier collection.
//!
//! # Evaluation Order
//!
//! [`Stat::final_value`] is recomputed on every call and never cached:
//!
//! 1. All [`ModifierKind::Flat`] modifiers are summed into the base value.
//! 2. All [`ModifierKind::Percentage`] modifiers then multiply the running
//!    total by `1 + value / 100`, in insertion order.
//!
//! Grouping by kind, not raw insertion order, decides the result. Flat
//! modifiers commute with each other; percentage modifiers compound.
//!
//! # Example
//!
//! ```
//! use runestat::{Modifier, Stat};
//!
//! let mut atk = Stat::new("ATK", 10.0);
//! atk.add_modifier(Modifier::percentage(50.0, "rage"));
//! atk.add_modifier(Modifier::flat(5.0, "ring"));
//!
//! // (10 + 5) * 1.5, regardless of insertion order across kinds
//! assert!((atk.final_value() - 22.5).abs() < 1e-5);
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::definition::StatDefinition;
use crate::modifier::{Modifier, ModifierKind, ModifierSource};

/// A named numeric quantity with modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    name: String,
    base_value: f32,
    modifiers: Vec<Modifier>,
    /// Clamp bounds inherited from the definition, if any.
    bounds: Option<(f32, f32)>,
}

impl Stat {
    /// Creates an unbounded stat with no modifiers.
    #[must_use]
    pub fn new(name: &str, base_value: f32) -> Self {
        Self {
            name: name.to_string(),
            base_value,
            modifiers: Vec::new(),
            bounds: None,
        }
    }

    /// Creates a stat from a definition, clamping the default value.
    #[must_use]
    pub fn from_definition(definition: &StatDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            base_value: definition.clamp(definition.default_value),
            modifiers: Vec::new(),
            bounds: Some((definition.min_value, definition.max_value)),
        }
    }

    /// Returns the stat name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the base value before modifiers.
    #[must_use]
    pub const fn base_value(&self) -> f32 {
        self.base_value
    }

    /// Replaces the base value, clamped to the definition bounds.
    pub fn set_base_value(&mut self, value: f32) {
        self.base_value = self.clamp(value);
    }

    /// Returns the active modifiers in insertion order.
    #[must_use]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Computes the final value from the base value and current modifiers.
    ///
    /// Deterministic, `O(modifier count)`, no side effects. With no modifiers
    /// this equals [`Stat::base_value`].
    #[must_use]
    pub fn final_value(&self) -> f32 {
        let flat: f32 = self
            .modifiers
            .iter()
            .filter(|m| m.kind() == ModifierKind::Flat)
            .map(Modifier::value)
            .sum();

        let value = self
            .modifiers
            .iter()
            .filter(|m| m.kind() == ModifierKind::Percentage)
            .fold(self.base_value + flat, |running, m| m.apply(running));

        self.clamp(value)
    }

    /// Appends a modifier.
    pub fn add_modifier(&mut self, modifier: Modifier) {
        trace!(stat = %self.name, %modifier, "modifier added");
        self.modifiers.push(modifier);
    }

    /// Removes the first modifier equal to `modifier`.
    ///
    /// Returns `false` (and changes nothing) when no such modifier is present.
    pub fn remove_modifier(&mut self, modifier: &Modifier) -> bool {
        match self.modifiers.iter().position(|m| m == modifier) {
            Some(index) => {
                self.modifiers.remove(index);
                trace!(stat = %self.name, %modifier, "modifier removed");
                true
            }
            None => false,
        }
    }

    /// Removes every modifier carrying the given source tag.
    ///
    /// Returns the number of modifiers removed.
    pub fn remove_modifiers_from_source(&mut self, source: &ModifierSource) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.source() != source);
        before - self.modifiers.len()
    }

    /// Clears all modifiers, resetting the final value to the base value.
    ///
    /// Returns `true` if any modifier was removed.
    pub fn clear_modifiers(&mut self) -> bool {
        let had_any = !self.modifiers.is_empty();
        self.modifiers.clear();
        had_any
    }

    fn clamp(&self, value: f32) -> f32 {
        match self.bounds {
            Some((min, max)) => value.max(min).min(max),
            None => value,
        }
    }
}
