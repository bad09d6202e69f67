//! Stat definitions: immutable templates for stat instances.

use serde::{Deserialize, Serialize};

use crate::error::SheetError;

/// Immutable template describing one stat.
///
/// Definitions are shared reference data: a combatant's sheet is built from a
/// list of them, and every value assigned to a stat created from a definition
/// is clamped into `[min_value, max_value]`.
///
/// # Example
///
/// ```
/// use runestat::StatDefinition;
///
/// let atk = StatDefinition::new("ATK", 10.0).with_bounds(0.0, 99.0);
/// assert!((atk.clamp(150.0) - 99.0).abs() < f32::EPSILON);
/// assert!((atk.clamp(-4.0)).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDefinition {
    /// Unique key of the stat (e.g. `"VIGOR"`, `"ATK"`).
    pub name: String,
    /// Human readable description.
    #[serde(default)]
    pub description: String,
    /// Base value a fresh stat starts with.
    pub default_value: f32,
    /// Lower clamp bound.
    #[serde(default = "default_min")]
    pub min_value: f32,
    /// Upper clamp bound.
    #[serde(default = "default_max")]
    pub max_value: f32,
}

fn default_min() -> f32 {
    f32::MIN
}

fn default_max() -> f32 {
    f32::MAX
}

impl StatDefinition {
    /// Creates an unbounded definition.
    #[must_use]
    pub fn new(name: &str, default_value: f32) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            default_value,
            min_value: default_min(),
            max_value: default_max(),
        }
    }

    /// Sets the clamp bounds.
    #[must_use]
    pub fn with_bounds(mut self, min_value: f32, max_value: f32) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Clamps a value into this definition's bounds.
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min_value).min(self.max_value)
    }

    /// Checks that the definition is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::EmptyName`] for a blank name and
    /// [`SheetError::InvalidBounds`] when `min_value > max_value`.
    pub fn validate(&self) -> Result<(), SheetError> {
        if self.name.trim().is_empty() {
            return Err(SheetError::EmptyName);
        }
        if self.min_value > self.max_value {
            return Err(SheetError::InvalidBounds {
                name: self.name.clone(),
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }
}
