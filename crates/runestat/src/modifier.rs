//! Modifiers: immutable transformation rules attached to stats.
//!
//! A [`Modifier`] is either a flat addition or a percentage scale. It carries
//! an opaque [`ModifierSource`] tag so that modifiers can be audited and bulk
//! removed by origin (an item, a buff, a skill).
//!
//! Modifiers never touch a stat themselves. A [`Stat`](crate::Stat) owns a
//! collection of them and decides in which order they apply.
//!
//! # Example
//!
//! ```
//! use runestat::{Modifier, ModifierKind};
//!
//! let flat = Modifier::flat(5.0, "ring");
//! let pct = Modifier::percentage(50.0, "rage");
//!
//! assert_eq!(flat.kind(), ModifierKind::Flat);
//! assert!((flat.apply(10.0) - 15.0).abs() < f32::EPSILON);
//! assert!((pct.apply(10.0) - 15.0).abs() < f32::EPSILON);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Modifier Kind
// =============================================================================

/// How a modifier transforms a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Adds `value` to the running total.
    Flat,
    /// Multiplies the running total by `1 + value / 100`.
    Percentage,
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "Flat"),
            Self::Percentage => write!(f, "Percentage"),
        }
    }
}

// =============================================================================
// Modifier Source
// =============================================================================

/// Opaque tag naming where a modifier came from.
///
/// Used for debugging output and for [`Stat::remove_modifiers_from_source`].
///
/// [`Stat::remove_modifiers_from_source`]: crate::Stat::remove_modifiers_from_source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierSource(String);

impl ModifierSource {
    /// Creates a new source tag.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(tag.to_string())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModifierSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModifierSource {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ModifierSource {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// Modifier
// =============================================================================

/// A single immutable transformation rule.
///
/// Equality is structural: two modifiers with the same kind, value and source
/// are interchangeable, and removing one from a stat removes the first
/// matching instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    kind: ModifierKind,
    value: f32,
    #[serde(default)]
    source: ModifierSource,
}

impl Modifier {
    /// Creates a modifier of the given kind.
    #[must_use]
    pub fn new(kind: ModifierKind, value: f32, source: impl Into<ModifierSource>) -> Self {
        Self {
            kind,
            value,
            source: source.into(),
        }
    }

    /// Creates a flat modifier.
    #[must_use]
    pub fn flat(value: f32, source: impl Into<ModifierSource>) -> Self {
        Self::new(ModifierKind::Flat, value, source)
    }

    /// Creates a percentage modifier (`50.0` means +50%).
    #[must_use]
    pub fn percentage(value: f32, source: impl Into<ModifierSource>) -> Self {
        Self::new(ModifierKind::Percentage, value, source)
    }

    /// Returns the modifier kind.
    #[must_use]
    pub const fn kind(&self) -> ModifierKind {
        self.kind
    }

    /// Returns the raw modifier value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Returns the source tag.
    #[must_use]
    pub fn source(&self) -> &ModifierSource {
        &self.source
    }

    /// Applies this modifier to a running value.
    #[must_use]
    pub fn apply(&self, running: f32) -> f32 {
        match self.kind {
            ModifierKind::Flat => running + self.value,
            ModifierKind::Percentage => running * (1.0 + self.value / 100.0),
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ModifierKind::Flat => write!(f, "{:+} ({})", self.value, self.source),
            ModifierKind::Percentage => write!(f, "{:+}% ({})", self.value, self.source),
        }
    }
}
