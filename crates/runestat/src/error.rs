//! Error types for building stats and stat sheets.
//!
//! Only construction can fail. Once a sheet exists, lookup misses and
//! out-of-range values are logged or clamped rather than reported.

use thiserror::Error;

/// Errors raised while validating stat definitions or assembling a sheet.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SheetError {
    /// Two definitions share the same stat name.
    #[error("Duplicate stat definition: {0}")]
    DuplicateStat(String),

    /// A definition's minimum exceeds its maximum.
    #[error("Invalid bounds for stat {name}: min {min} > max {max}")]
    InvalidBounds {
        /// Offending stat name
        name: String,
        /// Declared minimum
        min: f32,
        /// Declared maximum
        max: f32,
    },

    /// A definition has an empty name.
    #[error("Stat definition has an empty name")]
    EmptyName,
}
