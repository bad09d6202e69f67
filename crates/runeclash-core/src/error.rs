//! Setup-time error types.
//!
//! Errors exist only at the encounter boundary: loading a catalog, validating
//! configuration, building combatants. A running turn never returns an error;
//! lookup misses and mismatched configuration are logged and degrade to
//! neutral defaults.

use runestat::SheetError;
use thiserror::Error;

/// Errors raised while validating configuration or assembling an encounter.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A timing value is negative or not finite.
    #[error("Invalid duration for {field}: {value}")]
    InvalidDuration {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: f32,
    },

    /// The player turn bounds are inverted.
    #[error("Invalid turn duration bounds: min {min} > max {max}")]
    InvalidTurnBounds {
        /// Minimum turn duration
        min: f32,
        /// Maximum turn duration
        max: f32,
    },

    /// The defense mitigation constant is negative.
    #[error("Defense mitigation must be non-negative, got {0}")]
    NegativeMitigation(f32),

    /// The input cap would make every combination empty.
    #[error("Input cap must be at least 1")]
    ZeroInputCap,

    /// A skill declares an empty combination.
    #[error("Skill {0} has an empty combination")]
    EmptyCombination(String),

    /// Two skills in the catalog share a combination.
    #[error("Duplicate combination in skill catalog: {0}")]
    DuplicateCombination(String),

    /// A combatant references a combination the catalog does not contain.
    #[error("{owner} references unknown skill combination {combination}")]
    UnknownSkill {
        /// Combatant name
        owner: String,
        /// Missing combination
        combination: String,
    },

    /// Phase thresholds are outside `[0, 1]` or out of order.
    #[error("{enemy} has invalid phase thresholds: phase2 {phase2}, phase3 {phase3}")]
    InvalidThresholds {
        /// Enemy name
        enemy: String,
        /// Phase-2 threshold
        phase2: f32,
        /// Phase-3 threshold
        phase3: f32,
    },

    /// A stat sheet could not be built.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}
