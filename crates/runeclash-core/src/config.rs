//! Encounter-wide combat configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Timing and formula constants shared by every phase of an encounter.
///
/// Every field has a default, so a configuration file only needs to list the
/// values it overrides.
///
/// # Example
///
/// ```
/// use runeclash_core::config::CombatConfig;
///
/// let config = CombatConfig::default();
/// assert!(config.validate().is_ok());
/// assert!((config.min_turn_duration - 5.0).abs() < f32::EPSILON);
/// assert!((config.max_turn_duration - 20.0).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Seconds the enemy turn stays on screen after selection.
    pub enemy_turn_interval: f32,
    /// Seconds between clash resolution and the next enemy turn.
    pub resolution_buffer: f32,
    /// Lower clamp for the player turn countdown.
    pub min_turn_duration: f32,
    /// Upper clamp for the player turn countdown.
    pub max_turn_duration: f32,
    /// Maximum number of directions in one pending combination.
    pub input_cap: usize,
    /// Stat used by the defender to mitigate damage.
    pub defense_stat: String,
    /// Damage removed per point of defense.
    pub defense_mitigation: f32,
    /// Stat compared between the sides to size the player turn.
    pub speed_stat: String,
    /// Start the player countdown immediately instead of waiting for a
    /// turn-start signal.
    pub auto_start_player_turn: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            enemy_turn_interval: 5.0,
            resolution_buffer: 2.0,
            min_turn_duration: 5.0,
            max_turn_duration: 20.0,
            input_cap: 4,
            defense_stat: "DEF".to_string(),
            defense_mitigation: 100.0,
            speed_stat: "SPD".to_string(),
            auto_start_player_turn: false,
        }
    }
}

impl CombatConfig {
    /// Returns a copy that starts player turns without a signal.
    #[must_use]
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start_player_turn = auto_start;
        self
    }

    /// Checks the configuration for values the orchestrator cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("enemy_turn_interval", self.enemy_turn_interval),
            ("resolution_buffer", self.resolution_buffer),
            ("min_turn_duration", self.min_turn_duration),
            ("max_turn_duration", self.max_turn_duration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidDuration { field, value });
            }
        }
        if self.min_turn_duration > self.max_turn_duration {
            return Err(ConfigError::InvalidTurnBounds {
                min: self.min_turn_duration,
                max: self.max_turn_duration,
            });
        }
        if self.defense_mitigation < 0.0 {
            return Err(ConfigError::NegativeMitigation(self.defense_mitigation));
        }
        if self.input_cap == 0 {
            return Err(ConfigError::ZeroInputCap);
        }
        Ok(())
    }
}
