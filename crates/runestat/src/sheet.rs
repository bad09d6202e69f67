//! Stat sheets: a combatant's full set of stats plus derived health.
//!
//! A [`StatSheet`] owns every [`Stat`] of one combatant, keyed by name. It
//! derives maximum health from one designated stat (see [`SheetConfig`]) and
//! keeps current health clamped to `[0, max_health]`.
//!
//! # Change Notification
//!
//! Sheets do not broadcast. Every mutation that matters to an observer
//! records a [`SheetEvent`] which the owner drains with
//! [`StatSheet::drain_events`] after the mutation:
//!
//! - `StatChanged` after a modifier is added or removed through the sheet
//! - `HealthChanged` whenever current or maximum health moves
//! - `Died` exactly once, when health crosses from above zero to zero
//!
//! # Example
//!
//! ```
//! use runestat::{Modifier, SheetEvent, StatDefinition, StatSheet};
//!
//! let mut sheet = StatSheet::new(
//!     "hero",
//!     &[StatDefinition::new("VIGOR", 2.0), StatDefinition::new("ATK", 10.0)],
//! )
//! .unwrap();
//! assert!((sheet.max_health() - 300.0).abs() < 1e-3);
//!
//! sheet.apply_modifier("VIGOR", Modifier::flat(-1.0, "curse"));
//! assert!((sheet.current_health() - 150.0).abs() < 1e-3);
//!
//! sheet.take_damage(500.0);
//! sheet.take_damage(500.0);
//! let deaths = sheet
//!     .drain_events()
//!     .into_iter()
//!     .filter(|e| matches!(e, SheetEvent::Died))
//!     .count();
//! assert_eq!(deaths, 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::definition::StatDefinition;
use crate::error::SheetError;
use crate::modifier::{Modifier, ModifierSource};
use crate::stat::Stat;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for health derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Stat whose final value drives maximum health.
    pub health_stat: String,
    /// `max_health = health_stat.final_value() * health_multiplier`.
    pub health_multiplier: f32,
    /// Maximum health used when the health stat is absent.
    pub fallback_max_health: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            health_stat: "VIGOR".to_string(),
            health_multiplier: 150.0,
            fallback_max_health: 1000.0,
        }
    }
}

// =============================================================================
// Sheet Events
// =============================================================================

/// Notification recorded by a sheet mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SheetEvent {
    /// A stat's modifier collection or base value changed.
    StatChanged {
        /// Name of the stat
        stat: String,
    },
    /// Current or maximum health changed.
    HealthChanged {
        /// Current health after the change
        current: f32,
        /// Maximum health after the change
        max: f32,
    },
    /// Health reached zero. Recorded at most once per sheet.
    Died,
}

// =============================================================================
// Stat Sheet
// =============================================================================

/// A combatant's stats and health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSheet {
    name: String,
    /// Stats keyed by name. `BTreeMap` keeps iteration deterministic.
    stats: BTreeMap<String, Stat>,
    config: SheetConfig,
    current_health: f32,
    died: bool,
    #[serde(skip)]
    events: Vec<SheetEvent>,
}

impl StatSheet {
    /// Creates a sheet with the default [`SheetConfig`].
    ///
    /// # Errors
    ///
    /// Returns a [`SheetError`] if any definition is invalid or two
    /// definitions share a name.
    pub fn new(name: &str, definitions: &[StatDefinition]) -> Result<Self, SheetError> {
        Self::with_config(name, definitions, SheetConfig::default())
    }

    /// Creates a sheet with an explicit health configuration.
    ///
    /// Current health starts at maximum health. A sheet whose maximum health
    /// is zero starts defeated and records [`SheetEvent::Died`] once.
    ///
    /// # Errors
    ///
    /// Returns a [`SheetError`] if any definition is invalid or two
    /// definitions share a name.
    pub fn with_config(
        name: &str,
        definitions: &[StatDefinition],
        config: SheetConfig,
    ) -> Result<Self, SheetError> {
        let mut stats = BTreeMap::new();
        for definition in definitions {
            definition.validate()?;
            if stats.contains_key(&definition.name) {
                return Err(SheetError::DuplicateStat(definition.name.clone()));
            }
            stats.insert(definition.name.clone(), Stat::from_definition(definition));
        }

        let mut sheet = Self {
            name: name.to_string(),
            stats,
            config,
            current_health: 0.0,
            died: false,
            events: Vec::new(),
        };
        sheet.current_health = sheet.max_health();
        if sheet.is_defeated() {
            sheet.die();
        }
        Ok(sheet)
    }

    /// Returns the owner's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the health configuration.
    #[must_use]
    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Stat access
    // -------------------------------------------------------------------------

    /// Looks up a stat by name.
    #[must_use]
    pub fn stat(&self, name: &str) -> Option<&Stat> {
        self.stats.get(name)
    }

    /// Returns a stat's final value, if the stat exists.
    #[must_use]
    pub fn stat_value(&self, name: &str) -> Option<f32> {
        self.stats.get(name).map(Stat::final_value)
    }

    /// Returns a stat's final value, or `0.0` when the stat is absent.
    #[must_use]
    pub fn stat_value_or_zero(&self, name: &str) -> f32 {
        self.stat_value(name).unwrap_or(0.0)
    }

    /// Iterates over all stats in name order.
    pub fn stats(&self) -> impl Iterator<Item = &Stat> {
        self.stats.values()
    }

    /// Inserts a stat built from `definition` unless one with that name exists.
    ///
    /// Returns `true` if a stat was inserted.
    pub fn add_or_update_stat(&mut self, definition: &StatDefinition) -> bool {
        if self.stats.contains_key(&definition.name) {
            return false;
        }
        self.stats
            .insert(definition.name.clone(), Stat::from_definition(definition));
        self.on_stat_changed(&definition.name);
        true
    }

    /// Adds a modifier to the named stat.
    ///
    /// A missing stat is logged and leaves the sheet untouched.
    pub fn apply_modifier(&mut self, stat: &str, modifier: Modifier) -> bool {
        let Some(target) = self.stats.get_mut(stat) else {
            warn!(sheet = %self.name, stat, "stat not found, modifier not applied");
            return false;
        };
        target.add_modifier(modifier);
        self.on_stat_changed(stat);
        true
    }

    /// Removes the first matching modifier from the named stat.
    ///
    /// Returns `false` if the stat is missing or holds no such modifier.
    pub fn remove_modifier(&mut self, stat: &str, modifier: &Modifier) -> bool {
        let Some(target) = self.stats.get_mut(stat) else {
            warn!(sheet = %self.name, stat, "stat not found, modifier not removed");
            return false;
        };
        if !target.remove_modifier(modifier) {
            return false;
        }
        self.on_stat_changed(stat);
        true
    }

    /// Removes every modifier with the given source from every stat.
    ///
    /// Returns the total number of modifiers removed.
    pub fn remove_modifiers_from_source(&mut self, source: &ModifierSource) -> usize {
        let mut changed = Vec::new();
        let mut removed = 0;
        for (name, stat) in &mut self.stats {
            let count = stat.remove_modifiers_from_source(source);
            if count > 0 {
                removed += count;
                changed.push(name.clone());
            }
        }
        for name in changed {
            self.on_stat_changed(&name);
        }
        removed
    }

    /// Replaces the base value of the named stat.
    pub fn set_base_value(&mut self, stat: &str, value: f32) -> bool {
        let Some(target) = self.stats.get_mut(stat) else {
            warn!(sheet = %self.name, stat, "stat not found, base value not set");
            return false;
        };
        target.set_base_value(value);
        self.on_stat_changed(stat);
        true
    }

    /// Clears every modifier on every stat.
    pub fn reset_all_stats(&mut self) {
        let mut changed = Vec::new();
        for (name, stat) in &mut self.stats {
            if stat.clear_modifiers() {
                changed.push(name.clone());
            }
        }
        for name in changed {
            self.on_stat_changed(&name);
        }
    }

    fn on_stat_changed(&mut self, stat: &str) {
        self.events.push(SheetEvent::StatChanged {
            stat: stat.to_string(),
        });
        if stat == self.config.health_stat {
            let was_alive = !self.is_defeated();
            let max = self.max_health();
            self.current_health = self.current_health.min(max);
            self.events.push(SheetEvent::HealthChanged {
                current: self.current_health,
                max,
            });
            if was_alive && self.is_defeated() {
                self.die();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    /// Maximum health derived from the health stat.
    #[must_use]
    pub fn max_health(&self) -> f32 {
        match self.stats.get(&self.config.health_stat) {
            Some(stat) => (stat.final_value() * self.config.health_multiplier).max(0.0),
            None => self.config.fallback_max_health,
        }
    }

    /// Current health, always within `[0, max_health]`.
    #[must_use]
    pub const fn current_health(&self) -> f32 {
        self.current_health
    }

    /// Current health as a fraction of maximum health (`0.0` when max is zero).
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        let max = self.max_health();
        if max <= 0.0 {
            0.0
        } else {
            self.current_health / max
        }
    }

    /// Returns true once health is at or below zero.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.current_health <= 0.0
    }

    /// Reduces current health by `damage`, clamped at zero.
    ///
    /// A sheet already at zero health ignores damage. Crossing to zero records
    /// [`SheetEvent::Died`] exactly once. Returns the health actually removed.
    pub fn take_damage(&mut self, damage: f32) -> f32 {
        if self.is_defeated() {
            return 0.0;
        }
        let before = self.current_health;
        self.current_health = (self.current_health - damage.max(0.0)).max(0.0);
        self.events.push(SheetEvent::HealthChanged {
            current: self.current_health,
            max: self.max_health(),
        });
        if self.is_defeated() {
            self.die();
        }
        before - self.current_health
    }

    /// Raises current health by `amount`, clamped at maximum health.
    ///
    /// A defeated sheet cannot be healed. Returns the health actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if self.is_defeated() {
            return 0.0;
        }
        let before = self.current_health;
        let max = self.max_health();
        self.current_health = (self.current_health + amount.max(0.0)).min(max);
        self.events.push(SheetEvent::HealthChanged {
            current: self.current_health,
            max,
        });
        self.current_health - before
    }

    /// Sets current health directly, clamped to `[0, max_health]`.
    ///
    /// Used for encounter setup (e.g. starting a boss below full health).
    /// Reaching zero from above zero records the death transition.
    pub fn set_current_health(&mut self, value: f32) {
        let was_alive = !self.is_defeated();
        let max = self.max_health();
        self.current_health = value.max(0.0).min(max);
        self.events.push(SheetEvent::HealthChanged {
            current: self.current_health,
            max,
        });
        if was_alive && self.is_defeated() {
            self.die();
        }
    }

    fn die(&mut self) {
        if self.died {
            return;
        }
        self.died = true;
        debug!(sheet = %self.name, "defeated");
        self.events.push(SheetEvent::Died);
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Returns the events recorded since the last drain.
    #[must_use]
    pub fn pending_events(&self) -> &[SheetEvent] {
        &self.events
    }

    /// Drains and returns the recorded events in order.
    pub fn drain_events(&mut self) -> Vec<SheetEvent> {
        std::mem::take(&mut self.events)
    }
}
