//! Encounter assembly.
//!
//! An [`Encounter`] owns every combatant and the shared [`SkillCatalog`].
//! It is built once, before the orchestrator starts, from serialisable
//! [`PlayerProfile`] and [`EnemyProfile`] data.

use std::sync::Arc;

use runestat::{SheetConfig, StatDefinition, StatSheet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combatant::{Combatant, CombatantId, Side};
use crate::enemy::{Enemy, EnemyProfile};
use crate::error::ConfigError;
use crate::skill::{Combination, KnownSkills, SkillCatalog};

// =============================================================================
// Player
// =============================================================================

/// Serialisable description of the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Display name
    pub name: String,
    /// Stat definitions for the player's sheet
    pub stats: Vec<StatDefinition>,
    /// Health derivation
    #[serde(default)]
    pub sheet: SheetConfig,
    /// Combinations the player always knows
    #[serde(default)]
    pub loadout: Vec<Combination>,
}

/// The player combatant.
#[derive(Debug, Clone)]
pub struct Player {
    sheet: StatSheet,
    loadout: Vec<Combination>,
    known: KnownSkills,
}

impl Player {
    /// Builds the player from its profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid stats or a loadout entry missing
    /// from the catalog.
    pub fn new(profile: &PlayerProfile, catalog: &SkillCatalog) -> Result<Self, ConfigError> {
        if let Some(missing) = profile.loadout.iter().find(|c| !catalog.contains(c)) {
            return Err(ConfigError::UnknownSkill {
                owner: profile.name.clone(),
                combination: missing.to_string(),
            });
        }
        let sheet = StatSheet::with_config(&profile.name, &profile.stats, profile.sheet.clone())?;
        Ok(Self {
            sheet,
            known: profile.loadout.iter().cloned().collect(),
            loadout: profile.loadout.clone(),
        })
    }

    /// Combinations the player always knows.
    #[must_use]
    pub fn loadout(&self) -> &[Combination] {
        &self.loadout
    }

    /// Combinations the player can currently resolve.
    #[must_use]
    pub const fn known_skills(&self) -> &KnownSkills {
        &self.known
    }

    /// Rebuilds known skills as the loadout plus every living enemy's current
    /// phase pool.
    pub fn refresh_known_skills(&mut self, enemies: &[Enemy]) {
        self.known.clear();
        self.known.extend(self.loadout.iter().cloned());
        for enemy in enemies.iter().filter(|e| !e.is_defeated()) {
            self.known
                .extend(enemy.available_skills().iter().map(|s| s.combination.clone()));
        }
        debug!(known = self.known.len(), "player known skills refreshed");
    }
}

impl Combatant for Player {
    fn id(&self) -> CombatantId {
        CombatantId::PLAYER
    }

    fn side(&self) -> Side {
        Side::Player
    }

    fn sheet(&self) -> &StatSheet {
        &self.sheet
    }

    fn sheet_mut(&mut self) -> &mut StatSheet {
        &mut self.sheet
    }
}

// =============================================================================
// Encounter
// =============================================================================

/// All combatants of one fight plus the skill catalog.
#[derive(Debug, Clone)]
pub struct Encounter {
    /// The player
    pub player: Player,
    /// Enemies in encounter order; ids start at 1
    pub enemies: Vec<Enemy>,
    catalog: Arc<SkillCatalog>,
}

impl Encounter {
    /// Assembles an encounter.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] raised while building a combatant.
    pub fn new(
        catalog: SkillCatalog,
        player: &PlayerProfile,
        enemies: &[EnemyProfile],
    ) -> Result<Self, ConfigError> {
        let player = Player::new(player, &catalog)?;
        let enemies = enemies
            .iter()
            .zip(1u64..)
            .map(|(profile, id)| Enemy::new(CombatantId::new(id), profile, &catalog))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            player,
            enemies,
            catalog: Arc::new(catalog),
        })
    }

    /// The shared skill catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<SkillCatalog> {
        &self.catalog
    }

    /// Finds an enemy by id.
    #[must_use]
    pub fn enemy(&self, id: CombatantId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id() == id)
    }

    /// Finds an enemy by id, for mutation.
    pub fn enemy_mut(&mut self, id: CombatantId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id() == id)
    }

    /// Enemies still standing.
    pub fn living_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| !e.is_defeated())
    }

    /// Sheet of any combatant.
    #[must_use]
    pub fn sheet(&self, id: CombatantId) -> Option<&StatSheet> {
        if id == CombatantId::PLAYER {
            Some(self.player.sheet())
        } else {
            self.enemy(id).map(Combatant::sheet)
        }
    }

    /// Returns true if the player is down.
    #[must_use]
    pub fn player_defeated(&self) -> bool {
        self.player.is_defeated()
    }

    /// Returns true if every enemy is down (or there are none).
    #[must_use]
    pub fn enemies_defeated(&self) -> bool {
        self.enemies.iter().all(Combatant::is_defeated)
    }
}
