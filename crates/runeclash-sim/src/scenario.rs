//! Encounter files.
//!
//! A scenario is one JSON document holding everything needed to replay a
//! fight: configuration, the skill catalog, both sides, and the player's
//! scripted input.
//!
//! ```json
//! {
//!   "config": { "auto_start_player_turn": true },
//!   "skills": [{ "name": "Jab", "combination": "W", "effect": "Damage", "base_value": 10.0 }],
//!   "player": { "name": "Hero", "stats": [{ "name": "VIGOR", "default_value": 1.0 }], "loadout": ["W"] },
//!   "enemies": [{ "name": "Slime", "stats": [{ "name": "VIGOR", "default_value": 0.5 }], "skills": ["W"], "max_uses": [1] }],
//!   "script": [[["W"]], [["W"], ["W"]]]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use runeclash_core::prelude::*;
use serde::Deserialize;

/// Chains the player enters during one turn, each a list of combinations.
pub type TurnScript = Vec<Vec<Combination>>;

/// A complete encounter description.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: CombatConfig,
    pub skills: Vec<SkillDefinition>,
    pub player: PlayerProfile,
    #[serde(default)]
    pub enemies: Vec<EnemyProfile>,
    /// Per-turn player input. Turns beyond the script reuse it from the start;
    /// an empty script leaves the player idle.
    #[serde(default)]
    pub script: Vec<TurnScript>,
}

impl Scenario {
    /// Reads and validates a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read encounter file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid encounter file {}", path.display()))
    }

    /// Parses and validates a scenario from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(text).context("malformed encounter JSON")?;
        scenario.validate_script()?;
        Ok(scenario)
    }

    /// Builds an orchestrator for this scenario.
    pub fn build(&self, seed: u64) -> Result<TurnOrchestrator> {
        let catalog = SkillCatalog::from_skills(self.skills.iter().cloned())
            .context("invalid skill catalog")?;
        let encounter = Encounter::new(catalog, &self.player, &self.enemies)
            .context("failed to assemble encounter")?;
        TurnOrchestrator::new(encounter, self.config.clone(), seed)
            .context("invalid combat configuration")
    }

    /// Input for the given 1-based turn.
    pub fn turn_script(&self, turn: u32) -> &[Vec<Combination>] {
        if self.script.is_empty() || turn == 0 {
            return &[];
        }
        let index = (turn as usize - 1) % self.script.len();
        &self.script[index]
    }

    fn validate_script(&self) -> Result<()> {
        for (turn, chains) in self.script.iter().enumerate() {
            for combination in chains.iter().flatten() {
                if combination.is_empty() {
                    bail!("script turn {} contains an empty combination", turn + 1);
                }
                if let Some(bad) = combination
                    .as_str()
                    .chars()
                    .find(|c| Direction::from_token(*c).is_none())
                {
                    bail!(
                        "script turn {} combination {combination} has invalid direction {bad:?}",
                        turn + 1
                    );
                }
            }
        }
        Ok(())
    }
}
